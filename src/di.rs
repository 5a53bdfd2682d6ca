//! Dependency injection container for the reducer.
//!
//! Embedders wire the platform task queue and the collector into a container
//! rather than reaching for global singletons; each test gets an isolated
//! container so command observation never leaks between tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ReducerConfig;
use crate::error::ReducerResult;
use crate::platform::{self, GcTrigger, TimerScheduler};
use crate::reducer::MemoryReducer;

/// Container holding the reducer and its outbound capabilities.
pub struct DIContainer {
    timer_scheduler: Arc<dyn TimerScheduler>,
    gc_trigger: Arc<dyn GcTrigger>,
    memory_reducer: Mutex<Option<Arc<MemoryReducer>>>,
}

impl Clone for DIContainer {
    fn clone(&self) -> Self {
        Self {
            timer_scheduler: Arc::clone(&self.timer_scheduler),
            gc_trigger: Arc::clone(&self.gc_trigger),
            memory_reducer: Mutex::new(self.memory_reducer.lock().clone()),
        }
    }
}

impl DIContainer {
    /// Create a container wired to the shared no-op platform.
    pub fn new() -> Self {
        let noop = platform::noop_platform();
        let timer_scheduler: Arc<dyn TimerScheduler> = noop.clone();
        let gc_trigger: Arc<dyn GcTrigger> = noop;
        Self {
            timer_scheduler,
            gc_trigger,
            memory_reducer: Mutex::new(None),
        }
    }

    /// Create a container for testing with isolated components.
    pub fn new_for_testing() -> Self {
        Self::new()
    }

    /// Create a container around the host's real capabilities.
    pub fn with_platform(
        timer_scheduler: Arc<dyn TimerScheduler>,
        gc_trigger: Arc<dyn GcTrigger>,
    ) -> Self {
        Self {
            timer_scheduler,
            gc_trigger,
            memory_reducer: Mutex::new(None),
        }
    }

    pub fn timer_scheduler(&self) -> &Arc<dyn TimerScheduler> {
        &self.timer_scheduler
    }

    pub fn gc_trigger(&self) -> &Arc<dyn GcTrigger> {
        &self.gc_trigger
    }

    /// Get the memory reducer (panics if not set).
    pub fn memory_reducer(&self) -> Arc<MemoryReducer> {
        self.memory_reducer
            .lock()
            .as_ref()
            .expect("memory reducer not set in DI container")
            .clone()
    }

    pub fn set_memory_reducer(&self, reducer: Arc<MemoryReducer>) {
        let mut guard = self.memory_reducer.lock();
        *guard = Some(reducer);
    }

    /// Build a reducer from this container's capabilities and cache it.
    pub fn create_memory_reducer(
        &self,
        config: ReducerConfig,
    ) -> ReducerResult<Arc<MemoryReducer>> {
        let reducer = Arc::new(MemoryReducer::new(
            config,
            Arc::clone(&self.timer_scheduler),
            Arc::clone(&self.gc_trigger),
        )?);

        let mut guard = self.memory_reducer.lock();
        *guard = Some(Arc::clone(&reducer));

        Ok(reducer)
    }
}

impl Default for DIContainer {
    fn default() -> Self {
        Self::new()
    }
}

// Thread-local container for the current context.
thread_local! {
    static CURRENT_CONTAINER: std::cell::RefCell<Option<Arc<DIContainer>>> = const {
        std::cell::RefCell::new(None)
    };
}

/// Set the container for the current thread context.
pub fn set_current_container(container: Arc<DIContainer>) {
    CURRENT_CONTAINER.with(|c| {
        *c.borrow_mut() = Some(container);
    });
}

/// Get the current container, or create a default one.
pub fn current_container() -> Arc<DIContainer> {
    CURRENT_CONTAINER.with(|c| {
        if let Some(ref arc) = *c.borrow() {
            Arc::clone(arc)
        } else {
            let new = Arc::new(DIContainer::new());
            *c.borrow_mut() = Some(Arc::clone(&new));
            new
        }
    })
}

/// Clear the current container (useful for test cleanup).
pub fn clear_current_container() {
    CURRENT_CONTAINER.with(|c| {
        *c.borrow_mut() = None;
    });
}

/// RAII guard that scopes a container to the current thread.
pub struct DIScope {
    _phantom: std::marker::PhantomData<()>,
}

impl DIScope {
    pub fn new(container: Arc<DIContainer>) -> Self {
        set_current_container(container);
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl Drop for DIScope {
    fn drop(&mut self) {
        clear_current_container();
    }
}
