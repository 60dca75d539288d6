//! Publish-once deferred values.
//!
//! A [`DeferredValue`] holds a factory and runs it on first access. The
//! factory runs at most once even when several threads race on the first
//! access; every caller observes the same instance.
//!
//! Fallible initialization is expressed as `DeferredValue<Result<T>>`: the
//! outcome is cached, so a failed factory is never retried.

use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

type Factory<T> = Box<dyn FnOnce() -> T + Send>;

/// A value constructed on first read and memoized afterwards.
pub struct DeferredValue<T> {
    value: OnceLock<T>,
    factory: Mutex<Option<Factory<T>>>,
}

impl<T> DeferredValue<T> {
    /// Register a factory without running it.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            value: OnceLock::new(),
            factory: Mutex::new(Some(Box::new(factory))),
        }
    }

    /// Create an already-realized value.
    pub fn realized(value: T) -> Self {
        Self {
            value: OnceLock::from(value),
            factory: Mutex::new(None),
        }
    }

    /// Realize the value if needed and return it.
    ///
    /// # Panics
    ///
    /// Panics if a previous factory invocation panicked; the factory is
    /// consumed by its single run and cannot be retried.
    #[must_use]
    pub fn get(&self) -> &T {
        self.value.get_or_init(|| {
            let factory = self
                .factory
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            match factory {
                Some(factory) => factory(),
                None => panic!("deferred value factory panicked during an earlier initialization"),
            }
        })
    }

    /// Return the value only if it has already been realized.
    #[must_use]
    pub fn get_if_realized(&self) -> Option<&T> {
        self.value.get()
    }

    /// Whether the factory has run.
    #[must_use]
    pub fn is_realized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Consume the wrapper, returning the value if it was realized.
    #[must_use]
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }
}

impl<T: fmt::Debug> fmt::Debug for DeferredValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("DeferredValue").field(value).finish(),
            None => f.write_str("DeferredValue(<unrealized>)"),
        }
    }
}
