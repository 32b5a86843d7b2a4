//! Serialized access to one session from several threads.
//!
//! Sessions are not reentrant. An embedding that shares one between threads wraps
//! it in a [`SessionSlot`], which runs each call sequence under a mutex.

use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to a mutex-guarded session.
pub struct SessionSlot<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SessionSlot<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Default> Default for SessionSlot<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> SessionSlot<S> {
    /// Wrap `session` for shared use.
    pub fn new(session: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// A panic inside an earlier call does not lock the slot forever; the session is
    /// handed over as it was left, and its own phase checks reject stale streams.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
