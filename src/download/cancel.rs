//! Cooperative cancellation shared between the worker and the main task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A stop request polled at artwork, image and attempt boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
