use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Per-call failure state shared by every task of one parallel fan-out.
///
/// The first user-function panic is captured here and flips the
/// cancellation flag; tasks that have not started yet observe the flag
/// and skip their user function so the call fails fast. Tasks already
/// running are not stopped.
pub(crate) struct FailureCell {
    cancelled: AtomicBool,
    panic_message: Mutex<Option<String>>,
}

impl FailureCell {
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            panic_message: Mutex::new(None),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Run a user function, capturing a panic instead of unwinding.
    /// Returns `None` when the function panicked; the first panic per
    /// call is recorded, later ones are dropped.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                self.record_panic(panic_message(payload));
                None
            }
        }
    }

    fn record_panic(&self, message: String) {
        let mut slot = self.panic_message.lock();
        if slot.is_none() {
            *slot = Some(message);
        }
        drop(slot);
        self.cancel();
    }

    /// Resolve the call outcome after the completion barrier opens.
    pub fn check(&self) -> Result<()> {
        if let Some(message) = self.panic_message.lock().take() {
            return Err(Error::TaskPanicked(message));
        }
        if self.is_cancelled() {
            return Err(Error::executor("parallel call abandoned before completion"));
        }
        Ok(())
    }
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
