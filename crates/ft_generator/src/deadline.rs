//! Cooperative deadlines for in-flight builds.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A wall-clock budget plus an optional shared cancellation flag.
///
/// The builder calls [`Deadline::check`] between expansion steps; a build
/// that fails the check is abandoned and its partial tree dropped.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Deadline {
    /// Starts a deadline that expires after `budget`, or never for `None`.
    #[must_use]
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
            cancelled: None,
        }
    }

    /// Starts a deadline that never expires.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Attaches a flag that cancels the build once set to true.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// Time since the deadline started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fails once the budget is spent or the flag is raised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::Timeout`].
    pub fn check(&self) -> Result<()> {
        if self
            .cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            return Err(Error::Cancelled);
        }
        if let Some(budget) = self.budget {
            let elapsed = self.elapsed();
            if elapsed > budget {
                return Err(Error::Timeout { elapsed });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_expires() {
        assert!(Deadline::unbounded().check().is_ok());
    }

    #[test]
    fn zero_budget_times_out() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(deadline.check(), Err(Error::Timeout { .. })));
    }

    #[test]
    fn cancel_flag_wins() {
        let flag = Arc::new(AtomicBool::new(false));
        let deadline = Deadline::unbounded().with_cancel_flag(Arc::clone(&flag));
        assert!(deadline.check().is_ok());
        flag.store(true, Ordering::SeqCst);
        assert!(matches!(deadline.check(), Err(Error::Cancelled)));
    }
}
