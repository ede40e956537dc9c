//! Per-client fixed-window admission control.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::domain::ports::Clock;
use crate::domain::Error;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    attempts: u32,
}

/// Fixed-window counter keyed by client address.
///
/// Every call counts against the window, successful or not, and the window
/// only resets once its full duration has elapsed. State is in-process; with
/// multiple replicas each replica enforces its own budget.
pub struct FixedWindowLimiter {
    max_attempts: u32,
    window: Duration,
    message: String,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Create a limiter allowing `max_attempts` per `window` per key.
    pub fn new(
        max_attempts: u32,
        window: Duration,
        message: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            max_attempts,
            window,
            message: message.into(),
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `key` and reject it once the budget is spent.
    pub fn check(&self, key: &str) -> Result<(), Error> {
        let now = self.clock.now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let window = windows.entry(key.to_owned()).or_insert(Window {
            started_at: now,
            attempts: 0,
        });
        if now - window.started_at >= self.window {
            window.started_at = now;
            window.attempts = 0;
        }
        window.attempts += 1;
        if window.attempts > self.max_attempts {
            return Err(Error::too_many_requests(self.message.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FixedClock;
    use crate::domain::ErrorCode;

    const MESSAGE: &str = "Too many attempts.";

    fn limiter(clock: Arc<FixedClock>) -> FixedWindowLimiter {
        FixedWindowLimiter::new(5, Duration::minutes(15), MESSAGE, clock)
    }

    #[test]
    fn the_sixth_attempt_in_a_window_is_rejected() {
        let clock = Arc::new(FixedClock::at(Utc::now()));
        let limiter = limiter(clock);
        for _ in 0..5 {
            limiter.check("10.0.0.1").expect("within budget");
        }
        let err = limiter.check("10.0.0.1").expect_err("budget spent");
        assert_eq!(err.code(), ErrorCode::TooManyRequests);
        assert_eq!(err.message(), MESSAGE);
    }

    #[test]
    fn keys_are_budgeted_independently() {
        let clock = Arc::new(FixedClock::at(Utc::now()));
        let limiter = limiter(clock);
        for _ in 0..5 {
            limiter.check("10.0.0.1").expect("within budget");
        }
        limiter.check("10.0.0.2").expect("separate key unaffected");
    }

    #[test]
    fn the_window_resets_after_its_full_duration() {
        let clock = Arc::new(FixedClock::at(Utc::now()));
        let limiter = limiter(clock.clone());
        for _ in 0..6 {
            let _ = limiter.check("10.0.0.1");
        }
        clock.advance(Duration::minutes(15));
        limiter.check("10.0.0.1").expect("fresh window after expiry");
    }

    #[test]
    fn rejected_attempts_still_count() {
        let clock = Arc::new(FixedClock::at(Utc::now()));
        let limiter = limiter(clock.clone());
        for _ in 0..6 {
            let _ = limiter.check("10.0.0.1");
        }
        // Still inside the window, so the budget stays spent.
        clock.advance(Duration::minutes(14));
        limiter
            .check("10.0.0.1")
            .expect_err("window has not reset yet");
    }
}
