use std::convert::Infallible;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::sleep::{Sleeper, ThreadSleeper};

/// Value returned by a bounded poll.
///
/// `value` is whatever the last attempt fetched. When the budget ran out it
/// is the last unsettled value, so check [`Polled::settled`] before trusting
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled<T> {
    value: T,
    attempts: u32,
    settled: bool,
}

impl<T> Polled<T> {
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Number of fetches performed.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the predicate held on the last fetch.
    #[must_use]
    pub fn settled(&self) -> bool {
        self.settled
    }
}

/// Fixed-attempt, fixed-interval retry loop for asynchronously settled
/// remote state.
///
/// The first fetch happens immediately; each further fetch is preceded by
/// one sleep of `interval`. There is no backoff: the remote side is expected
/// to settle within a small window, and running out of attempts is the
/// caller's signal that it did not.
#[derive(Debug, Clone)]
pub struct BoundedPoller<S = ThreadSleeper> {
    max_attempts: u32,
    interval: Duration,
    sleeper: S,
}

impl BoundedPoller {
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroAttempts`] if `max_attempts` is zero.
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(CoreError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            interval,
            sleeper: ThreadSleeper,
        })
    }
}

impl<S: Sleeper> BoundedPoller<S> {
    #[must_use]
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> BoundedPoller<T> {
        BoundedPoller {
            max_attempts: self.max_attempts,
            interval: self.interval,
            sleeper,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch until `fetch_and_test` reports the value as settled or the
    /// attempt budget is spent. Exhaustion is not an error.
    pub fn poll<T, F>(&self, mut fetch_and_test: F) -> Polled<T>
    where
        F: FnMut() -> (T, bool),
    {
        match self.try_poll(|| Ok::<_, Infallible>(fetch_and_test())) {
            Ok(polled) => polled,
            Err(never) => match never {},
        }
    }

    /// Like [`poll`](Self::poll), but a fetch may fail. The first error stops
    /// the loop and is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing fetch.
    pub fn try_poll<T, E, F>(&self, mut fetch_and_test: F) -> std::result::Result<Polled<T>, E>
    where
        F: FnMut() -> std::result::Result<(T, bool), E>,
    {
        let mut attempt = 1;
        loop {
            let (value, settled) = fetch_and_test()?;
            debug!(attempt, max_attempts = self.max_attempts, settled, "poll attempt");

            if settled || attempt >= self.max_attempts {
                if !settled {
                    warn!(attempts = attempt, "poll budget exhausted before settlement");
                }
                return Ok(Polled {
                    value,
                    attempts: attempt,
                    settled,
                });
            }

            self.sleeper.sleep(self.interval);
            attempt += 1;
        }
    }
}
