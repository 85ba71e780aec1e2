use jiff::{SignedDuration, Timestamp};
use linkstash_core::Clock;
use parking_lot::Mutex;
use std::sync::Arc;

/// A clock that only moves when the test says so.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Starts at an arbitrary fixed instant.
    pub fn fixed() -> Self {
        Self::new(Timestamp::from_second(1_700_000_000).unwrap())
    }

    pub fn advance(&self, by: SignedDuration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}
