use jiff::Timestamp;

/// A source of the current time.
///
/// The store's retention sweep and the rate limiter both reason about
/// wall-clock windows; injecting the clock keeps those windows testable.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Drops sub-second precision from a timestamp.
///
/// Stored favorites carry second precision only.
pub fn truncate_to_second(ts: Timestamp) -> Timestamp {
    Timestamp::from_second(ts.as_second()).unwrap_or(ts)
}
