use time::macros::offset;
use time::{Date, OffsetDateTime};

/// Source of "today" for operations invoked without an explicit date.
///
/// Injected into every adapter so date-default behavior stays deterministic
/// under test.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Wall clock pinned to exchange local time (UTC+8).
///
/// All three providers publish statistics keyed to the Taipei trading day,
/// so "today" is always resolved in that zone regardless of host timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(offset!(+8)).date()
    }
}

/// Deterministic clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
