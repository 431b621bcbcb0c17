use chrono::{Datelike, Utc};

/// Source of the current calendar year for recency and year scoring
pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Reads the year from the system clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        Utc::now().year()
    }
}

/// Always reports the same year
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}
