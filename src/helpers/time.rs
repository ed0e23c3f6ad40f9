use chrono::Utc;

/// Source of "now" for token staleness checks.
pub trait Clock {
    /// Unix time in (fractional) seconds.
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        now_f64()
    }
}

/// Clock frozen at a given instant. Used by tests and dry runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

pub fn now_f64() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
