use chrono::{DateTime, Local, NaiveDate};

/// Wall clock, injectable so day boundaries can be simulated
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Calendar day, no time-of-day component
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
