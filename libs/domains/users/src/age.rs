//! Age eligibility rule and the clock it reads "today" from.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{UserError, UserResult};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date; for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Owners must be at least `allowed_age` whole years old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRule {
    pub allowed_age: u32,
}

impl AgeRule {
    pub fn new(allowed_age: u32) -> Self {
        Self { allowed_age }
    }

    /// Whole years between `birth_date` and `today`; negative for future dates.
    pub fn age_at(birth_date: NaiveDate, today: NaiveDate) -> i32 {
        let mut years = today.year() - birth_date.year();
        if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
            years -= 1;
        }
        years
    }

    pub fn check(&self, birth_date: NaiveDate, today: NaiveDate) -> UserResult<()> {
        if i64::from(Self::age_at(birth_date, today)) < i64::from(self.allowed_age) {
            return Err(UserError::UnderAge {
                allowed_age: self.allowed_age,
            });
        }
        Ok(())
    }
}

impl Default for AgeRule {
    fn default() -> Self {
        Self::new(18)
    }
}
