//! Day numbering anchored to a fixed epoch.
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::ReferenceDate;
use crate::constants::{DEFAULT_EPOCH_DAY, DEFAULT_EPOCH_MONTH, DEFAULT_EPOCH_YEAR};

/// Converts reference dates into puzzle day numbers and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayIndex {
    epoch: NaiveDate,
}

impl Default for DayIndex {
    fn default() -> Self {
        Self::new(default_epoch())
    }
}

impl DayIndex {
    #[must_use]
    pub const fn new(epoch: NaiveDate) -> Self {
        Self { epoch }
    }

    #[must_use]
    pub const fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    /// Whole calendar days between the epoch and `date`; negative before the epoch.
    #[must_use]
    pub fn day_number(&self, date: ReferenceDate) -> i64 {
        date.date().signed_duration_since(self.epoch).num_days()
    }

    /// Inverse of [`DayIndex::day_number`]. `None` outside chrono's date range.
    #[must_use]
    pub fn date_for_day(&self, day: i64) -> Option<ReferenceDate> {
        let magnitude = Days::new(day.unsigned_abs());
        let date = if day >= 0 {
            self.epoch.checked_add_days(magnitude)
        } else {
            self.epoch.checked_sub_days(magnitude)
        };
        date.map(ReferenceDate::assume_reference)
    }
}

/// 2024-01-01.
#[must_use]
pub fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(DEFAULT_EPOCH_YEAR, DEFAULT_EPOCH_MONTH, DEFAULT_EPOCH_DAY)
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> ReferenceDate {
        ReferenceDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn epoch_is_day_zero() {
        let index = DayIndex::default();
        assert_eq!(index.day_number(date(2024, 1, 1)), 0);
        assert_eq!(index.day_number(date(2024, 2, 12)), 42);
    }

    #[test]
    fn consecutive_dates_differ_by_one() {
        let index = DayIndex::default();
        let mut current = date(2024, 2, 27);
        for _ in 0..400 {
            let next = current.succ().unwrap();
            assert_eq!(index.day_number(next), index.day_number(current) + 1);
            current = next;
        }
    }

    #[test]
    fn leap_year_and_dst_dates_count_as_single_days() {
        let index = DayIndex::default();
        // 2024 is a leap year: Feb 29 exists and the year has 366 days.
        assert_eq!(index.day_number(date(2025, 1, 1)), 366);
        // DST transitions in March/November do not produce fractional days.
        assert_eq!(
            index.day_number(date(2024, 3, 11)) - index.day_number(date(2024, 3, 10)),
            1
        );
        assert_eq!(
            index.day_number(date(2024, 11, 4)) - index.day_number(date(2024, 11, 3)),
            1
        );
    }

    #[test]
    fn dates_before_epoch_are_negative() {
        let index = DayIndex::default();
        assert_eq!(index.day_number(date(2023, 12, 31)), -1);
    }

    #[test]
    fn date_for_day_inverts_day_number() {
        let index = DayIndex::default();
        for day in [-30, -1, 0, 1, 42, 365, 1000] {
            let back = index.date_for_day(day).unwrap();
            assert_eq!(index.day_number(back), day);
        }
        assert_eq!(index.date_for_day(42), Some(date(2024, 2, 12)));
    }

    #[test]
    fn custom_epoch_shifts_numbering() {
        let index = DayIndex::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(index.day_number(date(2025, 6, 3)), 2);
    }
}
