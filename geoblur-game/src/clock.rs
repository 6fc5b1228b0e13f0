//! Reference-timezone calendar.
//!
//! Every player sees the same puzzle because "today" is always evaluated in a
//! single named timezone. Host-local time never enters the calculation: the
//! UTC instant is converted with `chrono-tz` and truncated to a calendar date.
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_REFERENCE_TIMEZONE, REFERENCE_DATE_FORMAT};

/// Source of the current instant.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock of the host machine (UTC, so no local offset leaks in).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

/// A calendar date already evaluated in the reference timezone.
///
/// Only [`ReferenceCalendar`] and [`ReferenceDate::assume_reference`] produce
/// one, which keeps host-local dates away from the day index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceDate(NaiveDate);

impl ReferenceDate {
    /// Treat `date` as a reference-timezone date. The caller vouches for it.
    #[must_use]
    pub const fn assume_reference(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    #[must_use]
    pub fn key(self) -> String {
        self.0.format(REFERENCE_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for ReferenceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(REFERENCE_DATE_FORMAT))
    }
}

impl FromStr for ReferenceDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), REFERENCE_DATE_FORMAT).map(Self)
    }
}

impl Serialize for ReferenceDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Fallback zone used when a configured name cannot be resolved.
#[must_use]
pub fn default_reference_zone() -> Tz {
    DEFAULT_REFERENCE_TIMEZONE
        .parse()
        .unwrap_or(chrono_tz::America::New_York)
}

/// Resolve an IANA name, falling back to the built-in reference zone.
#[must_use]
pub fn resolve_zone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|_| {
        log::warn!(
            "unknown reference timezone '{name}', falling back to {DEFAULT_REFERENCE_TIMEZONE}"
        );
        default_reference_zone()
    })
}

/// Clock adapter: answers "what date is it in the reference timezone".
#[derive(Debug, Clone)]
pub struct ReferenceCalendar<C> {
    clock: C,
    zone: Tz,
}

impl<C: Clock> ReferenceCalendar<C> {
    #[must_use]
    pub const fn new(clock: C, zone: Tz) -> Self {
        Self { clock, zone }
    }

    #[must_use]
    pub fn with_zone_name(clock: C, zone_name: &str) -> Self {
        Self::new(clock, resolve_zone(zone_name))
    }

    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }

    #[must_use]
    pub fn current_reference_date(&self) -> ReferenceDate {
        self.reference_date_at(self.clock.now_utc())
    }

    #[must_use]
    pub fn reference_date_at(&self, instant: DateTime<Utc>) -> ReferenceDate {
        reference_date_in(self.zone, instant)
    }
}

/// Calendar date shown by a wall clock in `zone` at `instant`.
#[must_use]
pub fn reference_date_in(zone: Tz, instant: DateTime<Utc>) -> ReferenceDate {
    ReferenceDate(instant.with_timezone(&zone).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn late_utc_evening_is_still_today_in_new_york() {
        let cal = ReferenceCalendar::new(
            FixedClock::new(utc(2024, 3, 5, 3, 30)),
            chrono_tz::America::New_York,
        );
        // 03:30 UTC is 22:30 EST on the previous day.
        assert_eq!(cal.current_reference_date().key(), "2024-03-04");
    }

    #[test]
    fn midnight_follows_dst_offsets() {
        let zone = chrono_tz::America::New_York;
        // Winter: EST is UTC-5, so local midnight is 05:00 UTC.
        assert_eq!(reference_date_in(zone, utc(2024, 1, 10, 4, 59)).key(), "2024-01-09");
        assert_eq!(reference_date_in(zone, utc(2024, 1, 10, 5, 0)).key(), "2024-01-10");
        // Summer: EDT is UTC-4, so local midnight is 04:00 UTC.
        assert_eq!(reference_date_in(zone, utc(2024, 7, 10, 3, 59)).key(), "2024-07-09");
        assert_eq!(reference_date_in(zone, utc(2024, 7, 10, 4, 0)).key(), "2024-07-10");
    }

    #[test]
    fn spring_forward_day_is_a_single_calendar_date() {
        let zone = chrono_tz::America::New_York;
        // 2024-03-10 02:00 local jumps to 03:00; the day spans 23 hours.
        assert_eq!(reference_date_in(zone, utc(2024, 3, 10, 5, 0)).key(), "2024-03-10");
        assert_eq!(reference_date_in(zone, utc(2024, 3, 11, 3, 59)).key(), "2024-03-10");
        assert_eq!(reference_date_in(zone, utc(2024, 3, 11, 4, 0)).key(), "2024-03-11");
    }

    #[test]
    fn unknown_zone_falls_back_to_default_not_host() {
        let cal = ReferenceCalendar::with_zone_name(SystemClock, "Mars/Olympus_Mons");
        assert_eq!(cal.zone(), chrono_tz::America::New_York);
        let tokyo = ReferenceCalendar::with_zone_name(SystemClock, "Asia/Tokyo");
        assert_eq!(tokyo.zone(), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(utc(2024, 1, 1, 12, 0));
        clock.advance(Duration::hours(13));
        assert_eq!(clock.now_utc(), utc(2024, 1, 2, 1, 0));
    }

    #[test]
    fn reference_date_parses_and_serializes_as_iso_day() {
        let date: ReferenceDate = "2024-02-29".parse().unwrap();
        assert_eq!(date, ReferenceDate::from_ymd(2024, 2, 29).unwrap());
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2024-02-29\"");
        let back: ReferenceDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
        assert!("infinite".parse::<ReferenceDate>().is_err());
    }
}
