//! Calendar-aware interval arithmetic anchored at the UNIX epoch.
//!
//! All arithmetic is performed in UTC. Months are calendar-variable; days and
//! weeks stay DST-neutral because no local timezone is ever involved.

use chrono::{DateTime, Datelike, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseIntervalError;

/// The UNIX epoch, the anchor for all interval indexing.
pub const EPOCH: DateTime<Utc> = DateTime::UNIX_EPOCH;

/// Calendar unit of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl Unit {
    /// All units, smallest first.
    pub fn all() -> &'static [Unit] {
        &[
            Unit::Seconds,
            Unit::Minutes,
            Unit::Hours,
            Unit::Days,
            Unit::Weeks,
            Unit::Months,
        ]
    }

    /// Single-letter code used in the short string form.
    pub const fn code(self) -> char {
        match self {
            Unit::Seconds => 's',
            Unit::Minutes => 'm',
            Unit::Hours => 'h',
            Unit::Days => 'd',
            Unit::Weeks => 'w',
            Unit::Months => 'M',
        }
    }

    /// Parse a single-letter unit code.
    pub const fn from_code(code: char) -> Option<Unit> {
        match code {
            's' => Some(Unit::Seconds),
            'm' => Some(Unit::Minutes),
            'h' => Some(Unit::Hours),
            'd' => Some(Unit::Days),
            'w' => Some(Unit::Weeks),
            'M' => Some(Unit::Months),
            _ => None,
        }
    }

    /// Fixed length in milliseconds, or `None` for calendar-variable units.
    const fn fixed_millis(self) -> Option<i64> {
        match self {
            Unit::Seconds => Some(1_000),
            Unit::Minutes => Some(60_000),
            Unit::Hours => Some(3_600_000),
            Unit::Days => Some(86_400_000),
            Unit::Weeks => Some(7 * 86_400_000),
            Unit::Months => None,
        }
    }

    /// Apply `count` units to a UTC date with calendar-correct semantics.
    fn add_to(self, date: DateTime<Utc>, count: i64) -> DateTime<Utc> {
        match self.fixed_millis() {
            Some(millis) => date + TimeDelta::milliseconds(millis * count),
            None => add_months(date, count),
        }
    }

    /// Whole units between two UTC dates, floored.
    fn between(self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        match self.fixed_millis() {
            Some(millis) => (later - earlier).num_milliseconds().div_euclid(millis),
            None => months_between(earlier, later),
        }
    }
}

fn add_months(date: DateTime<Utc>, count: i64) -> DateTime<Utc> {
    let months = Months::new(count.unsigned_abs() as u32);
    let shifted = if count >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    // Saturates at the representable date range.
    shifted.unwrap_or(date)
}

fn months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = (later.year() as i64 - earlier.year() as i64) * 12
        + (later.month0() as i64 - earlier.month0() as i64);
    // The calendar count overstates by one when the final month is incomplete.
    if months > 0 && add_months(earlier, months) > later {
        months -= 1;
    } else if months < 0 && add_months(earlier, months) < later {
        months += 1;
    }
    months
}

/// A calendar-aware duration: `amount` repetitions of a calendar `Unit`.
///
/// Immutable value type; `amount` is always at least 1. Serialized as the
/// compact short string (`"5m"`, `"1d"`, `"1M"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    unit: Unit,
    amount: u32,
}

impl Interval {
    /// Create an interval. Fails if `amount` is zero.
    pub fn new(unit: Unit, amount: u32) -> Result<Self, ParseIntervalError> {
        if amount == 0 {
            return Err(ParseIntervalError::NonPositiveAmount(0));
        }
        Ok(Self { unit, amount })
    }

    /// The calendar unit.
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    /// The number of units per interval, at least 1.
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Apply `count` intervals to a UTC date.
    pub fn add(&self, date: DateTime<Utc>, count: i64) -> DateTime<Utc> {
        self.unit.add_to(date, self.amount as i64 * count)
    }

    /// Remove `count` intervals from a UTC date.
    pub fn subtract(&self, date: DateTime<Utc>, count: i64) -> DateTime<Utc> {
        self.add(date, -count)
    }

    /// Whole intervals between two dates: `floor(raw_unit_difference / amount)`.
    ///
    /// Consistent with [`Interval::add`]:
    /// `difference(d, add(d, k)) == k` for any integer `k >= 0`.
    pub fn difference(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        self.unit
            .between(earlier, later)
            .div_euclid(self.amount as i64)
    }

    /// Interval index of a UTC date relative to the epoch.
    pub fn number_since_epoch_date(&self, date: DateTime<Utc>) -> i64 {
        self.difference(EPOCH, date)
    }

    /// Canonical boundary date for interval index `n`.
    pub fn add_to_epoch(&self, n: i64) -> DateTime<Utc> {
        self.add(EPOCH, n)
    }

    /// Interval index of a millisecond timestamp relative to the epoch.
    pub fn number_since_epoch(&self, timestamp: i64) -> i64 {
        self.number_since_epoch_date(datetime(timestamp))
    }

    /// Canonical boundary timestamp (milliseconds) for interval index `n`.
    pub fn timestamp_of(&self, n: i64) -> i64 {
        self.add_to_epoch(n).timestamp_millis()
    }

    /// Apply `count` intervals to a millisecond timestamp.
    pub fn add_to_timestamp(&self, timestamp: i64, count: i64) -> i64 {
        self.add(datetime(timestamp), count).timestamp_millis()
    }

    /// Remove `count` intervals from a millisecond timestamp.
    pub fn subtract_from_timestamp(&self, timestamp: i64, count: i64) -> i64 {
        self.add_to_timestamp(timestamp, -count)
    }
}

fn datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp).unwrap_or(EPOCH)
}

impl Default for Interval {
    /// One day, the partitioning grain charts most commonly start from.
    fn default() -> Self {
        Self {
            unit: Unit::Days,
            amount: 1,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.code())
    }
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(last) = s.chars().next_back() else {
            return Err(ParseIntervalError::Empty);
        };
        let unit = Unit::from_code(last).ok_or(ParseIntervalError::UnknownUnit(last))?;
        let amount_str = &s[..s.len() - last.len_utf8()];
        let amount: i64 = amount_str
            .parse()
            .map_err(|_| ParseIntervalError::InvalidAmount(amount_str.to_string()))?;
        if amount <= 0 {
            return Err(ParseIntervalError::NonPositiveAmount(amount));
        }
        if amount > u32::MAX as i64 {
            return Err(ParseIntervalError::InvalidAmount(amount_str.to_string()));
        }
        Interval::new(unit, amount as u32)
    }
}

impl TryFrom<String> for Interval {
    type Error = ParseIntervalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> String {
        interval.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
    }

    fn interval(s: &str) -> Interval {
        s.parse().unwrap()
    }

    #[test]
    fn test_number_since_epoch_minutes() {
        assert_eq!(
            interval("1m").number_since_epoch_date(utc(1970, 1, 1, 0, 7)),
            7
        );
        assert_eq!(
            interval("5m").number_since_epoch_date(utc(1970, 1, 1, 0, 12)),
            2
        );
    }

    #[test]
    fn test_number_since_epoch_months() {
        let date = utc(1972, 4, 1, 0, 0);
        assert_eq!(interval("1M").number_since_epoch_date(date), 27);
        // A partial month does not count.
        assert_eq!(interval("1M").number_since_epoch_date(utc(1972, 4, 1, 3, 0)), 27);
        assert_eq!(
            interval("1M").add_to_epoch(28).to_rfc3339(),
            "1972-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_round_trip_law() {
        for code in ["1s", "30s", "1m", "5m", "1h", "4h", "1d", "3d", "1w", "1M", "3M"] {
            let interval = interval(code);
            for n in [0, 1, 2, 11, 59, 365, 1000] {
                assert_eq!(
                    interval.number_since_epoch(interval.timestamp_of(n)),
                    n,
                    "round trip failed for {code} at n={n}"
                );
            }
        }
    }

    #[test]
    fn test_difference_consistent_with_add() {
        let base = utc(2024, 2, 29, 12, 0);
        for code in ["1m", "7m", "1h", "1d", "2w", "1M", "2M"] {
            let interval = interval(code);
            for k in [0, 1, 3, 25] {
                assert_eq!(
                    interval.difference(base, interval.add(base, k)),
                    k,
                    "difference/add mismatch for {code} at k={k}"
                );
            }
        }
    }

    #[test]
    fn test_month_end_clamping() {
        let jan31 = utc(2023, 1, 31, 0, 0);
        assert_eq!(
            interval("1M").add(jan31, 1).to_rfc3339(),
            "2023-02-28T00:00:00+00:00"
        );
    }

    #[test]
    fn test_difference_floors_partial_intervals() {
        let five = interval("5m");
        assert_eq!(five.difference(EPOCH, utc(1970, 1, 1, 0, 4)), 0);
        assert_eq!(five.difference(EPOCH, utc(1970, 1, 1, 0, 12)), 2);
    }

    #[test]
    fn test_short_string_round_trip() {
        for unit in Unit::all() {
            for amount in [1u32, 5, 15, 240] {
                let interval = Interval::new(*unit, amount).unwrap();
                let parsed: Interval = interval.to_string().parse().unwrap();
                assert_eq!(parsed, interval);
            }
        }
    }

    #[test]
    fn test_short_string_examples() {
        assert_eq!(interval("1d").to_string(), "1d");
        assert_eq!(interval("1M").unit(), Unit::Months);
        assert_eq!(interval("15m").amount(), 15);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Interval>(), Err(ParseIntervalError::Empty));
        assert_eq!(
            "5x".parse::<Interval>(),
            Err(ParseIntervalError::UnknownUnit('x'))
        );
        assert_eq!(
            "m".parse::<Interval>(),
            Err(ParseIntervalError::InvalidAmount(String::new()))
        );
        assert_eq!(
            "1.5h".parse::<Interval>(),
            Err(ParseIntervalError::InvalidAmount("1.5".to_string()))
        );
        assert_eq!(
            "0d".parse::<Interval>(),
            Err(ParseIntervalError::NonPositiveAmount(0))
        );
        assert_eq!(
            "-2w".parse::<Interval>(),
            Err(ParseIntervalError::NonPositiveAmount(-2))
        );
    }

    #[test]
    fn test_serde_uses_short_string() {
        let interval = interval("5m");
        assert_eq!(serde_json::to_string(&interval).unwrap(), "\"5m\"");
        let back: Interval = serde_json::from_str("\"5m\"").unwrap();
        assert_eq!(back, interval);
        assert!(serde_json::from_str::<Interval>("\"0d\"").is_err());
    }
}
