//! Calendar dates decomposed into year, month and day
//!
//! Transactions carry their date as three separate fields, which is also how
//! they are stored remotely. Range selection compares those fields tier by
//! tier rather than as whole dates; see [`DateRange::contains`].

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar date as separate year, month (1-12) and day (1-31) fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl LedgerDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Today's date in local time
    pub fn today() -> Self {
        chrono::Local::now().date_naive().into()
    }

    /// Whether the fields name a real calendar day
    pub fn is_valid(&self) -> bool {
        self.to_naive().is_some()
    }

    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for LedgerDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for LedgerDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self::from)
    }
}

/// An inclusive selection window over transaction dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: LedgerDate,
    pub to: LedgerDate,
}

impl DateRange {
    pub const fn new(from: LedgerDate, to: LedgerDate) -> Self {
        Self { from, to }
    }

    /// Whether the range can match anything at all
    ///
    /// Both ends must be real dates and `from` must not come after `to`.
    pub fn is_usable(&self) -> bool {
        self.from.is_valid() && self.to.is_valid() && self.from <= self.to
    }

    /// Three-tier inclusive match.
    ///
    /// A year strictly between the endpoint years always matches. At an
    /// endpoint year, a month strictly between the endpoint months matches;
    /// at an endpoint month the day must lie within `from.day..=to.day`.
    /// The day bounds apply together even when only one endpoint month is
    /// hit, so a window like 03-20..05-10 does not match 03-25.
    pub fn contains(&self, date: &LedgerDate) -> bool {
        if !self.is_usable() {
            return false;
        }

        let (from, to) = (&self.from, &self.to);
        if date.year > from.year && date.year < to.year {
            return true;
        }
        if date.year != from.year && date.year != to.year {
            return false;
        }
        if date.month > from.month && date.month < to.month {
            return true;
        }
        if date.month != from.month && date.month != to.month {
            return false;
        }
        date.day >= from.day && date.day <= to.day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(from: (i32, u32, u32), to: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            LedgerDate::new(from.0, from.1, from.2),
            LedgerDate::new(to.0, to.1, to.2),
        )
    }

    #[test]
    fn test_parse_and_display() {
        let date: LedgerDate = "2023-01-15".parse().unwrap();
        assert_eq!(date, LedgerDate::new(2023, 1, 15));
        assert_eq!(date.to_string(), "2023-01-15");
        assert!("2023-02-30".parse::<LedgerDate>().is_err());
    }

    #[test]
    fn test_whole_year_window() {
        let r = range((2023, 1, 1), (2023, 12, 31));
        assert!(r.contains(&LedgerDate::new(2023, 1, 15)));
        assert!(r.contains(&LedgerDate::new(2023, 6, 1)));
        assert!(!r.contains(&LedgerDate::new(2024, 1, 1)));
    }

    #[test]
    fn test_single_day_window() {
        let r = range((2023, 1, 15), (2023, 1, 15));
        assert!(r.contains(&LedgerDate::new(2023, 1, 15)));
        assert!(!r.contains(&LedgerDate::new(2023, 1, 14)));
        assert!(!r.contains(&LedgerDate::new(2023, 6, 1)));
    }

    #[test]
    fn test_year_strictly_between_matches_any_month() {
        let r = range((2021, 11, 30), (2024, 2, 1));
        assert!(r.contains(&LedgerDate::new(2022, 12, 31)));
        assert!(r.contains(&LedgerDate::new(2023, 1, 1)));
    }

    #[test]
    fn test_endpoint_month_uses_both_day_bounds() {
        let r = range((2023, 3, 20), (2023, 5, 10));
        assert!(r.contains(&LedgerDate::new(2023, 4, 30)));
        assert!(!r.contains(&LedgerDate::new(2023, 3, 25)));
        assert!(!r.contains(&LedgerDate::new(2023, 5, 5)));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let r = range((2024, 1, 1), (2023, 12, 31));
        assert!(!r.is_usable());
        assert!(!r.contains(&LedgerDate::new(2024, 1, 1)));
        assert!(!r.contains(&LedgerDate::new(2023, 12, 31)));
    }

    #[test]
    fn test_invalid_endpoint_matches_nothing() {
        let r = range((2023, 2, 30), (2023, 3, 31));
        assert!(!r.contains(&LedgerDate::new(2023, 3, 1)));
    }
}
