//! # Order Codes
//!
//! Human-readable order codes scoped to a calendar month:
//!
//! ```text
//! TRX 2026 10 0001
//! ─┬─ ──┬─ ┬─ ──┬─
//!  │    │  │    └── sequence within the month, zero-padded to 4 digits
//!  │    │  └─────── month
//!  │    └────────── year
//!  └─────────────── ORDER_CODE_PREFIX
//! ```
//!
//! Allocation (reading the counter, bumping it) lives in atlas-db; this
//! module only formats and parses.

use chrono::Datelike;
use std::fmt;

use crate::ORDER_CODE_PREFIX;

/// Calendar month an order code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Returns `None` for a month outside 1..=12 or a year outside 0..=9999.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((0..=9999).contains(&year) && (1..=12).contains(&month)).then_some(Period { year, month })
    }

    /// The period containing `date`.
    pub fn of(date: &impl Datelike) -> Self {
        Period {
            year: date.year().clamp(0, 9999),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Counter key, e.g. `202610`.
    pub fn key(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Shared prefix of every code in this period, e.g. `TRX202610`.
    pub fn code_prefix(&self) -> String {
        format!("{ORDER_CODE_PREFIX}{}", self.key())
    }

    /// Formats the `seq`-th code of this period.
    ///
    /// ```rust
    /// use atlas_core::sequence::Period;
    ///
    /// let period = Period::new(2026, 3).unwrap();
    /// assert_eq!(period.format_code(1), "TRX2026030001");
    /// assert_eq!(period.format_code(42), "TRX2026030042");
    /// ```
    pub fn format_code(&self, seq: u32) -> String {
        format!("{}{:04}", self.code_prefix(), seq)
    }

    /// Extracts the sequence number from a code of this period.
    ///
    /// Returns `None` when the code belongs to another period or its suffix
    /// is not numeric.
    pub fn parse_sequence(&self, code: &str) -> Option<u32> {
        let suffix = code.strip_prefix(&self.code_prefix())?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_period_of_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let period = Period::of(&date);
        assert_eq!(period.key(), "202610");
        assert_eq!(period.code_prefix(), "TRX202610");
        assert_eq!(period.to_string(), "2026-10");
    }

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(Period::new(2026, 0).is_none());
        assert!(Period::new(2026, 13).is_none());
    }

    #[test]
    fn test_parse_sequence() {
        let period = Period::new(2026, 10).unwrap();
        assert_eq!(period.parse_sequence("TRX2026100007"), Some(7));
        assert_eq!(period.parse_sequence("TRX2026100120"), Some(120));
        assert_eq!(period.parse_sequence("TRX20261012345"), Some(12_345));
        assert_eq!(period.parse_sequence("TRX2026090007"), None);
        assert_eq!(period.parse_sequence("TRX202610"), None);
        assert_eq!(period.parse_sequence("TRX20261000a1"), None);
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let period = Period::new(2026, 1).unwrap();
        for seq in [1, 9, 10, 999, 9_999] {
            assert_eq!(period.parse_sequence(&period.format_code(seq)), Some(seq));
        }
    }
}
