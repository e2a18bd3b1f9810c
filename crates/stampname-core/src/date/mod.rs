pub mod metadata;
pub mod name;
pub mod reconcile;

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Separator placed between date and time (and before counters and descriptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameStyle {
    /// `2023-04-01 15-30-00 beach.jpg`
    Standard,
    /// `2023-04-01_15-30-00_beach.jpg`, only URI-unreserved characters
    Strict,
}

impl NameStyle {
    pub fn separator(self) -> char {
        match self {
            NameStyle::Standard => ' ',
            NameStyle::Strict => '_',
        }
    }
}

/// A timestamp recovered from a file name or from metadata.
///
/// `Complete` always holds a valid calendar date-time. `Partial` is the
/// messaging-app form (`IMG-20230401-WA0007`) which only knows the date and a
/// per-day sequence number; it is carried around as a literal and never used
/// for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TimestampToken {
    Complete { at: NaiveDateTime },
    Partial { date: NaiveDate, sequence: String },
}

impl TimestampToken {
    /// Build a complete token from exactly 14 ASCII digits (`YYYYMMDDHHMMSS`).
    pub fn from_digits(digits: &str) -> Result<Self, TokenError> {
        if digits.len() != 14 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::Shape(digits.to_string()));
        }
        // all-ASCII, so byte slicing is safe
        let field = |range: std::ops::Range<usize>| -> u32 {
            digits[range].parse().unwrap_or(u32::MAX)
        };
        let year = field(0..4) as i32;
        if year < 1 {
            return Err(TokenError::Calendar(digits.to_string()));
        }
        let date = NaiveDate::from_ymd_opt(year, field(4..6), field(6..8))
            .ok_or_else(|| TokenError::Calendar(digits.to_string()))?;
        let time = NaiveTime::from_hms_opt(field(8..10), field(10..12), field(12..14))
            .ok_or_else(|| TokenError::Calendar(digits.to_string()))?;
        Ok(TimestampToken::Complete {
            at: NaiveDateTime::new(date, time),
        })
    }

    /// Build a partial token from an 8-digit date and a 4-digit sequence number.
    pub fn partial(date_digits: &str, sequence: &str) -> Result<Self, TokenError> {
        let date = NaiveDate::parse_from_str(date_digits, "%Y%m%d")
            .map_err(|_| TokenError::Calendar(date_digits.to_string()))?;
        if sequence.len() != 4 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::Shape(sequence.to_string()));
        }
        Ok(TimestampToken::Partial {
            date,
            sequence: sequence.to_string(),
        })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TimestampToken::Complete { .. })
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            TimestampToken::Complete { at } => Some(*at),
            TimestampToken::Partial { .. } => None,
        }
    }

    /// Complete token one second later. `None` for partial tokens.
    pub fn next_second(&self) -> Option<Self> {
        let at = self.as_datetime()?.checked_add_signed(Duration::seconds(1))?;
        Some(TimestampToken::Complete { at })
    }

    /// Render the token as the leading part of a file name.
    pub fn render(&self, style: NameStyle) -> String {
        let sep = style.separator();
        match self {
            TimestampToken::Complete { at } => {
                format!("{}{}{}", at.format("%Y-%m-%d"), sep, at.format("%H-%M-%S"))
            }
            TimestampToken::Partial { date, sequence } => {
                format!("{}{}WA{}", date.format("%Y-%m-%d"), sep, sequence)
            }
        }
    }
}

impl fmt::Display for TimestampToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampToken::Complete { at } => write!(f, "{}", at.format("%Y%m%d%H%M%S")),
            TimestampToken::Partial { date, sequence } => {
                write!(f, "{} WA{}", date.format("%Y-%m-%d"), sequence)
            }
        }
    }
}
