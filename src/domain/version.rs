//! Date-coded package versions
//!
//! Format: `YYYY.MM.DD.NNN` where `NNN` is a zero-padded sequence number for
//! releases cut on the same day.
//!
//! Bump rule:
//! - same date as today: sequence + 1, keeping the padded width
//! - any other date: today's date with sequence `001`

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the sequence for a freshly dated version
const FIRST_SEQUENCE_WIDTH: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum VersionError {
    #[error("Invalid version format: expected 'YYYY.MM.DD.NNN', got '{0}'")]
    InvalidFormat(String),

    #[error("Invalid date in version '{0}'")]
    InvalidDate(String),

    #[error("Sequence of version '{0}' can't be incremented")]
    SequenceOverflow(String),
}

/// A `YYYY.MM.DD.NNN` version string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateVersion {
    /// Date portion exactly as written (`2024.03.15`)
    date_text: String,
    date: NaiveDate,
    sequence: u32,
    width: usize,
}

impl DateVersion {
    /// Creates the first version for a date (`YYYY.MM.DD.001`)
    pub fn first_of(date: NaiveDate) -> Self {
        Self {
            date_text: date.format("%Y.%m.%d").to_string(),
            date,
            sequence: 1,
            width: FIRST_SEQUENCE_WIDTH,
        }
    }

    /// Computes the version that follows this one when released on `today`
    pub fn next(&self, today: NaiveDate) -> Result<Self, VersionError> {
        if self.date != today {
            return Ok(Self::first_of(today));
        }

        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or_else(|| VersionError::SequenceOverflow(self.to_string()))?;
        Ok(Self {
            date_text: self.date_text.clone(),
            date: self.date,
            sequence,
            width: self.width,
        })
    }
}

impl fmt::Display for DateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.date_text,
            self.sequence,
            width = self.width
        )
    }
}

impl FromStr for DateVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || VersionError::InvalidFormat(s.to_string());

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let year: i32 = parts[0].parse().map_err(|_| invalid())?;
        let month: u32 = parts[1].parse().map_err(|_| invalid())?;
        let day: u32 = parts[2].parse().map_err(|_| invalid())?;
        let sequence: u32 = parts[3].parse().map_err(|_| invalid())?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| VersionError::InvalidDate(s.to_string()))?;

        Ok(Self {
            date_text: format!("{}.{}.{}", parts[0], parts[1], parts[2]),
            date,
            sequence,
            width: parts[3].len(),
        })
    }
}

impl TryFrom<String> for DateVersion {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DateVersion> for String {
    fn from(version: DateVersion) -> Self {
        version.to_string()
    }
}
