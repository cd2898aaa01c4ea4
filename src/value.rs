//! Observation cell values.
//!
//! An observation is one row of [`Value`]s, one per variable. The exporter
//! accepts the full set of kinds below; the importer produces only
//! [`Value::Character`], [`Value::Number`], and [`Value::Missing`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::missing::MissingValue;

/// A single cell of an observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A character value. Missing is the empty (or all-blank) string.
    Character(String),
    /// A finite numeric value.
    Number(f64),
    /// A numeric missing value sentinel.
    Missing(MissingValue),
    /// A calendar date, written as days since 1960-01-01.
    Date(NaiveDate),
    /// A time of day, written as seconds since midnight.
    Time(NaiveTime),
    /// A timestamp, written as seconds since 1960-01-01T00:00:00.
    DateTime(NaiveDateTime),
}

impl Value {
    /// A short noun for this value kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Character(_) => "character",
            Self::Number(_) => "number",
            Self::Missing(_) => "missing value",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
        }
    }

    /// Returns the character payload, if this is a character value.
    #[must_use]
    pub fn as_character(&self) -> Option<&str> {
        match self {
            Self::Character(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the missing value sentinel, if this is one.
    #[must_use]
    pub fn as_missing(&self) -> Option<MissingValue> {
        match self {
            Self::Missing(m) => Some(*m),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Character(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Character(value)
    }
}

impl From<MissingValue> for Value {
    fn from(value: MissingValue) -> Self {
        Self::Missing(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}
