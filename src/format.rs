//! SAS format and informat specifications.
//!
//! Formats control how SAS displays a variable (`DATE9.`, `BEST12.`,
//! `$CHAR20.`); informats control how raw input is read. On the wire both
//! are a name of up to 8 characters plus a width and a decimal-digit count.

use std::fmt;

/// A SAS output format or informat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Format {
    /// Format name, conventionally uppercase, at most 8 characters.
    pub name: String,
    /// Total display width.
    pub width: i16,
    /// Number of decimal digits.
    pub digits: i16,
}

impl Format {
    /// The distinguished "no format" value: empty name, zero width and digits.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::default()
    }

    /// Creates a format with a name and width.
    #[must_use]
    pub fn new(name: impl Into<String>, width: i16) -> Self {
        Self {
            name: name.into(),
            width,
            digits: 0,
        }
    }

    /// Creates a format with a name, width, and decimal digits.
    #[must_use]
    pub fn with_digits(name: impl Into<String>, width: i16, digits: i16) -> Self {
        Self {
            name: name.into(),
            width,
            digits,
        }
    }

    /// Returns `true` for the distinguished unspecified format.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        self.name.is_empty() && self.width == 0 && self.digits == 0
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            return Ok(());
        }
        if self.digits > 0 {
            write!(f, "{}{}.{}", self.name, self.width, self.digits)
        } else if self.width > 0 {
            write!(f, "{}{}.", self.name, self.width)
        } else {
            write!(f, "{}.", self.name)
        }
    }
}

/// Output format justification of a variable.
///
/// Stored on the wire as a 2-byte integer: 0 is left, 1 is right, anything
/// else is reported as [`Justification::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Justification {
    /// Left-justified (wire code 0).
    #[default]
    Left,
    /// Right-justified (wire code 1).
    Right,
    /// Any other wire code.
    Unknown,
}

impl Justification {
    /// Maps a wire code to a justification.
    #[must_use]
    pub const fn from_code(code: i16) -> Self {
        match code {
            0 => Self::Left,
            1 => Self::Right,
            _ => Self::Unknown,
        }
    }

    /// The wire code written for this justification.
    ///
    /// [`Justification::Unknown`] has no dedicated code and is written as 0.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Right => 1,
            Self::Left | Self::Unknown => 0,
        }
    }
}
