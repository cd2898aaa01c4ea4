//! Variable descriptors.
//!
//! A [`Variable`] describes one typed, named column of a dataset: its wire
//! type, byte length within the observation record, label, and display
//! formats. Descriptors are plain value types built up front and consumed
//! by the exporter or produced by the importer.

use crate::format::{Format, Justification};

/// The two variable types of the transport format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableType {
    /// Fixed-width ASCII text, 1-200 bytes (up to 32767 in basic mode).
    Character,
    /// IBM hexadecimal floating point, 2-8 bytes.
    Numeric,
}

impl VariableType {
    /// The NAMESTR type code: 1 for numeric, 2 for character.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Numeric => 1,
            Self::Character => 2,
        }
    }
}

/// One column of a dataset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// Variable name, a SAS identifier of 1-8 ASCII characters.
    pub name: String,
    /// Variable number. Written to the wire untouched, negative included.
    pub number: i16,
    /// Wire type of the variable.
    pub variable_type: VariableType,
    /// Byte length of this variable within each observation.
    pub length: u16,
    /// Human-readable label, at most 40 ASCII characters.
    pub label: String,
    /// Output (display) format.
    pub output_format: Format,
    /// Justification of the output format.
    pub output_format_justification: Justification,
    /// Input format (informat).
    pub input_format: Format,
}

impl Variable {
    /// Creates a numeric variable with the full 8-byte length.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: 0,
            variable_type: VariableType::Numeric,
            length: 8,
            label: String::new(),
            output_format: Format::unspecified(),
            output_format_justification: Justification::Left,
            input_format: Format::unspecified(),
        }
    }

    /// Creates a character variable with the given byte length.
    #[must_use]
    pub fn character(name: impl Into<String>, length: u16) -> Self {
        Self {
            length,
            variable_type: VariableType::Character,
            ..Self::numeric(name)
        }
    }

    /// Sets the byte length. Numeric variables may be 2-8 bytes; the low
    /// bytes of the 8-byte float are truncated on write.
    #[must_use]
    pub fn with_length(mut self, length: u16) -> Self {
        self.length = length;
        self
    }

    /// Sets the variable number.
    #[must_use]
    pub fn with_number(mut self, number: i16) -> Self {
        self.number = number;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_output_format(mut self, format: Format) -> Self {
        self.output_format = format;
        self
    }

    /// Sets the output format justification.
    #[must_use]
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.output_format_justification = justification;
        self
    }

    /// Sets the input format.
    #[must_use]
    pub fn with_input_format(mut self, format: Format) -> Self {
        self.input_format = format;
        self
    }

    /// Returns `true` for numeric variables.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.variable_type == VariableType::Numeric
    }
}
