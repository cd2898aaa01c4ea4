//! Error types for the sas-transport crate.
//!
//! All fallible operations return [`Result`]. The [`Error`] enum keeps the
//! failure classes distinct: caller mistakes ([`Error::Argument`]), bad bytes
//! on the wire ([`Error::Malformed`]), recognized-but-refused format variants
//! ([`Error::Unsupported`]), use of a closed importer or exporter
//! ([`Error::Closed`]), and plain I/O failures ([`Error::Io`]).

use thiserror::Error;

/// A transport-file variant this crate recognizes but does not read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnsupportedVariant {
    /// SAS Transport Version 8/9 (`LIBV8` library header).
    XportV8,
    /// CPORT, the compressed proprietary transport format.
    Cport,
}

impl UnsupportedVariant {
    fn describe(self) -> &'static str {
        match self {
            Self::XportV8 => "SAS V8 XPORT format is not supported",
            Self::Cport => "CPORT format is not supported",
        }
    }
}

/// Unified error type for all transport operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Caller-supplied data failed a pre-condition.
    ///
    /// Raised before any bytes are written; the importer or exporter state
    /// is unchanged and the caller may retry with corrected input.
    #[error("{message}")]
    Argument {
        /// Description of the violated pre-condition.
        message: String,
    },

    /// The byte stream violates the XPORT V5 grammar.
    #[error("{message}")]
    Malformed {
        /// Description of the violation.
        message: String,
        /// Wrapped cause giving detail, when one exists.
        #[source]
        cause: Option<Box<Error>>,
    },

    /// A recognized transport variant this codec refuses.
    #[error("{}", .variant.describe())]
    Unsupported {
        /// The refused variant.
        variant: UnsupportedVariant,
    },

    /// The stream contains a second data set.
    ///
    /// XPORT libraries may hold several members; this codec reads only the
    /// first. Raised when the next observation is requested after the first
    /// member's observations are exhausted, never while they are still being
    /// iterated.
    #[error("transport file contains more than one data set")]
    MultipleDatasets,

    /// Operation on a closed importer or exporter.
    #[error("{message}")]
    Closed {
        /// Description of the refused operation.
        message: &'static str,
    },

    /// Underlying stream failure, propagated unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an argument pre-condition error.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    /// Creates a malformed-file error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a malformed-file error wrapping a more detailed cause.
    #[must_use]
    pub fn malformed_with(message: impl Into<String>, cause: Error) -> Self {
        Self::Malformed {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates an unsupported-variant error.
    #[must_use]
    pub fn unsupported(variant: UnsupportedVariant) -> Self {
        Self::Unsupported { variant }
    }

    /// Returns `true` for [`Error::Malformed`].
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Returns `true` for [`Error::Argument`].
    #[must_use]
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;
