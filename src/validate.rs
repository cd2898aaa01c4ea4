//! Structural and semantic validation of descriptors.
//!
//! The write path validates everything before the first byte is emitted.
//! The read path applies only the length checks (via
//! [`validate_variable_lengths`]): files in the wild carry corrupted names
//! and labels, and rejecting them on read would prevent access entirely.

use std::sync::OnceLock;

use regex::Regex;

use crate::dataset::{DatasetDescription, LibraryDescription};
use crate::error::{Error, Result};
use crate::format::Format;
use crate::variable::{Variable, VariableType};

/// How strictly descriptors are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrictnessMode {
    /// Relaxed bounds: character variables up to 32767 bytes, non-ASCII
    /// labels permitted.
    Basic,
    /// The bounds required for FDA submission files (the default).
    #[default]
    FdaSubmission,
}

impl StrictnessMode {
    /// Maximum character variable length for this mode.
    #[must_use]
    pub const fn max_character_length(self) -> u16 {
        match self {
            Self::Basic => 32767,
            Self::FdaSubmission => 200,
        }
    }
}

/// Maximum number of variables in a dataset.
pub const MAX_VARIABLES: usize = 9999;

const MAX_NAME_LENGTH: usize = 8;
const MAX_LABEL_LENGTH: usize = 40;

fn sas_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("SAS name pattern is a valid regex")
    })
}

fn check_ascii(field: &str, text: &str) -> Result<()> {
    if text.is_ascii() {
        Ok(())
    } else {
        Err(Error::argument(format!(
            "{field} must contain only ASCII (7-bit) characters"
        )))
    }
}

fn check_max_length(field: &str, text: &str, max: usize) -> Result<()> {
    if text.chars().count() > max {
        Err(Error::argument(format!(
            "{field} must not be longer than {max} characters"
        )))
    } else {
        Ok(())
    }
}

/// Validates a library description and its dataset.
///
/// # Errors
///
/// Returns [`Error::Argument`] naming the first violated pre-condition.
pub fn validate_library(library: &LibraryDescription, mode: StrictnessMode) -> Result<()> {
    check_ascii("operating system", &library.source_operating_system)?;
    check_max_length(
        "operating system",
        &library.source_operating_system,
        MAX_NAME_LENGTH,
    )?;
    check_ascii("SAS version", &library.source_sas_version)?;
    check_max_length("SAS version", &library.source_sas_version, MAX_NAME_LENGTH)?;
    validate_dataset(&library.dataset, mode)
}

/// Validates a dataset description, its variables, and name uniqueness.
///
/// # Errors
///
/// Returns [`Error::Argument`] naming the first violated pre-condition.
pub fn validate_dataset(dataset: &DatasetDescription, mode: StrictnessMode) -> Result<()> {
    if dataset.name.trim().is_empty() {
        return Err(Error::argument("dataset name must not be blank"));
    }
    check_ascii("dataset name", &dataset.name)?;
    check_max_length("dataset name", &dataset.name, MAX_NAME_LENGTH)?;
    if !sas_name_pattern().is_match(&dataset.name) {
        return Err(Error::argument("dataset name is illegal for SAS"));
    }

    if mode == StrictnessMode::FdaSubmission {
        check_ascii("dataset label", &dataset.label)?;
    }
    check_max_length("dataset label", &dataset.label, MAX_LABEL_LENGTH)?;

    check_ascii("dataset type", &dataset.dataset_type)?;
    check_max_length("dataset type", &dataset.dataset_type, MAX_NAME_LENGTH)?;
    check_ascii("operating system", &dataset.source_operating_system)?;
    check_max_length(
        "operating system",
        &dataset.source_operating_system,
        MAX_NAME_LENGTH,
    )?;
    check_ascii("SAS version", &dataset.source_sas_version)?;
    check_max_length("SAS version", &dataset.source_sas_version, MAX_NAME_LENGTH)?;

    if dataset.variables.len() > MAX_VARIABLES {
        return Err(Error::argument(format!(
            "data set must not have more than {MAX_VARIABLES} variables"
        )));
    }

    for variable in &dataset.variables {
        validate_variable(variable, mode)?;
    }

    // Variable names are unique ignoring case.
    let mut seen: Vec<String> = Vec::with_capacity(dataset.variables.len());
    for variable in &dataset.variables {
        let folded = variable.name.to_ascii_uppercase();
        if seen.contains(&folded) {
            return Err(Error::argument(format!(
                "duplicate variable name: '{}'",
                variable.name
            )));
        }
        seen.push(folded);
    }

    Ok(())
}

/// Validates a single variable descriptor.
///
/// # Errors
///
/// Returns [`Error::Argument`] naming the first violated pre-condition.
pub fn validate_variable(variable: &Variable, mode: StrictnessMode) -> Result<()> {
    check_ascii("variable name", &variable.name)?;
    check_max_length("variable name", &variable.name, MAX_NAME_LENGTH)?;
    if !sas_name_pattern().is_match(&variable.name) {
        return Err(Error::argument("variable name is illegal for SAS"));
    }

    if mode == StrictnessMode::FdaSubmission {
        check_ascii("variable label", &variable.label)?;
    }
    check_max_length("variable label", &variable.label, MAX_LABEL_LENGTH)?;

    validate_variable_lengths(variable, mode)?;

    validate_format(&variable.output_format)?;
    validate_format(&variable.input_format)?;

    Ok(())
}

/// Validates only the length domain of a variable.
///
/// This is the subset of checks the importer applies to descriptors parsed
/// off the wire.
///
/// # Errors
///
/// Returns [`Error::Argument`] when the length is outside the domain for
/// the variable type and strictness mode.
pub fn validate_variable_lengths(variable: &Variable, mode: StrictnessMode) -> Result<()> {
    match variable.variable_type {
        VariableType::Character => {
            if variable.length < 1 {
                return Err(Error::argument(
                    "character variables must have a positive length",
                ));
            }
            let max = mode.max_character_length();
            if variable.length > max {
                return Err(Error::argument(format!(
                    "character variables must not have a length greater than {max}"
                )));
            }
        }
        VariableType::Numeric => {
            if !(2..=8).contains(&variable.length) {
                return Err(Error::argument(
                    "numeric variables must have a length between 2-8",
                ));
            }
        }
    }
    Ok(())
}

fn validate_format(format: &Format) -> Result<()> {
    check_ascii("format name", &format.name)?;
    check_max_length("format name", &format.name, MAX_NAME_LENGTH)?;
    if format.width < 0 {
        return Err(Error::argument("format width must not be negative"));
    }
    if format.digits < 0 {
        return Err(Error::argument("format digits must not be negative"));
    }
    Ok(())
}
