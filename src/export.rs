//! Transport file export.
//!
//! [`Exporter`] validates the [`LibraryDescription`] and writes the header
//! and NAMESTR blocks on construction. Observations are appended one row
//! at a time; each row is validated and encoded in full before any of its
//! bytes reach the sink, so a rejected observation leaves the stream
//! untouched and the caller may retry.

use std::io::Write;

use crate::dataset::LibraryDescription;
use crate::error::{Error, Result};
use crate::header::{self, DESCRIPTOR_HEADER, LIBRARY_HEADER, MEMBER_HEADER, OBS_HEADER};
use crate::ibm;
use crate::missing::MissingValue;
use crate::namestr;
use crate::record::{PAD_BYTE, RecordWriter};
use crate::timestamp::{sas_days_since_1960, sas_seconds_since_1960, sas_seconds_since_midnight};
use crate::validate::{self, StrictnessMode};
use crate::value::Value;
use crate::variable::{Variable, VariableType};

/// Options controlling the export.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Validation bounds applied to the description and to observations.
    pub strictness: StrictnessMode,
}

/// Streaming writer of a single-member transport file.
#[derive(Debug)]
pub struct Exporter<W: Write> {
    records: RecordWriter<W>,
    variables: Vec<Variable>,
    closed: bool,
}

impl<W: Write> Exporter<W> {
    /// Validates `library` and writes the header and NAMESTR blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if validation fails (nothing is
    /// written), or [`Error::Io`] if writing the header block fails.
    pub(crate) fn new(sink: W, library: &LibraryDescription, options: ExportOptions) -> Result<Self> {
        validate::validate_library(library, options.strictness)?;

        let dataset = &library.dataset;
        let mut records = RecordWriter::new(sink);

        records.write_record(LIBRARY_HEADER)?;
        records.write_record(&header::encode_first_real_header(
            &library.source_sas_version,
            &library.source_operating_system,
            library.created,
        ))?;
        records.write_record(&header::encode_second_real_header(library.modified))?;

        records.write_record(MEMBER_HEADER)?;
        records.write_record(DESCRIPTOR_HEADER)?;
        records.write_record(&header::encode_member_descriptor(
            &dataset.name,
            &dataset.source_sas_version,
            &dataset.source_operating_system,
            dataset.created,
        ))?;
        records.write_record(&header::encode_member_data(
            dataset.modified,
            &dataset.label,
            &dataset.dataset_type,
        ))?;

        records.write_record(&header::encode_namestr_header(dataset.variables.len()))?;
        let mut position: u32 = 0;
        for variable in &dataset.variables {
            records.write_bytes(&namestr::pack(variable, position))?;
            position += u32::from(variable.length);
        }
        records.pad_to_boundary(0)?;

        records.write_record(OBS_HEADER)?;

        Ok(Self {
            records,
            variables: dataset.variables.clone(),
            closed: false,
        })
    }

    /// Validates, encodes, and writes one observation.
    ///
    /// The row is captured before this method returns; later mutation of
    /// the caller's container cannot affect already-written output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] after [`close`](Self::close), and
    /// [`Error::Argument`] for arity, type, range, and ASCII violations.
    /// On a validation failure no bytes are written and the exporter
    /// remains usable.
    pub fn append_observation(&mut self, values: &[Value]) -> Result<()> {
        if self.closed {
            return Err(Error::Closed {
                message: "Writing to a closed exporter",
            });
        }

        let expected = self.variables.len();
        if values.len() < expected {
            return Err(Error::argument(format!(
                "observation has too few values, expected {expected} but got {}",
                values.len()
            )));
        }
        if values.len() > expected {
            return Err(Error::argument(format!(
                "observation has too many values, expected {expected} but got {}",
                values.len()
            )));
        }

        let row_len: usize = self.variables.iter().map(|v| usize::from(v.length)).sum();
        let mut row = Vec::with_capacity(row_len);
        for (variable, value) in self.variables.iter().zip(values) {
            encode_value(variable, value, &mut row)?;
        }

        self.records.write_bytes(&row)?;
        Ok(())
    }

    /// Pads the observation block to an 80-byte boundary with spaces and
    /// flushes the sink. Closing is idempotent; writes after close fail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if padding or flushing fails.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.records.pad_to_boundary(PAD_BYTE)?;
        self.records.flush()?;
        self.closed = true;
        Ok(())
    }
}

fn encode_value(variable: &Variable, value: &Value, row: &mut Vec<u8>) -> Result<()> {
    match variable.variable_type {
        VariableType::Character => encode_character(variable, value, row),
        VariableType::Numeric => encode_numeric(variable, value, row),
    }
}

fn encode_character(variable: &Variable, value: &Value, row: &mut Vec<u8>) -> Result<()> {
    let text = match value {
        Value::Character(text) => text.as_str(),
        // The standard missing value is an alias for the blank string; the
        // special missing values have no character representation.
        Value::Missing(MissingValue::Standard) => "",
        Value::Missing(_) => {
            return Err(Error::argument(
                "CHARACTER variables use the empty string for missing values",
            ));
        }
        other => {
            return Err(Error::argument(format!(
                "CHARACTER variable {} cannot store a {} value; \
                 character variables accept only character strings",
                variable.name,
                other.kind()
            )));
        }
    };

    if !text.is_ascii() {
        return Err(Error::argument(
            "character value must contain only ASCII (7-bit) characters",
        ));
    }
    let length = usize::from(variable.length);
    if text.len() > length {
        return Err(Error::argument(format!(
            "character value must not be longer than {length} characters"
        )));
    }

    row.extend_from_slice(text.as_bytes());
    row.resize(row.len() + length - text.len(), PAD_BYTE);
    Ok(())
}

fn encode_numeric(variable: &Variable, value: &Value, row: &mut Vec<u8>) -> Result<()> {
    let full = match value {
        Value::Number(number) => ibm::encode(*number)?,
        Value::Missing(missing) => ibm::encode_missing(*missing),
        Value::Date(date) => ibm::encode(sas_days_since_1960(*date) as f64)?,
        Value::DateTime(timestamp) => ibm::encode(sas_seconds_since_1960(*timestamp) as f64)?,
        Value::Time(time) => ibm::encode(sas_seconds_since_midnight(*time) as f64)?,
        Value::Character(_) => {
            return Err(Error::argument(format!(
                "NUMERIC variable {} cannot store a character value; numeric variables \
                 accept numbers, missing values, dates, times, and datetimes",
                variable.name
            )));
        }
    };

    // Numeric variables shorter than 8 bytes truncate the low mantissa
    // bytes.
    row.extend_from_slice(&full[..usize::from(variable.length)]);
    Ok(())
}
