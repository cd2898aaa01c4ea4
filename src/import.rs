//! Transport file import.
//!
//! [`Importer`] parses the header and NAMESTR blocks eagerly on
//! construction, producing a [`LibraryDescription`], and then decodes
//! observations lazily as [`next_observation`](Importer::next_observation)
//! is called.
//!
//! The first structural error is terminal: every subsequent call reports
//! the same failure. End of data is reported as `Ok(None)` and is
//! idempotent.
//!
//! End-of-file handling follows observed SAS behavior. The observation
//! block is space-padded to the next record boundary, so a partial trailing
//! observation made entirely of spaces and lying within the final 80 bytes
//! is padding, and a final record made entirely of spaces is read as
//! padding even when it could have held whole blank observations.

use std::io::{self, Read};

use crate::dataset::{DatasetDescription, LibraryDescription};
use crate::error::{Error, Result, UnsupportedVariant};
use crate::header::{
    self, CPORT_PREFIX, DESCRIPTOR_HEADER, LIBRARY_HEADER, MEMBER_HEADER, OBS_HEADER,
    V8_LIBRARY_PREFIX,
};
use crate::ibm;
use crate::namestr::{self, NAMESTR_LEN};
use crate::record::{PAD_BYTE, RECORD_LEN, RawRecord, RecordReader};
use crate::timestamp::{YearMapper, default_year_mapper, parse_timestamp};
use crate::validate::{self, MAX_VARIABLES, StrictnessMode};
use crate::value::Value;
use crate::variable::Variable;

/// One decoded observation row, one [`Value`] per variable.
pub type Observation = Vec<Value>;

/// Options controlling the import.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Validation bounds applied to the parsed dataset description.
    pub strictness: StrictnessMode,
    /// Two-digit-year disambiguation for header timestamps.
    pub year_mapper: YearMapper,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strictness: StrictnessMode::default(),
            year_mapper: default_year_mapper,
        }
    }
}

/// Slice of the observation record belonging to one variable.
#[derive(Debug, Clone, Copy)]
struct FieldSlice {
    position: usize,
    length: usize,
    numeric: bool,
}

/// A reproducible copy of the first terminal failure.
#[derive(Debug)]
enum Sticky {
    Malformed(String),
    MultipleDatasets,
    Io(io::ErrorKind, String),
}

impl Sticky {
    fn capture(error: &Error) -> Self {
        match error {
            Error::MultipleDatasets => Self::MultipleDatasets,
            Error::Io(e) => Self::Io(e.kind(), e.to_string()),
            other => Self::Malformed(other.to_string()),
        }
    }

    fn replay(&self) -> Error {
        match self {
            Self::Malformed(message) => Error::malformed(message.clone()),
            Self::MultipleDatasets => Error::MultipleDatasets,
            Self::Io(kind, message) => Error::Io(io::Error::new(*kind, message.clone())),
        }
    }
}

#[derive(Debug)]
enum Phase {
    Reading,
    Done,
    Failed(Sticky),
}

/// Streaming reader of a single-member transport file.
#[derive(Debug)]
pub struct Importer<R: Read> {
    records: RecordReader<R>,
    library: LibraryDescription,
    fields: Vec<FieldSlice>,
    row_len: usize,
    /// Partially consumed record, with the read position inside it.
    current: Option<(RawRecord, usize)>,
    phase: Phase,
    closed: bool,
}

impl<R: Read> Importer<R> {
    /// Parses the header block of `source` and readies lazy observation
    /// decoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for grammar violations,
    /// [`Error::Unsupported`] for V8 XPORT and CPORT streams, and
    /// [`Error::Io`] for underlying stream failures.
    pub fn new(source: R, options: ImportOptions) -> Result<Self> {
        let mut records = RecordReader::new(source);
        let (library, namestrs) = parse_library(&mut records, &options)?;

        let row_len = library.dataset.observation_length();
        let mut fields = Vec::with_capacity(namestrs.len());
        for (index, entry) in namestrs.iter().enumerate() {
            let position = entry.position as usize;
            let length = usize::from(entry.variable.length);
            if position + length > row_len {
                return Err(Error::malformed_with(
                    format!("Variable #{} is malformed", index + 1),
                    Error::argument("variable position exceeds the observation record"),
                ));
            }
            fields.push(FieldSlice {
                position,
                length,
                numeric: entry.variable.is_numeric(),
            });
        }

        let phase = if row_len == 0 {
            // A dataset with no variables has no observations.
            Phase::Done
        } else {
            Phase::Reading
        };

        Ok(Self {
            records,
            library,
            fields,
            row_len,
            current: None,
            phase,
            closed: false,
        })
    }

    /// The parsed library description.
    #[must_use]
    pub fn description(&self) -> &LibraryDescription {
        &self.library
    }

    /// Decodes the next observation.
    ///
    /// Returns `Ok(None)` at the end of the observation block; further
    /// calls keep returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] after [`close`](Self::close),
    /// [`Error::MultipleDatasets`] when a second member follows the
    /// observation block, and [`Error::Malformed`] for truncated or
    /// undecodable rows. The first such failure is repeated by every
    /// subsequent call.
    pub fn next_observation(&mut self) -> Result<Option<Observation>> {
        if self.closed {
            return Err(Error::Closed {
                message: "Reading from a closed importer",
            });
        }
        match &self.phase {
            Phase::Done => return Ok(None),
            Phase::Failed(sticky) => return Err(sticky.replay()),
            Phase::Reading => {}
        }

        match self.read_row() {
            Ok(Some(row)) => Ok(Some(row)),
            Ok(None) => {
                self.phase = Phase::Done;
                Ok(None)
            }
            Err(error) => {
                self.phase = Phase::Failed(Sticky::capture(&error));
                Err(error)
            }
        }
    }

    /// Closes the importer. Closing is idempotent; reads after close fail.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn read_row(&mut self) -> Result<Option<Observation>> {
        if !self.position_at_row_start()? {
            return Ok(None);
        }

        let Some(bytes) = self.collect_row_bytes()? else {
            return Ok(None);
        };
        self.decode_row(&bytes).map(Some)
    }

    /// Positions the cursor at the start of the next observation.
    ///
    /// Returns `Ok(false)` when the remaining bytes are trailing padding
    /// (end of data).
    fn position_at_row_start(&mut self) -> Result<bool> {
        match self.current {
            None => {
                // On a record boundary.
                let Some(peeked) = self.records.peek_record().map_err(Error::Io)?.copied() else {
                    return Ok(false);
                };
                if peeked.is_full() && is_dataset_boundary(&peeked.bytes) {
                    return Err(Error::MultipleDatasets);
                }
                let Some(record) = self.records.next_record().map_err(Error::Io)? else {
                    return Ok(false);
                };
                let more = self.records.has_more().map_err(Error::Io)?;
                if !more && record.data().iter().all(|&b| b == PAD_BYTE) {
                    // The final all-space record is padding, matching the
                    // SAS engine's reading of the ambiguity.
                    return Ok(false);
                }
                self.current = Some((record, 0));
                Ok(true)
            }
            Some((record, pos)) => {
                if record.data()[pos..].iter().all(|&b| b == PAD_BYTE) {
                    match self.records.peek_record().map_err(Error::Io)? {
                        None => {
                            // Trailing padding of the final record.
                            self.current = None;
                            return Ok(false);
                        }
                        Some(next) if next.is_full() && is_dataset_boundary(&next.bytes) => {
                            return Err(Error::MultipleDatasets);
                        }
                        Some(_) => {}
                    }
                }
                Ok(true)
            }
        }
    }

    /// Pulls `row_len` bytes across record boundaries.
    ///
    /// Returns `Ok(None)` when the stream ends inside the row but the
    /// partial bytes are trailing padding.
    fn collect_row_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        let mut row = Vec::with_capacity(self.row_len);
        loop {
            if let Some((record, pos)) = self.current.as_mut() {
                let take = (record.len - *pos).min(self.row_len - row.len());
                row.extend_from_slice(&record.bytes[*pos..*pos + take]);
                *pos += take;
                let exhausted = *pos == record.len;
                if exhausted {
                    self.current = None;
                }
            }
            if row.len() == self.row_len {
                return Ok(Some(row));
            }
            match self.records.next_record().map_err(Error::Io)? {
                Some(record) => self.current = Some((record, 0)),
                None => {
                    // A partial observation is padding only when it is all
                    // spaces and lies within the final 80 bytes.
                    if row.len() <= RECORD_LEN && row.iter().all(|&b| b == PAD_BYTE) {
                        return Ok(None);
                    }
                    return Err(Error::malformed("observation truncated"));
                }
            }
        }
    }

    fn decode_row(&self, bytes: &[u8]) -> Result<Observation> {
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let slice = &bytes[field.position..field.position + field.length];
            let value = if field.numeric {
                ibm::decode(slice)?
            } else {
                Value::Character(header::lossy_ascii(slice))
            };
            values.push(value);
        }
        Ok(values)
    }
}

fn is_dataset_boundary(record: &[u8; RECORD_LEN]) -> bool {
    record == LIBRARY_HEADER || record == MEMBER_HEADER
}

fn require_record<R: Read>(
    records: &mut RecordReader<R>,
    section: &'static str,
) -> Result<[u8; RECORD_LEN]> {
    match records.next_record() {
        Ok(Some(record)) if record.is_full() => Ok(record.bytes),
        // Nothing left, or a short record: either way the section is
        // missing or cut off.
        Ok(_) => Err(Error::malformed(format!("missing {section} record"))),
        Err(e) => Err(Error::Io(e)),
    }
}

fn parse_library<R: Read>(
    records: &mut RecordReader<R>,
    options: &ImportOptions,
) -> Result<(LibraryDescription, Vec<namestr::Namestr>)> {
    // Library header.
    let first = require_record(records, "LIBRARY_HEADER")?;
    if &first != LIBRARY_HEADER {
        if first.starts_with(CPORT_PREFIX) {
            return Err(Error::unsupported(UnsupportedVariant::Cport));
        }
        if first.starts_with(V8_LIBRARY_PREFIX) {
            return Err(Error::unsupported(UnsupportedVariant::XportV8));
        }
        return Err(Error::malformed(
            "First record indicates this is not SAS V5 XPORT format",
        ));
    }

    // Two real header records with library provenance.
    let real1 = require_record(records, "REAL_HEADER")?;
    let real_header = header::decode_first_real_header(&real1)?;
    let library_created = parse_timestamp(&real_header.timestamp_raw, options.year_mapper)?;

    let real2 = require_record(records, "REAL_HEADER")?;
    let modified_raw = header::decode_second_real_header(&real2);
    let library_modified = parse_timestamp(&modified_raw, options.year_mapper)?;

    // Member and descriptor markers.
    let member = require_record(records, "MEMBER_HEADER")?;
    if &member != MEMBER_HEADER {
        return Err(Error::malformed("missing MEMBER_HEADER record"));
    }
    let dscrptr = require_record(records, "DSCRPTR_HEADER")?;
    if &dscrptr != DESCRIPTOR_HEADER {
        return Err(Error::malformed("missing DSCRPTR_HEADER record"));
    }

    // Two member descriptor records.
    let md1 = require_record(records, "MEMBER_DATA")?;
    let descriptor = header::decode_member_descriptor(&md1)?;
    let dataset_created = parse_timestamp(&descriptor.timestamp_raw, options.year_mapper)?;

    let md2 = require_record(records, "MEMBER_DATA")?;
    let member_data = header::decode_member_data(&md2);
    let dataset_modified = parse_timestamp(&member_data.timestamp_raw, options.year_mapper)?;

    // NAMESTR block.
    let namestr_header = require_record(records, "NAMESTR_HEADER")?;
    let count = header::decode_namestr_header(&namestr_header)?;
    if count > MAX_VARIABLES {
        return Err(Error::malformed_with(
            "Data set is malformed",
            Error::argument(format!(
                "data set must not have more than {MAX_VARIABLES} variables"
            )),
        ));
    }

    let namestr_records = (count * NAMESTR_LEN).div_ceil(RECORD_LEN);
    let mut block = Vec::with_capacity(namestr_records * RECORD_LEN);
    for _ in 0..namestr_records {
        block.extend_from_slice(&require_record(records, "NAMESTR")?);
    }

    let mut namestrs = Vec::with_capacity(count);
    let mut variables: Vec<Variable> = Vec::with_capacity(count);
    for index in 0..count {
        let mut raw = [0u8; NAMESTR_LEN];
        raw.copy_from_slice(&block[index * NAMESTR_LEN..(index + 1) * NAMESTR_LEN]);
        let entry = namestr::unpack(&raw).map_err(|cause| {
            Error::malformed_with(format!("Variable #{} is malformed", index + 1), cause)
        })?;
        variables.push(entry.variable.clone());
        namestrs.push(entry);
    }

    // Observation header.
    let obs = require_record(records, "OBS_HEADER")?;
    if &obs != OBS_HEADER {
        return Err(Error::malformed("missing OBS_HEADER record"));
    }

    let dataset = DatasetDescription {
        name: descriptor.name,
        label: member_data.label,
        dataset_type: member_data.dataset_type,
        source_operating_system: descriptor.operating_system,
        source_sas_version: descriptor.sas_version,
        variables,
        created: dataset_created,
        modified: dataset_modified,
    };

    // Semantic validation of the parsed description. Only the length
    // domain is checked on read; corrupted names and labels are reported
    // as parsed so damaged files remain accessible.
    for variable in &dataset.variables {
        validate::validate_variable_lengths(variable, options.strictness)
            .map_err(|cause| Error::malformed_with("Data set is malformed", cause))?;
    }

    let library = LibraryDescription {
        dataset,
        source_operating_system: real_header.operating_system,
        source_sas_version: real_header.sas_version,
        created: library_created,
        modified: library_modified,
    };

    Ok((library, namestrs))
}
