//! Header record grammar.
//!
//! Every transport file opens with a fixed sequence of 80-byte header
//! records: the library header, two "real header" records carrying library
//! provenance, the member and descriptor markers, two member descriptor
//! records, the NAMESTR header, and, after the NAMESTR block, the
//! observation header.
//!
//! The read side tolerates two corruptions seen in files in the wild: NUL
//! bytes used as padding in the symbol, version, and library-name fields,
//! and the `%loc2xpt` off-by-one bug that overwrites the first byte of the
//! blanks region following the operating-system field. The write side emits
//! strictly conformant records.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::record::RECORD_LEN;
use crate::timestamp::format_timestamp;

/// The library header, the first record of every V5 transport file.
pub const LIBRARY_HEADER: &[u8; RECORD_LEN] =
    b"HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!000000000000000000000000000000  ";

/// Prefix of the V8/V9 library header, recognized only to refuse it.
pub const V8_LIBRARY_PREFIX: &[u8] = b"HEADER RECORD*******LIBV8   HEADER RECORD";

/// Prefix of a CPORT stream, recognized only to refuse it.
pub const CPORT_PREFIX: &[u8] = b"**COMPRESSED**";

/// The member header record.
pub const MEMBER_HEADER: &[u8; RECORD_LEN] =
    b"HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!000000000000000001600000000140  ";

/// The descriptor header record.
pub const DESCRIPTOR_HEADER: &[u8; RECORD_LEN] =
    b"HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!000000000000000000000000000000  ";

/// The fixed prefix of the NAMESTR header record; the variable count
/// follows in a 10-character decimal field.
pub const NAMESTR_HEADER_PREFIX: &[u8; 48] =
    b"HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";

/// The observation header record.
pub const OBS_HEADER: &[u8; RECORD_LEN] =
    b"HEADER RECORD*******OBS     HEADER RECORD!!!!!!!000000000000000000000000000000  ";

/// Decodes bytes as ASCII, replacing every non-ASCII byte with U+FFFD.
///
/// `String::from_utf8_lossy` would pass multi-byte UTF-8 sequences through;
/// the transport format is strictly 7-bit, so each high byte is replaced
/// individually.
pub fn lossy_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
        .collect()
}

fn field_verbatim(record: &[u8], start: usize, len: usize) -> String {
    let text = lossy_ascii(&record[start..start + len]);
    text.trim_end_matches(' ').to_owned()
}

fn field_nul_trimmed(record: &[u8], start: usize, len: usize) -> String {
    let text: String = record[start..start + len]
        .iter()
        .map(|&b| match b {
            0 => ' ',
            b if b.is_ascii() => b as char,
            _ => '\u{FFFD}',
        })
        .collect();
    text.trim_end_matches(' ').to_owned()
}

/// Compares an 8-byte symbol field against its expected content, accepting
/// NUL bytes in place of the space padding.
fn symbol_matches(field: &[u8], expected: &[u8]) -> bool {
    let trimmed: &[u8] = {
        let mut end = field.len();
        while end > 0 && (field[end - 1] == b' ' || field[end - 1] == 0) {
            end -= 1;
        }
        &field[..end]
    };
    trimmed == expected
}

fn put(record: &mut [u8; RECORD_LEN], start: usize, bytes: &[u8]) {
    record[start..start + bytes.len()].copy_from_slice(bytes);
}

fn put_str_padded(record: &mut [u8; RECORD_LEN], start: usize, len: usize, text: &str) {
    debug_assert!(text.len() <= len, "field exceeds its wire width");
    let bytes = text.as_bytes();
    put(record, start, bytes);
    // The record is space-filled already; nothing to pad.
}

/// Provenance carried by the first real header record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealHeader {
    /// SAS version, trailing spaces trimmed, NULs preserved verbatim.
    pub sas_version: String,
    /// Operating system, NULs treated as blanks, then trailing-trimmed.
    /// The `%loc2xpt` leading-space quirk is reported unchanged.
    pub operating_system: String,
    /// The raw 16-character creation timestamp field.
    pub timestamp_raw: String,
}

/// Encodes the first real header record.
pub fn encode_first_real_header(
    sas_version: &str,
    operating_system: &str,
    created: NaiveDateTime,
) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    put(&mut record, 0, b"SAS     SAS     SASLIB  ");
    put_str_padded(&mut record, 24, 8, sas_version);
    put_str_padded(&mut record, 32, 8, operating_system);
    // 24 blanks at 40..64.
    put(&mut record, 64, format_timestamp(created).as_bytes());
    record
}

/// Decodes the first real header record.
///
/// # Errors
///
/// Returns [`Error::Malformed`] when the symbol fields do not identify a
/// real header, or when the blanks region is corrupt beyond the tolerated
/// off-by-one byte.
pub fn decode_first_real_header(record: &[u8; RECORD_LEN]) -> Result<RealHeader> {
    if !symbol_matches(&record[0..8], b"SAS")
        || !symbol_matches(&record[8..16], b"SAS")
        || !symbol_matches(&record[16..24], b"SASLIB")
    {
        return Err(Error::malformed("missing REAL_HEADER record"));
    }

    // Byte 40 may carry the spill-over of the %loc2xpt off-by-one bug.
    if record[41..64].iter().any(|&b| b != b' ') {
        return Err(Error::malformed("corrupt blanks region in REAL_HEADER"));
    }

    Ok(RealHeader {
        sas_version: field_verbatim(record, 24, 8),
        operating_system: field_nul_trimmed(record, 32, 8),
        timestamp_raw: lossy_ascii(&record[64..80]),
    })
}

/// Encodes the second real header record: the modification timestamp
/// followed by 64 spaces.
pub fn encode_second_real_header(modified: NaiveDateTime) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    put(&mut record, 0, format_timestamp(modified).as_bytes());
    record
}

/// Decodes the second real header record, returning the raw 16-character
/// modification timestamp field.
pub fn decode_second_real_header(record: &[u8; RECORD_LEN]) -> String {
    lossy_ascii(&record[0..16])
}

/// Fields of the first member descriptor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    /// Dataset name.
    pub name: String,
    /// SAS version the member was created with.
    pub sas_version: String,
    /// Operating system the member was created on.
    pub operating_system: String,
    /// The raw 16-character creation timestamp field.
    pub timestamp_raw: String,
}

/// Encodes the first member descriptor record.
pub fn encode_member_descriptor(
    name: &str,
    sas_version: &str,
    operating_system: &str,
    created: NaiveDateTime,
) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    put(&mut record, 0, b"SAS     ");
    put_str_padded(&mut record, 8, 8, name);
    put(&mut record, 16, b"SASDATA ");
    put_str_padded(&mut record, 24, 8, sas_version);
    put_str_padded(&mut record, 32, 8, operating_system);
    // 24 blanks at 40..64.
    put(&mut record, 64, format_timestamp(created).as_bytes());
    record
}

/// Decodes the first member descriptor record.
///
/// # Errors
///
/// Returns [`Error::Malformed`] when the symbol fields do not identify a
/// member descriptor.
pub fn decode_member_descriptor(record: &[u8; RECORD_LEN]) -> Result<MemberDescriptor> {
    if !symbol_matches(&record[0..8], b"SAS") || !symbol_matches(&record[16..24], b"SASDATA") {
        return Err(Error::malformed("missing MEMBER_DATA record"));
    }
    Ok(MemberDescriptor {
        name: field_verbatim(record, 8, 8),
        sas_version: field_verbatim(record, 24, 8),
        operating_system: field_nul_trimmed(record, 32, 8),
        timestamp_raw: lossy_ascii(&record[64..80]),
    })
}

/// Fields of the second member descriptor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberData {
    /// The raw 16-character modification timestamp field.
    pub timestamp_raw: String,
    /// Dataset label.
    pub label: String,
    /// Dataset type.
    pub dataset_type: String,
}

/// Encodes the second member descriptor record: modification timestamp,
/// 16 blanks, the 40-byte dataset label, and the 8-byte dataset type.
pub fn encode_member_data(
    modified: NaiveDateTime,
    label: &str,
    dataset_type: &str,
) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    put(&mut record, 0, format_timestamp(modified).as_bytes());
    put_str_padded(&mut record, 32, 40, label);
    put_str_padded(&mut record, 72, 8, dataset_type);
    record
}

/// Decodes the second member descriptor record.
pub fn decode_member_data(record: &[u8; RECORD_LEN]) -> MemberData {
    MemberData {
        timestamp_raw: lossy_ascii(&record[0..16]),
        label: field_verbatim(record, 32, 40),
        dataset_type: field_verbatim(record, 72, 8),
    }
}

/// Encodes the NAMESTR header record for `count` variables.
pub fn encode_namestr_header(count: usize) -> [u8; RECORD_LEN] {
    let mut record = [b'0'; RECORD_LEN];
    put(&mut record, 0, NAMESTR_HEADER_PREFIX);
    put(&mut record, 48, format!("{count:010}").as_bytes());
    put(&mut record, 78, b"  ");
    record
}

/// Decodes the NAMESTR header record, returning the variable count.
///
/// The 10-character count field accepts space padding around the decimal
/// digits.
///
/// # Errors
///
/// Returns [`Error::Malformed`] (`missing NAMESTR_HEADER record`) when the
/// record prefix does not match, or `malformed NAMESTR header record` with
/// a wrapped cause when the count field is non-numeric or negative.
pub fn decode_namestr_header(record: &[u8; RECORD_LEN]) -> Result<usize> {
    if &record[0..48] != NAMESTR_HEADER_PREFIX {
        return Err(Error::malformed("missing NAMESTR_HEADER record"));
    }

    let raw = lossy_ascii(&record[48..58]);
    let count: i64 = raw.trim().parse().map_err(|_| {
        Error::malformed_with(
            "malformed NAMESTR header record",
            Error::argument(format!("invalid variable count: '{raw}'")),
        )
    })?;
    if count < 0 {
        return Err(Error::malformed_with(
            "malformed NAMESTR header record",
            Error::argument(format!("negative variable count: {count}")),
        ));
    }
    usize::try_from(count).map_err(|_| {
        Error::malformed_with(
            "malformed NAMESTR header record",
            Error::argument(format!("invalid variable count: '{raw}'")),
        )
    })
}
