//! The 140-byte NAMESTR variable descriptor.
//!
//! Each variable of a dataset is described on the wire by one NAMESTR
//! record: type code, length, wire position, name, label, and format
//! fields, all integers big-endian. NAMESTR records are concatenated
//! after the NAMESTR header and the block is zero-padded to the next
//! 80-byte boundary.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::format::{Format, Justification};
use crate::header::lossy_ascii;
use crate::variable::{Variable, VariableType};

/// NAMESTR record length in bytes.
pub const NAMESTR_LEN: usize = 140;

/// A decoded NAMESTR record: the variable descriptor plus its byte
/// position within the observation record.
#[derive(Debug, Clone, PartialEq)]
pub struct Namestr {
    /// The decoded variable.
    pub variable: Variable,
    /// Byte offset of this variable's value within each observation.
    pub position: u32,
}

fn put_text(buf: &mut [u8; NAMESTR_LEN], start: usize, len: usize, text: &str) {
    debug_assert!(text.len() <= len, "field exceeds its wire width");
    buf[start..start + text.len()].copy_from_slice(text.as_bytes());
    buf[start + text.len()..start + len].fill(b' ');
}

fn text_field(buf: &[u8; NAMESTR_LEN], start: usize, len: usize) -> String {
    lossy_ascii(&buf[start..start + len])
        .trim_end_matches(' ')
        .to_owned()
}

/// Packs a variable descriptor into a 140-byte NAMESTR record.
///
/// The name-hash field is written as zero; `position` is the byte offset
/// of the variable within the observation record.
pub fn pack(variable: &Variable, position: u32) -> [u8; NAMESTR_LEN] {
    let mut buf = [0u8; NAMESTR_LEN];

    BigEndian::write_i16(&mut buf[0..2], variable.variable_type.code());
    // 2..4: name hash, unused in V5.
    BigEndian::write_i16(&mut buf[4..6], variable.length as i16);
    BigEndian::write_i16(&mut buf[6..8], variable.number);
    put_text(&mut buf, 8, 8, &variable.name);
    put_text(&mut buf, 16, 40, &variable.label);

    put_text(&mut buf, 56, 8, &variable.output_format.name);
    BigEndian::write_i16(&mut buf[64..66], variable.output_format.width);
    BigEndian::write_i16(&mut buf[66..68], variable.output_format.digits);
    BigEndian::write_i16(&mut buf[68..70], variable.output_format_justification.code());
    // 70..72: reserved.
    put_text(&mut buf, 72, 8, &variable.input_format.name);
    BigEndian::write_i16(&mut buf[80..82], variable.input_format.width);
    BigEndian::write_i16(&mut buf[82..84], variable.input_format.digits);

    BigEndian::write_i32(&mut buf[84..88], position as i32);
    // 88..140: ignored.

    buf
}

/// Unpacks a 140-byte NAMESTR record.
///
/// Non-ASCII bytes in text fields are replaced with U+FFFD; the name-hash
/// field is ignored.
///
/// # Errors
///
/// Returns [`Error::Malformed`] for a type code other than 1 or 2, and for
/// a negative position field.
pub fn unpack(buf: &[u8; NAMESTR_LEN]) -> Result<Namestr> {
    let type_code = BigEndian::read_i16(&buf[0..2]);
    let variable_type = match type_code {
        1 => VariableType::Numeric,
        2 => VariableType::Character,
        other => {
            return Err(Error::malformed(format!(
                "Unexpected type code in NAMESTR field: {other}"
            )));
        }
    };

    let length = BigEndian::read_u16(&buf[4..6]);
    let number = BigEndian::read_i16(&buf[6..8]);
    let name = text_field(buf, 8, 8);
    let label = text_field(buf, 16, 40);

    let output_format = Format {
        name: text_field(buf, 56, 8),
        width: BigEndian::read_i16(&buf[64..66]),
        digits: BigEndian::read_i16(&buf[66..68]),
    };
    let justification = Justification::from_code(BigEndian::read_i16(&buf[68..70]));
    let input_format = Format {
        name: text_field(buf, 72, 8),
        width: BigEndian::read_i16(&buf[80..82]),
        digits: BigEndian::read_i16(&buf[82..84]),
    };

    let position = BigEndian::read_i32(&buf[84..88]);
    if position < 0 {
        return Err(Error::malformed(format!(
            "negative variable position in NAMESTR field: {position}"
        )));
    }

    Ok(Namestr {
        variable: Variable {
            name,
            number,
            variable_type,
            length,
            label,
            output_format,
            output_format_justification: justification,
            input_format,
        },
        position: position as u32,
    })
}
