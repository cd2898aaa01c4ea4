//! IBM System/360 hexadecimal floating point.
//!
//! Numeric values are stored big-endian as 1 sign bit, a 7-bit excess-64
//! base-16 exponent, and a 56-bit mantissa normalized so the leading hex
//! digit is non-zero. Numeric variables shorter than 8 bytes truncate the
//! low bytes on write and zero-extend on read.
//!
//! A binary64 significand (53 bits) always fits the 56-bit IBM mantissa, so
//! encoding never rounds; decoding rounds the 56-bit mantissa to the nearest
//! binary64.

use crate::error::{Error, Result};
use crate::missing::MissingValue;
use crate::value::Value;

/// Smallest encodable non-zero magnitude, 2^-260 (= 16^-65).
pub const MIN_MAGNITUDE: f64 = f64::from_bits(0x2FB0_0000_0000_0000);

/// Largest encodable magnitude, 2^248 (= 16^62).
pub const MAX_MAGNITUDE: f64 = f64::from_bits(0x4F70_0000_0000_0000);

const MANTISSA_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// Encodes a finite binary64 into the full 8-byte IBM representation.
///
/// # Errors
///
/// Returns [`Error::Argument`] for NaN and for magnitudes outside
/// `[2^-260, 2^248]`. Zero is always encodable as eight zero bytes.
pub fn encode(value: f64) -> Result<[u8; 8]> {
    if value == 0.0 {
        return Ok([0u8; 8]);
    }
    if value.is_nan() {
        return Err(Error::argument("NUMERIC variables cannot store NaN"));
    }
    let magnitude = value.abs();
    if magnitude < MIN_MAGNITUDE {
        return Err(Error::argument(
            "XPORT format cannot store numbers smaller than pow(2, -260)",
        ));
    }
    if magnitude > MAX_MAGNITUDE {
        return Err(Error::argument(
            "XPORT format cannot store numbers larger than pow(2, 248)",
        ));
    }

    // The range check excludes subnormals, so the implicit bit is set.
    let bits = value.to_bits();
    let sign = ((bits >> 63) & 1) as u8;
    let exponent = (((bits >> 52) & 0x7FF) as i32) - 1023;
    let significand = (bits & 0x000F_FFFF_FFFF_FFFF) | (1u64 << 52);

    // 2^e = 16^(e div 4) * 2^(e mod 4); the mod-4 remainder shifts the
    // mantissa up to align the binary point with a hex digit.
    let shift = exponent.rem_euclid(4) as u32;
    let hex_exponent = exponent.div_euclid(4) + 65;
    let fraction = significand << shift;

    let mut out = fraction.to_be_bytes();
    out[0] = (sign << 7) | (hex_exponent as u8);
    Ok(out)
}

/// Encodes a missing value sentinel as the full 8-byte payload.
#[must_use]
pub fn encode_missing(missing: MissingValue) -> [u8; 8] {
    missing.to_bytes()
}

/// Decodes a 2-8 byte numeric field, zero-extending to 8 bytes.
///
/// Returns [`Value::Number`] or [`Value::Missing`].
///
/// # Errors
///
/// Returns [`Error::Malformed`] when the mantissa is zero but the payload
/// is neither zero nor a recognized missing value sentinel.
///
/// # Panics
///
/// Panics if `bytes` is longer than 8 bytes.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut full = [0u8; 8];
    full[..bytes.len()].copy_from_slice(bytes);

    let packed = u64::from_be_bytes(full);
    if packed == 0 {
        return Ok(Value::Number(0.0));
    }

    if packed & MANTISSA_MASK == 0 {
        return match MissingValue::from_tag_byte(full[0]) {
            Some(missing) => Ok(Value::Missing(missing)),
            None => Err(Error::malformed(
                "Malformed numeric value: mantissa is zero but value is not 0 or a MissingValue",
            )),
        };
    }

    let sign = if full[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let hex_exponent = i32::from(full[0] & 0x7F);
    let fraction = packed & MANTISSA_MASK;

    // value = fraction / 16^14 * 16^(hex_exponent - 64)
    let magnitude = (fraction as f64) * (2.0f64).powi(4 * (hex_exponent - 64) - 56);
    Ok(Value::Number(sign * magnitude))
}
