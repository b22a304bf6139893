//! Binary codec for values persisted by blob-oriented storage engines.
//!
//! Format:
//! ```text
//! [kind:1][payload:N]
//!
//! Bool       payload = [0x00 | 0x01]
//! Int        payload = [i32:4]
//! Long       payload = [i64:8]
//! Float      payload = [f32 bits:4]
//! String     payload = [len:4][utf8:len]
//! LongArray  payload = [count:4][i64:8 * count]
//! ```
//! All multi-byte integers are big-endian.  A decoded buffer must be consumed
//! exactly; trailing bytes are an error.

use thiserror::Error;

use crate::storage::value::{StoredValue, ValueKind};

/// Errors that can occur while decoding a stored value.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// The buffer is empty, so it has no kind byte.
    #[error("empty value buffer")]
    Empty,

    /// The kind byte is not a recognized value.
    #[error("unknown value kind: 0x{0:02X}")]
    UnknownKind(u8),

    /// The buffer is shorter than the payload requires.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The payload could not be parsed (bad bool byte, UTF-8 error, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Bytes remain after the payload.
    #[error("trailing bytes: payload ended at {consumed}, buffer has {available}")]
    TrailingBytes { consumed: usize, available: usize },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`StoredValue`] into a byte vector including the kind byte.
///
/// # Examples
///
/// ```rust
/// use extended_core::storage::{decode_value, encode_value, StoredValue};
///
/// let value = StoredValue::Int(42);
/// let bytes = encode_value(&value);
/// assert_eq!(bytes, vec![0x02, 0, 0, 0, 42]);
/// assert_eq!(decode_value(&bytes).unwrap(), value);
/// ```
pub fn encode_value(value: &StoredValue) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + payload_len_hint(value));
    buf.push(value.kind() as u8);

    match value {
        StoredValue::Bool(v) => buf.push(u8::from(*v)),
        StoredValue::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
        StoredValue::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
        StoredValue::Float(v) => buf.extend_from_slice(&v.to_bits().to_be_bytes()),
        StoredValue::String(s) => {
            buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        StoredValue::LongArray(values) => {
            buf.extend_from_slice(&(values.len() as u32).to_be_bytes());
            for v in values {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
    }
    buf
}

/// Decodes one [`StoredValue`] occupying all of `bytes`.
///
/// # Errors
///
/// Returns [`CodecError`] if the bytes are empty, carry an unknown kind,
/// are truncated, hold an invalid payload, or have trailing bytes.
pub fn decode_value(bytes: &[u8]) -> Result<StoredValue, CodecError> {
    let (&tag, payload) = bytes.split_first().ok_or(CodecError::Empty)?;
    let kind = ValueKind::from_u8(tag).ok_or(CodecError::UnknownKind(tag))?;

    let (value, consumed) = match kind {
        ValueKind::Bool => {
            require_len(payload, 1)?;
            let v = match payload[0] {
                0 => false,
                1 => true,
                other => {
                    return Err(CodecError::MalformedPayload(format!(
                        "bool byte must be 0 or 1, got {other}"
                    )))
                }
            };
            (StoredValue::Bool(v), 1)
        }
        ValueKind::Int => (StoredValue::Int(read_u32(payload, 0)? as i32), 4),
        ValueKind::Long => (StoredValue::Long(read_u64(payload, 0)? as i64), 8),
        ValueKind::Float => (StoredValue::Float(f32::from_bits(read_u32(payload, 0)?)), 4),
        ValueKind::String => {
            let (s, end) = read_length_prefixed_string(payload, 0)?;
            (StoredValue::String(s), end)
        }
        ValueKind::LongArray => {
            let count = read_u32(payload, 0)? as usize;
            let byte_len = count.checked_mul(8).ok_or_else(|| {
                CodecError::MalformedPayload(format!("long array count {count} overflows"))
            })?;
            require_len(payload, 4 + byte_len)?;
            let values = (0..count)
                .map(|i| read_u64(payload, 4 + i * 8).map(|v| v as i64))
                .collect::<Result<Vec<_>, _>>()?;
            (StoredValue::LongArray(values), 4 + byte_len)
        }
    };

    if consumed != payload.len() {
        return Err(CodecError::TrailingBytes {
            consumed: consumed + 1,
            available: bytes.len(),
        });
    }
    Ok(value)
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn payload_len_hint(value: &StoredValue) -> usize {
    match value {
        StoredValue::Bool(_) => 1,
        StoredValue::Int(_) | StoredValue::Float(_) => 4,
        StoredValue::Long(_) => 8,
        StoredValue::String(s) => 4 + s.len(),
        StoredValue::LongArray(v) => 4 + v.len() * 8,
    }
}

fn require_len(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.len() < needed {
        Err(CodecError::InsufficientData {
            needed,
            available: buf.len(),
        })
    } else {
        Ok(())
    }
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, CodecError> {
    require_len(buf, offset + 4)?;
    Ok(u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ]))
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, CodecError> {
    require_len(buf, offset + 8)?;
    Ok(u64::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
        buf[offset + 4],
        buf[offset + 5],
        buf[offset + 6],
        buf[offset + 7],
    ]))
}

/// Reads a 4-byte length prefix and then that many UTF-8 bytes.
/// Returns the string and the offset of the byte after the string.
fn read_length_prefixed_string(buf: &[u8], offset: usize) -> Result<(String, usize), CodecError> {
    let len = read_u32(buf, offset)? as usize;
    let start = offset + 4;
    require_len(buf, start + len)?;
    let s = std::str::from_utf8(&buf[start..start + len])
        .map_err(|e| CodecError::MalformedPayload(format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok((s, start + len))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &StoredValue) -> StoredValue {
        decode_value(&encode_value(value)).expect("decode failed")
    }

    #[test]
    fn test_bool_encodes_to_two_bytes() {
        assert_eq!(encode_value(&StoredValue::Bool(true)), vec![0x01, 0x01]);
        assert_eq!(encode_value(&StoredValue::Bool(false)), vec![0x01, 0x00]);
    }

    #[test]
    fn test_long_is_big_endian() {
        let bytes = encode_value(&StoredValue::Long(0x0102_0304_0506_0708));
        assert_eq!(bytes, vec![0x03, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_negative_int_survives() {
        assert_eq!(round_trip(&StoredValue::Int(-17)), StoredValue::Int(-17));
    }

    #[test]
    fn test_string_with_multibyte_utf8_survives() {
        let value = StoredValue::String("Привет, 世界".to_string());
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn test_empty_long_array_is_count_only() {
        let bytes = encode_value(&StoredValue::LongArray(Vec::new()));
        assert_eq!(bytes, vec![0x06, 0, 0, 0, 0]);
        assert_eq!(decode_value(&bytes).unwrap(), StoredValue::LongArray(Vec::new()));
    }

    #[test]
    fn test_float_preserves_bits() {
        let value = StoredValue::Float(-0.0);
        match round_trip(&value) {
            StoredValue::Float(v) => assert_eq!(v.to_bits(), (-0.0_f32).to_bits()),
            other => panic!("expected Float, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_buffer_is_error() {
        assert_eq!(decode_value(&[]), Err(CodecError::Empty));
    }

    #[test]
    fn test_decode_unknown_kind_is_error() {
        assert_eq!(decode_value(&[0xEE, 0x00]), Err(CodecError::UnknownKind(0xEE)));
    }

    #[test]
    fn test_decode_truncated_long_is_error() {
        let result = decode_value(&[0x03, 0, 0, 0]);
        assert_eq!(
            result,
            Err(CodecError::InsufficientData {
                needed: 8,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_bool_out_of_range_is_error() {
        assert!(matches!(
            decode_value(&[0x01, 0x02]),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8_is_error() {
        let bytes = [0x05, 0, 0, 0, 2, 0xC3, 0x28];
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_string_length_beyond_buffer_is_error() {
        let bytes = [0x05, 0, 0, 0, 10, b'a'];
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_decode_long_array_count_beyond_buffer_is_error() {
        let bytes = [0x06, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 1];
        assert!(matches!(
            decode_value(&bytes),
            Err(CodecError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_decode_trailing_bytes_is_error() {
        assert_eq!(
            decode_value(&[0x01, 0x01, 0xFF]),
            Err(CodecError::TrailingBytes {
                consumed: 2,
                available: 3
            })
        );
    }
}
