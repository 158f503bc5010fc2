//! Binary value codec for CQL values.
//!
//! Bind variables arrive as raw encoded bytes and must decode under the
//! column's declared type. The encoding is fixed-width big-endian for numeric
//! types and raw bytes for text/blob, matching the classic CQL wire layout:
//!
//! | type      | encoding                |
//! |-----------|-------------------------|
//! | int       | 4 bytes, BE two's compl |
//! | bigint    | 8 bytes, BE             |
//! | timestamp | 8 bytes, BE millis      |
//! | boolean   | 1 byte, 0 or 1          |
//! | float     | 4 bytes, IEEE-754 BE    |
//! | double    | 8 bytes, IEEE-754 BE    |
//! | uuid      | 16 bytes                |
//! | text      | UTF-8 bytes             |
//! | blob      | raw bytes               |

use crate::models::datatypes::CqlType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error produced when raw bytes do not decode under a declared type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueCodecError {
    #[error("expected {expected} bytes for {data_type}, got {actual}")]
    WrongLength {
        data_type: CqlType,
        expected: usize,
        actual: usize,
    },

    #[error("invalid UTF-8 in text value")]
    InvalidUtf8,

    #[error("invalid boolean byte {0:#x}")]
    InvalidBoolean(u8),
}

/// A decoded CQL value.
///
/// `PartialOrd`/`Ord` are not derived: `Double`/`Float` carry NaN. Ordering
/// where needed is done on the [`sort_key`](Self::sort_key) representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CqlValue {
    Text(String),
    Int(i32),
    BigInt(i64),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Blob(Vec<u8>),
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl CqlValue {
    /// The declared type this value belongs to.
    pub fn data_type(&self) -> CqlType {
        match self {
            Self::Text(_) => CqlType::Text,
            Self::Int(_) => CqlType::Int,
            Self::BigInt(_) => CqlType::BigInt,
            Self::Boolean(_) => CqlType::Boolean,
            Self::Float(_) => CqlType::Float,
            Self::Double(_) => CqlType::Double,
            Self::Blob(_) => CqlType::Blob,
            Self::Timestamp(_) => CqlType::Timestamp,
            Self::Uuid(_) => CqlType::Uuid,
        }
    }

    /// Decodes raw bytes under the given declared type.
    pub fn decode(data_type: CqlType, bytes: &[u8]) -> Result<Self, ValueCodecError> {
        let wrong_length = |expected: usize| ValueCodecError::WrongLength {
            data_type,
            expected,
            actual: bytes.len(),
        };

        match data_type {
            CqlType::Text => match std::str::from_utf8(bytes) {
                Ok(s) => Ok(Self::Text(s.to_string())),
                Err(_) => Err(ValueCodecError::InvalidUtf8),
            },
            CqlType::Blob => Ok(Self::Blob(bytes.to_vec())),
            CqlType::Int => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| wrong_length(4))?;
                Ok(Self::Int(i32::from_be_bytes(arr)))
            }
            CqlType::BigInt => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| wrong_length(8))?;
                Ok(Self::BigInt(i64::from_be_bytes(arr)))
            }
            CqlType::Timestamp => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| wrong_length(8))?;
                Ok(Self::Timestamp(i64::from_be_bytes(arr)))
            }
            CqlType::Boolean => {
                let arr: [u8; 1] = bytes.try_into().map_err(|_| wrong_length(1))?;
                match arr[0] {
                    0 => Ok(Self::Boolean(false)),
                    1 => Ok(Self::Boolean(true)),
                    b => Err(ValueCodecError::InvalidBoolean(b)),
                }
            }
            CqlType::Float => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| wrong_length(4))?;
                Ok(Self::Float(f32::from_be_bytes(arr)))
            }
            CqlType::Double => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| wrong_length(8))?;
                Ok(Self::Double(f64::from_be_bytes(arr)))
            }
            CqlType::Uuid => {
                let arr: [u8; 16] = bytes.try_into().map_err(|_| wrong_length(16))?;
                Ok(Self::Uuid(arr))
            }
        }
    }

    /// Encodes this value into its wire representation.
    ///
    /// Byte-wise comparison of wire encodings does not follow the natural
    /// order for signed or floating-point values; use [`sort_key`](Self::sort_key)
    /// where ordered keys are needed.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Text(s) => s.as_bytes().to_vec(),
            Self::Int(v) => v.to_be_bytes().to_vec(),
            Self::BigInt(v) | Self::Timestamp(v) => v.to_be_bytes().to_vec(),
            Self::Boolean(v) => vec![u8::from(*v)],
            Self::Float(v) => v.to_be_bytes().to_vec(),
            Self::Double(v) => v.to_be_bytes().to_vec(),
            Self::Blob(b) => b.clone(),
            Self::Uuid(b) => b.to_vec(),
        }
    }

    /// Encodes this value as an order-preserving key: byte-wise comparison of
    /// two keys of the same type matches the natural order of the values.
    ///
    /// Signed integers get the sign bit flipped; floats use the IEEE-754
    /// total-order transform (negatives fully inverted, NaN sorts above every
    /// number). Text, blob, boolean and uuid already compare correctly in
    /// their wire encoding.
    pub fn sort_key(&self) -> Vec<u8> {
        match self {
            Self::Int(v) => ((*v as u32) ^ 1 << 31).to_be_bytes().to_vec(),
            Self::BigInt(v) | Self::Timestamp(v) => {
                ((*v as u64) ^ 1 << 63).to_be_bytes().to_vec()
            }
            Self::Float(v) => {
                let bits = v.to_bits();
                let key = if bits >> 31 == 1 { !bits } else { bits | 1 << 31 };
                key.to_be_bytes().to_vec()
            }
            Self::Double(v) => {
                let bits = v.to_bits();
                let key = if bits >> 63 == 1 { !bits } else { bits | 1 << 63 };
                key.to_be_bytes().to_vec()
            }
            _ => self.encode(),
        }
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s),
            Self::Int(v) => write!(f, "{}", v),
            Self::BigInt(v) | Self::Timestamp(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Blob(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Self::Uuid(b) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_codec() {
        let v = CqlValue::Int(123);
        assert_eq!(v.encode(), vec![0, 0, 0, 123]);
        assert_eq!(CqlValue::decode(CqlType::Int, &v.encode()).unwrap(), v);
    }

    #[test]
    fn test_text_codec() {
        let v = CqlValue::decode(CqlType::Text, b"someKey").unwrap();
        assert_eq!(v, CqlValue::Text("someKey".to_string()));
        assert_eq!(v.encode(), b"someKey");
    }

    #[test]
    fn test_wrong_length_reports_type() {
        let err = CqlValue::decode(CqlType::BigInt, &[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            ValueCodecError::WrongLength {
                data_type: CqlType::BigInt,
                expected: 8,
                actual: 3,
            }
        );
        assert_eq!(err.to_string(), "expected 8 bytes for bigint, got 3");
    }

    #[test]
    fn test_boolean_rejects_garbage() {
        assert_eq!(
            CqlValue::decode(CqlType::Boolean, &[2]).unwrap_err(),
            ValueCodecError::InvalidBoolean(2)
        );
        assert_eq!(
            CqlValue::decode(CqlType::Boolean, &[1]).unwrap(),
            CqlValue::Boolean(true)
        );
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        assert_eq!(
            CqlValue::decode(CqlType::Text, &[0xff, 0xfe]).unwrap_err(),
            ValueCodecError::InvalidUtf8
        );
    }

    #[test]
    fn test_sort_key_orders_signed_integers() {
        for window in [-5i32, -1, 0, 3, 7, i32::MAX].windows(2) {
            assert!(
                CqlValue::Int(window[0]).sort_key() < CqlValue::Int(window[1]).sort_key(),
                "{} should key below {}",
                window[0],
                window[1]
            );
        }
        assert!(
            CqlValue::BigInt(i64::MIN).sort_key() < CqlValue::BigInt(-1).sort_key()
        );
        assert!(CqlValue::BigInt(-1).sort_key() < CqlValue::BigInt(0).sort_key());
        assert!(
            CqlValue::Timestamp(-1).sort_key() < CqlValue::Timestamp(1).sort_key()
        );
    }

    #[test]
    fn test_sort_key_orders_floats() {
        for window in [f64::NEG_INFINITY, -2.5f64, -0.0, 1.5, f64::INFINITY].windows(2) {
            assert!(
                CqlValue::Double(window[0]).sort_key() < CqlValue::Double(window[1]).sort_key(),
                "{} should key below {}",
                window[0],
                window[1]
            );
        }
        assert!(CqlValue::Float(-1.0).sort_key() < CqlValue::Float(0.5).sort_key());
    }

    #[test]
    fn test_sort_key_matches_wire_encoding_for_text() {
        let v = CqlValue::Text("someKey".into());
        assert_eq!(v.sort_key(), v.encode());
    }

    #[test]
    fn test_display() {
        assert_eq!(CqlValue::Text("x".into()).to_string(), "'x'");
        assert_eq!(CqlValue::Blob(vec![0xab, 0x01]).to_string(), "0xab01");
    }
}
