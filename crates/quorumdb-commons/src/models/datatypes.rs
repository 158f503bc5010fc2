//! The CQL column type system.
//!
//! Each type carries a stable one-byte tag used when bind-variable metadata is
//! shipped to clients, and knows how to parse its DDL spelling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a column or bind variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CqlType {
    Text,
    Int,
    BigInt,
    Boolean,
    Float,
    Double,
    Blob,
    Timestamp,
    Uuid,
}

impl CqlType {
    /// Stable wire tag for this type.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Text => 0x01,
            Self::Int => 0x02,
            Self::BigInt => 0x03,
            Self::Boolean => 0x04,
            Self::Float => 0x05,
            Self::Double => 0x06,
            Self::Blob => 0x07,
            Self::Timestamp => 0x08,
            Self::Uuid => 0x09,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::Text),
            0x02 => Some(Self::Int),
            0x03 => Some(Self::BigInt),
            0x04 => Some(Self::Boolean),
            0x05 => Some(Self::Float),
            0x06 => Some(Self::Double),
            0x07 => Some(Self::Blob),
            0x08 => Some(Self::Timestamp),
            0x09 => Some(Self::Uuid),
            _ => None,
        }
    }

    /// Parses the DDL spelling of a type (case-insensitive).
    ///
    /// `varchar` is accepted as an alias for `text`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "varchar" => Some(Self::Text),
            "int" => Some(Self::Int),
            "bigint" => Some(Self::BigInt),
            "boolean" => Some(Self::Boolean),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "blob" => Some(Self::Blob),
            "timestamp" => Some(Self::Timestamp),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    /// DDL spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Double => "double",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
        }
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CqlType; 9] = [
        CqlType::Text,
        CqlType::Int,
        CqlType::BigInt,
        CqlType::Boolean,
        CqlType::Float,
        CqlType::Double,
        CqlType::Blob,
        CqlType::Timestamp,
        CqlType::Uuid,
    ];

    #[test]
    fn test_tag_round_trip() {
        for ty in ALL {
            assert_eq!(CqlType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(CqlType::from_tag(0xFF), None);
    }

    #[test]
    fn test_parse_spellings() {
        assert_eq!(CqlType::parse("TEXT"), Some(CqlType::Text));
        assert_eq!(CqlType::parse("varchar"), Some(CqlType::Text));
        assert_eq!(CqlType::parse("Int"), Some(CqlType::Int));
        assert_eq!(CqlType::parse("decimal"), None);
    }

    #[test]
    fn test_parse_display_round_trip() {
        for ty in ALL {
            assert_eq!(CqlType::parse(ty.as_str()), Some(ty));
        }
    }
}
