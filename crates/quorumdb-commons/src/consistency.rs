//! Replica consistency levels.
//!
//! A consistency level is a caller-supplied requirement on how many replica
//! acknowledgements a read or write needs before it counts as successful. The
//! query layer validates that the value is a known one and forwards it to the
//! storage executor verbatim; interpretation happens there.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consistency requirement forwarded to the storage executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
}

impl ConsistencyLevel {
    /// Parse the canonical (case-insensitive) name of a consistency level.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ANY" => Some(Self::Any),
            "ONE" => Some(Self::One),
            "TWO" => Some(Self::Two),
            "THREE" => Some(Self::Three),
            "QUORUM" => Some(Self::Quorum),
            "ALL" => Some(Self::All),
            "LOCAL_QUORUM" => Some(Self::LocalQuorum),
            "EACH_QUORUM" => Some(Self::EachQuorum),
            _ => None,
        }
    }

    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Three => "THREE",
            Self::Quorum => "QUORUM",
            Self::All => "ALL",
            Self::LocalQuorum => "LOCAL_QUORUM",
            Self::EachQuorum => "EACH_QUORUM",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for level in [
            ConsistencyLevel::Any,
            ConsistencyLevel::One,
            ConsistencyLevel::Two,
            ConsistencyLevel::Three,
            ConsistencyLevel::Quorum,
            ConsistencyLevel::All,
            ConsistencyLevel::LocalQuorum,
            ConsistencyLevel::EachQuorum,
        ] {
            assert_eq!(ConsistencyLevel::parse(level.as_str()), Some(level));
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!(
            ConsistencyLevel::parse("quorum"),
            Some(ConsistencyLevel::Quorum)
        );
        assert_eq!(ConsistencyLevel::parse("serial"), None);
    }
}
