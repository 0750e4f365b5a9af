use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Classification {
    Normal => "normal",
    High => "high",
    Critical => "critical",
});

str_enum!(ConfidenceLevel {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(TrendDirection {
    Up => "up",
    Down => "down",
    Stable => "stable",
});

str_enum!(StorageMode {
    Persistent => "persistent",
    Memory => "memory",
    MemoryFallback => "memory_fallback",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn classification_round_trip() {
        for (variant, s) in [
            (Classification::Normal, "normal"),
            (Classification::High, "high"),
            (Classification::Critical, "critical"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Classification::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn classification_serializes_lowercase() {
        let json = serde_json::to_string(&Classification::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let back: Classification = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(back, Classification::High);
    }

    #[test]
    fn storage_mode_uses_snake_case() {
        assert_eq!(StorageMode::MemoryFallback.to_string(), "memory_fallback");
        let json = serde_json::to_string(&StorageMode::MemoryFallback).unwrap();
        assert_eq!(json, "\"memory_fallback\"");
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Classification::from_str("borderline").is_err());
        assert!(TrendDirection::from_str("").is_err());
        let err = ConfidenceLevel::from_str("Elevee").unwrap_err();
        assert!(err.to_string().contains("ConfidenceLevel"));
    }
}
