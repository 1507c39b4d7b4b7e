//! Entity identity - prefixed ULIDs
//!
//! Every record carries an ID of the form `PREFIX-ULID`
//! (e.g. `AST-01KCWY20F01B21V0G4E835NW3J`). The prefix names the record
//! type so IDs stay unambiguous when they appear in logs or on the command line.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use ulid::Ulid;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    /// Equipment or vehicle
    Ast,
    /// Service case (repair, RMA, maintenance, ...)
    Case,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Ast => "AST",
            EntityPrefix::Case => "CASE",
        }
    }

    /// All known prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[EntityPrefix::Ast, EntityPrefix::Case]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AST" => Ok(EntityPrefix::Ast),
            "CASE" => Ok(EntityPrefix::Case),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

/// Errors from parsing an entity ID
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("ID is missing the PREFIX- part: '{0}'")]
    MissingPrefix(String),

    #[error("Unknown entity prefix: '{0}'")]
    UnknownPrefix(String),

    #[error("Invalid ULID in ID '{id}': {reason}")]
    InvalidUlid { id: String, reason: String },
}

/// A prefixed, time-sortable entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh ID for the given record type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        let prefix: EntityPrefix = prefix.parse()?;
        let ulid = Ulid::from_string(rest).map_err(|e| IdParseError::InvalidUlid {
            id: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let id = EntityId::new(EntityPrefix::Ast);
        let s = id.to_string();
        assert!(s.starts_with("AST-"));
        assert_eq!(s.len(), 4 + 26);
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id = EntityId::new(EntityPrefix::Case);
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(parsed.prefix(), EntityPrefix::Case);
    }

    #[test]
    fn test_id_parse_errors() {
        assert!(matches!(
            "NOPREFIX".parse::<EntityId>(),
            Err(IdParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            "REQ-01KCWY20F01B21V0G4E835NW3J".parse::<EntityId>(),
            Err(IdParseError::UnknownPrefix(_))
        ));
        assert!(matches!(
            "AST-not-a-ulid".parse::<EntityId>(),
            Err(IdParseError::InvalidUlid { .. })
        ));
    }

    #[test]
    fn test_prefix_case_insensitive() {
        assert_eq!("case".parse::<EntityPrefix>().unwrap(), EntityPrefix::Case);
        assert_eq!("Ast".parse::<EntityPrefix>().unwrap(), EntityPrefix::Ast);
    }
}
