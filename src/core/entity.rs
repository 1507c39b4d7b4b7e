//! Entity trait - common interface for assets and service cases

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all persisted records
pub trait Entity: Serialize + DeserializeOwned {
    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Revision counter, bumped on every committed write
    fn revision(&self) -> u32;
}

/// Priority of a service case
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Priority {
    Low,
    #[default]
    #[serde(alias = "medium")]
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// High and urgent cases are surfaced on dashboards
    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }

    pub fn all() -> &'static [Priority] {
        &[
            Priority::Low,
            Priority::Normal,
            Priority::High,
            Priority::Urgent,
        ]
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" | "medium" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_medium_alias() {
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Normal);
        let p: Priority = serde_yml::from_str("medium").unwrap();
        assert_eq!(p, Priority::Normal);
    }

    #[test]
    fn test_priority_urgency() {
        assert!(Priority::Urgent.is_urgent());
        assert!(Priority::High.is_urgent());
        assert!(!Priority::Normal.is_urgent());
        assert!(Priority::Low < Priority::Urgent);
    }
}
