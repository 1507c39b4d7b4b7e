//! Canonical lifecycle phases and the legal transition graph
//!
//! Every case-type status vocabulary reduces to one of these six phases.
//! The lifecycle engine only ever reasons about phases.

use serde::{Deserialize, Serialize};

/// Canonical phase of a service case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Phase {
    #[default]
    Open,
    InProgress,
    Blocked,
    Resolved,
    Closed,
    Cancelled,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[
            Phase::Open,
            Phase::InProgress,
            Phase::Blocked,
            Phase::Resolved,
            Phase::Closed,
            Phase::Cancelled,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Open => "open",
            Phase::InProgress => "in_progress",
            Phase::Blocked => "blocked",
            Phase::Resolved => "resolved",
            Phase::Closed => "closed",
            Phase::Cancelled => "cancelled",
        }
    }

    /// Work is under way and the asset is off-line
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::InProgress | Phase::Blocked)
    }

    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Closed | Phase::Cancelled)
    }

    /// Case no longer needs attention (resolved, closed or cancelled)
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Resolved | Phase::Closed | Phase::Cancelled)
    }

    /// Check if a phase change follows an edge of the lifecycle graph
    pub fn can_transition_to(self, to: Phase) -> bool {
        matches!(
            (self, to),
            // Normal forward path
            (Phase::Open, Phase::InProgress)
                | (Phase::InProgress, Phase::Resolved)
                | (Phase::Resolved, Phase::Closed)
                // Waiting on parts, carrier or customer
                | (Phase::InProgress, Phase::Blocked)
                | (Phase::Blocked, Phase::InProgress)
                // Abandoned before completion
                | (Phase::Open, Phase::Cancelled)
                | (Phase::InProgress, Phase::Cancelled)
        )
    }

    /// Get allowed next phases from this one
    pub fn allowed_transitions(self) -> Vec<Phase> {
        match self {
            Phase::Open => vec![Phase::InProgress, Phase::Cancelled],
            Phase::InProgress => vec![Phase::Blocked, Phase::Resolved, Phase::Cancelled],
            Phase::Blocked => vec![Phase::InProgress],
            Phase::Resolved => vec![Phase::Closed],
            Phase::Closed | Phase::Cancelled => vec![],
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Phase::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == normalized || p.as_str().replace('_', "") == normalized)
            .ok_or_else(|| format!("Unknown phase: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(Phase::Open.can_transition_to(Phase::InProgress));
        assert!(Phase::InProgress.can_transition_to(Phase::Resolved));
        assert!(Phase::Resolved.can_transition_to(Phase::Closed));
        assert!(Phase::InProgress.can_transition_to(Phase::Blocked));
        assert!(Phase::Blocked.can_transition_to(Phase::InProgress));
        assert!(Phase::Open.can_transition_to(Phase::Cancelled));
        assert!(Phase::InProgress.can_transition_to(Phase::Cancelled));

        assert!(!Phase::Open.can_transition_to(Phase::Resolved));
        assert!(!Phase::Open.can_transition_to(Phase::Closed));
        assert!(!Phase::Blocked.can_transition_to(Phase::Resolved));
        assert!(!Phase::Blocked.can_transition_to(Phase::Cancelled));
        assert!(!Phase::Resolved.can_transition_to(Phase::Cancelled));
        assert!(!Phase::InProgress.can_transition_to(Phase::InProgress));
    }

    #[test]
    fn test_allowed_transitions_agree_with_graph() {
        for &from in Phase::all() {
            for &to in Phase::all() {
                assert_eq!(
                    from.allowed_transitions().contains(&to),
                    from.can_transition_to(to),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_phases_have_no_exits() {
        assert!(Phase::Closed.allowed_transitions().is_empty());
        assert!(Phase::Cancelled.allowed_transitions().is_empty());
        assert!(Phase::Closed.is_terminal());
        assert!(!Phase::Resolved.is_terminal());
    }

    #[test]
    fn test_parse_phase() {
        assert_eq!("in_progress".parse::<Phase>().unwrap(), Phase::InProgress);
        assert_eq!("In-Progress".parse::<Phase>().unwrap(), Phase::InProgress);
        assert_eq!("inprogress".parse::<Phase>().unwrap(), Phase::InProgress);
        assert_eq!("CLOSED".parse::<Phase>().unwrap(), Phase::Closed);
        assert!("finished".parse::<Phase>().is_err());
    }
}
