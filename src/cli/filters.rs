//! Filter enums for list commands

use clap::ValueEnum;

use crate::core::entity::Priority;
use crate::core::phase::Phase;

/// Phase filter for `case list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PhaseFilter {
    Open,
    InProgress,
    Blocked,
    Resolved,
    Closed,
    Cancelled,
    /// Everything not closed or cancelled - default
    #[default]
    Active,
    /// All phases including archived
    All,
}

impl PhaseFilter {
    /// The single phase this filter selects, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PhaseFilter::Open => Some(Phase::Open),
            PhaseFilter::InProgress => Some(Phase::InProgress),
            PhaseFilter::Blocked => Some(Phase::Blocked),
            PhaseFilter::Resolved => Some(Phase::Resolved),
            PhaseFilter::Closed => Some(Phase::Closed),
            PhaseFilter::Cancelled => Some(Phase::Cancelled),
            PhaseFilter::Active | PhaseFilter::All => None,
        }
    }

    pub fn open_only(&self) -> bool {
        *self == PhaseFilter::Active
    }

    pub fn matches(&self, phase: Phase) -> bool {
        match self.phase() {
            Some(p) => p == phase,
            None => !self.open_only() || !phase.is_terminal(),
        }
    }
}

/// Priority filter for `case list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    Low,
    Normal,
    High,
    Urgent,
    /// High and urgent
    Elevated,
    /// All priorities - default
    #[default]
    All,
}

impl PriorityFilter {
    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::Low => priority == Priority::Low,
            PriorityFilter::Normal => priority == Priority::Normal,
            PriorityFilter::High => priority == Priority::High,
            PriorityFilter::Urgent => priority == Priority::Urgent,
            PriorityFilter::Elevated => priority.is_urgent(),
            PriorityFilter::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_filter_matches() {
        assert!(PhaseFilter::Active.matches(Phase::Resolved));
        assert!(!PhaseFilter::Active.matches(Phase::Closed));
        assert!(PhaseFilter::All.matches(Phase::Cancelled));
        assert!(PhaseFilter::Blocked.matches(Phase::Blocked));
        assert!(!PhaseFilter::Blocked.matches(Phase::InProgress));
    }

    #[test]
    fn test_priority_filter_matches() {
        assert!(PriorityFilter::Elevated.matches(Priority::High));
        assert!(PriorityFilter::Elevated.matches(Priority::Urgent));
        assert!(!PriorityFilter::Elevated.matches(Priority::Normal));
        assert!(PriorityFilter::All.matches(Priority::Low));
    }
}
