//! Case-type status vocabularies
//!
//! Callers see status terms specific to a case type ("waiting_parts" on a
//! repair, "under_analysis" on an RMA). Each term maps onto exactly one
//! canonical [`Phase`]. The mapping lives in a single table so the
//! vocabularies cannot drift apart.
//!
//! Order matters in [`TERMS`]: the first term listed for a phase is the term
//! shown when a caller asks for the bare phase, and the order of terms within
//! a phase is the order in which a case may step through them.

use serde::{Deserialize, Serialize};

use crate::core::phase::Phase;
use crate::entities::service_case::CaseType;

/// A status term from any vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTerm {
    Open,
    InProgress,
    WaitingParts,
    Blocked,
    Resolved,
    Completed,
    Closed,
    Cancelled,
    Initiated,
    Authorized,
    InTransitReturn,
    Received,
    UnderAnalysis,
    Repaired,
    Replaced,
    Refunded,
    Rejected,
}

impl StatusTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTerm::Open => "open",
            StatusTerm::InProgress => "in_progress",
            StatusTerm::WaitingParts => "waiting_parts",
            StatusTerm::Blocked => "blocked",
            StatusTerm::Resolved => "resolved",
            StatusTerm::Completed => "completed",
            StatusTerm::Closed => "closed",
            StatusTerm::Cancelled => "cancelled",
            StatusTerm::Initiated => "initiated",
            StatusTerm::Authorized => "authorized",
            StatusTerm::InTransitReturn => "in_transit_return",
            StatusTerm::Received => "received",
            StatusTerm::UnderAnalysis => "under_analysis",
            StatusTerm::Repaired => "repaired",
            StatusTerm::Replaced => "replaced",
            StatusTerm::Refunded => "refunded",
            StatusTerm::Rejected => "rejected",
        }
    }

    /// Human-readable label for tables
    pub fn label(&self) -> &'static str {
        match self {
            StatusTerm::Open => "Open",
            StatusTerm::InProgress => "In progress",
            StatusTerm::WaitingParts => "Waiting for parts",
            StatusTerm::Blocked => "Blocked",
            StatusTerm::Resolved => "Resolved",
            StatusTerm::Completed => "Completed",
            StatusTerm::Closed => "Closed",
            StatusTerm::Cancelled => "Cancelled",
            StatusTerm::Initiated => "Initiated",
            StatusTerm::Authorized => "Authorized",
            StatusTerm::InTransitReturn => "In transit (return)",
            StatusTerm::Received => "Received",
            StatusTerm::UnderAnalysis => "Under analysis",
            StatusTerm::Repaired => "Repaired",
            StatusTerm::Replaced => "Replaced",
            StatusTerm::Refunded => "Refunded",
            StatusTerm::Rejected => "Rejected",
        }
    }

    fn matches(&self, input: &str) -> bool {
        self.as_str() == input || self.as_str().replace('_', "") == input
    }
}

impl std::fmt::Display for StatusTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The vocabulary a case type speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    Repair,
    Rma,
    Request,
}

struct TermEntry {
    vocabulary: Vocabulary,
    term: StatusTerm,
    phase: Phase,
}

const fn entry(vocabulary: Vocabulary, term: StatusTerm, phase: Phase) -> TermEntry {
    TermEntry {
        vocabulary,
        term,
        phase,
    }
}

const TERMS: &[TermEntry] = &[
    // Repair
    entry(Vocabulary::Repair, StatusTerm::Open, Phase::Open),
    entry(Vocabulary::Repair, StatusTerm::InProgress, Phase::InProgress),
    entry(Vocabulary::Repair, StatusTerm::WaitingParts, Phase::Blocked),
    entry(Vocabulary::Repair, StatusTerm::Completed, Phase::Resolved),
    entry(Vocabulary::Repair, StatusTerm::Closed, Phase::Closed),
    entry(Vocabulary::Repair, StatusTerm::Cancelled, Phase::Cancelled),
    // RMA
    entry(Vocabulary::Rma, StatusTerm::Initiated, Phase::Open),
    entry(Vocabulary::Rma, StatusTerm::Authorized, Phase::InProgress),
    entry(Vocabulary::Rma, StatusTerm::InTransitReturn, Phase::InProgress),
    entry(Vocabulary::Rma, StatusTerm::Received, Phase::InProgress),
    entry(Vocabulary::Rma, StatusTerm::UnderAnalysis, Phase::InProgress),
    entry(Vocabulary::Rma, StatusTerm::Blocked, Phase::Blocked),
    entry(Vocabulary::Rma, StatusTerm::Completed, Phase::Resolved),
    entry(Vocabulary::Rma, StatusTerm::Repaired, Phase::Resolved),
    entry(Vocabulary::Rma, StatusTerm::Replaced, Phase::Resolved),
    entry(Vocabulary::Rma, StatusTerm::Refunded, Phase::Resolved),
    entry(Vocabulary::Rma, StatusTerm::Rejected, Phase::Resolved),
    entry(Vocabulary::Rma, StatusTerm::Closed, Phase::Closed),
    entry(Vocabulary::Rma, StatusTerm::Cancelled, Phase::Cancelled),
    // Generic service request
    entry(Vocabulary::Request, StatusTerm::Open, Phase::Open),
    entry(Vocabulary::Request, StatusTerm::InProgress, Phase::InProgress),
    entry(Vocabulary::Request, StatusTerm::WaitingParts, Phase::Blocked),
    entry(Vocabulary::Request, StatusTerm::Resolved, Phase::Resolved),
    entry(Vocabulary::Request, StatusTerm::Closed, Phase::Closed),
    entry(Vocabulary::Request, StatusTerm::Cancelled, Phase::Cancelled),
];

/// Deprecated values still found in older records. Accepted on input only.
const LEGACY_ALIASES: &[(Vocabulary, &str, StatusTerm)] = &[
    (Vocabulary::Repair, "diagnostic", StatusTerm::InProgress),
    (Vocabulary::Repair, "initiated", StatusTerm::InProgress),
    (Vocabulary::Repair, "diagnosed", StatusTerm::InProgress),
    (Vocabulary::Repair, "on_hold", StatusTerm::WaitingParts),
    (Vocabulary::Request, "validated", StatusTerm::Open),
    (Vocabulary::Request, "external", StatusTerm::WaitingParts),
];

fn normalize(input: &str) -> String {
    input.trim().to_lowercase().replace(['-', ' '], "_")
}

impl Vocabulary {
    pub fn for_case_type(case_type: CaseType) -> Self {
        match case_type {
            CaseType::Repair => Vocabulary::Repair,
            CaseType::Rma => Vocabulary::Rma,
            CaseType::Maintenance
            | CaseType::Installation
            | CaseType::Training
            | CaseType::Warranty => Vocabulary::Request,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Vocabulary::Repair => "repair",
            Vocabulary::Rma => "RMA",
            Vocabulary::Request => "service request",
        }
    }

    fn entries(self) -> impl Iterator<Item = &'static TermEntry> {
        TERMS.iter().filter(move |e| e.vocabulary == self)
    }

    /// Terms of this vocabulary in table order
    pub fn terms(self) -> Vec<(StatusTerm, Phase)> {
        self.entries().map(|e| (e.term, e.phase)).collect()
    }

    /// Canonical phase of a term, if the term belongs to this vocabulary
    pub fn phase_of(self, term: StatusTerm) -> Option<Phase> {
        self.entries().find(|e| e.term == term).map(|e| e.phase)
    }

    /// The term shown for a bare phase
    pub fn display_term(self, phase: Phase) -> StatusTerm {
        self.entries()
            .find(|e| e.phase == phase)
            .map(|e| e.term)
            // Every vocabulary covers all six phases; see test below
            .unwrap_or(StatusTerm::Open)
    }

    /// Position of a term among the terms of its own phase
    pub fn step_of(self, term: StatusTerm) -> Option<usize> {
        let phase = self.phase_of(term)?;
        self.entries()
            .filter(|e| e.phase == phase)
            .position(|e| e.term == term)
    }

    /// Parse user input as a term of this vocabulary, accepting legacy aliases
    pub fn parse_term(self, input: &str) -> Option<StatusTerm> {
        let normalized = normalize(input);
        if let Some(e) = self.entries().find(|e| e.term.matches(&normalized)) {
            return Some(e.term);
        }
        LEGACY_ALIASES
            .iter()
            .find(|(v, alias, _)| *v == self && *alias == normalized)
            .map(|(_, _, term)| *term)
    }
}

impl std::fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a caller asked a case to move to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A bare canonical phase; displayed with the vocabulary's term for it
    Phase(Phase),
    /// A specific term of the case's vocabulary
    Term(StatusTerm),
}

impl Target {
    /// Parse a requested status for a case speaking `vocabulary`
    ///
    /// Vocabulary terms (and their legacy aliases) win over canonical phase
    /// names. Terms from another vocabulary are rejected.
    pub fn parse(vocabulary: Vocabulary, input: &str) -> Result<Target, String> {
        if let Some(term) = vocabulary.parse_term(input) {
            return Ok(Target::Term(term));
        }
        if let Ok(phase) = input.parse::<Phase>() {
            return Ok(Target::Phase(phase));
        }
        Err(format!("'{}' is not a {} status", input.trim(), vocabulary))
    }

    /// Resolve to (phase, term) within a vocabulary
    pub fn resolve(self, vocabulary: Vocabulary) -> Result<(Phase, StatusTerm), String> {
        match self {
            Target::Phase(phase) => Ok((phase, vocabulary.display_term(phase))),
            Target::Term(term) => vocabulary
                .phase_of(term)
                .map(|phase| (phase, term))
                .ok_or_else(|| format!("'{}' is not a {} status", term, vocabulary)),
        }
    }
}

impl From<Phase> for Target {
    fn from(phase: Phase) -> Self {
        Target::Phase(phase)
    }
}

impl From<StatusTerm> for Target {
    fn from(term: StatusTerm) -> Self {
        Target::Term(term)
    }
}
