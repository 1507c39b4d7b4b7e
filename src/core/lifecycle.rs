//! Lifecycle engine for service cases
//!
//! Validates a requested status change against the phase graph and computes
//! the resulting case and asset records without touching storage. The
//! service desk commits the plan under its locks; a rejected request
//! produces no plan, so nothing is ever half-applied.

use chrono::{DateTime, Utc};

use crate::core::error::{FleetError, FleetResult};
use crate::core::phase::Phase;
use crate::core::vocabulary::{StatusTerm, Target, Vocabulary};
use crate::entities::asset::{Asset, AssetKind, AssetStatus};
use crate::entities::service_case::{AssetDisposition, ServiceCase, TransitionRecord};

/// A request to move a case
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub target: Target,
    pub note: Option<String>,
    /// Recorded as the case's actual cost
    pub actual_cost: Option<f64>,
    /// Asset outcome, only meaningful when resolving
    pub disposition: Option<AssetDisposition>,
    /// Reject with a conflict unless the stored case is at this revision
    pub expected_revision: Option<u32>,
}

impl TransitionRequest {
    pub fn to(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            note: None,
            actual_cost: None,
            disposition: None,
            expected_revision: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_actual_cost(mut self, cost: f64) -> Self {
        self.actual_cost = Some(cost);
        self
    }

    pub fn with_disposition(mut self, disposition: AssetDisposition) -> Self {
        self.disposition = Some(disposition);
        self
    }

    pub fn expecting(mut self, revision: u32) -> Self {
        self.expected_revision = Some(revision);
        self
    }
}

/// Other cases filed against the same asset, as seen when planning
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Siblings {
    /// InProgress or Blocked; the asset stays off-line while any exist
    pub active: usize,
    /// Not closed or cancelled, active ones included
    pub unfinished: usize,
}

impl Siblings {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Records to commit for an accepted transition
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    pub case: ServiceCase,
    /// Present only when the asset changes
    pub asset: Option<Asset>,
    pub from: StatusTerm,
    pub to: StatusTerm,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LifecycleEngine;

impl LifecycleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Check a phase change against the graph
    pub fn is_valid_transition(&self, from: Phase, to: Phase) -> bool {
        from.can_transition_to(to)
    }

    /// Status terms a case may be moved to next
    pub fn next_statuses(&self, case: &ServiceCase) -> Vec<StatusTerm> {
        let vocab = case.vocabulary();
        let current_step = vocab.step_of(case.status);
        vocab
            .terms()
            .into_iter()
            .filter(|(term, phase)| {
                if *phase == case.phase {
                    case.phase == Phase::InProgress
                        && vocab.step_of(*term) > current_step
                } else {
                    case.phase.can_transition_to(*phase)
                }
            })
            .map(|(term, _)| term)
            .collect()
    }

    /// Validate `request` and compute the records it would produce
    ///
    /// The asset is only released when no sibling case is active. A
    /// non-default disposition chosen while a sibling still holds the asset
    /// is kept on the asset and applied when the last active case lets go.
    pub fn plan(
        &self,
        case: &ServiceCase,
        asset: &Asset,
        siblings: Siblings,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> FleetResult<TransitionPlan> {
        let vocab = case.vocabulary();
        let (to_phase, to_term) = request
            .target
            .resolve(vocab)
            .map_err(FleetError::Validation)?;

        self.check_edge(case, vocab, request.target, to_phase, to_term)?;
        Self::check_request(asset, siblings, request, to_phase)?;

        let mut next = case.clone();
        next.phase = to_phase;
        next.status = to_term;
        next.updated_at = now;
        next.entity_revision += 1;
        if let Some(cost) = request.actual_cost {
            next.costs.actual = Some(cost);
        }
        next.history.push(TransitionRecord {
            from: case.status,
            to: to_term,
            at: now,
            note: request.note.clone(),
        });

        match to_phase {
            Phase::InProgress => {
                next.started_at.get_or_insert(now);
            }
            Phase::Resolved => {
                next.resolved_at.get_or_insert(now);
                next.disposition = Some(request.disposition.unwrap_or_default());
                if request.note.is_some() {
                    next.resolution_notes = request.note.clone();
                }
            }
            Phase::Closed => {
                next.closed_at.get_or_insert(now);
            }
            Phase::Cancelled => {
                next.cancelled_at.get_or_insert(now);
            }
            Phase::Open | Phase::Blocked => {}
        }

        let asset = Self::asset_effect(case, &next, asset, siblings, now);

        Ok(TransitionPlan {
            from: case.status,
            to: to_term,
            case: next,
            asset,
        })
    }

    fn check_edge(
        &self,
        case: &ServiceCase,
        vocab: Vocabulary,
        target: Target,
        to_phase: Phase,
        to_term: StatusTerm,
    ) -> FleetResult<()> {
        if to_phase == case.phase {
            // Stepping forward through the terms of the active phase
            let is_step = matches!(target, Target::Term(_))
                && case.phase == Phase::InProgress
                && vocab.step_of(to_term) > vocab.step_of(case.status);
            if is_step {
                return Ok(());
            }
            return Err(FleetError::invalid_transition(case.phase, to_phase));
        }
        if !self.is_valid_transition(case.phase, to_phase) {
            return Err(FleetError::invalid_transition(case.phase, to_phase));
        }
        Ok(())
    }

    fn check_request(
        asset: &Asset,
        siblings: Siblings,
        request: &TransitionRequest,
        to_phase: Phase,
    ) -> FleetResult<()> {
        if to_phase == Phase::InProgress && asset.status == AssetStatus::Retired {
            return Err(FleetError::validation(format!(
                "asset {} is retired; no work can start on it",
                asset.display_name()
            )));
        }
        if request.actual_cost.is_some_and(|c| c < 0.0 || !c.is_finite()) {
            return Err(FleetError::validation("actual cost must be a non-negative amount"));
        }
        if let Some(disposition) = request.disposition {
            if to_phase != Phase::Resolved {
                return Err(FleetError::validation(format!(
                    "asset disposition only applies when resolving (requested {})",
                    to_phase
                )));
            }
            if disposition == AssetDisposition::Retire {
                if asset.kind != AssetKind::Equipment {
                    return Err(FleetError::validation("only equipment can be retired"));
                }
                if siblings.unfinished > 0 {
                    return Err(FleetError::validation(format!(
                        "asset {} has {} other case(s) that are not closed or cancelled",
                        asset.display_name(),
                        siblings.unfinished
                    )));
                }
            }
        }
        Ok(())
    }

    fn asset_effect(
        before: &ServiceCase,
        after: &ServiceCase,
        asset: &Asset,
        siblings: Siblings,
        now: DateTime<Utc>,
    ) -> Option<Asset> {
        let mut next = asset.clone();
        let released = siblings.active == 0;
        match after.phase {
            Phase::InProgress => {
                if next.status != AssetStatus::Maintenance {
                    if next.status_before_service.is_none() {
                        next.status_before_service = Some(next.status);
                    }
                    next.status = AssetStatus::Maintenance;
                }
            }
            Phase::Resolved => {
                let disposition = after.disposition.unwrap_or_default();
                if released {
                    let outcome = next
                        .pending_disposition
                        .take()
                        .map_or(disposition, |pending| pending.max(disposition));
                    next.status = outcome.resulting_status();
                    next.status_before_service = None;
                } else if disposition != AssetDisposition::Restore {
                    next.pending_disposition = next.pending_disposition.max(Some(disposition));
                }
            }
            // Nothing was taken off-line if the case never started
            Phase::Cancelled if released && before.started_at.is_some() => {
                let prior = next.status_before_service.take();
                next.status = match next.pending_disposition.take() {
                    Some(pending) => pending.resulting_status(),
                    None => prior.unwrap_or(AssetStatus::Available),
                };
            }
            _ => {}
        }

        if next.status == asset.status
            && next.status_before_service == asset.status_before_service
            && next.pending_disposition == asset.pending_disposition
        {
            return None;
        }
        next.updated = now;
        next.entity_revision += 1;
        Some(next)
    }
}
