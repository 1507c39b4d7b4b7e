//! Service desk - the operations exposed to front ends
//!
//! Wraps a [`Store`] and a [`Clock`] and serializes writers through a
//! [`LockTable`]: a transition holds its case lock, then its asset lock,
//! for the whole read-validate-commit sequence. Asset-only operations take
//! just the asset lock. Reads take no locks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{Config, DEFAULT_LOOKAHEAD_DAYS};
use crate::core::entity::Priority;
use crate::core::error::{FleetError, FleetResult};
use crate::core::identity::EntityId;
use crate::core::lifecycle::{LifecycleEngine, Siblings, TransitionRequest};
use crate::core::locks::LockTable;
use crate::core::phase::Phase;
use crate::core::scanner::{self, AlertSet, Expiry};
use crate::core::store::Store;
use crate::core::vocabulary::Target;
use crate::entities::asset::{Asset, AssetKind, AssetStatus, MaintenanceInterval};
use crate::entities::service_case::{format_case_number, CaseCosts, CaseType, RmaReason, ServiceCase};

/// Input for registering an asset
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    pub name: String,
    pub kind: AssetKind,
    pub code: Option<String>,
    pub status: Option<AssetStatus>,
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,
    pub maintenance_interval: MaintenanceInterval,
    pub mileage: Option<u32>,
    pub mileage_at_last_maintenance: Option<u32>,
    pub insurance_expiry: Option<NaiveDate>,
    pub technical_control_expiry: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl NewAsset {
    pub fn new(name: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }
}

/// Input for opening a case
#[derive(Debug, Clone)]
pub struct NewCase {
    pub asset: EntityId,
    pub case_type: CaseType,
    pub priority: Priority,
    pub title: Option<String>,
    pub description: Option<String>,
    pub requester: Option<String>,
    pub assigned_technician: Option<String>,
    pub estimated_cost: Option<f64>,
}

impl NewCase {
    pub fn new(asset: EntityId, case_type: CaseType) -> Self {
        Self {
            asset,
            case_type,
            priority: Priority::default(),
            title: None,
            description: None,
            requester: None,
            assigned_technician: None,
            estimated_cost: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Attribute edits on a case; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct CaseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub requester: Option<String>,
    pub assigned_technician: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub diagnosis: Option<String>,
    pub solution: Option<String>,
    pub parts_needed: Option<String>,
    /// Return fields below apply to RMA cases only
    pub rma_reason: Option<RmaReason>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_cost: Option<f64>,
    pub refund_amount: Option<f64>,
}

impl CaseUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.requester.is_none()
            && self.assigned_technician.is_none()
            && self.estimated_cost.is_none()
            && self.actual_cost.is_none()
            && self.diagnosis.is_none()
            && self.solution.is_none()
            && self.parts_needed.is_none()
            && !self.touches_return()
    }

    fn touches_return(&self) -> bool {
        self.rma_reason.is_some()
            || self.carrier.is_some()
            || self.tracking_number.is_some()
            || self.shipping_cost.is_some()
            || self.refund_amount.is_some()
    }

    fn amounts(&self) -> [Option<f64>; 4] {
        [
            self.estimated_cost,
            self.actual_cost,
            self.shipping_cost,
            self.refund_amount,
        ]
    }
}

/// Criteria for listing cases; empty fields match everything
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub phase: Option<Phase>,
    pub case_type: Option<CaseType>,
    pub priority: Option<Priority>,
    pub asset: Option<EntityId>,
    /// Substring match, case-insensitive
    pub technician: Option<String>,
    /// Hide closed and cancelled cases
    pub open_only: bool,
}

impl CaseFilter {
    pub fn matches(&self, case: &ServiceCase) -> bool {
        self.phase.is_none_or(|p| case.phase == p)
            && self.case_type.is_none_or(|t| case.case_type == t)
            && self.priority.is_none_or(|p| case.priority == p)
            && self.asset.is_none_or(|a| case.asset == a)
            && self.technician.as_ref().is_none_or(|needle| {
                case.assigned_technician
                    .as_ref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase()))
            })
            && (!self.open_only || !case.is_archived())
    }
}

/// Case counts for dashboards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    pub total: usize,
    pub by_phase: BTreeMap<Phase, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    /// High or urgent cases that still need work
    pub urgent_open: usize,
}

/// Alerts for one asset in a fleet scan
#[derive(Debug, Clone, Serialize)]
pub struct AssetAlerts {
    pub asset: EntityId,
    pub name: String,
    pub alerts: AlertSet,
}

#[derive(Debug, Clone)]
struct DeskSettings {
    author: String,
    lookahead_days: u32,
    default_maintenance_days: Option<u32>,
}

pub struct ServiceDesk {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    engine: LifecycleEngine,
    locks: LockTable,
    numbering: Mutex<()>,
    settings: DeskSettings,
}

impl ServiceDesk {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            engine: LifecycleEngine::new(),
            locks: LockTable::new(),
            numbering: Mutex::new(()),
            settings: DeskSettings {
                author: "system".to_string(),
                lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
                default_maintenance_days: None,
            },
        }
    }

    /// Desk over `store` using wall-clock time and the given configuration
    pub fn with_config(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::new(store, Arc::new(SystemClock)).configure(config)
    }

    pub fn configure(mut self, config: &Config) -> Self {
        self.settings = DeskSettings {
            author: config.author(),
            lookahead_days: config.lookahead_days(),
            default_maintenance_days: config.default_maintenance_days,
        };
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.settings.author = author.into();
        self
    }

    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.settings.lookahead_days = days;
        self
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn lookahead_days(&self) -> u32 {
        self.settings.lookahead_days
    }

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------

    pub fn register_asset(&self, input: NewAsset) -> FleetResult<Asset> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(FleetError::validation("asset name is required"));
        }
        if input.kind == AssetKind::Equipment {
            if input.mileage.is_some() || input.mileage_at_last_maintenance.is_some() {
                return Err(FleetError::validation("mileage only applies to vehicles"));
            }
            if input.maintenance_interval.distance_km.is_some() {
                return Err(FleetError::validation(
                    "distance maintenance interval only applies to vehicles",
                ));
            }
            if input.technical_control_expiry.is_some() {
                return Err(FleetError::validation(
                    "technical control only applies to vehicles",
                ));
            }
        }
        let status = input.status.unwrap_or_default();
        if !status.is_allowed_for(input.kind) {
            return Err(FleetError::validation(format!(
                "status {} is not valid for {}",
                status, input.kind
            )));
        }
        if let (Some(current), Some(at_service)) = (input.mileage, input.mileage_at_last_maintenance)
        {
            if at_service > current {
                return Err(FleetError::validation(
                    "mileage at last maintenance exceeds current mileage",
                ));
            }
        }

        let mut asset = Asset::new(name, input.kind, &self.settings.author, self.clock.now());
        asset.code = input.code.filter(|c| !c.trim().is_empty());
        asset.status = status;
        asset.maintenance_interval = input.maintenance_interval;
        if asset.maintenance_interval.days.is_none() {
            asset.maintenance_interval.days = self.settings.default_maintenance_days;
        }
        asset.last_maintenance = input.last_maintenance;
        asset.next_maintenance = match (input.next_maintenance, input.last_maintenance) {
            (Some(next), _) => Some(next),
            (None, Some(last)) => asset.next_due_after(last)?,
            (None, None) => None,
        };
        asset.mileage = input.mileage;
        asset.mileage_at_last_maintenance = input.mileage_at_last_maintenance;
        asset.insurance_expiry = input.insurance_expiry;
        asset.technical_control_expiry = input.technical_control_expiry;
        asset.warranty_expiry = input.warranty_expiry;
        asset.location = input.location;
        asset.notes = input.notes;
        asset.tags = input.tags;

        self.store.save_asset(&asset)?;
        info!(asset_id = %asset.id, kind = %asset.kind, name = %asset.name, "asset registered");
        Ok(asset)
    }

    pub fn get_asset(&self, id: &EntityId) -> FleetResult<Asset> {
        self.store
            .load_asset(id)?
            .ok_or_else(|| FleetError::not_found("asset", id))
    }

    /// All assets, oldest first
    pub fn list_assets(&self) -> FleetResult<Vec<Asset>> {
        let mut assets = self.store.list_assets()?;
        assets.sort_by_key(|a| a.id);
        Ok(assets)
    }

    /// Administrative status override
    ///
    /// No lifecycle check is made; only the kind's status vocabulary is enforced.
    pub fn set_asset_status(&self, id: &EntityId, status: AssetStatus) -> FleetResult<Asset> {
        self.locks.with_lock(&id.to_string(), || {
            let mut asset = self.get_asset(id)?;
            if !status.is_allowed_for(asset.kind) {
                return Err(FleetError::validation(format!(
                    "status {} is not valid for {}",
                    status, asset.kind
                )));
            }
            let previous = asset.status;
            asset.status = status;
            self.touch_asset(&mut asset)?;
            info!(asset_id = %id, from = %previous, to = %status, "asset status overridden");
            Ok(asset)
        })
    }

    /// Record a service performed on `date`, optionally at an odometer reading
    pub fn record_maintenance(
        &self,
        id: &EntityId,
        date: NaiveDate,
        mileage: Option<u32>,
    ) -> FleetResult<Asset> {
        self.locks.with_lock(&id.to_string(), || {
            let mut asset = self.get_asset(id)?;
            if let Some(reading) = mileage {
                asset.set_mileage(reading)?;
            }
            if asset.is_vehicle() {
                asset.mileage_at_last_maintenance = asset.mileage;
            }
            asset.next_maintenance = asset.next_due_after(date)?;
            asset.last_maintenance = Some(date);
            self.touch_asset(&mut asset)?;
            info!(
                asset_id = %id,
                date = %date,
                next = ?asset.next_maintenance,
                "maintenance recorded"
            );
            Ok(asset)
        })
    }

    /// Record an odometer reading between services
    ///
    /// Vehicles only. The reading may not go below the current one and does
    /// not move the maintenance baseline, so distance-based maintenance
    /// comes due as the vehicle is driven.
    pub fn record_mileage(&self, id: &EntityId, reading: u32) -> FleetResult<Asset> {
        self.locks.with_lock(&id.to_string(), || {
            let mut asset = self.get_asset(id)?;
            let previous = asset.mileage;
            asset.set_mileage(reading)?;
            if asset.mileage == previous {
                return Ok(asset);
            }
            self.touch_asset(&mut asset)?;
            info!(asset_id = %id, mileage = reading, "mileage recorded");
            Ok(asset)
        })
    }

    /// Soft retirement of equipment with no unfinished cases
    pub fn retire_asset(&self, id: &EntityId) -> FleetResult<Asset> {
        self.locks.with_lock(&id.to_string(), || {
            let mut asset = self.get_asset(id)?;
            if asset.kind != AssetKind::Equipment {
                return Err(FleetError::validation("only equipment can be retired"));
            }
            let pending = self.count_cases_on(id, |c| !c.phase.is_terminal())?;
            if pending > 0 {
                return Err(FleetError::validation(format!(
                    "asset has {} case(s) that are not closed or cancelled",
                    pending
                )));
            }
            asset.status = AssetStatus::Retired;
            asset.status_before_service = None;
            asset.pending_disposition = None;
            self.touch_asset(&mut asset)?;
            info!(asset_id = %id, "asset retired");
            Ok(asset)
        })
    }

    /// Physically remove an asset that no open case references
    pub fn delete_asset(&self, id: &EntityId) -> FleetResult<()> {
        self.locks.with_lock(&id.to_string(), || {
            self.get_asset(id)?;
            let open = self.count_cases_on(id, |c| !c.phase.is_terminal())?;
            if open > 0 {
                return Err(FleetError::validation(format!(
                    "asset is referenced by {} open case(s); retire it instead",
                    open
                )));
            }
            self.store.delete_asset(id)?;
            info!(asset_id = %id, "asset deleted");
            Ok(())
        })
    }

    fn touch_asset(&self, asset: &mut Asset) -> FleetResult<()> {
        asset.updated = self.clock.now();
        asset.entity_revision += 1;
        self.store.save_asset(asset)?;
        Ok(())
    }

    /// Count the other cases on `case`'s asset that still matter to it
    fn siblings_of(&self, case: &ServiceCase) -> FleetResult<Siblings> {
        let mut siblings = Siblings::none();
        for other in self
            .store
            .list_cases()?
            .iter()
            .filter(|c| c.asset == case.asset && c.id != case.id)
        {
            if other.phase.is_active() {
                siblings.active += 1;
            }
            if !other.phase.is_terminal() {
                siblings.unfinished += 1;
            }
        }
        Ok(siblings)
    }

    fn count_cases_on(
        &self,
        asset: &EntityId,
        pred: impl Fn(&ServiceCase) -> bool,
    ) -> FleetResult<usize> {
        Ok(self
            .store
            .list_cases()?
            .iter()
            .filter(|c| c.asset == *asset && pred(c))
            .count())
    }

    // ------------------------------------------------------------------
    // Cases
    // ------------------------------------------------------------------

    pub fn create_case(&self, input: NewCase) -> FleetResult<ServiceCase> {
        if input.estimated_cost.is_some_and(|c| c < 0.0 || !c.is_finite()) {
            return Err(FleetError::validation("estimated cost must be a non-negative amount"));
        }

        self.locks.with_lock(&input.asset.to_string(), || {
            let asset = self.get_asset(&input.asset)?;
            if asset.status == AssetStatus::Retired {
                return Err(FleetError::validation(format!(
                    "asset {} is retired",
                    asset.display_name()
                )));
            }

            let now = self.clock.now();
            let title = input
                .title
                .filter(|t| !t.trim().is_empty())
                .or_else(|| {
                    input
                        .description
                        .as_deref()
                        .and_then(|d| d.lines().next())
                        .filter(|l| !l.trim().is_empty())
                        .map(|l| l.trim().to_string())
                })
                .unwrap_or_else(|| format!("{} on {}", input.case_type, asset.display_name()));

            let _numbering = self.numbering.lock().unwrap_or_else(|e| e.into_inner());
            let number = self.next_case_number(input.case_type, now)?;

            let mut case = ServiceCase::new(
                number,
                title,
                input.case_type,
                asset.id,
                &self.settings.author,
                now,
            );
            case.priority = input.priority;
            case.description = input.description;
            case.requester = input.requester;
            case.assigned_technician = input.assigned_technician;
            case.costs = CaseCosts {
                estimated: input.estimated_cost,
                ..CaseCosts::default()
            };
            case.warranty_covered = asset.under_warranty(now.date_naive());

            self.store.save_case(&case)?;
            info!(
                case_id = %case.id,
                number = %case.number,
                asset_id = %asset.id,
                case_type = %case.case_type,
                priority = %case.priority,
                "case opened"
            );
            Ok(case)
        })
    }

    fn next_case_number(&self, case_type: CaseType, now: chrono::DateTime<chrono::Utc>) -> FleetResult<String> {
        let prefix = format!("{}-{}-", case_type.number_prefix(), now.year());
        let highest = self
            .store
            .list_cases()?
            .iter()
            .filter_map(|c| c.number.strip_prefix(&prefix))
            .filter_map(|seq| seq.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(format_case_number(case_type, now, highest + 1))
    }

    pub fn get_case(&self, id: &EntityId) -> FleetResult<ServiceCase> {
        self.store
            .load_case(id)?
            .ok_or_else(|| FleetError::not_found("case", id))
    }

    pub fn find_case_by_number(&self, number: &str) -> FleetResult<ServiceCase> {
        self.store
            .list_cases()?
            .into_iter()
            .find(|c| c.number.eq_ignore_ascii_case(number.trim()))
            .ok_or_else(|| FleetError::not_found("case", number))
    }

    /// RMA cases shipped under a carrier tracking number
    pub fn find_cases_by_tracking(&self, tracking: &str) -> FleetResult<Vec<ServiceCase>> {
        if tracking.trim().is_empty() {
            return Err(FleetError::validation("tracking number is required"));
        }
        let mut cases: Vec<ServiceCase> = self
            .store
            .list_cases()?
            .into_iter()
            .filter(|c| c.has_tracking_number(tracking))
            .collect();
        cases.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        Ok(cases)
    }

    /// Cases filed against an asset, oldest request first
    pub fn list_cases_for_asset(&self, asset: &EntityId) -> FleetResult<Vec<ServiceCase>> {
        self.list_cases(&CaseFilter {
            asset: Some(*asset),
            ..Default::default()
        })
    }

    pub fn list_cases(&self, filter: &CaseFilter) -> FleetResult<Vec<ServiceCase>> {
        let mut cases: Vec<ServiceCase> = self
            .store
            .list_cases()?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        cases.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        Ok(cases)
    }

    /// Move a case to a phase or vocabulary term
    ///
    /// Requests on one case are serialized, so two callers racing to move
    /// the same case both succeed if each move is legal from the state the
    /// other left behind. Callers that need exactly one of them to win must
    /// pass the revision they read through [`TransitionRequest::expecting`].
    pub fn transition(&self, id: &EntityId, target: impl Into<Target>) -> FleetResult<ServiceCase> {
        self.transition_with(id, TransitionRequest::to(target))
    }

    pub fn transition_with(
        &self,
        id: &EntityId,
        request: TransitionRequest,
    ) -> FleetResult<ServiceCase> {
        self.locks.with_lock(&id.to_string(), || {
            let case = self.get_case(id)?;
            if let Some(expected) = request.expected_revision {
                if expected != case.entity_revision {
                    debug!(case_id = %id, expected, found = case.entity_revision, "stale transition request");
                    return Err(FleetError::ConcurrencyConflict {
                        id: id.to_string(),
                        expected,
                        found: case.entity_revision,
                    });
                }
            }

            self.locks.with_lock(&case.asset.to_string(), || {
                let asset = self.get_asset(&case.asset)?;
                let siblings = self.siblings_of(&case)?;

                let plan = self
                    .engine
                    .plan(&case, &asset, siblings, &request, self.clock.now())
                    .inspect_err(|e| {
                        debug!(case_id = %id, status = %case.status, error = %e, "transition rejected");
                    })?;

                self.store.commit(&plan.case, plan.asset.as_ref())?;
                info!(
                    case_id = %id,
                    asset_id = %case.asset,
                    from = %plan.from,
                    to = %plan.to,
                    phase = %plan.case.phase,
                    "case transitioned"
                );
                if let Some(updated) = &plan.asset {
                    info!(
                        asset_id = %updated.id,
                        from = %asset.status,
                        to = %updated.status,
                        "asset status changed by case"
                    );
                }
                Ok(plan.case)
            })
        })
    }

    /// Edit plain attributes of a case that is not closed
    pub fn update_case(&self, id: &EntityId, update: CaseUpdate) -> FleetResult<ServiceCase> {
        for cost in update.amounts().into_iter().flatten() {
            if cost < 0.0 || !cost.is_finite() {
                return Err(FleetError::validation("costs must be non-negative amounts"));
            }
        }
        if update.title.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Err(FleetError::validation("title cannot be empty"));
        }

        self.locks.with_lock(&id.to_string(), || {
            let mut case = self.get_case(id)?;
            if case.phase == Phase::Closed {
                return Err(FleetError::validation(format!(
                    "case {} is closed and can no longer be edited",
                    case.number
                )));
            }
            if update.is_empty() {
                return Ok(case);
            }
            if update.touches_return() && case.case_type != CaseType::Rma {
                return Err(FleetError::validation(format!(
                    "return details only apply to RMA cases ({} is a {} case)",
                    case.number, case.case_type
                )));
            }

            if let Some(title) = update.title {
                case.title = title.trim().to_string();
            }
            if let Some(description) = update.description {
                case.description = Some(description);
            }
            if let Some(priority) = update.priority {
                case.priority = priority;
            }
            if let Some(requester) = update.requester {
                case.requester = Some(requester);
            }
            if let Some(technician) = update.assigned_technician {
                case.assigned_technician = Some(technician);
            }
            if let Some(cost) = update.estimated_cost {
                case.costs.estimated = Some(cost);
            }
            if let Some(cost) = update.actual_cost {
                case.costs.actual = Some(cost);
            }
            if let Some(diagnosis) = update.diagnosis {
                case.report.diagnosis = Some(diagnosis);
            }
            if let Some(solution) = update.solution {
                case.report.solution = Some(solution);
            }
            if let Some(parts) = update.parts_needed {
                case.report.parts_needed = Some(parts);
            }
            if let Some(reason) = update.rma_reason {
                case.shipment.reason = Some(reason);
            }
            if let Some(carrier) = update.carrier {
                case.shipment.carrier = Some(carrier);
            }
            if let Some(tracking) = update.tracking_number {
                case.shipment.tracking_number = Some(tracking.trim().to_string());
            }
            if let Some(cost) = update.shipping_cost {
                case.costs.shipping = Some(cost);
            }
            if let Some(amount) = update.refund_amount {
                case.costs.refund = Some(amount);
            }
            case.updated_at = self.clock.now();
            case.entity_revision += 1;
            self.store.save_case(&case)?;
            info!(case_id = %id, revision = case.entity_revision, "case updated");
            Ok(case)
        })
    }

    pub fn case_stats(&self) -> FleetResult<CaseStats> {
        let mut stats = CaseStats::default();
        for case in self.store.list_cases()? {
            stats.total += 1;
            *stats.by_phase.entry(case.phase).or_default() += 1;
            *stats.by_priority.entry(case.priority).or_default() += 1;
            if case.priority.is_urgent() && !case.phase.is_settled() {
                stats.urgent_open += 1;
            }
        }
        Ok(stats)
    }

    // ------------------------------------------------------------------
    // Scanner
    // ------------------------------------------------------------------

    pub fn evaluate_alerts(&self, id: &EntityId) -> FleetResult<AlertSet> {
        let asset = self.get_asset(id)?;
        Ok(scanner::evaluate(
            &asset,
            self.clock.today(),
            self.settings.lookahead_days,
        ))
    }

    pub fn upcoming_expiries(&self, id: &EntityId, within_days: u32) -> FleetResult<Vec<Expiry>> {
        let asset = self.get_asset(id)?;
        Ok(scanner::upcoming_expiries(&asset, self.clock.today(), within_days))
    }

    /// Alert sets of every non-retired asset that has at least one alert
    pub fn scan_fleet(&self) -> FleetResult<Vec<AssetAlerts>> {
        let today = self.clock.today();
        Ok(self
            .list_assets()?
            .into_iter()
            .filter(|a| a.status != AssetStatus::Retired)
            .filter_map(|asset| {
                let alerts = scanner::evaluate(&asset, today, self.settings.lookahead_days);
                (!alerts.is_empty()).then(|| AssetAlerts {
                    asset: asset.id,
                    name: asset.display_name().to_string(),
                    alerts,
                })
            })
            .collect())
    }
}
