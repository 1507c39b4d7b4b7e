//! Service case entity type - one issue filed against one asset

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Priority};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::phase::Phase;
use crate::core::vocabulary::{StatusTerm, Vocabulary};
use crate::entities::asset::AssetStatus;

/// Kind of work a case represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Repair,
    Maintenance,
    Installation,
    Training,
    Rma,
    Warranty,
}

impl CaseType {
    pub fn all() -> &'static [CaseType] {
        &[
            CaseType::Repair,
            CaseType::Maintenance,
            CaseType::Installation,
            CaseType::Training,
            CaseType::Rma,
            CaseType::Warranty,
        ]
    }

    /// Prefix used in human-readable case numbers
    pub fn number_prefix(&self) -> &'static str {
        match self {
            CaseType::Repair => "REP",
            CaseType::Maintenance => "MNT",
            CaseType::Installation => "INS",
            CaseType::Training => "TRN",
            CaseType::Rma => "RMA",
            CaseType::Warranty => "WAR",
        }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::for_case_type(*self)
    }
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseType::Repair => write!(f, "repair"),
            CaseType::Maintenance => write!(f, "maintenance"),
            CaseType::Installation => write!(f, "installation"),
            CaseType::Training => write!(f, "training"),
            CaseType::Rma => write!(f, "rma"),
            CaseType::Warranty => write!(f, "warranty"),
        }
    }
}

impl std::str::FromStr for CaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseType::all()
            .iter()
            .copied()
            .find(|t| t.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown case type: {}", s))
    }
}

/// What happens to the asset when a case is resolved
///
/// Ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetDisposition {
    /// Back to available
    #[default]
    Restore,
    /// Kept off-line, e.g. irreparable but not yet written off
    OutOfOrder,
    /// Written off (equipment only)
    Retire,
}

impl AssetDisposition {
    pub fn resulting_status(&self) -> AssetStatus {
        match self {
            AssetDisposition::Restore => AssetStatus::Available,
            AssetDisposition::OutOfOrder => AssetStatus::OutOfOrder,
            AssetDisposition::Retire => AssetStatus::Retired,
        }
    }
}

impl std::fmt::Display for AssetDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetDisposition::Restore => write!(f, "restore"),
            AssetDisposition::OutOfOrder => write!(f, "out_of_order"),
            AssetDisposition::Retire => write!(f, "retire"),
        }
    }
}

impl std::str::FromStr for AssetDisposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "restore" | "available" => Ok(AssetDisposition::Restore),
            "out_of_order" => Ok(AssetDisposition::OutOfOrder),
            "retire" | "retired" => Ok(AssetDisposition::Retire),
            _ => Err(format!("Unknown disposition: {}", s)),
        }
    }
}

/// Why a unit is being returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RmaReason {
    ManufacturingDefect,
    TransportDamage,
    NonCompliance,
    WarrantyEnd,
    Upgrade,
    OrderError,
    CustomerRequest,
    Other,
}

impl RmaReason {
    pub fn all() -> &'static [RmaReason] {
        &[
            RmaReason::ManufacturingDefect,
            RmaReason::TransportDamage,
            RmaReason::NonCompliance,
            RmaReason::WarrantyEnd,
            RmaReason::Upgrade,
            RmaReason::OrderError,
            RmaReason::CustomerRequest,
            RmaReason::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RmaReason::ManufacturingDefect => "manufacturing_defect",
            RmaReason::TransportDamage => "transport_damage",
            RmaReason::NonCompliance => "non_compliance",
            RmaReason::WarrantyEnd => "warranty_end",
            RmaReason::Upgrade => "upgrade",
            RmaReason::OrderError => "order_error",
            RmaReason::CustomerRequest => "customer_request",
            RmaReason::Other => "other",
        }
    }
}

impl std::fmt::Display for RmaReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RmaReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        RmaReason::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == key)
            .ok_or_else(|| format!("Unknown RMA reason: {}", s))
    }
}

/// Money attached to the work
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseCosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,

    /// Carrier charges for a return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<f64>,

    /// Amount credited back to the customer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund: Option<f64>,
}

impl CaseCosts {
    pub fn is_empty(&self) -> bool {
        self.estimated.is_none()
            && self.actual.is_none()
            && self.shipping.is_none()
            && self.refund.is_none()
    }
}

/// Return logistics of an RMA
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnShipment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RmaReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl ReturnShipment {
    pub fn is_empty(&self) -> bool {
        self.reason.is_none() && self.carrier.is_none() && self.tracking_number.is_none()
    }
}

/// Technician findings on the work performed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,

    /// Free-form list of parts to order or fit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts_needed: Option<String>,
}

impl WorkReport {
    pub fn is_empty(&self) -> bool {
        self.diagnosis.is_none() && self.solution.is_none() && self.parts_needed.is_none()
    }
}

/// Record of one committed status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: StatusTerm,
    pub to: StatusTerm,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A Service Case entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCase {
    /// Unique identifier
    pub id: EntityId,

    /// Human-readable number, e.g. REP-2026-0007
    pub number: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub case_type: CaseType,

    #[serde(default)]
    pub priority: Priority,

    /// Canonical phase
    #[serde(default)]
    pub phase: Phase,

    /// Type-specific status term; always maps onto `phase`
    pub status: StatusTerm,

    /// The asset this case is filed against. Never changes.
    pub asset: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_technician: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,

    #[serde(default, skip_serializing_if = "CaseCosts::is_empty")]
    pub costs: CaseCosts,

    /// Return logistics (RMA cases only)
    #[serde(default, skip_serializing_if = "ReturnShipment::is_empty")]
    pub shipment: ReturnShipment,

    #[serde(default, skip_serializing_if = "WorkReport::is_empty")]
    pub report: WorkReport,

    /// Asset warranty was valid when the case was opened
    #[serde(default)]
    pub warranty_covered: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,

    /// Asset outcome chosen on resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<AssetDisposition>,

    pub requested_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,

    /// Status changes, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<TransitionRecord>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for ServiceCase {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn revision(&self) -> u32 {
        self.entity_revision
    }
}

impl ServiceCase {
    /// Create a new open case against an asset
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        case_type: CaseType,
        asset: EntityId,
        author: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Case),
            number: number.into(),
            title: title.into(),
            description: None,
            case_type,
            priority: Priority::default(),
            phase: Phase::Open,
            status: case_type.vocabulary().display_term(Phase::Open),
            asset,
            assigned_technician: None,
            requester: None,
            costs: CaseCosts::default(),
            shipment: ReturnShipment::default(),
            report: WorkReport::default(),
            warranty_covered: false,
            resolution_notes: None,
            disposition: None,
            requested_at: now,
            started_at: None,
            resolved_at: None,
            closed_at: None,
            cancelled_at: None,
            updated_at: now,
            history: Vec::new(),
            created: now,
            author: author.into(),
            entity_revision: 1,
        }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.case_type.vocabulary()
    }

    /// Closed and cancelled cases are archived
    pub fn is_archived(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Carrier tracking number matches, ignoring case and surrounding spaces
    pub fn has_tracking_number(&self, tracking: &str) -> bool {
        self.shipment
            .tracking_number
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(tracking.trim()))
    }

    /// Time from request to resolution, if resolved
    pub fn turnaround(&self) -> Option<chrono::Duration> {
        self.resolved_at.map(|r| r - self.requested_at)
    }
}

/// Format a case number from type, year and sequence
pub fn format_case_number(case_type: CaseType, at: DateTime<Utc>, seq: u32) -> String {
    format!("{}-{}-{:04}", case_type.number_prefix(), at.year(), seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_case_creation() {
        let asset = EntityId::new(EntityPrefix::Ast);
        let case = ServiceCase::new("REP-2026-0001", "Fan noise", CaseType::Repair, asset, "test", now());

        assert!(case.id.to_string().starts_with("CASE-"));
        assert_eq!(case.phase, Phase::Open);
        assert_eq!(case.status, StatusTerm::Open);
        assert_eq!(case.requested_at, now());
        assert!(case.started_at.is_none());
        assert!(case.history.is_empty());
    }

    #[test]
    fn test_rma_starts_initiated() {
        let asset = EntityId::new(EntityPrefix::Ast);
        let case = ServiceCase::new("RMA-2026-0001", "DOA amp", CaseType::Rma, asset, "test", now());
        assert_eq!(case.status, StatusTerm::Initiated);
        assert_eq!(case.phase, Phase::Open);
    }

    #[test]
    fn test_case_number_format() {
        assert_eq!(
            format_case_number(CaseType::Rma, now(), 7),
            "RMA-2026-0007"
        );
        assert_eq!(
            format_case_number(CaseType::Maintenance, now(), 12345),
            "MNT-2026-12345"
        );
    }

    #[test]
    fn test_case_type_parse() {
        assert_eq!("RMA".parse::<CaseType>().unwrap(), CaseType::Rma);
        assert_eq!("repair".parse::<CaseType>().unwrap(), CaseType::Repair);
        assert!("upgrade".parse::<CaseType>().is_err());
    }

    #[test]
    fn test_disposition_status() {
        assert_eq!(AssetDisposition::default().resulting_status(), AssetStatus::Available);
        assert_eq!(AssetDisposition::Retire.resulting_status(), AssetStatus::Retired);
    }

    #[test]
    fn test_rma_reason_parse() {
        assert_eq!(
            "transport-damage".parse::<RmaReason>().unwrap(),
            RmaReason::TransportDamage
        );
        assert_eq!("Other".parse::<RmaReason>().unwrap(), RmaReason::Other);
        assert!("broken".parse::<RmaReason>().is_err());
    }

    #[test]
    fn test_disposition_order() {
        assert!(AssetDisposition::Restore < AssetDisposition::OutOfOrder);
        assert!(AssetDisposition::OutOfOrder < AssetDisposition::Retire);
    }

    #[test]
    fn test_shipment_serialized_only_when_set() {
        let asset = EntityId::new(EntityPrefix::Ast);
        let mut case = ServiceCase::new("RMA-2026-0002", "Dead amp", CaseType::Rma, asset, "test", now());
        assert!(!serde_yml::to_string(&case).unwrap().contains("shipment"));

        case.shipment.reason = Some(RmaReason::ManufacturingDefect);
        case.shipment.tracking_number = Some("1Z999AA10123456784".to_string());
        let yaml = serde_yml::to_string(&case).unwrap();
        assert!(yaml.contains("reason: manufacturing_defect"));
        assert!(case.has_tracking_number(" 1z999aa10123456784 "));
    }

    #[test]
    fn test_case_yaml_uses_type_key() {
        let asset = EntityId::new(EntityPrefix::Ast);
        let case = ServiceCase::new("MNT-2026-0001", "Yearly check", CaseType::Maintenance, asset, "test", now());
        let yaml = serde_yml::to_string(&case).unwrap();
        assert!(yaml.contains("type: maintenance"));
        assert!(yaml.contains("status: open"));
        assert!(!yaml.contains("started_at"));
    }
}
