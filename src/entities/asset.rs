//! Asset entity type - rental equipment and vehicles

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::{FleetError, FleetResult};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::service_case::AssetDisposition;

/// What kind of physical unit this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    #[default]
    Equipment,
    Vehicle,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Equipment => write!(f, "equipment"),
            AssetKind::Vehicle => write!(f, "vehicle"),
        }
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equipment" | "eqp" => Ok(AssetKind::Equipment),
            "vehicle" | "veh" => Ok(AssetKind::Vehicle),
            _ => Err(format!("Unknown asset kind: {}", s)),
        }
    }
}

/// Operational status of an asset
///
/// Equipment and vehicles share most values; `InService` and `Retired` only
/// apply to equipment, `RentedOut` and `Reserved` only to vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum AssetStatus {
    #[default]
    Available,
    InUse,
    Maintenance,
    OutOfOrder,
    InService,
    Retired,
    RentedOut,
    Reserved,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "available",
            AssetStatus::InUse => "in_use",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::OutOfOrder => "out_of_order",
            AssetStatus::InService => "in_service",
            AssetStatus::Retired => "retired",
            AssetStatus::RentedOut => "rented_out",
            AssetStatus::Reserved => "reserved",
        }
    }

    /// Statuses an asset of the given kind may hold
    pub fn allowed_for(kind: AssetKind) -> &'static [AssetStatus] {
        match kind {
            AssetKind::Equipment => &[
                AssetStatus::Available,
                AssetStatus::InUse,
                AssetStatus::Maintenance,
                AssetStatus::OutOfOrder,
                AssetStatus::InService,
                AssetStatus::Retired,
            ],
            AssetKind::Vehicle => &[
                AssetStatus::Available,
                AssetStatus::InUse,
                AssetStatus::Maintenance,
                AssetStatus::OutOfOrder,
                AssetStatus::RentedOut,
                AssetStatus::Reserved,
            ],
        }
    }

    pub fn is_allowed_for(&self, kind: AssetKind) -> bool {
        Self::allowed_for(kind).contains(self)
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "available" => Ok(AssetStatus::Available),
            "in_use" => Ok(AssetStatus::InUse),
            "maintenance" => Ok(AssetStatus::Maintenance),
            "out_of_order" => Ok(AssetStatus::OutOfOrder),
            "in_service" | "in_sav" => Ok(AssetStatus::InService),
            "retired" => Ok(AssetStatus::Retired),
            "rented_out" => Ok(AssetStatus::RentedOut),
            "reserved" => Ok(AssetStatus::Reserved),
            _ => Err(format!("Unknown asset status: {}", s)),
        }
    }
}

/// Preventive maintenance interval, by calendar and/or by distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceInterval {
    /// Days between services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,

    /// Kilometres between services (vehicles only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u32>,
}

impl MaintenanceInterval {
    pub fn is_empty(&self) -> bool {
        self.days.is_none() && self.distance_km.is_none()
    }
}

/// An Asset entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: EntityId,

    /// Serial number, internal reference or licence plate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Display name
    pub name: String,

    /// Equipment or vehicle
    #[serde(default)]
    pub kind: AssetKind,

    /// Current operational status
    #[serde(default)]
    pub status: AssetStatus,

    /// Status the asset had before a service case took it off-line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_before_service: Option<AssetStatus>,

    /// Outcome a resolved case asked for while another case still held the asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_disposition: Option<AssetDisposition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "MaintenanceInterval::is_empty")]
    pub maintenance_interval: MaintenanceInterval,

    /// Odometer reading in km (vehicles only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,

    /// Odometer reading when maintenance was last recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage_at_last_maintenance: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_expiry: Option<NaiveDate>,

    /// Periodic roadworthiness inspection (vehicles only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_control_expiry: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated: DateTime<Utc>,

    /// Who registered the asset
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Asset {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn revision(&self) -> u32 {
        self.entity_revision
    }
}

impl Asset {
    /// Create a new asset, available and with no tracked dates
    pub fn new(
        name: impl Into<String>,
        kind: AssetKind,
        author: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ast),
            code: None,
            name: name.into(),
            kind,
            status: AssetStatus::Available,
            status_before_service: None,
            pending_disposition: None,
            last_maintenance: None,
            next_maintenance: None,
            maintenance_interval: MaintenanceInterval::default(),
            mileage: None,
            mileage_at_last_maintenance: None,
            insurance_expiry: None,
            technical_control_expiry: None,
            warranty_expiry: None,
            location: None,
            notes: None,
            tags: Vec::new(),
            created: now,
            updated: now,
            author: author.into(),
            entity_revision: 1,
        }
    }

    /// Code if present, otherwise name
    pub fn display_name(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.name)
    }

    pub fn is_vehicle(&self) -> bool {
        self.kind == AssetKind::Vehicle
    }

    /// Next calendar service date derived from a service performed on `date`
    ///
    /// `None` without a calendar interval; an interval that runs past the
    /// last representable date is a validation error.
    pub fn next_due_after(&self, date: NaiveDate) -> FleetResult<Option<NaiveDate>> {
        let Some(days) = self.maintenance_interval.days else {
            return Ok(None);
        };
        date.checked_add_days(Days::new(u64::from(days)))
            .map(Some)
            .ok_or_else(|| {
                FleetError::validation(format!(
                    "maintenance interval of {} days is out of range",
                    days
                ))
            })
    }

    /// Record an odometer reading; readings never go backwards
    pub fn set_mileage(&mut self, reading: u32) -> FleetResult<()> {
        if !self.is_vehicle() {
            return Err(FleetError::validation("mileage only applies to vehicles"));
        }
        if let Some(current) = self.mileage.filter(|&current| reading < current) {
            return Err(FleetError::validation(format!(
                "mileage {} is below the current reading {}",
                reading, current
            )));
        }
        self.mileage = Some(reading);
        Ok(())
    }

    /// Distance driven since the last recorded service
    pub fn distance_since_maintenance(&self) -> Option<u32> {
        let current = self.mileage?;
        let at_service = self.mileage_at_last_maintenance?;
        Some(current.saturating_sub(at_service))
    }

    /// Check if the manufacturer warranty still covers the asset on `today`
    pub fn under_warranty(&self, today: NaiveDate) -> bool {
        self.warranty_expiry.is_some_and(|exp| exp >= today)
    }
}
