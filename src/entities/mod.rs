//! Entity type definitions

pub mod asset;
pub mod service_case;

pub use asset::{Asset, AssetKind, AssetStatus, MaintenanceInterval};
pub use service_case::{AssetDisposition, CaseType, ServiceCase, TransitionRecord};
