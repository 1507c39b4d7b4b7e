//! Core module - fundamental types and utilities

pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod locks;
pub mod phase;
pub mod project;
pub mod scanner;
pub mod service;
pub mod shortid;
pub mod store;
pub mod vocabulary;
pub mod yaml_store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use entity::{Entity, Priority};
pub use error::{FleetError, FleetResult, StoreError};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use lifecycle::{LifecycleEngine, Siblings, TransitionPlan, TransitionRequest};
pub use locks::LockTable;
pub use phase::Phase;
pub use project::{Project, ProjectError};
pub use scanner::{Alert, AlertSet, Document, Expiry};
pub use service::{
    AssetAlerts, CaseFilter, CaseStats, CaseUpdate, NewAsset, NewCase, ServiceDesk,
};
pub use shortid::ShortIdIndex;
pub use store::{MemoryStore, Store};
pub use vocabulary::{StatusTerm, Target, Vocabulary};
pub use yaml_store::YamlStore;
