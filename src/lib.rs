//! fleetcare: after-sales service tracking for rental equipment and vehicles
//!
//! Assets and service cases are kept as plain YAML files. The library holds
//! the lifecycle rules that move a case between phases, the effect each move
//! has on the asset, and the scanner that flags due maintenance and expired
//! documents.

pub mod cli;
pub mod core;
pub mod entities;
