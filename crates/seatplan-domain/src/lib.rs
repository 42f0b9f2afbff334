//! Domain layer for seatplan
//!
//! Students, vehicles and groups, plus the services that partition a roster
//! into capacity-bounded vehicle groups.

pub mod assigner;
pub mod model;
pub mod service;

pub use assigner::GroupAssigner;
