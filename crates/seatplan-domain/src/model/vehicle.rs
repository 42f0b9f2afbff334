//! Vehicle and fleet definitions

use serde::{Deserialize, Serialize};

use seatplan_types::ConfigError;

use super::group::Group;

/// The fixed fleet, in the order groups are numbered and filled
pub const STANDARD_FLEET: [(&str, u32); 10] = [
    ("Mercedes Sprinter", 19),
    ("Ford Transit", 16),
    ("Fiat Ducato", 15),
    ("Fiat Ducato 2", 15),
    ("VW Transporter", 7),
    ("VW Transporter 2", 7),
    ("VW Transporter 3", 7),
    ("VW Transporter 4", 7),
    ("Ford Custom", 7),
    ("Mercedes Elektryk", 7),
];

/// A vehicle with its seat count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    /// Student seats
    pub capacity: u32,
}

impl Vehicle {
    pub fn new(name: &str, capacity: u32) -> Self {
        Self {
            name: name.to_string(),
            capacity,
        }
    }
}

/// Ordered, immutable list of vehicles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    /// Build a fleet, rejecting empty fleets and zero-seat vehicles
    pub fn new(vehicles: Vec<Vehicle>) -> Result<Self, ConfigError> {
        if vehicles.is_empty() {
            return Err(ConfigError::Invalid("fleet has no vehicles".to_string()));
        }
        if let Some(v) = vehicles.iter().find(|v| v.capacity == 0) {
            return Err(ConfigError::Invalid(format!(
                "vehicle '{}' has zero capacity",
                v.name
            )));
        }
        Ok(Self { vehicles })
    }

    pub fn standard() -> Self {
        Self {
            vehicles: STANDARD_FLEET
                .iter()
                .map(|(name, capacity)| Vehicle::new(name, *capacity))
                .collect(),
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn total_capacity(&self) -> usize {
        self.vehicles.iter().map(|v| v.capacity as usize).sum()
    }

    /// One empty group per vehicle, numbered from 1
    pub fn empty_groups(&self) -> Vec<Group> {
        self.vehicles
            .iter()
            .enumerate()
            .map(|(idx, v)| Group::new(idx as u32 + 1, v))
            .collect()
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Self::standard()
    }
}
