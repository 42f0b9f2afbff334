//! Vehicle groups and grouping plans

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seatplan_types::Strategy;

use super::student::Student;
use super::vehicle::Vehicle;

/// Students riding in one vehicle, in pickup order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: u32,
    pub vehicle: String,
    pub capacity: u32,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Group {
    pub fn new(group_id: u32, vehicle: &Vehicle) -> Self {
        Self {
            group_id,
            vehicle: vehicle.name.clone(),
            capacity: vehicle.capacity,
            students: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn has_free_seat(&self) -> bool {
        self.students.len() < self.capacity as usize
    }

    pub fn is_over_capacity(&self) -> bool {
        self.students.len() > self.capacity as usize
    }

    pub fn position(&self, student_id: &str) -> Option<usize> {
        self.students.iter().position(|s| s.id == student_id)
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.position(student_id).is_some()
    }

    /// Display label, e.g. "Group 3 - Fiat Ducato (4/15)"
    pub fn label(&self) -> String {
        format!(
            "Group {} - {} ({}/{})",
            self.group_id,
            self.vehicle,
            self.students.len(),
            self.capacity
        )
    }
}

/// Result of a grouping run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub created_at: DateTime<Utc>,
    pub strategy: Strategy,
    pub groups: Vec<Group>,
}

impl Plan {
    pub fn new(strategy: Strategy, groups: Vec<Group>) -> Self {
        Self {
            created_at: Utc::now(),
            strategy,
            groups,
        }
    }

    pub fn student_count(&self) -> usize {
        self.groups.iter().map(|g| g.students.len()).sum()
    }

    pub fn non_empty_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| !g.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_capacity_helpers() {
        let mut group = Group::new(5, &Vehicle::new("VW Transporter", 2));
        assert!(group.has_free_seat());
        group.students.push(Student::new(0, "1", "Anna", "Lipowa 1"));
        group.students.push(Student::new(0, "2", "Jan", "Lipowa 2"));
        assert!(!group.has_free_seat());
        assert!(!group.is_over_capacity());
        assert_eq!(group.position("0_2"), Some(1));
        assert!(!group.contains("0_3"));
        assert_eq!(group.label(), "Group 5 - VW Transporter (2/2)");
    }

    #[test]
    fn test_plan_counts() {
        let mut full = Group::new(1, &Vehicle::new("Ford Transit", 16));
        full.students.push(Student::new(0, "1", "Anna", "Lipowa 1"));
        let empty = Group::new(2, &Vehicle::new("Fiat Ducato", 15));
        let plan = Plan::new(Strategy::Greedy, vec![full, empty]);
        assert_eq!(plan.student_count(), 1);
        assert_eq!(plan.non_empty_groups().count(), 1);
    }
}
