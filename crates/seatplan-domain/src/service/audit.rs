//! Consistency checks for groups produced outside the capacity-enforcing paths

use std::collections::{HashMap, HashSet};

use crate::model::{Group, Student};

/// Findings for one batch of groups. Nothing here is fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// (group_id, seated, capacity)
    pub over_capacity: Vec<(u32, usize, u32)>,
    /// Batch students that no group contains
    pub missing: Vec<String>,
    /// Students seated more than once
    pub duplicated: Vec<String>,
    /// Seated ids that were not part of the batch
    pub unknown: Vec<String>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.over_capacity.is_empty()
            && self.missing.is_empty()
            && self.duplicated.is_empty()
            && self.unknown.is_empty()
    }
}

pub fn audit_groups(batch: &[Student], groups: &[Group]) -> AuditReport {
    let mut report = AuditReport::default();
    let expected: HashSet<&str> = batch.iter().map(|s| s.id.as_str()).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for group in groups {
        if group.is_over_capacity() {
            report
                .over_capacity
                .push((group.group_id, group.len(), group.capacity));
        }
        for student in &group.students {
            let count = counts.entry(student.id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                report.duplicated.push(student.id.clone());
            }
            if *count == 1 && !expected.contains(student.id.as_str()) {
                report.unknown.push(student.id.clone());
            }
        }
    }

    report.missing = batch
        .iter()
        .filter(|s| !counts.contains_key(s.id.as_str()))
        .map(|s| s.id.clone())
        .collect();

    report
}
