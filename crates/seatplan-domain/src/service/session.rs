//! Manual group assignment session
//!
//! Holds the group state for one interactive session. Every operation keeps
//! each student in at most one place (a group or the unassigned pool) and
//! never lets a group grow past its capacity.

use std::collections::HashSet;

use seatplan_types::AssignmentError;

use crate::model::{Fleet, Group, Student};

/// Where an `assign` call actually put the student
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Group the student ended up in
    pub group_id: u32,
    /// Group the caller asked for
    pub requested: u32,
    /// Group the student was moved out of, if any
    pub moved_from: Option<u32>,
}

impl Placement {
    pub fn redirected(&self) -> bool {
        self.group_id != self.requested
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    groups: Vec<Group>,
    unassigned: Vec<Student>,
}

impl Session {
    /// Start with one empty group per vehicle and everyone unassigned
    pub fn new(fleet: &Fleet, roster: Vec<Student>) -> Self {
        Self {
            groups: fleet.empty_groups(),
            unassigned: roster,
        }
    }

    /// Resume from existing groups; roster students not seated in any of
    /// them go to the unassigned pool.
    ///
    /// Over-full groups are kept as they are; they only shrink through
    /// `remove` or by moving students out.
    pub fn from_groups(groups: Vec<Group>, roster: Vec<Student>) -> Self {
        for group in groups.iter().filter(|g| g.is_over_capacity()) {
            tracing::warn!(
                group_id = group.group_id,
                seated = group.len(),
                capacity = group.capacity,
                "resumed group is over capacity"
            );
        }
        let seated: HashSet<String> = groups
            .iter()
            .flat_map(|g| g.students.iter().map(|s| s.id.clone()))
            .collect();
        let unassigned = roster
            .into_iter()
            .filter(|s| !seated.contains(&s.id))
            .collect();
        Self { groups, unassigned }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn unassigned(&self) -> &[Student] {
        &self.unassigned
    }

    pub fn group(&self, group_id: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    /// Group currently holding the student
    pub fn locate(&self, student_id: &str) -> Option<u32> {
        self.locate_index(student_id).map(|idx| self.groups[idx].group_id)
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    fn group_index(&self, group_id: u32) -> Result<usize, AssignmentError> {
        self.groups
            .iter()
            .position(|g| g.group_id == group_id)
            .ok_or(AssignmentError::UnknownGroup(group_id))
    }

    fn locate_index(&self, student_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(student_id))
    }

    /// Seat a student in `target`, or in the next group with a free seat.
    ///
    /// Groups are tried in session order starting at `target` and wrapping
    /// around. A student already seated elsewhere is moved; if the search
    /// reaches the student's current group first, the student stays there.
    pub fn assign(&mut self, student_id: &str, target: u32) -> Result<Placement, AssignmentError> {
        let target_idx = self.group_index(target)?;
        let current = self.locate_index(student_id);

        if current.is_none() && !self.unassigned.iter().any(|s| s.id == student_id) {
            return Err(AssignmentError::UnknownStudent(student_id.to_string()));
        }

        let n = self.groups.len();
        let dest = (0..n)
            .map(|offset| (target_idx + offset) % n)
            .find(|&idx| Some(idx) == current || self.groups[idx].has_free_seat())
            .ok_or(AssignmentError::NoCapacity)?;

        if Some(dest) == current {
            return Ok(Placement {
                group_id: self.groups[dest].group_id,
                requested: target,
                moved_from: None,
            });
        }

        let (student, moved_from) = match current {
            Some(idx) => {
                let group = &mut self.groups[idx];
                let pos = group
                    .position(student_id)
                    .ok_or_else(|| AssignmentError::UnknownStudent(student_id.to_string()))?;
                (group.students.remove(pos), Some(group.group_id))
            }
            None => {
                let pos = self
                    .unassigned
                    .iter()
                    .position(|s| s.id == student_id)
                    .ok_or_else(|| AssignmentError::UnknownStudent(student_id.to_string()))?;
                (self.unassigned.remove(pos), None)
            }
        };

        let group = &mut self.groups[dest];
        group.students.push(student);

        Ok(Placement {
            group_id: group.group_id,
            requested: target,
            moved_from,
        })
    }

    /// Take a student out of a group and back into the unassigned pool.
    ///
    /// Returns `false` when the student was not in that group.
    pub fn remove(&mut self, student_id: &str, group_id: u32) -> Result<bool, AssignmentError> {
        let idx = self.group_index(group_id)?;
        let group = &mut self.groups[idx];
        match group.position(student_id) {
            Some(pos) => {
                let student = group.students.remove(pos);
                self.unassigned.push(student);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace a group's order with a permutation of its current members
    pub fn reorder(&mut self, group_id: u32, new_order: &[String]) -> Result<(), AssignmentError> {
        let idx = self.group_index(group_id)?;
        let group = &mut self.groups[idx];

        let invalid = |reason: String| AssignmentError::InvalidOrder {
            group: group_id,
            reason,
        };

        if new_order.len() != group.students.len() {
            return Err(invalid(format!(
                "expected {} ids, got {}",
                group.students.len(),
                new_order.len()
            )));
        }

        let mut seen = HashSet::new();
        for id in new_order {
            if !seen.insert(id.as_str()) {
                return Err(invalid(format!("'{}' listed twice", id)));
            }
            if !group.contains(id) {
                return Err(invalid(format!("'{}' is not in this group", id)));
            }
        }

        let mut pool = std::mem::take(&mut group.students);
        for id in new_order {
            if let Some(pos) = pool.iter().position(|s| &s.id == id) {
                group.students.push(pool.swap_remove(pos));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<Student> {
        (1..=n)
            .map(|i| Student::new(0, &i.to_string(), &format!("Student {}", i), "Lipowa 1"))
            .collect()
    }

    fn seated_count(session: &Session, id: &str) -> usize {
        session.groups().iter().filter(|g| g.contains(id)).count()
    }

    fn assert_capacity_invariant(session: &Session) {
        for g in session.groups() {
            assert!(!g.is_over_capacity(), "group {} over capacity", g.group_id);
        }
    }

    #[test]
    fn test_assign_into_free_group() {
        let mut session = Session::new(&Fleet::standard(), roster(3));
        let placement = session.assign("0_2", 3).unwrap();
        assert_eq!(placement.group_id, 3);
        assert!(!placement.redirected());
        assert_eq!(session.locate("0_2"), Some(3));
        assert_eq!(session.unassigned().len(), 2);
    }

    #[test]
    fn test_overflow_spills_into_next_group() {
        // group 5 is the first 7-seat vehicle
        let mut session = Session::new(&Fleet::standard(), roster(8));
        for i in 1..=7 {
            let p = session.assign(&format!("0_{}", i), 5).unwrap();
            assert_eq!(p.group_id, 5);
        }
        let p = session.assign("0_8", 5).unwrap();
        assert!(p.redirected());
        assert_eq!(p.group_id, 6);
        assert_eq!(session.group(5).unwrap().len(), 7);
        assert_eq!(session.group(6).unwrap().students[0].id, "0_8");
        assert_capacity_invariant(&session);
    }

    #[test]
    fn test_overflow_wraps_around_to_first_group() {
        let fleet = Fleet::new(vec![
            crate::model::Vehicle::new("A", 1),
            crate::model::Vehicle::new("B", 1),
        ])
        .unwrap();
        let mut session = Session::new(&fleet, roster(2));
        session.assign("0_1", 2).unwrap();
        let p = session.assign("0_2", 2).unwrap();
        assert_eq!(p.group_id, 1);
    }

    #[test]
    fn test_no_capacity_leaves_state_unchanged() {
        let fleet = Fleet::new(vec![crate::model::Vehicle::new("A", 1)]).unwrap();
        let mut session = Session::new(&fleet, roster(2));
        session.assign("0_1", 1).unwrap();
        let before = session.clone();

        let err = session.assign("0_2", 1).unwrap_err();
        assert_eq!(err, AssignmentError::NoCapacity);
        assert_eq!(session.groups(), before.groups());
        assert_eq!(session.unassigned(), before.unassigned());
    }

    #[test]
    fn test_full_fleet_reports_no_capacity() {
        let fleet = Fleet::standard();
        let mut session = Session::new(&fleet, roster(108));
        for i in 1..=107 {
            session.assign(&format!("0_{}", i), 1).unwrap();
        }
        assert!(session.groups().iter().all(|g| !g.has_free_seat()));
        assert_eq!(session.assign("0_108", 4), Err(AssignmentError::NoCapacity));
        assert_eq!(session.unassigned().len(), 1);
        assert_capacity_invariant(&session);
    }

    #[test]
    fn test_assign_moves_between_groups() {
        let mut session = Session::new(&Fleet::standard(), roster(2));
        session.assign("0_1", 1).unwrap();
        let p = session.assign("0_1", 2).unwrap();
        assert_eq!(p.moved_from, Some(1));
        assert_eq!(seated_count(&session, "0_1"), 1);
        assert_eq!(session.locate("0_1"), Some(2));
        assert!(session.group(1).unwrap().is_empty());
    }

    #[test]
    fn test_assign_to_current_group_is_noop() {
        let mut session = Session::new(&Fleet::standard(), roster(2));
        session.assign("0_1", 1).unwrap();
        session.assign("0_2", 1).unwrap();
        let p = session.assign("0_1", 1).unwrap();
        assert_eq!(p.group_id, 1);
        assert_eq!(p.moved_from, None);
        let order: Vec<&str> = session.group(1).unwrap().students.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["0_1", "0_2"]);
    }

    #[test]
    fn test_assign_unknown_student_or_group() {
        let mut session = Session::new(&Fleet::standard(), roster(1));
        assert_eq!(
            session.assign("9_9", 1),
            Err(AssignmentError::UnknownStudent("9_9".to_string()))
        );
        assert_eq!(session.assign("0_1", 42), Err(AssignmentError::UnknownGroup(42)));
    }

    #[test]
    fn test_remove_returns_student_to_pool() {
        let mut session = Session::new(&Fleet::standard(), roster(2));
        session.assign("0_1", 1).unwrap();
        assert!(session.remove("0_1", 1).unwrap());
        assert_eq!(session.locate("0_1"), None);
        assert_eq!(session.unassigned().len(), 2);
        // absent student is not an error
        assert!(!session.remove("0_1", 1).unwrap());
        assert_eq!(session.remove("0_1", 99), Err(AssignmentError::UnknownGroup(99)));
    }

    #[test]
    fn test_reorder_applies_permutation() {
        let mut session = Session::new(&Fleet::standard(), roster(3));
        for id in ["0_1", "0_2", "0_3"] {
            session.assign(id, 2).unwrap();
        }
        let order = vec!["0_3".to_string(), "0_1".to_string(), "0_2".to_string()];
        session.reorder(2, &order).unwrap();
        let ids: Vec<String> = session.group(2).unwrap().students.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, order);
    }

    #[test]
    fn test_reorder_rejects_non_permutations() {
        let mut session = Session::new(&Fleet::standard(), roster(3));
        session.assign("0_1", 2).unwrap();
        session.assign("0_2", 2).unwrap();
        let before = session.group(2).unwrap().clone();

        let dup = vec!["0_1".to_string(), "0_1".to_string()];
        let short = vec!["0_1".to_string()];
        let foreign = vec!["0_1".to_string(), "0_3".to_string()];
        for bad in [dup, short, foreign] {
            assert!(matches!(
                session.reorder(2, &bad),
                Err(AssignmentError::InvalidOrder { group: 2, .. })
            ));
        }
        assert_eq!(session.group(2).unwrap(), &before);
    }

    #[test]
    fn test_from_groups_keeps_seated_students() {
        let students = roster(3);
        let mut groups = Fleet::standard().empty_groups();
        groups[0].students.push(students[1].clone());
        let session = Session::from_groups(groups, students);
        assert_eq!(session.locate("0_2"), Some(1));
        let pool: Vec<&str> = session.unassigned().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(pool, vec!["0_1", "0_3"]);
    }
}
