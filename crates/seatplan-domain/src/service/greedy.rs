//! Deterministic nearest-neighbour grouping under vehicle capacity

use seatplan_types::{AssignmentError, Result};

use crate::assigner::GroupAssigner;
use crate::model::{Fleet, Group, Student};

/// Distance between two students' pickup points.
///
/// `None` means the distance is unknown (missing coordinates); unknown
/// candidates are only picked when no measurable one remains.
pub trait DistanceMeter {
    fn distance(&self, from: &Student, to: &Student) -> Option<f64>;
}

/// Great-circle distance between geocoded addresses, in kilometres
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMeter;

impl DistanceMeter for HaversineMeter {
    fn distance(&self, from: &Student, to: &Student) -> Option<f64> {
        match (from.location, to.location) {
            (Some(a), Some(b)) => Some(a.haversine_km(&b)),
            _ => None,
        }
    }
}

/// Fills vehicles in fleet order.
///
/// Each group is seeded with the first remaining student in roster order and
/// grown by appending the remaining student nearest to the last one added,
/// so the group order doubles as a pickup route.
#[derive(Debug, Clone, Default)]
pub struct GreedyAssigner<M = HaversineMeter> {
    meter: M,
}

impl GreedyAssigner<HaversineMeter> {
    pub fn new() -> Self {
        Self {
            meter: HaversineMeter,
        }
    }
}

impl<M: DistanceMeter> GreedyAssigner<M> {
    pub fn with_meter(meter: M) -> Self {
        Self { meter }
    }

    /// Index into `remaining` of the candidate closest to `from`.
    /// Ties keep the earlier roster position.
    fn nearest(&self, from: &Student, remaining: &[&Student]) -> usize {
        let mut best: Option<(usize, f64)> = None;
        for (idx, candidate) in remaining.iter().enumerate() {
            if let Some(d) = self.meter.distance(from, candidate) {
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((idx, d));
                }
            }
        }
        best.map(|(idx, _)| idx).unwrap_or(0)
    }
}

impl<M: DistanceMeter> GroupAssigner for GreedyAssigner<M> {
    fn name(&self) -> &str {
        "greedy"
    }

    fn assign_batch(&self, batch: &[Student], fleet: &Fleet) -> Result<Vec<Group>> {
        if batch.len() > fleet.total_capacity() {
            return Err(AssignmentError::NoCapacity.into());
        }

        let mut remaining: Vec<&Student> = batch.iter().collect();
        let mut groups = Vec::new();

        for mut group in fleet.empty_groups() {
            if remaining.is_empty() {
                break;
            }
            let mut last = remaining.remove(0);
            group.students.push(last.clone());

            while group.has_free_seat() && !remaining.is_empty() {
                let next = self.nearest(last, &remaining);
                last = remaining.remove(next);
                group.students.push(last.clone());
            }
            groups.push(group);
        }

        Ok(groups)
    }
}
