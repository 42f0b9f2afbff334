//! Group assigner seam

use crate::model::{Fleet, Group, Student};
use seatplan_types::Result;

/// Decides how one batch of students is split across the fleet.
///
/// Implementations return groups numbered from 1 within the batch; the
/// batch runner renumbers them across the whole run.
pub trait GroupAssigner {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn assign_batch(&self, batch: &[Student], fleet: &Fleet) -> Result<Vec<Group>>;
}
