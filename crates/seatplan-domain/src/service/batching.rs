//! Batch splitting and cross-batch group renumbering

use seatplan_types::{ConfigError, Error, Result};

use crate::assigner::GroupAssigner;
use crate::model::{Fleet, Group, Student};

/// Students per assigner call
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Batch progress callback, receives (completed, total)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send>;

/// Split the roster into ordered chunks of at most `batch_size` students
pub fn split_batches(students: &[Student], batch_size: usize) -> Result<Vec<&[Student]>> {
    if batch_size == 0 {
        return Err(ConfigError::Invalid("batch size must be at least 1".to_string()).into());
    }
    Ok(students.chunks(batch_size).collect())
}

/// Flatten per-batch groups and number them 1..N in batch order
pub fn renumber_groups(batches: Vec<Vec<Group>>) -> Vec<Group> {
    batches
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(idx, mut group)| {
            group.group_id = idx as u32 + 1;
            group
        })
        .collect()
}

/// Run the assigner over every batch, strictly in order.
///
/// The first failing batch aborts the run; nothing from earlier batches is
/// returned.
pub fn run_batches<A: GroupAssigner + ?Sized>(
    assigner: &A,
    students: &[Student],
    fleet: &Fleet,
    batch_size: usize,
    progress: Option<ProgressCallback>,
) -> Result<Vec<Group>> {
    let batches = split_batches(students, batch_size)?;
    let total = batches.len();
    let mut per_batch = Vec::with_capacity(total);

    for (idx, batch) in batches.into_iter().enumerate() {
        tracing::info!(
            assigner = assigner.name(),
            batch = idx + 1,
            total,
            students = batch.len(),
            "assigning batch"
        );
        let groups = assigner
            .assign_batch(batch, fleet)
            .map_err(|e| match e {
                Error::BatchFailed { .. } => e,
                other => Error::BatchFailed {
                    batch: idx + 1,
                    message: other.to_string(),
                },
            })?;
        tracing::debug!(batch = idx + 1, groups = groups.len(), "batch assigned");
        per_batch.push(groups);

        if let Some(ref cb) = progress {
            cb(idx + 1, total);
        }
    }

    Ok(renumber_groups(per_batch))
}
