//! Domain services

pub mod audit;
pub mod batching;
pub mod greedy;
pub mod session;

pub use audit::{audit_groups, AuditReport};
pub use batching::{renumber_groups, run_batches, split_batches, ProgressCallback, DEFAULT_BATCH_SIZE};
pub use greedy::{DistanceMeter, GreedyAssigner, HaversineMeter};
pub use session::{Placement, Session};
