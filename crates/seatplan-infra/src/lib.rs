//! Infrastructure layer - roster files, fleet files, plan persistence

pub mod fleet_loader;
pub mod plan_file;
pub mod roster_csv;
pub mod text;

pub use fleet_loader::FleetLoader;
pub use plan_file::{load_plan, save_plan};
pub use roster_csv::{load_roster, LoadOptions, RosterColumns, RosterError, RosterLoad, RowIssue};
