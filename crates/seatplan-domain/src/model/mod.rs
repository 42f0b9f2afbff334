//! Domain model types

pub mod group;
pub mod student;
pub mod vehicle;

pub use group::{Group, Plan};
pub use student::{GeoPoint, Student, WeekdayPickups};
pub use vehicle::{Fleet, Vehicle, STANDARD_FLEET};
