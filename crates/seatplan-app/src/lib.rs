//! Application service layer - config, grouping use case, routing links, export

pub mod config;
pub mod export;
pub mod grouping;
pub mod routing;
