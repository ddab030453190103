//! kvtable-configs
//!
//! Configuration types, loader and logging setup for kvtable.

pub mod config;
pub mod logging;

pub use config::defaults;
pub use config::*;
