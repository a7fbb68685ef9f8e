//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior, including the static track list, and helpers to load
//! configuration from disk.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path, write_template};
pub use schema::*;
