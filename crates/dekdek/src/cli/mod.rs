//! Command-line client: `dekdek [serve|init|config]`.
//!
//! - `commands`: dispatch and the per-command handlers
//! - `setup`: argument definitions

mod commands;
pub mod setup;

pub use commands::run;
