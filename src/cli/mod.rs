//! Command-line interface for rtcheck
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point, environment probing and the test run itself
//! - `tests`: test module (cfg(test) only)

pub mod args;
mod run;


pub use args::{Cli, build_cli};
pub use run::run;
