//! Cancellable process supervision for rtcheck
//!
//! Every external process a test launches goes through
//! [`ProcessSupervisor::run`]: argv-style [`CommandSpec`], line-by-line output
//! forwarding through [`OutputSinks`], and a [`CancellationToken`] that, when
//! it fires, tears down the child's entire process tree before `run` returns.

pub mod cancel;
pub mod command_spec;
pub mod error;
mod platform;
pub mod supervisor;

pub use cancel::{CancellationSource, CancellationToken};
pub use command_spec::CommandSpec;
pub use error::SupervisorError;
pub use supervisor::{LineSink, OutputSinks, ProcessSupervisor};
