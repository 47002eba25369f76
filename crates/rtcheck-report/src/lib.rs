//! Result outputs for rtcheck: the default console listing, a
//! dotnet-bunny compatible transcript, a JUnit XML report and per-test log
//! files. Each is a [`rtcheck_engine::TestOutput`].

pub mod bunny;
pub mod console;
pub mod junit;
pub mod log_writer;

#[cfg(test)]
mod test_support;

pub use bunny::BunnyOutput;
pub use console::ConsoleOutput;
pub use junit::{JUNIT_FILE_NAME, JUnitOutput};
pub use log_writer::LogWriter;
