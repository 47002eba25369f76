//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::CliArgs;

/// rtcheck - compatibility test runner for .NET runtimes and SDKs
#[derive(Parser, Debug)]
#[command(name = "rtcheck")]
#[command(about = "A test runner for standalone shell-based or build-and-test compatibility tests")]
#[command(long_about = r#"
rtcheck searches TEST_ROOT for test.json manifests and runs every test that
applies to the installed .NET runtime, SDK and platform.

EXAMPLES:
  # Run everything under the current directory
  rtcheck

  # Run a test tree, writing logs and results.xml to ./logs
  rtcheck ./tests --log-directory logs

  # Double the default timeout and add a package feed
  rtcheck ./tests -t 600 -s https://pkgs.example.org/feed/index.json

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is discovered by searching upward from TEST_ROOT for
  .rtcheck/config.toml. Use --config to specify an explicit path.

EXIT CODES:
  0  all executed tests passed
  1  at least one test failed
  2  invalid arguments, configuration or test root
  3  the runtime under test could not be determined
"#)]
#[command(version)]
pub struct Cli {
    /// Directory searched for test.json manifests (default: current directory)
    #[arg(value_name = "TEST_ROOT")]
    pub test_root: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Make output compatible with dotnet-bunny
    #[arg(short, long)]
    pub compatible: bool,

    /// Directory for per-test logs and results.xml (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub log_directory: Option<PathBuf>,

    /// Additional package feed; may be repeated
    #[arg(short = 's', long = "additional-feed", value_name = "URL")]
    pub additional_feeds: Vec<String>,

    /// Default per-test timeout in seconds; 0 keeps the configured default
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Extra trait matched by skipWhen conditions, e.g. "os=custom"; may be repeated
    #[arg(long = "trait", value_name = "TRAIT")]
    pub traits: Vec<String>,

    /// Explicit configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not look up a ProdCon feed for unreleased runtimes
    #[arg(long)]
    pub no_feed_resolution: bool,
}

impl Cli {
    /// Values that take part in configuration precedence. Flags that were
    /// not given stay `None` so the config file can supply them.
    #[must_use]
    pub fn to_cli_args(&self) -> CliArgs {
        CliArgs {
            config_path: self.config.clone(),
            timeout_secs: self.timeout,
            verbose: self.verbose.then_some(true),
            compatible: self.compatible.then_some(true),
            log_directory: self.log_directory.clone(),
            additional_feeds: self.additional_feeds.clone(),
            traits: self.traits.clone(),
            no_feed_resolution: self.no_feed_resolution,
        }
    }
}

/// Build the CLI command structure without parsing arguments
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
