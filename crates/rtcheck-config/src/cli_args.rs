use std::path::PathBuf;

/// Values taken from the command line that participate in config precedence.
///
/// `None`/empty means "not given on the command line"; the config file or the
/// built-in default is used instead.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    /// `Some(0)` is treated like "not given".
    pub timeout_secs: Option<u64>,
    pub verbose: Option<bool>,
    pub compatible: Option<bool>,
    pub log_directory: Option<PathBuf>,
    /// Appended after the configured feeds.
    pub additional_feeds: Vec<String>,
    /// Appended after the configured extra traits.
    pub traits: Vec<String>,
    pub no_feed_resolution: bool,
}
