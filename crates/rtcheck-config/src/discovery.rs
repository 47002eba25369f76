use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rtcheck_utils::error::{ConfigError, RtcheckError};
use rtcheck_utils::types::ConfigSource;

use crate::model::TomlConfig;
use crate::{CliArgs, Config, Defaults, EnvironmentConfig, FeedsConfig, RunnerConfig};

const CONFIG_DIR: &str = ".rtcheck";
const CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults.
    ///
    /// The config file is `cli_args.config_path` when given (and must exist),
    /// otherwise the first `.rtcheck/config.toml` found walking upward from
    /// `start_dir`.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = HashMap::new();

        let mut defaults = Defaults::default();
        let mut feeds = FeedsConfig::default();
        let mut environment = EnvironmentConfig::default();
        let mut runner = RunnerConfig::default();

        for key in ["timeout_secs", "verbose", "compatible"] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(RtcheckError::Config(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    })
                    .into());
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            let source = ConfigSource::Config;

            if let Some(file_defaults) = file_config.defaults {
                if file_defaults.timeout_secs.is_some() {
                    defaults.timeout_secs = file_defaults.timeout_secs;
                    source_attribution.insert("timeout_secs".to_string(), source);
                }
                if file_defaults.verbose.is_some() {
                    defaults.verbose = file_defaults.verbose;
                    source_attribution.insert("verbose".to_string(), source);
                }
                if file_defaults.compatible.is_some() {
                    defaults.compatible = file_defaults.compatible;
                    source_attribution.insert("compatible".to_string(), source);
                }
                if file_defaults.log_directory.is_some() {
                    defaults.log_directory = file_defaults.log_directory;
                    source_attribution.insert("log_directory".to_string(), source);
                }
            }

            if let Some(file_feeds) = file_config.feeds {
                if !file_feeds.additional.is_empty() {
                    feeds.additional = file_feeds.additional;
                    source_attribution.insert("feeds_additional".to_string(), source);
                }
                if file_feeds.resolve_prodcon.is_some() {
                    feeds.resolve_prodcon = file_feeds.resolve_prodcon;
                    source_attribution.insert("resolve_prodcon".to_string(), source);
                }
            }

            if let Some(file_environment) = file_config.environment {
                if !file_environment.filtered_variables.is_empty() {
                    environment.filtered_variables = file_environment.filtered_variables;
                    source_attribution.insert("filtered_variables".to_string(), source);
                }
                if !file_environment.extra_traits.is_empty() {
                    environment.extra_traits = file_environment.extra_traits;
                    source_attribution.insert("extra_traits".to_string(), source);
                }
            }

            if let Some(file_runner) = file_config.runner {
                if file_runner.kill_grace_ms.is_some() {
                    runner.kill_grace_ms = file_runner.kill_grace_ms;
                    source_attribution.insert("kill_grace_ms".to_string(), source);
                }
                if file_runner.dotnet.is_some() {
                    runner.dotnet = file_runner.dotnet;
                    source_attribution.insert("dotnet".to_string(), source);
                }
            }
        }

        // CLI overrides
        if let Some(timeout) = cli_args.timeout_secs.filter(|t| *t > 0) {
            defaults.timeout_secs = Some(timeout);
            source_attribution.insert("timeout_secs".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }
        if let Some(compatible) = cli_args.compatible {
            defaults.compatible = Some(compatible);
            source_attribution.insert("compatible".to_string(), ConfigSource::Cli);
        }
        if let Some(log_directory) = &cli_args.log_directory {
            defaults.log_directory = Some(log_directory.clone());
            source_attribution.insert("log_directory".to_string(), ConfigSource::Cli);
        }
        if !cli_args.additional_feeds.is_empty() {
            feeds
                .additional
                .extend(cli_args.additional_feeds.iter().cloned());
            source_attribution.insert("feeds_additional".to_string(), ConfigSource::Cli);
        }
        if cli_args.no_feed_resolution {
            feeds.resolve_prodcon = Some(false);
            source_attribution.insert("resolve_prodcon".to_string(), ConfigSource::Cli);
        }
        if !cli_args.traits.is_empty() {
            environment
                .extra_traits
                .extend(cli_args.traits.iter().cloned());
            source_attribution.insert("extra_traits".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            defaults,
            feeds,
            environment,
            runner,
            config_path,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Walk upward from `start_dir` looking for `.rtcheck/config.toml`.
    ///
    /// The walk stops at the filesystem root or at the first directory that
    /// looks like a repository root (`.git`, `.hg`, `.svn`).
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            RtcheckError::Config(ConfigError::InvalidFile(format!("{}: {e}", path.display())))
                .into()
        })
    }
}
