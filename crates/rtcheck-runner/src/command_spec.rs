use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use tokio::process::Command as TokioCommand;

// ============================================================================
// CommandSpec - argv-style process specification
// ============================================================================

/// Specification for a command to execute.
///
/// Arguments are kept as discrete `OsString` elements and are never joined
/// into a shell string.
///
/// ```rust
/// use rtcheck_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("dotnet")
///     .arg("build")
///     .cwd("/tests/hello")
///     .clear_env()
///     .env("DOTNET_CLI_TELEMETRY_OPTOUT", "1");
///
/// assert_eq!(cmd.program, OsString::from("dotnet"));
/// assert_eq!(cmd.args.len(), 1);
/// assert!(cmd.env_clear);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// Environment set on the child. Applied after `env_clear`.
    pub env: Option<BTreeMap<OsString, OsString>>,
    /// Start from an empty environment instead of inheriting ours.
    pub env_clear: bool,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let env_map = self.env.get_or_insert_with(BTreeMap::new);
        for (key, value) in envs {
            env_map.insert(key.into(), value.into());
        }
        self
    }

    /// Do not inherit the parent environment; only `env` is visible.
    #[must_use]
    pub fn clear_env(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// Convert into a `tokio::process::Command`. Stdio is left to the caller.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if self.env_clear {
            cmd.env_clear();
        }

        if let Some(ref env) = self.env {
            cmd.envs(env);
        }

        cmd
    }

    /// Program name for diagnostics.
    #[must_use]
    pub fn program_display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Arguments joined with spaces for diagnostics.
    #[must_use]
    pub fn args_display(&self) -> String {
        self.args
            .iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The launch line written into test logs:
/// `Executing <program> with arguments <args> in working directory <dir>`.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Executing {} with arguments {} in working directory {}",
            self.program_display(),
            self.args_display(),
            self.cwd
                .as_ref()
                .map_or_else(|| ".".to_string(), |cwd| cwd.display().to_string())
        )
    }
}
