use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::error::ExplorerError;
use crate::inline::{InlineDecisionMap, parse_inline_decisions};
use crate::ssa::{SsaResult, extract_ssa, gossafunc_value};

/// Flag asking gc for the most verbose inlining report.
pub const INLINE_REPORT_FLAG: &str = "-gcflags=-m=2";

/// Source of raw compiler diagnostics.
///
/// Both calls block until the build finishes. Implementations return whatever
/// the compiler printed; the exit status is not part of the contract.
pub trait BuildRunner: Send + Sync {
    /// Build every package of `workdir` with `GOSSAFUNC=<identifier>+`.
    fn ssa_dump(&self, workdir: &Path, identifier: &str) -> Result<String>;

    /// Build the single file `file_name` (workspace-relative, leading `/`) with `-m=2`.
    fn inlining_report(&self, workdir: &Path, file_name: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub go_binary: PathBuf,
    pub extra_env: Vec<(String, String)>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go_binary: PathBuf::from("go"),
            extra_env: Vec::new(),
        }
    }
}

impl ToolchainConfig {
    /// `GOSSA_GO` overrides the `go` binary looked up on `PATH`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(explicit) = std::env::var_os("GOSSA_GO").filter(|v| !v.is_empty()) {
            config.go_binary = PathBuf::from(explicit);
        }
        config
    }

    pub fn with_go_binary(mut self, go_binary: impl Into<PathBuf>) -> Self {
        self.go_binary = go_binary.into();
        self
    }

    /// Extra variables set on every `go` invocation, on top of the inherited environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extra_env.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// The `go` command line.
#[derive(Debug, Clone, Default)]
pub struct GoToolchain {
    config: ToolchainConfig,
}

impl GoToolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(ToolchainConfig::from_env())
    }

    fn command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.go_binary);
        cmd.current_dir(workdir);
        for (key, value) in &self.config.extra_env {
            cmd.env(key, value);
        }
        cmd
    }

    // `output()` drains both pipes and reaps the child whatever happens next.
    fn capture_stderr(&self, mut cmd: Command, what: &str) -> Result<String> {
        let output = cmd
            .output()
            .with_context(|| format!("failed to spawn {} for {}", self.config.go_binary.display(), what))?;
        if !output.status.success() {
            tracing::debug!("go exited with {} while producing {}", output.status, what);
        }
        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}

impl BuildRunner for GoToolchain {
    fn ssa_dump(&self, workdir: &Path, identifier: &str) -> Result<String> {
        let mut cmd = self.command(workdir);
        cmd.arg("build").arg("./...").env("GOSSAFUNC", gossafunc_value(identifier));
        let stderr = self.capture_stderr(cmd, &format!("SSA of `{}`", identifier))?;
        tracing::debug!("Output of SSA for `{}`:\n{}", identifier, stderr);
        Ok(stderr)
    }

    fn inlining_report(&self, workdir: &Path, file_name: &str) -> Result<String> {
        let mut target = OsString::from(workdir.as_os_str());
        target.push(file_name);
        let mut cmd = self.command(workdir);
        cmd.arg("build").arg(INLINE_REPORT_FLAG).arg(target);
        let stderr = self.capture_stderr(cmd, &format!("inlining decisions of `{}`", file_name))?;
        tracing::debug!("Output of inlining decisions for `{}`:\n{}", file_name, stderr);
        Ok(stderr)
    }
}

/// Run the SSA build and cut out the function's dump.
///
/// Launch failures and missing markers both come back as [`ExplorerError::SsaNotFound`];
/// the launch failure itself is only logged.
pub fn load_ssa(runner: &dyn BuildRunner, workdir: &Path, identifier: &str) -> Result<SsaResult, ExplorerError> {
    if workdir.as_os_str().is_empty() {
        return Err(ExplorerError::NoWorkspace);
    }
    let output = runner.ssa_dump(workdir, identifier).unwrap_or_else(|err| {
        tracing::warn!("SSA build for `{}` failed: {:#}", identifier, err);
        String::new()
    });
    extract_ssa(&output, identifier).ok_or_else(|| ExplorerError::not_found(identifier))
}

/// Run the single-file `-m=2` build and parse its report. Failures yield an empty map.
pub fn load_inline_decisions(runner: &dyn BuildRunner, workdir: &Path, file_name: &str) -> InlineDecisionMap {
    if workdir.as_os_str().is_empty() || file_name.is_empty() {
        return InlineDecisionMap::new();
    }
    match runner.inlining_report(workdir, file_name) {
        Ok(stderr) => parse_inline_decisions(&stderr),
        Err(err) => {
            tracing::warn!("inlining report for `{}` failed: {:#}", file_name, err);
            InlineDecisionMap::new()
        }
    }
}
