//! External compiler invocation
//!
//! The catalog never compiles anything itself: it runs the configured
//! compiler as a subprocess, blocks until it exits, and looks only at the exit
//! status to decide whether the import can continue.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::{debug, warn};

use crate::config::CompilerConfig;

/// Exit code reported when the compiler could not be started at all
pub const SPAWN_FAILURE_CODE: i32 = -1;

/// One compilation of a staged source into the cache directory
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Staged source file
    pub source: PathBuf,
    /// Output directory for the artifact
    pub out_dir: PathBuf,
    /// Crate name; determines the artifact file name
    pub crate_name: String,
}

impl CompileRequest {
    /// Where the compiler is expected to leave the dynamic library
    pub fn artifact_path(&self) -> PathBuf {
        self.out_dir
            .join(format!("{}{}{}", DLL_PREFIX, self.crate_name, DLL_SUFFIX))
    }
}

/// What the compiler reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileStatus {
    /// 0 on success
    pub code: i32,
    /// Captured compiler output, for logs
    pub output: String,
}

impl CompileStatus {
    pub fn succeeded() -> Self {
        Self {
            code: 0,
            output: String::new(),
        }
    }

    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    /// Numeric exit code when the platform reports one, otherwise the
    /// boolean success of the same run mapped to 0/1.
    pub fn from_exit_status(status: ExitStatus, output: impl Into<String>) -> Self {
        let code = status
            .code()
            .unwrap_or(if status.success() { 0 } else { 1 });
        Self {
            code,
            output: output.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// An external compilation step
pub trait Compiler {
    /// Compile `request.source` into `request.out_dir`. Blocks until done.
    fn compile(&self, request: &CompileRequest) -> CompileStatus;
}

/// Runs `rustc` (or the configured program) to build a `cdylib`
#[derive(Debug, Clone)]
pub struct RustcCompiler {
    config: CompilerConfig,
}

impl RustcCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Assemble the command line for a request
    pub fn command(&self, request: &CompileRequest) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("--edition")
            .arg(&self.config.edition)
            .args(["--crate-type", "cdylib"])
            .arg("--crate-name")
            .arg(&request.crate_name)
            .arg("--out-dir")
            .arg(&request.out_dir);

        for path in &self.config.search_paths {
            cmd.arg("-L").arg(format!("dependency={}", path.display()));
        }
        for ext in &self.config.externs {
            cmd.arg("--extern")
                .arg(format!("{}={}", ext.name, ext.path.display()));
        }

        cmd.args(&self.config.args).arg(&request.source);
        cmd
    }
}

impl Default for RustcCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Compiler for RustcCompiler {
    fn compile(&self, request: &CompileRequest) -> CompileStatus {
        let mut cmd = self.command(request);
        debug!(command = ?cmd, "invoking compiler");

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) => {
                warn!(program = %self.config.program, error = %e, "failed to start compiler");
                return CompileStatus::failed(SPAWN_FAILURE_CODE, e.to_string());
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let status = CompileStatus::from_exit_status(output.status, stderr);
        if !status.is_success() {
            warn!(code = status.code, source = %request.source.display(), "compiler reported failure");
            debug!(output = %status.output, "compiler output");
        }
        status
    }
}
