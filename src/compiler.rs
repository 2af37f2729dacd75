//! External stylesheet compiler
//!
//! The actual SCSS → CSS transformation is done by a separate program
//! (`sassc` by default), invoked as `<command> <args...> <source> <output>`.
//! A non-zero exit, a timeout, or a failure to start all count as a failed
//! compilation of that one file; batches keep going past failures.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::CompileMap;
use crate::logging::file_log;

/// Default compiler program
pub const DEFAULT_COMPILER: &str = "sassc";

/// Default per-file compile timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const POLL_STEP: Duration = Duration::from_millis(10);

/// Result of compiling a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Compiler exited successfully; `diagnostics` holds anything it printed to stderr
    Success { diagnostics: String },
    /// Compiler ran and reported an error
    Failed { diagnostics: String },
    /// Compiler did not finish in time and was killed
    TimedOut { after: Duration },
    /// Compiler could not be started, or the output directory could not be created
    NotRun { reason: String },
}

impl CompileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutcome::Success { .. })
    }

    /// Human-readable explanation for the log
    pub fn describe(&self) -> String {
        match self {
            CompileOutcome::Success { .. } => "compiled".to_string(),
            CompileOutcome::Failed { diagnostics } => {
                format!("compilation failed: {}", diagnostics.trim())
            }
            CompileOutcome::TimedOut { after } => {
                format!("compilation timed out after {:.1?}", after)
            }
            CompileOutcome::NotRun { reason } => format!("could not compile: {reason}"),
        }
    }
}

/// Something that turns one source file into one output file
pub trait Compiler: Send + Sync {
    fn compile_one(&self, source: &Path, output: &Path) -> CompileOutcome;
}

/// Counts from one batch compile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl BatchReport {
    /// Check if the batch had any failure
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Compile every entry of `staged`, logging each result.
///
/// Individual failures do not stop the batch.
pub fn compile_many(compiler: &dyn Compiler, staged: &CompileMap) -> BatchReport {
    let mut report = BatchReport::default();

    for (source, output) in staged {
        let outcome = compiler.compile_one(source, output);
        if let CompileOutcome::Success { diagnostics } = &outcome {
            if !diagnostics.trim().is_empty() {
                debug!(path = %source.display(), "{}", diagnostics.trim());
            }
        }
        file_log(outcome.is_success(), source, outcome.describe());

        if outcome.is_success() {
            report.compiled.push(source.clone());
        } else {
            report.failed.push(source.clone());
        }
    }

    report
}

/// Compiler settings: program, extra arguments, timeout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_command() -> String {
    DEFAULT_COMPILER.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Runs an external program for each file
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCompiler {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.command.clone())
            .with_args(config.args.iter().cloned())
            .with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Add one argument passed before the source and output paths
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the process for one file without starting it
    pub fn create(&self, source: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(source)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn wait_with_deadline(&self, child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            thread::sleep(POLL_STEP);
        }
    }
}

impl Compiler for CommandCompiler {
    fn compile_one(&self, source: &Path, output: &Path) -> CompileOutcome {
        if let Some(parent) = output.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return CompileOutcome::NotRun {
                    reason: format!("could not create {}: {e}", parent.display()),
                };
            }
        }

        let mut child = match self.create(source, output).spawn() {
            Ok(child) => child,
            Err(e) => {
                return CompileOutcome::NotRun {
                    reason: format!("could not run `{}`: {e}", self.command),
                }
            }
        };

        // Drain stderr on its own thread so a chatty compiler cannot block on a full pipe
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let collect_stderr = |reader: Option<thread::JoinHandle<String>>| {
            reader
                .and_then(|handle| handle.join().ok())
                .unwrap_or_default()
        };

        match self.wait_with_deadline(&mut child) {
            Ok(Some(status)) if status.success() => CompileOutcome::Success {
                diagnostics: collect_stderr(stderr_reader),
            },
            Ok(Some(status)) => {
                let diagnostics = collect_stderr(stderr_reader);
                CompileOutcome::Failed {
                    diagnostics: if diagnostics.trim().is_empty() {
                        format!("`{}` exited with {}", self.command, status)
                    } else {
                        diagnostics
                    },
                }
            }
            // The reader is left detached: a killed compiler's children may
            // still hold the pipe open.
            Ok(None) => CompileOutcome::TimedOut {
                after: self.timeout,
            },
            Err(e) => CompileOutcome::NotRun {
                reason: format!("could not wait for `{}`: {e}", self.command),
            },
        }
    }
}
