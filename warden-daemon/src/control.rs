//! Control-channel verbs forwarded to the running daemon.
//!
//! The wire protocol belongs to the external daemon; this module only shapes
//! the verbs and hands them to the daemon's own control binary pointed at the
//! rendered configuration.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{io_err, DaemonError};

pub const SUPERVISORCTL_BIN: &str = "supervisorctl";
/// Overrides the control binary name; used by integration tests.
pub const SUPERVISORCTL_BIN_ENV: &str = "WARDEN_SUPERVISORCTL_BIN";

/// Which output stream of a supervised process to tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStream::Stdout => "stdout",
            LogStream::Stderr => "stderr",
        }
    }
}

/// Closed enumeration of the verbs this tool forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlVerb {
    Shutdown,
    Update,
    Status { names: Vec<String> },
    Start { name: String },
    Stop { name: String },
    Restart { name: String },
    Tail {
        name: String,
        stream: LogStream,
        /// Bytes from the end of the log, when limited.
        bytes: Option<u64>,
        follow: bool,
    },
}

impl ControlVerb {
    /// Arguments in the form the control binary expects.
    pub fn cli_args(&self) -> Vec<String> {
        match self {
            ControlVerb::Shutdown => vec!["shutdown".to_string()],
            ControlVerb::Update => vec!["update".to_string()],
            ControlVerb::Status { names } => {
                let mut args = vec!["status".to_string()];
                args.extend(names.iter().cloned());
                args
            }
            ControlVerb::Start { name } => vec!["start".to_string(), name.clone()],
            ControlVerb::Stop { name } => vec!["stop".to_string(), name.clone()],
            ControlVerb::Restart { name } => vec!["restart".to_string(), name.clone()],
            ControlVerb::Tail {
                name,
                stream,
                bytes,
                follow,
            } => {
                let mut args = vec!["tail".to_string()];
                if *follow {
                    args.push("-f".to_string());
                }
                if let Some(bytes) = bytes {
                    args.push(format!("-{bytes}"));
                }
                args.push(name.clone());
                args.push(stream.as_str().to_string());
                args
            }
        }
    }
}

/// Narrow client interface over the daemon's control channel.
///
/// Only the verbs actually used are exposed, so the concrete transport stays
/// swappable in tests.
pub trait ControlClient {
    /// Forward one verb; its output passes through to the caller's terminal.
    /// Failures are hard errors with no retry.
    fn send(&self, verb: &ControlVerb) -> Result<(), DaemonError>;

    /// Names of all processes known to the daemon.
    fn process_names(&self) -> Result<Vec<String>, DaemonError>;
}

/// Real transport: invokes the control binary against the rendered config.
#[derive(Debug, Clone)]
pub struct SupervisorCtl {
    binary: PathBuf,
    conf_file: PathBuf,
}

impl SupervisorCtl {
    pub fn new(conf_file: impl Into<PathBuf>) -> Self {
        let binary = std::env::var_os(SUPERVISORCTL_BIN_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SUPERVISORCTL_BIN));
        Self {
            binary,
            conf_file: conf_file.into(),
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>, conf_file: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            conf_file: conf_file.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--config").arg(&self.conf_file);
        cmd
    }
}

impl ControlClient for SupervisorCtl {
    fn send(&self, verb: &ControlVerb) -> Result<(), DaemonError> {
        let args = verb.cli_args();
        let status = self
            .command()
            .args(&args)
            .status()
            .map_err(|e| io_err(&self.binary, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(DaemonError::Control {
                verb: args.join(" "),
                status,
            })
        }
    }

    fn process_names(&self) -> Result<Vec<String>, DaemonError> {
        let output = self
            .command()
            .arg("status")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| io_err(&self.binary, e))?;

        // `status` exits non-zero when any process is not RUNNING; the
        // listing is still usable in that case.
        let accepted = output.status.success() || output.status.code() == Some(3);
        if !accepted {
            return Err(DaemonError::Control {
                verb: "status".to_string(),
                status: output.status,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }
}
