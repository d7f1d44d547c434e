use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Error surface for instance reconciliation and daemon control.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("control command `{verb}` failed ({status})")]
    Control { verb: String, status: ExitStatus },

    #[error("unreadable port file at {path}")]
    PortFile { path: PathBuf },

    #[error("no available control port found in {base}..{end}")]
    NoAvailablePort { base: u16, end: u16 },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
