//! Launching and probing the external daemon process.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::error::{io_err, DaemonError};

pub const SUPERVISORD_BIN: &str = "supervisord";
/// Overrides the daemon binary name; used by integration tests.
pub const SUPERVISORD_BIN_ENV: &str = "WARDEN_SUPERVISORD_BIN";

/// Starts the external daemon as a detached process.
///
/// The launch returns as soon as the process is spawned; readiness is the
/// caller's concern.
pub trait Launcher {
    fn launch(&self, conf_file: &Path, env: &BTreeMap<String, String>)
        -> Result<(), DaemonError>;
}

/// Real launcher: `supervisord --config <conf>`, detached, null stdio, with
/// the environment overlay merged onto the ambient environment.
#[derive(Debug, Clone)]
pub struct Supervisord {
    binary: PathBuf,
}

impl Supervisord {
    pub fn new() -> Self {
        let binary = std::env::var_os(SUPERVISORD_BIN_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SUPERVISORD_BIN));
        Self { binary }
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for Supervisord {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for Supervisord {
    fn launch(
        &self,
        conf_file: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<(), DaemonError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--config").arg(conf_file);
        cmd.envs(env);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.spawn().map_err(|e| io_err(&self.binary, e))?;
        Ok(())
    }
}

/// Zero-effect liveness probe: signal 0 checks existence without delivering.
pub fn pid_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Read a decimal pid from a pid file.
///
/// Returns `Ok(None)` when the file is missing or does not parse; the caller
/// treats both the same way (no live daemon known).
pub fn read_pid(path: &Path) -> Result<Option<i32>, DaemonError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_err(path, err)),
    };
    Ok(text.trim().parse::<i32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn own_pid_is_alive() {
        assert!(pid_alive(std::process::id() as i32));
    }

    #[test]
    fn absurd_pid_is_not_alive() {
        assert!(!pid_alive(i32::MAX));
    }

    #[test]
    fn read_pid_handles_missing_garbage_and_valid_files() {
        let dir = TempDir::new().expect("dir");
        let path = dir.path().join("supervisord.pid");

        assert_eq!(read_pid(&path).expect("missing"), None);

        fs::write(&path, "not a pid\n").expect("write");
        assert_eq!(read_pid(&path).expect("garbage"), None);

        fs::write(&path, "  4242\n").expect("write");
        assert_eq!(read_pid(&path).expect("valid"), Some(4242));
    }

    #[cfg(unix)]
    #[test]
    fn launcher_spawns_the_configured_binary() {
        let dir = TempDir::new().expect("dir");
        let conf = dir.path().join("supervisord.conf");
        fs::write(&conf, "").expect("write conf");

        let launcher = Supervisord::with_binary("/bin/true");
        launcher
            .launch(&conf, &BTreeMap::new())
            .expect("spawn /bin/true");

        let missing = Supervisord::with_binary(dir.path().join("no-such-binary"));
        assert!(missing.launch(&conf, &BTreeMap::new()).is_err());
    }
}
