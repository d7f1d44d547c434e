//! Idempotent reconciliation between layered configuration and the daemon.
//!
//! Decision table for `ensure_running`, evaluated after the stale-pid
//! self-heal and under an exclusive lock:
//!
//! | running | stale config | action                                | outcome          |
//! |---------|--------------|----------------------------------------|------------------|
//! | yes     | no           | none                                   | `AlreadyRunning` |
//! | yes     | yes          | shutdown, rewrite config, start        | `Started`        |
//! | no      | either       | rewrite config if needed, start        | `Started`        |

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;

use warden_core::resolver;
use warden_core::LayerSet;

use crate::config::{self, ConfigInputs};
use crate::control::{ControlClient, ControlVerb};
use crate::error::{io_err, DaemonError};
use crate::paths::{InstancePaths, CONTROL_PORT_BASE};
use crate::process::{pid_alive, read_pid, Launcher};

/// Bounded search width above [`CONTROL_PORT_BASE`].
const PORT_SEARCH_WIDTH: u16 = 100;

/// Outcome of one `ensure_running` reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Daemon alive and config fresh; nothing was done.
    AlreadyRunning { port: Option<u16> },
    /// Daemon was started; `restarted` marks a stale-config shutdown first.
    Started { port: u16, restarted: bool },
}

impl RunOutcome {
    pub fn port(&self) -> Option<u16> {
        match self {
            RunOutcome::AlreadyRunning { port } => *port,
            RunOutcome::Started { port, .. } => Some(*port),
        }
    }
}

/// Read-only reconciliation report, for `warden info`.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub running: bool,
    pub pid: Option<i32>,
    pub port: Option<u16>,
    pub config_present: bool,
    pub config_stale: bool,
    pub location: PathBuf,
    pub socket_file: PathBuf,
    pub included_files: Vec<PathBuf>,
}

/// The single logical daemon instance for a base directory.
///
/// Constructed fresh on every invocation; all state is filesystem-resident
/// (pid file, port file, config file) so successive invocations observe
/// consistent external state. Construction self-heals a stale pid file
/// before any other operation.
pub struct Instance {
    paths: InstancePaths,
    files: Vec<PathBuf>,
    env: BTreeMap<String, String>,
}

impl Instance {
    pub fn open(
        base: &Path,
        snapshot: &LayerSet,
        env: BTreeMap<String, String>,
    ) -> Result<Self, DaemonError> {
        let instance = Self {
            paths: InstancePaths::at(base),
            files: resolver::resolve_files(snapshot),
            env,
        };
        instance.self_heal()?;
        Ok(instance)
    }

    pub fn paths(&self) -> &InstancePaths {
        &self.paths
    }

    /// Resolved include files, in priority order.
    pub fn included_files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Decide and act: no-op, rewrite, restart, or fresh start.
    ///
    /// The whole decide-and-act sequence holds an exclusive lock so
    /// concurrent invocations serialize instead of double-starting.
    pub fn ensure_running(
        &self,
        control: &dyn ControlClient,
        launcher: &dyn Launcher,
    ) -> Result<RunOutcome, DaemonError> {
        self.ensure_location()?;
        let _lock = self.acquire_lock()?;

        // Re-check under the lock: another invocation may have acted since
        // construction.
        self.self_heal()?;
        let stale = self.config_is_stale()?;
        let running = self.paths.pid_file.exists();

        match (running, stale) {
            (true, false) => Ok(RunOutcome::AlreadyRunning {
                port: self.persisted_port()?,
            }),
            (true, true) => {
                control.send(&ControlVerb::Shutdown)?;
                let port = self.write_config()?;
                launcher.launch(&self.paths.conf_file, &self.env)?;
                Ok(RunOutcome::Started {
                    port,
                    restarted: true,
                })
            }
            (false, _) => {
                let port = if stale {
                    self.write_config()?
                } else {
                    match self.persisted_port()? {
                        Some(port) => port,
                        // Fresh config but no port on record; rewrite so the
                        // two stay consistent.
                        None => self.write_config()?,
                    }
                };
                launcher.launch(&self.paths.conf_file, &self.env)?;
                Ok(RunOutcome::Started {
                    port,
                    restarted: false,
                })
            }
        }
    }

    /// Report instance state without acting.
    pub fn probe(&self) -> Result<InstanceReport, DaemonError> {
        let pid = read_pid(&self.paths.pid_file)?;
        let running = pid.map(pid_alive).unwrap_or(false);
        Ok(InstanceReport {
            running,
            pid,
            port: self.persisted_port()?,
            config_present: self.paths.conf_file.exists(),
            config_stale: self.config_is_stale()?,
            location: self.paths.location.clone(),
            socket_file: self.paths.socket_file.clone(),
            included_files: self.files.clone(),
        })
    }

    /// The configuration text a rewrite would produce right now.
    ///
    /// Uses the persisted port when one exists and falls back to the base
    /// port otherwise; never allocates or writes anything.
    pub fn preview_config(&self) -> Result<String, DaemonError> {
        let port = self.persisted_port()?.unwrap_or(CONTROL_PORT_BASE);
        Ok(self.render(port))
    }

    /// Delete the pid file when the process it names is gone.
    fn self_heal(&self) -> Result<(), DaemonError> {
        let pid_file = &self.paths.pid_file;
        match read_pid(pid_file)? {
            Some(pid) if pid_alive(pid) => Ok(()),
            Some(pid) => {
                tracing::debug!(pid, pid_file = %pid_file.display(), "removing stale pid file");
                remove_if_present(pid_file)
            }
            None => {
                // A pid file that exists but does not parse is equally stale.
                if pid_file.exists() {
                    tracing::debug!(pid_file = %pid_file.display(), "removing unreadable pid file");
                    remove_if_present(pid_file)?;
                }
                Ok(())
            }
        }
    }

    /// True when the config file is absent, unstattable, or older than any
    /// resolved include file.
    fn config_is_stale(&self) -> Result<bool, DaemonError> {
        let conf_mtime = match fs::metadata(&self.paths.conf_file).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return Ok(true),
        };

        for file in &self.files {
            match fs::metadata(file) {
                Ok(meta) => {
                    let mtime = meta.modified().map_err(|e| io_err(file, e))?;
                    if mtime > conf_mtime {
                        return Ok(true);
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::warn!(
                        file = %file.display(),
                        "include file vanished after resolution",
                    );
                }
                Err(err) => return Err(io_err(file, err)),
            }
        }
        Ok(false)
    }

    fn persisted_port(&self) -> Result<Option<u16>, DaemonError> {
        let text = match fs::read_to_string(&self.paths.port_file) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_err(&self.paths.port_file, err)),
        };
        text.trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|_| DaemonError::PortFile {
                path: self.paths.port_file.clone(),
            })
    }

    /// Reuse the persisted port, or allocate and persist a fresh one.
    fn ensure_port(&self) -> Result<u16, DaemonError> {
        if let Some(port) = self.persisted_port()? {
            return Ok(port);
        }
        let port = find_available_port(CONTROL_PORT_BASE)?;
        self.ensure_location()?;
        fs::write(&self.paths.port_file, port.to_string())
            .map_err(|e| io_err(&self.paths.port_file, e))?;
        Ok(port)
    }

    /// Render and atomically replace the config file; returns the port used.
    fn write_config(&self) -> Result<u16, DaemonError> {
        let port = self.ensure_port()?;
        let text = self.render(port);

        self.ensure_location()?;
        let tmp = PathBuf::from(format!("{}.warden.tmp", self.paths.conf_file.display()));
        fs::write(&tmp, &text).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.paths.conf_file) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(&self.paths.conf_file, e));
        }
        tracing::info!(conf = %self.paths.conf_file.display(), port, "wrote daemon configuration");
        Ok(port)
    }

    fn render(&self, port: u16) -> String {
        config::render(&ConfigInputs {
            socket_file: &self.paths.socket_file,
            port,
            log_file: &self.paths.log_file,
            pid_file: &self.paths.pid_file,
            location: &self.paths.location,
            files: &self.files,
        })
    }

    fn ensure_location(&self) -> Result<(), DaemonError> {
        if !self.paths.location.exists() {
            fs::create_dir_all(&self.paths.location)
                .map_err(|e| io_err(&self.paths.location, e))?;
        }
        Ok(())
    }

    fn acquire_lock(&self) -> Result<File, DaemonError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.paths.lock_file)
            .map_err(|e| io_err(&self.paths.lock_file, e))?;
        file.lock_exclusive()
            .map_err(|e| io_err(&self.paths.lock_file, e))?;
        // Released when the handle drops at the end of ensure_running.
        Ok(file)
    }
}

fn remove_if_present(path: &Path) -> Result<(), DaemonError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(path, err)),
    }
}

/// First port at or above `base` that can be bound, within a bounded search.
fn find_available_port(base: u16) -> Result<u16, DaemonError> {
    let end = base.saturating_add(PORT_SEARCH_WIDTH);
    for port in base..end {
        if TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return Ok(port);
        }
    }
    Err(DaemonError::NoAvailablePort { base, end })
}
