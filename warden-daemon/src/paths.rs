use std::path::{Path, PathBuf};

/// Lowest control port probed when no port has been persisted yet.
pub const CONTROL_PORT_BASE: u16 = 9001;

pub const CONF_FILE: &str = "supervisord.conf";
pub const SOCKET_FILE: &str = "supervisord.sock";
pub const LOG_FILE: &str = "supervisord.log";
pub const PID_FILE: &str = "supervisord.pid";
pub const PORT_FILE: &str = "port.txt";
pub const LOCK_FILE: &str = "warden.lock";

/// Derived path layout for one supervision instance.
///
/// Everything lives under `<base>/supervisor`; the directory is created on
/// demand by the reconciler, never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePaths {
    pub location: PathBuf,
    pub conf_file: PathBuf,
    pub socket_file: PathBuf,
    pub log_file: PathBuf,
    pub pid_file: PathBuf,
    pub port_file: PathBuf,
    pub lock_file: PathBuf,
}

impl InstancePaths {
    /// Pure path derivation, no I/O.
    pub fn at(base: &Path) -> Self {
        let location = base.join("supervisor");
        Self {
            conf_file: location.join(CONF_FILE),
            socket_file: location.join(SOCKET_FILE),
            log_file: location.join(LOG_FILE),
            pid_file: location.join(PID_FILE),
            port_file: location.join(PORT_FILE),
            lock_file: location.join(LOCK_FILE),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_all_live_under_the_location() {
        let paths = InstancePaths::at(Path::new("/home/tester/.warden"));
        assert_eq!(paths.location, Path::new("/home/tester/.warden/supervisor"));
        for child in [
            &paths.conf_file,
            &paths.socket_file,
            &paths.log_file,
            &paths.pid_file,
            &paths.port_file,
            &paths.lock_file,
        ] {
            assert!(child.starts_with(&paths.location), "{}", child.display());
        }
        assert_eq!(
            paths.port_file,
            Path::new("/home/tester/.warden/supervisor/port.txt")
        );
    }
}
