//! Renderer for the supervisord configuration document.
//!
//! The output is a fixed-format contract consumed by the external daemon's
//! parser: section names, key names, and the `include` line syntax must stay
//! byte-for-byte reproducible. Rendering is a pure function of its inputs.

use std::path::{Path, PathBuf};

/// Everything the configuration text depends on. No hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigInputs<'a> {
    pub socket_file: &'a Path,
    pub port: u16,
    pub log_file: &'a Path,
    pub pid_file: &'a Path,
    pub location: &'a Path,
    /// Resolved include files, already absolute and in priority order.
    pub files: &'a [PathBuf],
}

/// Render the configuration text for the external daemon.
pub fn render(inputs: &ConfigInputs) -> String {
    let include = inputs
        .files
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"[unix_http_server]
file={socket}

[inet_http_server]
port=:{port}

[supervisord]
logfile={log}
logfile_maxbytes=50MB
logfile_backups=10
loglevel=info
pidfile={pid}
nodaemon=false
minfds=1024
minprocs=200
childlogdir={location}

[rpcinterface:supervisor]
supervisor.rpcinterface_factory = supervisor.rpcinterface:make_main_rpcinterface

[supervisorctl]
serverurl=unix://{socket}

[include]
include = {include}
"#,
        socket = inputs.socket_file.display(),
        port = inputs.port,
        log = inputs.log_file.display(),
        pid = inputs.pid_file.display(),
        location = inputs.location.display(),
        include = include,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_inputs(files: &[PathBuf]) -> ConfigInputs<'_> {
        ConfigInputs {
            socket_file: Path::new("/x/supervisord.sock"),
            port: 9001,
            log_file: Path::new("/x/supervisord.log"),
            pid_file: Path::new("/x/supervisord.pid"),
            location: Path::new("/x"),
            files,
        }
    }

    #[test]
    fn rendering_is_byte_identical_across_calls() {
        let files = vec![PathBuf::from("/x/a.conf"), PathBuf::from("/y/b.conf")];
        let first = render(&fixed_inputs(&files));
        let second = render(&fixed_inputs(&files));
        assert_eq!(first, second);
    }

    #[test]
    fn include_section_lists_files_space_separated() {
        let files = vec![PathBuf::from("/x/a.conf"), PathBuf::from("/y/b.conf")];
        let text = render(&fixed_inputs(&files));
        assert!(text.contains("[include]\ninclude = /x/a.conf /y/b.conf\n"));
    }

    #[test]
    fn fixed_contract_keys_are_present() {
        let files = vec![PathBuf::from("/x/a.conf")];
        let text = render(&fixed_inputs(&files));

        assert!(text.starts_with("[unix_http_server]\nfile=/x/supervisord.sock\n"));
        assert!(text.contains("[inet_http_server]\nport=:9001\n"));
        assert!(text.contains("logfile_maxbytes=50MB\n"));
        assert!(text.contains("logfile_backups=10\n"));
        assert!(text.contains("pidfile=/x/supervisord.pid\n"));
        assert!(text.contains("childlogdir=/x\n"));
        assert!(text.contains(
            "supervisor.rpcinterface_factory = supervisor.rpcinterface:make_main_rpcinterface\n"
        ));
        assert!(text.contains("[supervisorctl]\nserverurl=unix:///x/supervisord.sock\n"));
        assert!(text.ends_with("\n"));
    }

    #[test]
    fn port_is_rendered_as_declared() {
        let files = vec![];
        let mut inputs = fixed_inputs(&files);
        inputs.port = 9042;
        assert!(render(&inputs).contains("port=:9042\n"));
    }
}
