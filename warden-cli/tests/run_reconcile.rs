#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A supervisord stand-in that accepts `--config <path>` and exits cleanly.
/// The real daemon writes its own pid file; tests seed that file themselves.
fn write_stub_daemon(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let stub = dir.join("supervisord");
    fs::write(&stub, "#!/bin/sh\nexit 0\n").expect("write stub");
    fs::set_permissions(&stub, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    stub
}

fn warden(home: &TempDir, cwd: &TempDir, stub: &Path) -> Command {
    let mut cmd = Command::cargo_bin("warden").expect("warden binary");
    cmd.env("WARDEN_HOME", home.path());
    cmd.env("WARDEN_SUPERVISORD_BIN", stub);
    cmd.env("WARDEN_SUPERVISORCTL_BIN", "/bin/true");
    cmd.current_dir(cwd.path());
    cmd
}

#[test]
fn run_starts_reports_idempotence_and_restarts_on_staleness() {
    let home = TempDir::new().expect("home");
    let cwd = TempDir::new().expect("cwd");
    let stub = write_stub_daemon(home.path());

    let include = home.path().join("web.conf");
    fs::write(home.path().join("warden.yaml"), "files:\n  - web.conf\n").expect("layer file");
    fs::write(&include, "[program:web]\n").expect("include file");

    // First run: fresh start, config and port persisted.
    warden(&home, &cwd, &stub)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("started, available on http://localhost:"));

    let instance = home.path().join("supervisor");
    let conf_file = instance.join("supervisord.conf");
    let port_file = instance.join("port.txt");
    assert!(conf_file.exists());
    let port: u16 = fs::read_to_string(&port_file)
        .expect("port file")
        .trim()
        .parse()
        .expect("port parses");
    assert!((9001..9101).contains(&port), "unexpected port {port}");

    let conf = fs::read_to_string(&conf_file).expect("read conf");
    assert!(conf.contains(&include.display().to_string()));

    // The stub exits immediately and leaves no pid file; stand in for a
    // live daemon with this test process's own pid.
    fs::write(instance.join("supervisord.pid"), std::process::id().to_string())
        .expect("seed pid");

    // Second run: live daemon, fresh config, nothing to do.
    warden(&home, &cwd, &stub)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("already running"));
    assert_eq!(
        fs::read_to_string(&port_file).expect("port file").trim(),
        port.to_string(),
        "port must be read back identically"
    );

    // Make an include file newer than the rendered config.
    sleep(Duration::from_millis(1100));
    fs::write(&include, "[program:web]\ncommand=/bin/true\n").expect("touch include");

    warden(&home, &cwd, &stub)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("restarted with fresh configuration"));
    assert_eq!(
        fs::read_to_string(&port_file).expect("port file").trim(),
        port.to_string(),
        "rewrite must reuse the persisted port"
    );
}

#[test]
fn run_self_heals_a_stale_pid_file() {
    let home = TempDir::new().expect("home");
    let cwd = TempDir::new().expect("cwd");
    let stub = write_stub_daemon(home.path());

    let instance = home.path().join("supervisor");
    fs::create_dir_all(&instance).expect("mkdir");
    fs::write(instance.join("supervisord.pid"), i32::MAX.to_string()).expect("stale pid");

    // The dead pid must not be mistaken for a running daemon.
    warden(&home, &cwd, &stub)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("started, available on http://localhost:"));
}
