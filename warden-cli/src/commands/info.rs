//! `warden info` — read-only reconciliation report.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use warden_daemon::ControlClient;

use crate::context::Context;

/// Arguments for `warden info`.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl InfoArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let instance = ctx.instance(&[])?;
        let report = instance.probe().context("failed to probe instance")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .context("failed to serialize info JSON")?
            );
            return Ok(());
        }

        let daemon = match (report.running, report.pid) {
            (true, Some(pid)) => format!("{} running (pid {pid})", "●".green()),
            (true, None) => format!("{} running", "●".green()),
            _ => format!("{} not running", "○".red()),
        };
        let config = if !report.config_present {
            "missing".yellow().to_string()
        } else if report.config_stale {
            "stale".yellow().to_string()
        } else {
            "fresh".green().to_string()
        };
        let port = report
            .port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "not allocated".to_string());

        println!("supervisord: {daemon}");
        println!("port:        {port}");
        println!("config:      {config}");
        println!("location:    {}", report.location.display());
        println!("socket:      {}", report.socket_file.display());
        println!("includes:    {} file(s)", report.included_files.len());
        for file in &report.included_files {
            println!("  {}", file.display());
        }

        // Best effort: the daemon may be mid-startup or unreachable.
        if report.running {
            let control = ctx.control(&instance);
            if let Ok(names) = control.process_names() {
                if !names.is_empty() {
                    println!("processes:   {}", names.join(", "));
                }
            }
        }

        Ok(())
    }
}
