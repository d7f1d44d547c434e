//! `warden run` — reconcile configuration and make sure the daemon runs.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use warden_daemon::{ControlClient, ControlVerb, RunOutcome, Supervisord};

use crate::context::Context;

/// Arguments for `warden run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Immediately show the daemon status afterwards.
    #[arg(long)]
    pub status: bool,

    /// Extra KEY=VALUE environment entries for the daemon process.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,
}

fn parse_env_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

impl RunArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let instance = ctx.instance(&self.env)?;
        let control = ctx.control(&instance);
        let launcher = Supervisord::new();

        let outcome = instance
            .ensure_running(&control, &launcher)
            .context("reconciliation failed")?;

        let check = "✓".green();
        match outcome {
            RunOutcome::AlreadyRunning { port: Some(port) } => {
                println!("{check} already running, available on http://localhost:{port}");
            }
            RunOutcome::AlreadyRunning { port: None } => {
                println!("{check} already running");
            }
            RunOutcome::Started {
                port,
                restarted: true,
            } => {
                println!(
                    "{check} restarted with fresh configuration, available on http://localhost:{port}"
                );
            }
            RunOutcome::Started {
                port,
                restarted: false,
            } => {
                println!("{check} started, available on http://localhost:{port}");
            }
        }

        if self.status {
            control
                .send(&ControlVerb::Status { names: vec![] })
                .context("failed to query daemon status")?;
        }

        Ok(())
    }
}
