//! Warden — manage a local supervisord instance from layered configuration.
//!
//! # Usage
//!
//! ```text
//! warden [--home <dir>] [--project <dir>] run [--status] [--env KEY=VALUE]...
//! warden info [--json]
//! warden status [name...]
//! warden start <name> [-f] [-e]
//! warden stop <name>
//! warden restart <name>
//! warden tail [-f] [-n <bytes>] [-e] <name>
//! warden shutdown
//! warden update
//! warden log [--lines <n>]
//! warden config
//! warden files
//! ```

mod commands;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    ctl::{ProcessArgs, StartArgs, StatusArgs, TailArgs},
    info::InfoArgs,
    log::LogArgs,
    run::RunArgs,
};
use context::{Context, GlobalArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Configure and drive a local supervisord instance",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile configuration and make sure the daemon is running.
    Run(RunArgs),

    /// Report instance state without acting.
    Info(InfoArgs),

    /// Show the status of supervised processes.
    Status(StatusArgs),

    /// Start a supervised process.
    Start(StartArgs),

    /// Stop a supervised process.
    Stop(ProcessArgs),

    /// Restart a supervised process.
    Restart(ProcessArgs),

    /// Show the output of a supervised process.
    Tail(TailArgs),

    /// Stop the supervised programs and the daemon itself.
    Shutdown,

    /// Reload the configuration without restarting the daemon.
    Update,

    /// Print recent daemon log lines.
    Log(LogArgs),

    /// Print the configuration rendered for the daemon.
    Config,

    /// Show include references and how they resolve.
    Files,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = Context::resolve(&cli.global)?;

    match cli.command {
        Commands::Run(args) => args.run(&ctx),
        Commands::Info(args) => args.run(&ctx),
        Commands::Status(args) => commands::ctl::status(&ctx, args),
        Commands::Start(args) => commands::ctl::start(&ctx, args),
        Commands::Stop(args) => commands::ctl::stop(&ctx, args),
        Commands::Restart(args) => commands::ctl::restart(&ctx, args),
        Commands::Tail(args) => commands::ctl::tail(&ctx, args),
        Commands::Shutdown => commands::ctl::shutdown(&ctx),
        Commands::Update => commands::ctl::update(&ctx),
        Commands::Log(args) => args.run(&ctx),
        Commands::Config => commands::config::run(&ctx),
        Commands::Files => commands::files::run(&ctx),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
