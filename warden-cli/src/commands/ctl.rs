//! Forwarding sub-commands onto the daemon's control channel.
//!
//! Output of the control binary passes straight through to the terminal;
//! failures propagate as hard errors with no retry.

use anyhow::Result;
use clap::Args;

use warden_daemon::{ControlClient, ControlVerb, LogStream};

use crate::context::Context;

/// Arguments for `warden status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Limit to specific process names.
    pub names: Vec<String>,
}

/// Arguments for `warden stop` and `warden restart`.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// The process to act on.
    pub name: String,
}

/// Arguments for `warden start`.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// The process to start.
    pub name: String,

    /// Also follow its output afterwards.
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Follow the error stream instead of stdout.
    #[arg(short = 'e', long)]
    pub err: bool,
}

/// Arguments for `warden tail`.
#[derive(Args, Debug)]
pub struct TailArgs {
    /// The process to tail.
    pub name: String,

    /// Keep following the output.
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Number of bytes from the end of the log.
    #[arg(short = 'n', long, value_name = "BYTES")]
    pub bytes: Option<u64>,

    /// Show the error stream instead of stdout.
    #[arg(short = 'e', long)]
    pub err: bool,
}

pub fn status(ctx: &Context, args: StatusArgs) -> Result<()> {
    forward(ctx, ControlVerb::Status { names: args.names })
}

pub fn start(ctx: &Context, args: StartArgs) -> Result<()> {
    forward(ctx, ControlVerb::Start {
        name: args.name.clone(),
    })?;
    if args.follow {
        forward(ctx, ControlVerb::Tail {
            name: args.name,
            stream: stream_for(args.err),
            bytes: None,
            follow: true,
        })?;
    }
    Ok(())
}

pub fn stop(ctx: &Context, args: ProcessArgs) -> Result<()> {
    forward(ctx, ControlVerb::Stop { name: args.name })
}

pub fn restart(ctx: &Context, args: ProcessArgs) -> Result<()> {
    forward(ctx, ControlVerb::Restart { name: args.name })
}

pub fn tail(ctx: &Context, args: TailArgs) -> Result<()> {
    forward(ctx, ControlVerb::Tail {
        name: args.name,
        stream: stream_for(args.err),
        bytes: args.bytes,
        follow: args.follow,
    })
}

pub fn shutdown(ctx: &Context) -> Result<()> {
    forward(ctx, ControlVerb::Shutdown)
}

pub fn update(ctx: &Context) -> Result<()> {
    forward(ctx, ControlVerb::Update)
}

fn stream_for(err: bool) -> LogStream {
    if err {
        LogStream::Stderr
    } else {
        LogStream::Stdout
    }
}

fn forward(ctx: &Context, verb: ControlVerb) -> Result<()> {
    let instance = ctx.instance(&[])?;
    let control = ctx.control(&instance);
    control.send(&verb)?;
    Ok(())
}
