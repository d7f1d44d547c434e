//! `warden config` — print the configuration rendered for the daemon.

use anyhow::{Context as _, Result};

use crate::context::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let instance = ctx.instance(&[])?;
    let text = instance
        .preview_config()
        .context("failed to render configuration")?;
    print!("{text}");
    Ok(())
}
