//! Shared invocation context: directories, configuration snapshot, instance.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use warden_core::{layers, LayerSet};
use warden_daemon::{Instance, SupervisorCtl};

/// Options shared by every sub-command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base directory for warden state (defaults to `~/.warden`).
    #[arg(long, global = true, env = "WARDEN_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Project directory contributing a layer and include-file fallback.
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

pub struct Context {
    pub base: PathBuf,
    pub snapshot: LayerSet,
}

impl Context {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let base = match &args.home {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .context("could not determine home directory")?
                .join(".warden"),
        };
        let project = match &args.project {
            Some(dir) => Some(dir.clone()),
            None => default_project()?,
        };
        let snapshot = layers::snapshot(&base, project.as_deref())
            .context("failed to load configuration layers")?;
        Ok(Self { base, snapshot })
    }

    /// Open the supervision instance (resolves include files, self-heals a
    /// stale pid file) with the merged environment overlay.
    pub fn instance(&self, extra_env: &[(String, String)]) -> Result<Instance> {
        let mut env: BTreeMap<String, String> = self.snapshot.env_overlay();
        for (key, value) in extra_env {
            env.insert(key.clone(), value.clone());
        }
        Instance::open(&self.base, &self.snapshot, env)
            .context("failed to open supervision instance")
    }

    pub fn control(&self, instance: &Instance) -> SupervisorCtl {
        SupervisorCtl::new(instance.paths().conf_file.clone())
    }
}

/// The current directory counts as the project when it carries a layer file.
fn default_project() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir().context("could not determine current directory")?;
    Ok(layers::layer_path(&cwd).exists().then_some(cwd))
}
