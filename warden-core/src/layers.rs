//! Read-only loading of layer files.
//!
//! # Storage layout
//!
//! ```text
//! <base>/warden.yaml       (global layer — optional)
//! <project>/warden.yaml    (project layer — optional)
//! ```
//!
//! A layer file declares include-file references and environment entries:
//!
//! ```yaml
//! files:
//!   - services/web.conf
//!   - /etc/jobs/backup.conf
//! env:
//!   RAILS_ENV: production
//! ```
//!
//! Loading is strictly read-only: there are no write-back commands. A missing
//! layer file contributes nothing; a malformed one is a hard error.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, LayerError};
use crate::types::{Layer, LayerName, LayerSet};

/// File name a layer is declared in, inside its owning directory.
pub const LAYER_FILE: &str = "warden.yaml";

/// On-disk shape of a layer file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerFile {
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `<location>/warden.yaml` — pure, no I/O.
pub fn layer_path(location: &Path) -> PathBuf {
    location.join(LAYER_FILE)
}

/// Load one layer from `<location>/warden.yaml`.
///
/// Returns `Ok(None)` when the layer file does not exist,
/// `LayerError::Parse` (with path and line context) when it is malformed.
pub fn load_layer(
    name: impl Into<LayerName>,
    location: &Path,
) -> Result<Option<Layer>, LayerError> {
    let path = layer_path(location);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_err(&path, err)),
    };
    let file: LayerFile =
        serde_yaml::from_str(&contents).map_err(|e| LayerError::Parse { path, source: e })?;
    Ok(Some(Layer {
        name: name.into(),
        location: location.to_path_buf(),
        files: file.files,
        env: file.env,
    }))
}

/// Assemble the configuration snapshot for one invocation.
///
/// Priority order: the global layer at `base` first, then the project layer,
/// so project declarations override global ones.
pub fn snapshot(base: &Path, project: Option<&Path>) -> Result<LayerSet, LayerError> {
    let mut layers = Vec::new();
    if let Some(layer) = load_layer("global", base)? {
        layers.push(layer);
    }
    if let Some(dir) = project {
        if let Some(layer) = load_layer("project", dir)? {
            layers.push(layer);
        }
    }
    Ok(LayerSet {
        layers,
        project: project.map(Path::to_path_buf),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn missing_layer_file_loads_as_none() {
        let dir = TempDir::new().expect("dir");
        let layer = load_layer("global", dir.path()).expect("load");
        assert!(layer.is_none());
    }

    #[test]
    fn layer_file_round_trips_files_and_env() {
        let dir = TempDir::new().expect("dir");
        fs::write(
            layer_path(dir.path()),
            "files:\n  - web.conf\n  - /etc/jobs/backup.conf\nenv:\n  RAILS_ENV: production\n",
        )
        .expect("write");

        let layer = load_layer("global", dir.path())
            .expect("load")
            .expect("layer present");
        assert_eq!(layer.name, LayerName::from("global"));
        assert_eq!(layer.location, dir.path());
        assert_eq!(
            layer.files,
            vec![PathBuf::from("web.conf"), PathBuf::from("/etc/jobs/backup.conf")]
        );
        assert_eq!(
            layer.env.get("RAILS_ENV").map(String::as_str),
            Some("production")
        );
    }

    #[test]
    fn malformed_layer_file_is_a_parse_error() {
        let dir = TempDir::new().expect("dir");
        fs::write(layer_path(dir.path()), "files: {not: [a, list}").expect("write");

        let err = load_layer("global", dir.path()).expect_err("parse failure");
        match err {
            LayerError::Parse { path, .. } => assert_eq!(path, layer_path(dir.path())),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_orders_global_before_project() {
        let base = TempDir::new().expect("base");
        let project = TempDir::new().expect("project");
        fs::write(layer_path(base.path()), "files: [a.conf]\n").expect("write global");
        fs::write(layer_path(project.path()), "files: [b.conf]\n").expect("write project");

        let set = snapshot(base.path(), Some(project.path())).expect("snapshot");
        let names: Vec<&str> = set.layers.iter().map(|l| l.name.0.as_str()).collect();
        assert_eq!(names, vec!["global", "project"]);
        assert_eq!(set.project.as_deref(), Some(project.path()));
    }

    #[test]
    fn snapshot_without_any_layer_files_is_empty() {
        let base = TempDir::new().expect("base");
        let set = snapshot(base.path(), None).expect("snapshot");
        assert!(set.layers.is_empty());
        assert!(set.project.is_none());
    }
}
