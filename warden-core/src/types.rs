//! Domain types for layered warden configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerName(pub String);

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LayerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LayerName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One prioritized source of configuration.
///
/// A layer owns a directory (`location`) and contributes include-file
/// references (relative to `location`, or absolute) plus environment
/// entries for the daemon process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: LayerName,
    /// Directory owning this layer; relative file references resolve here first.
    pub location: PathBuf,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// An explicit ordered snapshot of configuration layers.
///
/// Layers are listed in priority order: later layers override earlier ones.
/// The snapshot is assembled once per invocation and passed in; nothing here
/// is globally shared or mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    pub layers: Vec<Layer>,
    /// Fallback directory for relative references missing from their layer.
    pub project: Option<PathBuf>,
}

impl LayerSet {
    /// Merge the layers' environment contributions in priority order.
    pub fn env_overlay(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for layer in &self.layers {
            for (key, value) in &layer.env {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str, env: &[(&str, &str)]) -> Layer {
        Layer {
            name: LayerName::from(name),
            location: PathBuf::from("/tmp").join(name),
            files: vec![],
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn newtype_display() {
        assert_eq!(LayerName::from("global").to_string(), "global");
    }

    #[test]
    fn env_overlay_later_layers_win() {
        let set = LayerSet {
            layers: vec![
                layer("global", &[("A", "1"), ("B", "1")]),
                layer("project", &[("B", "2"), ("C", "2")]),
            ],
            project: None,
        };
        let merged = set.env_overlay();
        assert_eq!(merged.get("A").map(String::as_str), Some("1"));
        assert_eq!(merged.get("B").map(String::as_str), Some("2"));
        assert_eq!(merged.get("C").map(String::as_str), Some("2"));
    }

    #[test]
    fn env_overlay_empty_when_no_layers() {
        assert!(LayerSet::default().env_overlay().is_empty());
    }
}
