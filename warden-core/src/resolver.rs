//! Ordered include-file resolution across configuration layers.
//!
//! Resolution rules, in order, for each reference of each layer:
//! 1. an absolute reference is kept as-is when it exists on disk;
//! 2. a relative reference resolves against the owning layer's location;
//! 3. failing that, against the project directory when one is configured;
//! 4. otherwise the reference is skipped with a warning.
//!
//! Order is stable: layers in priority order, files within a layer in
//! declared order. Duplicates are not filtered.

use std::path::PathBuf;

use crate::types::{LayerName, LayerSet};

/// How one declared reference resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub layer: LayerName,
    /// The reference as declared in the layer file.
    pub reference: PathBuf,
    /// Absolute path the reference resolved to, or `None` when missing.
    pub resolved: Option<PathBuf>,
}

/// Resolve every declared reference, keeping misses for reporting.
pub fn resolve(set: &LayerSet) -> Vec<Resolution> {
    let mut resolutions = Vec::new();
    for layer in &set.layers {
        for reference in &layer.files {
            let resolved = if reference.is_absolute() {
                reference.exists().then(|| reference.clone())
            } else {
                let candidate = layer.location.join(reference);
                if candidate.exists() {
                    Some(candidate)
                } else {
                    // particular case of the project files
                    set.project
                        .as_ref()
                        .map(|project| project.join(reference))
                        .filter(|fallback| fallback.exists())
                }
            };
            if resolved.is_none() {
                tracing::warn!(
                    layer = %layer.name,
                    reference = %reference.display(),
                    "include file does not exist anymore",
                );
            }
            resolutions.push(Resolution {
                layer: layer.name.clone(),
                reference: reference.clone(),
                resolved,
            });
        }
    }
    resolutions
}

/// Flattened ordered sequence of absolute include paths.
///
/// Missing references are omitted (already warned about in [`resolve`]).
pub fn resolve_files(set: &LayerSet) -> Vec<PathBuf> {
    resolve(set)
        .into_iter()
        .filter_map(|r| r.resolved)
        .collect()
}
