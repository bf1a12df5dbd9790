//! Configuration consumed by the selection engine.

use serde::{Deserialize, Serialize};

/// Options read by the engine.
///
/// Only the temp directory is consulted; everything else about a run
/// (filesystems, executors, plugins) belongs to the surrounding tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptions {
    /// Directory under which per-step working directories are assigned.
    #[serde(default)]
    pub tmp_dir: String,
}

impl SelectOptions {
    /// Options with the given temp directory.
    #[must_use]
    pub fn new(tmp_dir: impl Into<String>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
        }
    }
}
