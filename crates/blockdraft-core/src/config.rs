//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Maximum number of undo steps kept by default.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Default distance within which a stored port box is matched to a live port on load.
pub const DEFAULT_LOAD_TOLERANCE: f64 = 2.0;

/// Tunables for an [`Editor`](crate::Editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo steps kept before the oldest is dropped.
    pub history_limit: usize,
    /// Record block drags as undoable commands.
    pub record_moves: bool,
    /// Matching distance used when reloading connection endpoints.
    pub load_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: MAX_UNDO_HISTORY,
            record_moves: false,
            load_tolerance: DEFAULT_LOAD_TOLERANCE,
        }
    }
}
