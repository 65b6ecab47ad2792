use crate::collision::CollisionAlgorithm;
use crate::drag::Axis;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Options for [`crate::Editor`] and [`crate::DragSessionCoordinator`].
///
/// Deserializes with every field optional, so a host can keep a partial JSON or RON file.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Number of snapshots the undo history retains, the current one included.
    pub history_capacity: usize,

    /// Layout direction used to decide whether a hover lands before or after a sibling.
    pub default_axis: Axis,

    /// Which collision ranking decides the authoritative region when several droppable regions
    /// overlap the dragged element.
    pub hover_algorithm: CollisionAlgorithm,

    /// Keep a bounded in-memory log of drag events (see
    /// [`crate::DragSessionCoordinator::debug_log_text`]).
    pub debug_event_log: bool,

    pub debug_event_log_capacity: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_axis: Axis::Vertical,
            hover_algorithm: CollisionAlgorithm::Smart,
            debug_event_log: false,
            debug_event_log_capacity: 256,
        }
    }
}
