//! Editing core for drag-and-drop page builders.
//!
//! A page is an [`ElementTree`]: an ordered list of typed [`Element`]s, some of which hold
//! children. Trees are immutable values; every edit returns a new tree that shares untouched
//! subtrees with the old one. On top of that:
//!
//! * [`collision`] ranks droppable rectangles against the one being dragged,
//! * [`DragSessionCoordinator`] turns a drag gesture into exactly one tree edit,
//! * [`History`] keeps a bounded undo/redo log of trees,
//! * [`Editor`] ties them together for an application.
//!
//! Rendering and input handling are left to the host; geometry is expressed with `egui`'s
//! [`egui::Rect`] and [`egui::Pos2`].

#![forbid(unsafe_code)]

pub mod collision;
pub mod drag;
pub mod history;

mod builder;
mod document;
mod editor;
mod element;
mod ids;
mod options;
mod registry;
mod tree;

pub use builder::PageBuilder;
pub use collision::{Candidate, CollisionAlgorithm, CollisionMatch, CollisionReport};
pub use document::DocumentError;
pub use drag::{
    Axis, CancelReason, DragError, DragPayload, DragPhase, DragProxy, DragSessionCoordinator,
    DropCommand, DropOutcome, DropPosition, DropRegion, DropTarget, PayloadError, PayloadKind,
    Unchanged,
};
pub use editor::{Editor, EditorError};
pub use element::{CHILDREN_KEY, Element, ElementId, ElementType, Props};
pub use history::{DEFAULT_HISTORY_CAPACITY, History, HistoryAction};
pub use ids::IdGenerator;
pub use options::EditorOptions;
pub use registry::{ElementRegistry, ElementTemplate};
pub use tree::{ElementIndex, ElementIter, ElementLocation, ElementTree, IndexEntry, TreeError};
