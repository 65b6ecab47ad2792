use std::path::Path;

use egui::{Pos2, Rect};
use serde_json::{Map, Value};

use crate::collision::Candidate;
use crate::document::DocumentError;
use crate::drag::{DragError, DragPayload, DragSessionCoordinator, DropOutcome, DropRegion, DropTarget};
use crate::element::{Element, ElementId, ElementType};
use crate::history::History;
use crate::ids::IdGenerator;
use crate::options::EditorOptions;
use crate::registry::{ElementRegistry, ElementTemplate};
use crate::tree::{ElementTree, TreeError};

#[derive(Debug)]
pub enum EditorError {
    Tree(TreeError),
    Drag(DragError),
    Document(DocumentError),

    /// No template is registered for the element type.
    MissingTemplate(ElementType),
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tree(err) => err.fmt(f),
            Self::Drag(err) => err.fmt(f),
            Self::Document(err) => err.fmt(f),
            Self::MissingTemplate(kind) => write!(f, "no template registered for {kind}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Document(err) => Some(err),
            Self::MissingTemplate(_) => None,
        }
    }
}

impl From<TreeError> for EditorError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<DragError> for EditorError {
    fn from(err: DragError) -> Self {
        Self::Drag(err)
    }
}

impl From<DocumentError> for EditorError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

/// One open page: its tree, undo history, palette and the drag gesture in progress.
///
/// The tree is only ever replaced as a whole. Every successful edit (including a completed
/// drop) records the new tree in the history; a failed edit leaves both untouched.
#[derive(Debug)]
pub struct Editor {
    options: EditorOptions,
    registry: ElementRegistry,
    ids: IdGenerator,
    history: History,
    drag: DragSessionCoordinator,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

impl Editor {
    /// An empty page with the built-in palette.
    pub fn new(options: EditorOptions) -> Self {
        Self::with_registry(options, ElementRegistry::builtin())
    }

    pub fn with_registry(options: EditorOptions, registry: ElementRegistry) -> Self {
        Self::from_tree(options, registry, ElementTree::new())
    }

    /// Open an existing tree. It becomes the oldest undo state.
    pub fn from_tree(options: EditorOptions, registry: ElementRegistry, tree: ElementTree) -> Self {
        Self {
            ids: IdGenerator::resume_after(&tree),
            history: History::with_capacity(tree, options.history_capacity),
            drag: DragSessionCoordinator::new(&options),
            registry,
            options,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ElementRegistry {
        &mut self.registry
    }

    /// The current page.
    pub fn tree(&self) -> &ElementTree {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn drag(&self) -> &DragSessionCoordinator {
        &self.drag
    }

    fn commit(&mut self, tree: ElementTree) {
        self.history.save_state(tree);
    }

    // ------------------------------------------------------------------------
    // Edits

    /// Add a new top-level element of type `kind` at `index` (default: the end).
    ///
    /// # Errors
    /// [`EditorError::MissingTemplate`] if the palette has no such type.
    pub fn add_element(&mut self, kind: ElementType, index: Option<usize>) -> Result<ElementId, EditorError> {
        let template = template_for(&self.registry, kind)?;
        let (tree, id) = self.history.current().add_element(template, index, &mut self.ids);
        self.commit(tree);
        Ok(id)
    }

    /// # Errors
    /// [`EditorError::MissingTemplate`], or the [`TreeError`] for a missing or non-container
    /// `container`.
    pub fn add_to_container(
        &mut self,
        container: &ElementId,
        kind: ElementType,
        index: Option<usize>,
    ) -> Result<ElementId, EditorError> {
        let template = template_for(&self.registry, kind)?;
        let (tree, id) = self
            .history
            .current()
            .add_to_container_at(container, template, index, &mut self.ids)?;
        self.commit(tree);
        Ok(id)
    }

    /// Move `element` to the end of `container`, or of the top level for `None`.
    ///
    /// # Errors
    /// See [`ElementTree::move_to_container`].
    pub fn move_to_container(&mut self, element: &ElementId, container: Option<&ElementId>) -> Result<(), EditorError> {
        let tree = self.history.current().move_to_container(element, container)?;
        self.commit(tree);
        Ok(())
    }

    /// # Errors
    /// See [`ElementTree::move_to`].
    pub fn move_to(
        &mut self,
        element: &ElementId,
        container: Option<&ElementId>,
        index: Option<usize>,
    ) -> Result<(), EditorError> {
        let tree = self.history.current().move_to(element, container, index)?;
        self.commit(tree);
        Ok(())
    }

    /// # Errors
    /// See [`ElementTree::update_element`].
    pub fn update_element(&mut self, updated: &Element) -> Result<(), EditorError> {
        let tree = self.history.current().update_element(updated)?;
        self.commit(tree);
        Ok(())
    }

    /// # Errors
    /// [`TreeError::NotFound`] if `id` is not on the page.
    pub fn update_props(&mut self, id: &ElementId, patch: &Map<String, Value>) -> Result<(), EditorError> {
        let tree = self.history.current().update_props(id, patch)?;
        self.commit(tree);
        Ok(())
    }

    /// # Errors
    /// See [`ElementTree::delete_element`].
    pub fn delete_element(&mut self, id: &ElementId, parent: Option<&ElementId>) -> Result<(), EditorError> {
        let tree = self.history.current().delete_element(id, parent)?;
        self.commit(tree);
        Ok(())
    }

    /// # Errors
    /// See [`ElementTree::duplicate_element`].
    pub fn duplicate_element(&mut self, id: &ElementId, parent: Option<&ElementId>) -> Result<ElementId, EditorError> {
        let (tree, copy) = self
            .history
            .current()
            .duplicate_element(id, parent, &mut self.ids)?;
        self.commit(tree);
        Ok(copy)
    }

    /// # Errors
    /// [`TreeError::IndexOutOfRange`] for a bad index.
    pub fn reorder_elements(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        self.reorder_within(None, from, to)
    }

    /// # Errors
    /// See [`ElementTree::reorder_within`].
    pub fn reorder_within(&mut self, parent: Option<&ElementId>, from: usize, to: usize) -> Result<(), EditorError> {
        let tree = self.history.current().reorder_within(parent, from, to)?;
        if tree != *self.history.current() {
            self.commit(tree);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // History

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    /// Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    // ------------------------------------------------------------------------
    // Drag and drop

    /// # Errors
    /// See [`DragSessionCoordinator::gesture_start`].
    pub fn start_drag(&mut self, payload: DragPayload) -> Result<u64, EditorError> {
        Ok(self.drag.gesture_start(payload, &self.registry)?)
    }

    /// # Errors
    /// See [`DragSessionCoordinator::gesture_start_wire`].
    pub fn start_drag_wire(&mut self, wire: &str) -> Result<u64, EditorError> {
        Ok(self.drag.gesture_start_wire(wire, &self.registry)?)
    }

    pub fn hover_region(&mut self, region: DropRegion, rect: Rect, pointer: Pos2) -> Option<&DropTarget> {
        self.drag
            .pointer_over_region(self.history.current(), region, rect, pointer)
    }

    pub fn hover_candidates(
        &mut self,
        active: Rect,
        pointer: Pos2,
        candidates: &[Candidate<DropRegion>],
    ) -> Option<&DropTarget> {
        self.drag
            .pointer_over_candidates(self.history.current(), active, pointer, candidates)
    }

    pub fn pointer_left(&mut self) {
        self.drag.pointer_left();
    }

    /// Release the gesture over `region`. A [`DropOutcome::Dropped`] tree is committed before
    /// this returns.
    pub fn end_drag(&mut self, region: Option<&DropRegion>) -> DropOutcome {
        let outcome = self
            .drag
            .gesture_end(region, self.history.current(), &mut self.ids);
        if let Some(tree) = outcome.tree() {
            self.commit(tree.clone());
        }
        outcome
    }

    pub fn abort_drag(&mut self) -> DropOutcome {
        self.drag.abort()
    }

    // ------------------------------------------------------------------------
    // Documents

    /// # Errors
    /// Only if JSON serialization itself fails.
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.tree().to_json()?)
    }

    /// Replace the page with a loaded document. Undo history starts over from it, and new ids
    /// are numbered past every id it contains. On error nothing changes.
    ///
    /// # Errors
    /// See [`ElementTree::from_json`].
    pub fn load_json(&mut self, text: &str) -> Result<(), EditorError> {
        let tree = ElementTree::from_json(text)?;
        self.open(tree);
        Ok(())
    }

    /// # Errors
    /// See [`ElementTree::save_to_path`].
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        Ok(self.tree().save_to_path(path)?)
    }

    /// # Errors
    /// See [`ElementTree::load_from_path`].
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let tree = ElementTree::load_from_path(path)?;
        self.open(tree);
        Ok(())
    }

    fn open(&mut self, tree: ElementTree) {
        self.drag.abort();
        self.ids = IdGenerator::resume_after(&tree);
        self.history.reset(tree);
        log::debug!("opened document with {} element(s)", self.tree().count_elements());
    }
}

fn template_for(registry: &ElementRegistry, kind: ElementType) -> Result<&ElementTemplate, EditorError> {
    registry
        .template(kind)
        .ok_or(EditorError::MissingTemplate(kind))
}
