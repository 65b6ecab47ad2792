//! Drag-and-drop gestures over the canvas.
//!
//! [`DragSessionCoordinator`] follows one gesture at a time through
//! `Idle -> Dragging <-> Hovering -> Idle`. It never edits a tree in place: a release is
//! turned into exactly one [`DropCommand`], run against the tree the caller passes in, and the
//! resulting tree comes back in the [`DropOutcome`] for the caller to commit.

use std::fmt;

use egui::{Pos2, Rect};

use crate::collision::{self, Candidate, CollisionAlgorithm, CollisionReport};
use crate::element::{ElementId, ElementType};
use crate::ids::IdGenerator;
use crate::options::EditorOptions;
use crate::registry::ElementRegistry;
use crate::tree::ElementTree;

mod command;
mod debug;
mod payload;
mod session;
mod target;

#[cfg(test)]
mod coordinator_tests;

pub use command::{CancelReason, DropCommand, Unchanged};
pub use payload::{DragPayload, PayloadError, PayloadKind};
pub use target::{Axis, DropPosition, DropRegion, DropTarget};

use command::Decision;
use debug::DebugEventLog;
use session::DragSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,

    /// A gesture is running but the pointer is over no droppable region.
    Dragging,

    /// A gesture is running and the pointer is over a droppable region.
    Hovering,
}

/// What follows the pointer during a gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct DragProxy {
    pub label: String,

    /// Last pointer position reported through a hover, if any.
    pub pointer: Option<Pos2>,
}

impl DragProxy {
    fn new(label: String) -> Self {
        Self {
            label,
            pointer: None,
        }
    }
}

/// A gesture could not be started.
#[derive(Debug)]
pub enum DragError {
    Payload(PayloadError),

    /// The palette item has no registered template.
    MissingTemplate(ElementType),
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload(err) => err.fmt(f),
            Self::MissingTemplate(kind) => write!(f, "no template registered for {kind}"),
        }
    }
}

impl std::error::Error for DragError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payload(err) => Some(err),
            Self::MissingTemplate(_) => None,
        }
    }
}

impl From<PayloadError> for DragError {
    fn from(err: PayloadError) -> Self {
        Self::Payload(err)
    }
}

/// How a gesture ended. `session` is the id [`DragSessionCoordinator::gesture_start`] returned.
#[derive(Clone, Debug, PartialEq)]
pub enum DropOutcome {
    /// The drop was applied; `tree` is the result and should be committed.
    Dropped {
        session: u64,
        command: DropCommand,
        tree: ElementTree,

        /// Id of the element a palette drop created.
        created: Option<ElementId>,
    },

    /// A valid drop that leaves the tree as it is. Nothing to commit.
    Unchanged { session: u64, reason: Unchanged },

    /// The gesture ended without a drop. `session` is `None` if no gesture was running.
    Cancelled {
        session: Option<u64>,
        reason: CancelReason,
    },
}

impl DropOutcome {
    pub fn tree(&self) -> Option<&ElementTree> {
        match self {
            Self::Dropped { tree, .. } => Some(tree),
            Self::Unchanged { .. } | Self::Cancelled { .. } => None,
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped { .. })
    }
}

/// Drives one drag gesture at a time and translates its release into a tree operation.
#[derive(Debug)]
pub struct DragSessionCoordinator {
    axis: Axis,
    hover_algorithm: CollisionAlgorithm,
    session: DragSession,
    debug: DebugEventLog,
    last_report: Option<CollisionReport<DropRegion>>,
}

impl Default for DragSessionCoordinator {
    fn default() -> Self {
        Self::new(&EditorOptions::default())
    }
}

impl DragSessionCoordinator {
    pub fn new(options: &EditorOptions) -> Self {
        Self {
            axis: options.default_axis,
            hover_algorithm: options.hover_algorithm,
            session: DragSession::default(),
            debug: DebugEventLog::new(options.debug_event_log, options.debug_event_log_capacity),
            last_report: None,
        }
    }

    pub fn set_axis(&mut self, axis: Axis) {
        self.axis = axis;
    }

    pub fn set_hover_algorithm(&mut self, algorithm: CollisionAlgorithm) {
        self.hover_algorithm = algorithm;
    }

    pub fn phase(&self) -> DragPhase {
        match self.session.active() {
            None => DragPhase::Idle,
            Some(gesture) if gesture.hover.is_some() => DragPhase::Hovering,
            Some(_) => DragPhase::Dragging,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.active().is_some()
    }

    /// Id of the running gesture.
    pub fn session_id(&self) -> Option<u64> {
        self.session.active().map(|gesture| gesture.id)
    }

    /// Id of the most recently ended (released, aborted, or superseded) gesture.
    pub fn last_session_id(&self) -> Option<u64> {
        self.session.last_finished()
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        self.session.active().map(|gesture| &gesture.payload)
    }

    pub fn proxy(&self) -> Option<&DragProxy> {
        self.session.active().map(|gesture| &gesture.proxy)
    }

    pub fn hover_target(&self) -> Option<&DropTarget> {
        self.session.active().and_then(|gesture| gesture.hover.as_ref())
    }

    /// The full ranking behind the last [`Self::pointer_over_candidates`] call of this gesture.
    pub fn last_collision_report(&self) -> Option<&CollisionReport<DropRegion>> {
        self.last_report.as_ref()
    }

    /// Begin a gesture carrying `payload`. A gesture that is still running is cancelled first.
    ///
    /// Palette payloads are checked against `registry` here, so a release never fails for a
    /// missing template.
    ///
    /// # Errors
    /// [`DragError::MissingTemplate`] if `registry` does not know the palette item. The running
    /// gesture, if any, is left alone.
    pub fn gesture_start(&mut self, payload: DragPayload, registry: &ElementRegistry) -> Result<u64, DragError> {
        let template = match &payload {
            DragPayload::NewFromPalette { element_type } => {
                let Some(template) = registry.template(*element_type) else {
                    self.debug
                        .push(format!("session START refused: no template for {element_type}"));
                    return Err(DragError::MissingTemplate(*element_type));
                };
                Some(template.clone())
            }
            DragPayload::ExistingCanvasElement { .. } => None,
        };

        let kind = payload.kind().wire_name();
        let proxy = DragProxy::new(payload.label());
        let (id, superseded) = self.session.start(payload, template, proxy);
        if let Some(old) = superseded {
            self.debug
                .push(format!("session CANCEL id={} reason={:?}", old.id, CancelReason::Superseded));
        }
        self.last_report = None;
        self.debug.push(format!("session START id={id} kind={kind}"));
        Ok(id)
    }

    /// [`Self::gesture_start`] with a payload in its wire form,
    /// `{"kind": "panel-element" | "canvas-element", ...}`.
    ///
    /// # Errors
    /// [`DragError::Payload`] if `wire` does not parse; no gesture is started and a later
    /// release reports [`CancelReason::NoActiveGesture`].
    pub fn gesture_start_wire(&mut self, wire: &str, registry: &ElementRegistry) -> Result<u64, DragError> {
        let payload = match DragPayload::from_wire(wire) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("ignoring drag with unusable payload: {err}");
                self.debug.push(format!("session START refused: {err}"));
                return Err(err.into());
            }
        };
        self.gesture_start(payload, registry)
    }

    /// The pointer is over `region`, which occupies `rect` on screen.
    ///
    /// Returns the resolved target, or `None` (and drops any previous hover) if no gesture is
    /// running or `region` names an element that is not in `tree`.
    pub fn pointer_over_region(
        &mut self,
        tree: &ElementTree,
        region: DropRegion,
        rect: Rect,
        pointer: Pos2,
    ) -> Option<&DropTarget> {
        let axis = self.axis;
        let gesture = self.session.active_mut()?;
        gesture.proxy.pointer = Some(pointer);

        let is_container = match &region {
            DropRegion::Canvas => true,
            DropRegion::Element(id) => match tree.find_element_by_id(id) {
                Some(element) => element.is_container(),
                None => {
                    if gesture.hover.take().is_some() {
                        self.debug
                            .push(format!("hover LOST id={} (region {id} not in tree)", gesture.id));
                    }
                    return None;
                }
            },
        };

        let position = target::position_in(is_container, rect, pointer, axis);
        let resolved = target::resolve(tree, &region, position);
        if resolved != gesture.hover {
            self.debug.push(format!(
                "hover id={} region={region:?} position={position:?}",
                gesture.id
            ));
        }
        gesture.hover = resolved;
        gesture.hover.as_ref()
    }

    /// The dragged element occupies `active` and the pointer is at `pointer`; `candidates` are
    /// the droppable regions on screen. The configured [`CollisionAlgorithm`] picks the one the
    /// gesture is over.
    pub fn pointer_over_candidates(
        &mut self,
        tree: &ElementTree,
        active: Rect,
        pointer: Pos2,
        candidates: &[Candidate<DropRegion>],
    ) -> Option<&DropTarget> {
        if !self.is_dragging() {
            return None;
        }
        let report = collision::detect_collisions(active, candidates);
        let winner = report
            .best(self.hover_algorithm)
            .map(|best| (best.id.clone(), best.rect));
        self.last_report = Some(report);

        match winner {
            Some((region, rect)) => self.pointer_over_region(tree, region, rect, pointer),
            None => {
                self.pointer_left();
                None
            }
        }
    }

    /// The pointer left every droppable region.
    pub fn pointer_left(&mut self) {
        if let Some(gesture) = self.session.active_mut() {
            if gesture.hover.take().is_some() {
                self.debug.push(format!("hover CLEAR id={}", gesture.id));
            }
        }
    }

    /// The gesture was released over `region` (`None`: outside every droppable region).
    ///
    /// Decides and runs the single tree operation the drop stands for. The gesture ends here
    /// whatever the outcome, so a repeated release is a no-op reporting
    /// [`CancelReason::NoActiveGesture`].
    pub fn gesture_end(
        &mut self,
        region: Option<&DropRegion>,
        tree: &ElementTree,
        ids: &mut IdGenerator,
    ) -> DropOutcome {
        let Some(gesture) = self.session.finish() else {
            return self.cancelled(None, CancelReason::NoActiveGesture);
        };
        let session = gesture.id;

        let Some(region) = region else {
            return self.cancelled(Some(session), CancelReason::OutsideDroppable);
        };

        // The hover is only trusted for the region it was computed for, and is re-resolved since
        // the tree may have changed underneath the gesture.
        let position = gesture
            .hover
            .as_ref()
            .filter(|hover| &hover.region == region)
            .map(|hover| hover.position)
            .or_else(|| target::default_position(tree, region));
        let Some(target) = position.and_then(|position| target::resolve(tree, region, position)) else {
            return self.cancelled(Some(session), CancelReason::TargetMissing(region.clone()));
        };

        match command::decide(tree, &gesture.payload, gesture.template.as_ref(), &target) {
            Decision::Apply(command) => match command.apply(tree, ids) {
                Ok((tree, created)) => {
                    self.debug
                        .push(format!("session DROP id={session} command={command:?}"));
                    DropOutcome::Dropped {
                        session,
                        command,
                        tree,
                        created,
                    }
                }
                Err(err) => self.cancelled(Some(session), CancelReason::Rejected(err)),
            },
            Decision::Unchanged(reason) => {
                self.debug
                    .push(format!("session DROP id={session} unchanged={reason:?}"));
                DropOutcome::Unchanged { session, reason }
            }
            Decision::Cancel(reason) => self.cancelled(Some(session), reason),
        }
    }

    /// Abandon the running gesture without touching the tree.
    pub fn abort(&mut self) -> DropOutcome {
        let session = self.session.finish().map(|gesture| gesture.id);
        let reason = match session {
            Some(_) => CancelReason::Aborted,
            None => CancelReason::NoActiveGesture,
        };
        self.cancelled(session, reason)
    }

    fn cancelled(&mut self, session: Option<u64>, reason: CancelReason) -> DropOutcome {
        match session {
            Some(id) => self.debug.push(format!("session CANCEL id={id} reason={reason:?}")),
            None => self.debug.push("session RELEASE (no active session)"),
        }
        DropOutcome::Cancelled { session, reason }
    }

    pub fn set_debug_event_log(&mut self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    /// The recorded drag events, oldest first, one per line.
    pub fn debug_log_text(&self) -> String {
        self.debug.text()
    }

    pub fn debug_log_clear(&mut self) {
        self.debug.clear();
    }
}
