use crate::registry::ElementTemplate;

use super::payload::DragPayload;
use super::target::DropTarget;
use super::DragProxy;

#[derive(Debug, Default)]
pub(super) struct DragSession {
    next_id: u64,
    active: Option<ActiveGesture>,
    last_finished: Option<u64>,
}

#[derive(Debug)]
pub(super) struct ActiveGesture {
    pub(super) id: u64,
    pub(super) payload: DragPayload,

    /// Resolved from the registry at gesture start for palette drags.
    pub(super) template: Option<ElementTemplate>,

    pub(super) proxy: DragProxy,
    pub(super) hover: Option<DropTarget>,
}

impl DragSession {
    /// Begin a gesture, returning its id and the gesture it replaced, if one was still running.
    pub(super) fn start(
        &mut self,
        payload: DragPayload,
        template: Option<ElementTemplate>,
        proxy: DragProxy,
    ) -> (u64, Option<ActiveGesture>) {
        let id = self.next_id.max(1);
        self.next_id = id.saturating_add(1);
        let superseded = self.active.replace(ActiveGesture {
            id,
            payload,
            template,
            proxy,
            hover: None,
        });
        if let Some(old) = &superseded {
            self.last_finished = Some(old.id);
        }
        (id, superseded)
    }

    pub(super) fn active(&self) -> Option<&ActiveGesture> {
        self.active.as_ref()
    }

    pub(super) fn active_mut(&mut self) -> Option<&mut ActiveGesture> {
        self.active.as_mut()
    }

    /// End the running gesture. A second call returns `None` until the next [`Self::start`].
    pub(super) fn finish(&mut self) -> Option<ActiveGesture> {
        let ended = self.active.take()?;
        self.last_finished = Some(ended.id);
        Some(ended)
    }

    pub(super) fn last_finished(&self) -> Option<u64> {
        self.last_finished
    }
}
