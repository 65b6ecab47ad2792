use std::collections::VecDeque;

/// Bounded record of drag events, for on-screen debugging.
///
/// Every event also goes to the `log` facade at debug level; the in-memory copy is only kept
/// while enabled.
#[derive(Clone, Debug)]
pub(super) struct DebugEventLog {
    enabled: bool,
    capacity: usize,
    lines: VecDeque<String>,
}

impl DebugEventLog {
    pub(super) fn new(enabled: bool, capacity: usize) -> Self {
        Self {
            enabled,
            capacity: capacity.clamp(1, 10_000),
            lines: VecDeque::new(),
        }
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(super) fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{message}");
        if !self.enabled {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(message);
    }

    pub(super) fn clear(&mut self) {
        self.lines.clear();
    }

    pub(super) fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub(super) fn text(&self) -> String {
        itertools::Itertools::join(&mut self.lines(), "\n")
    }
}
