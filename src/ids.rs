use crate::element::{ElementId, ElementType};
use crate::tree::ElementTree;

/// Hands out element ids of the form `"<type>-<n>"` from a strictly increasing counter.
///
/// One generator is scoped to one document. After loading a document, use
/// [`Self::resume_after`] so that fresh ids never collide with stored ones.
///
/// If the counter ever runs out, numbering restarts under a new generation and ids take the
/// form `"<type>-<generation>x<n>"`, so no id is handed out twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
    generation: u32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            next: 1,
            generation: 0,
        }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose counter is past every numeric id suffix found in `tree`.
    pub fn resume_after(tree: &ElementTree) -> Self {
        let mut ids = Self::new();
        for element in tree.iter() {
            ids.observe(element.id());
        }
        ids
    }

    /// Make sure the counter never produces `id` again.
    ///
    /// Suffixes too large to step past are ignored; [`Self::next_unused`] still skips them.
    pub fn observe(&mut self, id: &ElementId) {
        let next = id
            .as_str()
            .rsplit_once('-')
            .and_then(|(_, n)| n.parse::<u64>().ok())
            .and_then(|n| n.checked_add(1))
            .filter(|&next| next < u64::MAX);
        match next {
            Some(next) => self.next = self.next.max(next),
            None => log::trace!("id {id} does not move the counter"),
        }
    }

    /// The value the next id will be numbered with.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn next_for(&mut self, kind: ElementType) -> ElementId {
        let n = self.next;
        let id = if self.generation == 0 {
            format!("{}-{n}", kind.name())
        } else {
            format!("{}-{}x{n}", kind.name(), self.generation)
        };
        match n.checked_add(1) {
            Some(next) => self.next = next,
            None => {
                self.generation = self.generation.saturating_add(1);
                self.next = 1;
                log::warn!("id counter exhausted, starting generation {}", self.generation);
            }
        }
        ElementId::new(id)
    }

    /// Like [`Self::next_for`], skipping ids already present in `tree`.
    ///
    /// At most one more id than `tree` holds is tried; since generated ids are distinct, one of
    /// them is free.
    pub fn next_unused(&mut self, kind: ElementType, tree: &ElementTree) -> ElementId {
        for _ in 0..tree.count_elements() {
            let id = self.next_for(kind);
            if !tree.contains(&id) {
                return id;
            }
            log::debug!("id {id} already taken, skipping");
        }
        self.next_for(kind)
    }
}
