use std::sync::Arc;

use super::ElementTree;
use crate::element::{Element, ElementId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: Vec<usize>,
    pub parent: Option<ElementId>,
}

/// Id → position lookup table for one tree snapshot.
///
/// Building it costs one walk; afterwards lookups avoid re-walking the tree. It describes
/// exactly the tree it was built from and is never serialized. Rebuild after every edit.
#[derive(Clone, Debug, Default)]
pub struct ElementIndex {
    entries: ahash::HashMap<ElementId, IndexEntry>,
    duplicates: Vec<ElementId>,
}

impl ElementIndex {
    pub fn build(tree: &ElementTree) -> Self {
        fn visit(
            list: &[Arc<Element>],
            parent: Option<&ElementId>,
            path: &mut Vec<usize>,
            index: &mut ElementIndex,
        ) {
            for (ix, element) in list.iter().enumerate() {
                path.push(ix);
                let entry = IndexEntry {
                    path: path.clone(),
                    parent: parent.cloned(),
                };
                if index.entries.insert(element.id().clone(), entry).is_some() {
                    index.duplicates.push(element.id().clone());
                }
                visit(element.children(), Some(element.id()), path, index);
                path.pop();
            }
        }

        let mut index = Self::default();
        visit(tree.roots(), None, &mut Vec::new(), &mut index);
        index
    }

    pub fn get(&self, id: &ElementId) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn path(&self, id: &ElementId) -> Option<&[usize]> {
        self.entries.get(id).map(|e| e.path.as_slice())
    }

    /// `Some(None)` for a top-level element, `None` if `id` is unknown.
    pub fn parent(&self, id: &ElementId) -> Option<Option<&ElementId>> {
        self.entries.get(id).map(|e| e.parent.as_ref())
    }

    pub fn is_descendant_or_self(&self, ancestor: &ElementId, id: &ElementId) -> bool {
        match (self.path(ancestor), self.path(id)) {
            (Some(ancestor), Some(path)) => path.starts_with(ancestor),
            _ => false,
        }
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids seen more than once while building. Empty for a well-formed tree.
    pub fn duplicates(&self) -> &[ElementId] {
        &self.duplicates
    }
}

impl ElementTree {
    pub fn index(&self) -> ElementIndex {
        ElementIndex::build(self)
    }
}
