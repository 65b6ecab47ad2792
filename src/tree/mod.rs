//! The page document: an ordered list of top-level [`Element`]s, each possibly holding
//! children of its own.
//!
//! Trees are values. Every edit returns a new tree and leaves the input untouched; untouched
//! subtrees are shared between the two through [`Arc`], so keeping old trees around (as the
//! undo history does) is cheap.

use std::fmt;
use std::sync::Arc;

use crate::element::{Element, ElementId};

mod edit;
mod index;
mod integrity;


pub use index::{ElementIndex, IndexEntry};

/// Why a tree edit was refused. The input tree is unchanged whenever one of these is returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The id does not resolve to any element of the tree.
    NotFound(ElementId),

    /// The element exists but cannot hold children.
    InvalidTarget(ElementId),

    /// Moving `element` into `target` would make it its own descendant.
    SelfContainment {
        element: ElementId,
        target: ElementId,
    },

    /// The edit would introduce an id that is already used elsewhere in the tree.
    DuplicateId(ElementId),

    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "element not found: {id}"),
            Self::InvalidTarget(id) => write!(f, "element {id} cannot hold children"),
            Self::SelfContainment { element, target } => {
                write!(f, "cannot move {element} into itself or its descendant {target}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate element id: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} siblings")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Where an element sits: its parent (`None` for the top level) and its index among siblings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementLocation {
    pub parent: Option<ElementId>,
    pub index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ElementTree {
    roots: Vec<Arc<Element>>,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            roots: elements.into_iter().map(Arc::new).collect(),
        }
    }

    /// The top-level elements, in order.
    pub fn roots(&self) -> &[Arc<Element>] {
        &self.roots
    }

    /// Ids of the top-level elements, in order.
    pub fn root_ids(&self) -> Vec<ElementId> {
        self.roots.iter().map(|e| e.id().clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of elements at every depth.
    pub fn count_elements(&self) -> usize {
        self.roots.iter().map(|e| e.subtree_len()).sum()
    }

    /// Depth-first, pre-order walk over every element.
    pub fn iter(&self) -> ElementIter<'_> {
        ElementIter {
            stack: vec![self.roots.iter()],
        }
    }

    pub fn find_element_by_id(&self, id: &ElementId) -> Option<&Element> {
        self.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.find_element_by_id(id).is_some()
    }

    /// Child indices leading from the top level down to `id`.
    pub fn path_of(&self, id: &ElementId) -> Option<Vec<usize>> {
        fn search(list: &[Arc<Element>], id: &ElementId, path: &mut Vec<usize>) -> bool {
            for (ix, element) in list.iter().enumerate() {
                path.push(ix);
                if element.id() == id || search(element.children(), id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.roots, id, &mut path).then_some(path)
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (&first, rest) = path.split_first()?;
        let mut element: &Element = self.roots.get(first)?;
        for &ix in rest {
            element = &**element.children().get(ix)?;
        }
        Some(element)
    }

    /// The sibling list at `path`: the top level for an empty path, otherwise the children of
    /// the element at `path`.
    pub fn list_at(&self, path: &[usize]) -> Option<&[Arc<Element>]> {
        if path.is_empty() {
            Some(&self.roots)
        } else {
            self.element_at(path).map(Element::children)
        }
    }

    pub fn location(&self, id: &ElementId) -> Option<ElementLocation> {
        let path = self.path_of(id)?;
        let (&index, parent_path) = path.split_last()?;
        let parent = if parent_path.is_empty() {
            None
        } else {
            Some(self.element_at(parent_path)?.id().clone())
        };
        Some(ElementLocation { parent, index })
    }

    /// The children of `parent`, or the top level for `None`.
    pub fn siblings(&self, parent: Option<&ElementId>) -> Option<&[Arc<Element>]> {
        match parent {
            None => Some(&self.roots),
            Some(id) => self.find_element_by_id(id).map(Element::children),
        }
    }

    /// True if `id` is `ancestor` or lies somewhere below it.
    pub fn is_descendant_or_self(&self, ancestor: &ElementId, id: &ElementId) -> bool {
        match (self.path_of(ancestor), self.path_of(id)) {
            (Some(ancestor), Some(path)) => path.starts_with(&ancestor),
            _ => false,
        }
    }
}

/// Iterator returned by [`ElementTree::iter`].
pub struct ElementIter<'a> {
    stack: Vec<std::slice::Iter<'a, Arc<Element>>>,
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(element) => {
                    let element: &'a Element = element;
                    self.stack.push(element.children().iter());
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a ElementTree {
    type Item = &'a Element;
    type IntoIter = ElementIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
