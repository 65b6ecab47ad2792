use std::sync::Arc;

use serde_json::{Map, Value};

use super::{ElementTree, TreeError};
use crate::element::{Element, ElementId};
use crate::ids::IdGenerator;
use crate::registry::ElementTemplate;

fn rejected(op: &'static str, err: TreeError) -> TreeError {
    log::debug!("{op}: {err}");
    err
}

/// Deep copy of `source` where the copy and every descendant get a fresh id.
fn fresh_copy(source: &Element, ids: &mut IdGenerator, tree: &ElementTree) -> Element {
    let id = ids.next_unused(source.kind, tree);
    let mut props = source.props.clone();
    if let Some(children) = source.props.children_slot() {
        let copies = children
            .iter()
            .map(|child| Arc::new(fresh_copy(child, ids, tree)))
            .collect();
        props.set_children(Some(copies));
    }
    Element::new(id, source.kind, props)
}

fn clamp_index(index: Option<usize>, len: usize) -> usize {
    index.map_or(len, |ix| ix.min(len))
}

impl ElementTree {
    /// Create a new element from `template`. The template's props are copied verbatim, and any
    /// children it carries are copied with fresh ids.
    pub fn instantiate(&self, template: &ElementTemplate, ids: &mut IdGenerator) -> Element {
        let seed = Element::new(
            ElementId::new(String::new()),
            template.kind,
            template.default_props.clone(),
        );
        fresh_copy(&seed, ids, self)
    }

    /// Rebuild the path down to the sibling list at `parent_path` and hand that list to `edit`.
    ///
    /// Only the elements on the path are copied; every other subtree stays shared with `self`.
    /// Returns `None` if the path does not exist.
    fn edit_list<R>(
        &self,
        parent_path: &[usize],
        edit: impl FnOnce(&mut Vec<Arc<Element>>) -> R,
    ) -> Option<(Self, R)> {
        let mut roots = self.roots.clone();
        let out = {
            let mut list = &mut roots;
            for &ix in parent_path {
                list = Arc::make_mut(list.get_mut(ix)?).props.children_slot_mut();
            }
            edit(list)
        };
        Some((Self { roots }, out))
    }

    fn edit_element(&self, path: &[usize], edit: impl FnOnce(&mut Element)) -> Option<Self> {
        let (&ix, parent_path) = path.split_last()?;
        let (tree, found) = self.edit_list(parent_path, |list| {
            list.get_mut(ix).map(|slot| edit(Arc::make_mut(slot))).is_some()
        })?;
        found.then_some(tree)
    }

    fn remove_at(&self, path: &[usize]) -> Option<(Self, Arc<Element>)> {
        let (&ix, parent_path) = path.split_last()?;
        let (tree, removed) =
            self.edit_list(parent_path, |list| (ix < list.len()).then(|| list.remove(ix)))?;
        Some((tree, removed?))
    }

    fn insert_at(&self, parent_path: &[usize], index: Option<usize>, element: Arc<Element>) -> Option<Self> {
        let (tree, ()) = self.edit_list(parent_path, |list| {
            let at = clamp_index(index, list.len());
            list.insert(at, element);
        })?;
        Some(tree)
    }

    /// Path of a container-capable element.
    fn container_path(&self, id: &ElementId) -> Result<Vec<usize>, TreeError> {
        let path = self
            .path_of(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        match self.element_at(&path) {
            Some(element) if element.is_container() => Ok(path),
            Some(_) => Err(TreeError::InvalidTarget(id.clone())),
            None => Err(TreeError::NotFound(id.clone())),
        }
    }

    /// Path of `id`, looked up among the direct children of `parent` when given, otherwise
    /// anywhere in the tree.
    fn scoped_path(&self, id: &ElementId, parent: Option<&ElementId>) -> Result<Vec<usize>, TreeError> {
        let not_found = || TreeError::NotFound(id.clone());
        let Some(parent) = parent else {
            return self.path_of(id).ok_or_else(not_found);
        };
        let mut path = self
            .path_of(parent)
            .ok_or_else(|| TreeError::NotFound(parent.clone()))?;
        let ix = self
            .list_at(&path)
            .and_then(|children| children.iter().position(|c| c.id() == id))
            .ok_or_else(not_found)?;
        path.push(ix);
        Ok(path)
    }

    /// Append a new top-level element built from `template` at `index` (default: the end).
    pub fn add_element(
        &self,
        template: &ElementTemplate,
        index: Option<usize>,
        ids: &mut IdGenerator,
    ) -> (Self, ElementId) {
        let element = self.instantiate(template, ids);
        let id = element.id().clone();
        let mut roots = self.roots.clone();
        let at = clamp_index(index, roots.len());
        roots.insert(at, Arc::new(element));
        (Self { roots }, id)
    }

    /// Append a new element built from `template` to the children of `container`.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] or [`TreeError::InvalidTarget`] if `container` is missing or
    /// cannot hold children.
    pub fn add_to_container(
        &self,
        container: &ElementId,
        template: &ElementTemplate,
        ids: &mut IdGenerator,
    ) -> Result<(Self, ElementId), TreeError> {
        self.add_to_container_at(container, template, None, ids)
    }

    /// [`Self::add_to_container`] at a given child index (clamped; `None` appends).
    ///
    /// # Errors
    /// Same as [`Self::add_to_container`].
    pub fn add_to_container_at(
        &self,
        container: &ElementId,
        template: &ElementTemplate,
        index: Option<usize>,
        ids: &mut IdGenerator,
    ) -> Result<(Self, ElementId), TreeError> {
        let path = self
            .container_path(container)
            .map_err(|err| rejected("add_to_container", err))?;
        let element = self.instantiate(template, ids);
        let id = element.id().clone();
        let tree = self
            .insert_at(&path, index, Arc::new(element))
            .ok_or_else(|| TreeError::NotFound(container.clone()))?;
        Ok((tree, id))
    }

    /// Detach `element` from wherever it is and append it to `container`, or to the top level
    /// for `None`.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] for a missing element or container,
    /// [`TreeError::InvalidTarget`] if the container cannot hold children, and
    /// [`TreeError::SelfContainment`] if the container is the element itself or lies inside it.
    pub fn move_to_container(
        &self,
        element: &ElementId,
        container: Option<&ElementId>,
    ) -> Result<Self, TreeError> {
        self.move_to(element, container, None)
    }

    /// [`Self::move_to_container`] at a given child index.
    ///
    /// `index` counts positions in the destination list *after* the element was detached, and
    /// is clamped to its length. `None` appends.
    ///
    /// # Errors
    /// Same as [`Self::move_to_container`].
    pub fn move_to(
        &self,
        element: &ElementId,
        container: Option<&ElementId>,
        index: Option<usize>,
    ) -> Result<Self, TreeError> {
        let source = self
            .path_of(element)
            .ok_or_else(|| rejected("move", TreeError::NotFound(element.clone())))?;

        if let Some(container) = container {
            let target = self
                .container_path(container)
                .map_err(|err| rejected("move", err))?;
            if target.starts_with(&source) {
                return Err(rejected(
                    "move",
                    TreeError::SelfContainment {
                        element: element.clone(),
                        target: container.clone(),
                    },
                ));
            }
        }

        let (detached, moved) = self
            .remove_at(&source)
            .ok_or_else(|| TreeError::NotFound(element.clone()))?;
        let target = match container {
            Some(container) => detached
                .path_of(container)
                .ok_or_else(|| TreeError::NotFound(container.clone()))?,
            None => Vec::new(),
        };
        detached
            .insert_at(&target, index, moved)
            .ok_or_else(|| TreeError::NotFound(element.clone()))
    }

    /// Replace the element with the same id as `updated`, keeping its position.
    ///
    /// The existing children are kept unless `updated` has a `children` slot of its own.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] if no element has that id, [`TreeError::InvalidTarget`] if the
    /// result would be a non-container with children, and [`TreeError::DuplicateId`] if
    /// supplied children reuse ids found elsewhere in the tree.
    pub fn update_element(&self, updated: &Element) -> Result<Self, TreeError> {
        let id = updated.id();
        let path = self
            .path_of(id)
            .ok_or_else(|| rejected("update_element", TreeError::NotFound(id.clone())))?;
        let current = self
            .element_at(&path)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;

        let mut replacement = updated.clone();
        if !replacement.props.has_children_slot() {
            replacement
                .props
                .set_children(current.props.children_slot().cloned());
        }
        if !replacement.is_container() && !replacement.children().is_empty() {
            return Err(rejected("update_element", TreeError::InvalidTarget(id.clone())));
        }

        if updated.props.has_children_slot() {
            let mut kept = ahash::HashSet::default();
            let mut pending: Vec<&Element> = vec![current];
            while let Some(element) = pending.pop() {
                kept.insert(element.id().clone());
                pending.extend(element.children().iter().map(|c| &**c));
            }

            let mut seen = ahash::HashSet::default();
            let mut pending: Vec<&Element> = replacement.children().iter().map(|c| &**c).collect();
            while let Some(element) = pending.pop() {
                let child_id = element.id();
                let reused_elsewhere = !kept.contains(child_id) && self.contains(child_id);
                if child_id == id || reused_elsewhere || !seen.insert(child_id.clone()) {
                    return Err(rejected(
                        "update_element",
                        TreeError::DuplicateId(child_id.clone()),
                    ));
                }
                pending.extend(element.children().iter().map(|c| &**c));
            }
        }

        self.edit_element(&path, |slot| *slot = replacement)
            .ok_or_else(|| TreeError::NotFound(id.clone()))
    }

    /// Merge `patch` into the plain props of `id`, leaving children alone.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] if no element has that id.
    pub fn update_props(&self, id: &ElementId, patch: &Map<String, Value>) -> Result<Self, TreeError> {
        let path = self
            .path_of(id)
            .ok_or_else(|| rejected("update_props", TreeError::NotFound(id.clone())))?;
        self.edit_element(&path, |element| element.props.merge(patch))
            .ok_or_else(|| TreeError::NotFound(id.clone()))
    }

    /// Remove `id` and its whole subtree. With `parent`, only that element's direct children
    /// are searched.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] if the element (or the given parent) does not exist.
    pub fn delete_element(&self, id: &ElementId, parent: Option<&ElementId>) -> Result<Self, TreeError> {
        let path = self
            .scoped_path(id, parent)
            .map_err(|err| rejected("delete_element", err))?;
        let (tree, _removed) = self
            .remove_at(&path)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        Ok(tree)
    }

    /// Deep-copy `id` with fresh ids throughout and insert the copy right after the original.
    /// With `parent`, the original is looked up among that element's direct children.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] if the element (or the given parent) does not exist.
    pub fn duplicate_element(
        &self,
        id: &ElementId,
        parent: Option<&ElementId>,
        ids: &mut IdGenerator,
    ) -> Result<(Self, ElementId), TreeError> {
        let path = self
            .scoped_path(id, parent)
            .map_err(|err| rejected("duplicate_element", err))?;
        let original = self
            .element_at(&path)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let copy = fresh_copy(original, ids, self);
        let copy_id = copy.id().clone();

        let (&ix, parent_path) = path
            .split_last()
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let tree = self
            .insert_at(parent_path, Some(ix + 1), Arc::new(copy))
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        Ok((tree, copy_id))
    }

    /// Move the top-level element at `from` to `to`, shifting the ones in between.
    ///
    /// # Errors
    /// [`TreeError::IndexOutOfRange`] if either index is past the end.
    pub fn reorder_elements(&self, from: usize, to: usize) -> Result<Self, TreeError> {
        self.reorder_within(None, from, to)
    }

    /// Like [`Self::reorder_elements`], among the children of `parent`.
    ///
    /// # Errors
    /// [`TreeError::NotFound`] for a missing parent, [`TreeError::IndexOutOfRange`] for bad
    /// indices.
    pub fn reorder_within(&self, parent: Option<&ElementId>, from: usize, to: usize) -> Result<Self, TreeError> {
        let path = match parent {
            Some(parent) => self
                .path_of(parent)
                .ok_or_else(|| rejected("reorder", TreeError::NotFound(parent.clone())))?,
            None => Vec::new(),
        };
        let len = self.list_at(&path).map_or(0, <[_]>::len);
        for index in [from, to] {
            if index >= len {
                return Err(rejected("reorder", TreeError::IndexOutOfRange { index, len }));
            }
        }
        if from == to {
            return Ok(self.clone());
        }

        let (tree, ()) = self
            .edit_list(&path, |list| {
                let element = list.remove(from);
                list.insert(to, element);
            })
            .ok_or(TreeError::IndexOutOfRange { index: from, len })?;
        Ok(tree)
    }
}
