use std::sync::Arc;

use crate::element::{Element, ElementType, Props};
use crate::ids::IdGenerator;
use crate::registry::ElementTemplate;
use crate::tree::ElementTree;

/// A small convenience builder for constructing an [`ElementTree`] from code.
///
/// Ids come from the builder's own [`IdGenerator`], which is handed back by [`Self::build`] so
/// that later edits keep numbering where the builder stopped.
///
/// ```
/// use page_builder::{ElementType, PageBuilder, Props};
///
/// let mut page = PageBuilder::new();
/// let title = page.text("Welcome");
/// let cta = page.element(ElementType::Button, Props::new().with("label", "Sign up"));
/// let hero = page.container(ElementType::Section, vec![title, cta]);
/// let (tree, _ids) = page.build(vec![hero]);
/// assert_eq!(tree.count_elements(), 3);
/// ```
#[derive(Debug, Default)]
pub struct PageBuilder {
    ids: IdGenerator,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering from an existing generator.
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self { ids }
    }

    pub fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// A leaf element with the given props.
    #[must_use]
    pub fn element(&mut self, kind: ElementType, props: Props) -> Element {
        Element::new(self.ids.next_for(kind), kind, props)
    }

    #[must_use]
    pub fn text(&mut self, text: &str) -> Element {
        self.element(ElementType::Text, Props::new().with("text", text))
    }

    /// A container-capable element holding `children`, in order.
    #[must_use]
    pub fn container(&mut self, kind: ElementType, children: Vec<Element>) -> Element {
        debug_assert!(kind.is_container(), "{kind} cannot hold children");

        let mut props = Props::with_children_slot();
        props.set_children(Some(children.into_iter().map(Arc::new).collect()));
        Element::new(self.ids.next_for(kind), kind, props)
    }

    /// An element with the template's default props.
    #[must_use]
    pub fn from_template(&mut self, template: &ElementTemplate) -> Element {
        ElementTree::new().instantiate(template, &mut self.ids)
    }

    /// Finish building, producing the tree and the generator to keep using with it.
    pub fn build(self, roots: Vec<Element>) -> (ElementTree, IdGenerator) {
        (ElementTree::from_elements(roots), self.ids)
    }
}
