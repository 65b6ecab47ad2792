use std::collections::BTreeMap;

use serde_json::json;

use crate::element::{ElementType, Props};

/// What the palette hands to the tree when a new element is created: a type plus the
/// default properties to copy into the element.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTemplate {
    #[serde(rename = "type")]
    pub kind: ElementType,

    #[serde(default)]
    pub default_props: Props,
}

impl ElementTemplate {
    pub fn new(kind: ElementType, default_props: Props) -> Self {
        Self {
            kind,
            default_props,
        }
    }
}

/// Template lookup by element type.
///
/// This is an explicit value handed to whoever creates elements, not process-wide state.
/// [`Default`] yields the built-in templates; [`Self::empty`] starts from nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementRegistry {
    templates: BTreeMap<ElementType, ElementTemplate>,
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ElementRegistry {
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for kind in ElementType::ALL {
            registry.register(ElementTemplate::new(kind, builtin_props(kind)));
        }
        registry
    }

    /// Parse a JSON array of `{ "type": …, "defaultProps": { … } }` templates.
    ///
    /// # Errors
    /// Fails if `text` is not such an array.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let templates: Vec<ElementTemplate> = serde_json::from_str(text)?;
        let mut registry = Self::empty();
        for template in templates {
            registry.register(template);
        }
        Ok(registry)
    }

    /// Add or replace the template for its type, returning the one it replaced.
    pub fn register(&mut self, mut template: ElementTemplate) -> Option<ElementTemplate> {
        if !template.kind.is_container() && template.default_props.has_children_slot() {
            log::warn!(
                "template for {} carries children but the type cannot hold any; dropping them",
                template.kind
            );
            template.default_props.set_children(None);
        }
        self.templates.insert(template.kind, template)
    }

    pub fn template(&self, kind: ElementType) -> Option<&ElementTemplate> {
        self.templates.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn builtin_props(kind: ElementType) -> Props {
    let props = if kind.is_container() {
        Props::with_children_slot()
    } else {
        Props::new()
    };
    match kind {
        ElementType::Container => props.with("padding", 16).with("gap", 8),
        ElementType::Section => props.with("padding", 32).with("background", "#ffffff"),
        ElementType::Columns => props.with("columns", 2).with("gap", 16),
        ElementType::Text => props.with("text", "Text"),
        ElementType::Heading => props.with("text", "Heading").with("level", 2),
        ElementType::Paragraph => props.with("text", "Lorem ipsum dolor sit amet."),
        ElementType::Image => props.with("src", "").with("alt", ""),
        ElementType::Button => props.with("label", "Button").with("href", ""),
        ElementType::Link => props.with("text", "Link").with("href", "#"),
        ElementType::Divider => props.with("thickness", 1),
        ElementType::Spacer => props.with("height", 24),
        ElementType::Video => props.with("src", "").with("autoplay", false),
        ElementType::Icon => props.with("name", "star").with("size", json!(24)),
    }
}
