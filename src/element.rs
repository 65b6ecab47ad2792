use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::de::Error as _;
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The reserved property holding the ordered child elements of a container.
pub const CHILDREN_KEY: &str = "children";

/// Identifier of an [`Element`], unique across the whole tree it lives in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The closed set of element kinds a page can be built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Container,
    Section,
    Columns,
    Text,
    Heading,
    Paragraph,
    Image,
    Button,
    Link,
    Divider,
    Spacer,
    Video,
    Icon,
}

impl ElementType {
    pub const ALL: [Self; 13] = [
        Self::Container,
        Self::Section,
        Self::Columns,
        Self::Text,
        Self::Heading,
        Self::Paragraph,
        Self::Image,
        Self::Button,
        Self::Link,
        Self::Divider,
        Self::Spacer,
        Self::Video,
        Self::Icon,
    ];

    /// Only container-capable elements may hold a non-empty `children` sequence.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Container | Self::Section | Self::Columns)
    }

    /// The wire name, as used in documents and drag payloads.
    pub fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Section => "section",
            Self::Columns => "columns",
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Image => "image",
            Self::Button => "button",
            Self::Link => "link",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Video => "video",
            Self::Icon => "icon",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered property map of an element.
///
/// Plain properties keep their insertion order. The reserved `children` property is held
/// separately so that the tree can share untouched subtrees between snapshots, but it is
/// (de)serialized inline with the other properties.
///
/// A `children` slot that is present but empty (`"children": []`) is distinct from an absent
/// one, so documents round-trip exactly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    values: Map<String, Value>,
    children: Option<Vec<Arc<Element>>>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props with an empty `children` slot, as container templates carry.
    pub fn with_children_slot() -> Self {
        Self {
            values: Map::new(),
            children: Some(Vec::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a plain property, returning the previous value.
    ///
    /// `children` is reserved: use [`Self::set_children`] instead. Writes to it are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if key == CHILDREN_KEY {
            log::warn!("ignoring write to reserved property `{CHILDREN_KEY}`");
            return None;
        }
        self.values.insert(key, value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// The plain properties, without `children`.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Overwrite plain properties with the entries of `patch`, keeping the order of existing keys.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            self.insert(key.clone(), value.clone());
        }
    }

    pub fn children(&self) -> &[Arc<Element>] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn has_children_slot(&self) -> bool {
        self.children.is_some()
    }

    pub fn children_slot(&self) -> Option<&Vec<Arc<Element>>> {
        self.children.as_ref()
    }

    pub fn set_children(&mut self, children: Option<Vec<Arc<Element>>>) {
        self.children = children;
    }

    pub(crate) fn children_slot_mut(&mut self) -> &mut Vec<Arc<Element>> {
        self.children.get_or_insert_with(Vec::new)
    }
}

impl FromIterator<(String, Value)> for Props {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}

impl Serialize for Props {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.values.len() + usize::from(self.children.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        if let Some(children) = &self.children {
            map.serialize_entry(CHILDREN_KEY, children)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Props {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut values = Map::<String, Value>::deserialize(deserializer)?;
        let children = match values.shift_remove(CHILDREN_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(Vec::<Arc<Element>>::deserialize(raw).map_err(D::Error::custom)?),
        };
        Ok(Self { values, children })
    }
}

/// A node of the page document.
///
/// Elements carry no parent pointer: position is always derived from the tree root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: ElementId,

    #[serde(rename = "type")]
    pub kind: ElementType,

    #[serde(default)]
    pub props: Props,
}

impl Element {
    pub fn new(id: impl Into<ElementId>, kind: ElementType, props: Props) -> Self {
        Self {
            id: id.into(),
            kind,
            props,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn children(&self) -> &[Arc<Element>] {
        self.props.children()
    }

    /// This element plus all of its descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.subtree_len())
            .sum::<usize>()
    }
}
