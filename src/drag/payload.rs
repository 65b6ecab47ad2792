use std::fmt;

use crate::element::{ElementId, ElementType};

const KIND_PANEL: &str = "panel-element";
const KIND_CANVAS: &str = "canvas-element";

/// What a gesture is carrying and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragPayload {
    /// A new element of this type, dragged out of the palette.
    NewFromPalette { element_type: ElementType },

    /// An element already on the canvas. `source_index` and `source_parent` are as observed at
    /// gesture start (`source_parent == None` is the top level); the tree is authoritative at
    /// drop time.
    ExistingCanvasElement {
        source_id: ElementId,
        source_index: Option<usize>,
        source_parent: Option<ElementId>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    NewFromPalette,
    ExistingCanvasElement,
}

impl PayloadKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::NewFromPalette => KIND_PANEL,
            Self::ExistingCanvasElement => KIND_CANVAS,
        }
    }
}

#[derive(Debug)]
pub enum PayloadError {
    Json(serde_json::Error),
    UnknownKind(String),
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed drag payload: {err}"),
            Self::UnknownKind(kind) => write!(f, "unknown drag payload kind: {kind:?}"),
            Self::MissingField { kind, field } => {
                write!(f, "drag payload of kind {kind:?} lacks `{field}`")
            }
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnknownKind(_) | Self::MissingField { .. } => None,
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// `{ kind, elementType?, id?, index?, parentId? }`
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_type: Option<ElementType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ElementId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<ElementId>,
}

impl DragPayload {
    pub fn palette(element_type: ElementType) -> Self {
        Self::NewFromPalette { element_type }
    }

    pub fn canvas(source_id: ElementId, source_index: Option<usize>, source_parent: Option<ElementId>) -> Self {
        Self::ExistingCanvasElement {
            source_id,
            source_index,
            source_parent,
        }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::NewFromPalette { .. } => PayloadKind::NewFromPalette,
            Self::ExistingCanvasElement { .. } => PayloadKind::ExistingCanvasElement,
        }
    }

    /// Short text for the drag proxy.
    pub fn label(&self) -> String {
        match self {
            Self::NewFromPalette { element_type } => format!("new {element_type}"),
            Self::ExistingCanvasElement { source_id, .. } => source_id.to_string(),
        }
    }

    /// # Errors
    /// Only if JSON serialization itself fails.
    pub fn to_wire(&self) -> Result<String, PayloadError> {
        let wire = match self {
            Self::NewFromPalette { element_type } => WirePayload {
                kind: KIND_PANEL.to_owned(),
                element_type: Some(*element_type),
                ..Default::default()
            },
            Self::ExistingCanvasElement {
                source_id,
                source_index,
                source_parent,
            } => WirePayload {
                kind: KIND_CANVAS.to_owned(),
                id: Some(source_id.clone()),
                index: *source_index,
                parent_id: source_parent.clone(),
                ..Default::default()
            },
        };
        Ok(serde_json::to_string(&wire)?)
    }

    /// # Errors
    /// [`PayloadError`] if `text` is not a JSON payload object, names an unknown kind, or lacks
    /// the field its kind needs.
    pub fn from_wire(text: &str) -> Result<Self, PayloadError> {
        let wire: WirePayload = serde_json::from_str(text)?;
        match wire.kind.as_str() {
            KIND_PANEL => {
                let element_type = wire.element_type.ok_or(PayloadError::MissingField {
                    kind: KIND_PANEL,
                    field: "elementType",
                })?;
                Ok(Self::NewFromPalette { element_type })
            }
            KIND_CANVAS => {
                let source_id = wire.id.ok_or(PayloadError::MissingField {
                    kind: KIND_CANVAS,
                    field: "id",
                })?;
                Ok(Self::ExistingCanvasElement {
                    source_id,
                    source_index: wire.index,
                    source_parent: wire.parent_id,
                })
            }
            _ => Err(PayloadError::UnknownKind(wire.kind)),
        }
    }
}
