use crate::element::{ElementId, ElementType};
use crate::ids::IdGenerator;
use crate::registry::ElementTemplate;
use crate::tree::{ElementTree, TreeError};

use super::payload::DragPayload;
use super::target::{DropRegion, DropTarget};

/// The single tree operation a completed drop performs.
#[derive(Clone, Debug, PartialEq)]
pub enum DropCommand {
    AddElement {
        template: ElementTemplate,
        index: Option<usize>,
    },
    AddToContainer {
        container: ElementId,
        template: ElementTemplate,
        index: Option<usize>,
    },
    MoveToContainer {
        element: ElementId,
        container: Option<ElementId>,
        /// Index in the destination list once `element` has been detached.
        index: Option<usize>,
    },
    Reorder {
        parent: Option<ElementId>,
        from: usize,
        to: usize,
    },
}

impl DropCommand {
    /// Run the command, returning the new tree and the id of the element created, if any.
    ///
    /// # Errors
    /// Whatever the underlying tree operation refuses.
    pub fn apply(&self, tree: &ElementTree, ids: &mut IdGenerator) -> Result<(ElementTree, Option<ElementId>), TreeError> {
        match self {
            Self::AddElement { template, index } => {
                let (tree, id) = tree.add_element(template, *index, ids);
                Ok((tree, Some(id)))
            }
            Self::AddToContainer {
                container,
                template,
                index,
            } => {
                let (tree, id) = tree.add_to_container_at(container, template, *index, ids)?;
                Ok((tree, Some(id)))
            }
            Self::MoveToContainer {
                element,
                container,
                index,
            } => Ok((tree.move_to(element, container.as_ref(), *index)?, None)),
            Self::Reorder { parent: None, from, to } => {
                Ok((tree.reorder_elements(*from, *to)?, None))
            }
            Self::Reorder { parent, from, to } => {
                Ok((tree.reorder_within(parent.as_ref(), *from, *to)?, None))
            }
        }
    }
}

/// A drop that is valid but changes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unchanged {
    /// The element was dropped onto or into itself.
    SelfDrop,

    /// The element was dropped where it already is.
    SamePosition,
}

/// Why a gesture ended without touching the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// Released while no gesture was in progress (including a repeated release).
    NoActiveGesture,

    /// Released outside any droppable region.
    OutsideDroppable,

    /// Explicitly aborted, e.g. with the escape key.
    Aborted,

    /// A new gesture started before this one ended.
    Superseded,

    /// The drop region names an element that no longer exists.
    TargetMissing(DropRegion),

    /// The dragged element no longer exists.
    SourceMissing(ElementId),

    /// No template is registered for the dragged palette item.
    MissingTemplate(ElementType),

    /// The tree refused the operation.
    Rejected(TreeError),
}

pub(crate) enum Decision {
    Apply(DropCommand),
    Unchanged(Unchanged),
    Cancel(CancelReason),
}

/// Pick the tree operation for dropping `payload` onto `target`.
///
/// | payload            | into the top level            | into a container            |
/// |--------------------|-------------------------------|-----------------------------|
/// | new from palette   | `AddElement`                  | `AddToContainer`            |
/// | existing element   | `MoveToContainer(None)`       | `MoveToContainer(container)`|
///
/// An existing element dropped into the list it already lives in is a `Reorder` instead.
pub(crate) fn decide(
    tree: &ElementTree,
    payload: &DragPayload,
    template: Option<&ElementTemplate>,
    target: &DropTarget,
) -> Decision {
    match payload {
        DragPayload::NewFromPalette { element_type } => {
            let Some(template) = template.filter(|t| t.kind == *element_type) else {
                return Decision::Cancel(CancelReason::MissingTemplate(*element_type));
            };
            let template = template.clone();
            Decision::Apply(match &target.parent {
                None => DropCommand::AddElement {
                    template,
                    index: target.index,
                },
                Some(container) => DropCommand::AddToContainer {
                    container: container.clone(),
                    template,
                    index: target.index,
                },
            })
        }
        DragPayload::ExistingCanvasElement { source_id, .. } => {
            decide_existing(tree, source_id, target)
        }
    }
}

fn decide_existing(tree: &ElementTree, source_id: &ElementId, target: &DropTarget) -> Decision {
    let Some(source) = tree.location(source_id) else {
        return Decision::Cancel(CancelReason::SourceMissing(source_id.clone()));
    };

    if target.region == DropRegion::Element(source_id.clone())
        || target.parent.as_ref() == Some(source_id)
    {
        return Decision::Unchanged(Unchanged::SelfDrop);
    }
    if let Some(parent) = &target.parent {
        if tree.is_descendant_or_self(source_id, parent) {
            return Decision::Cancel(CancelReason::Rejected(TreeError::SelfContainment {
                element: source_id.clone(),
                target: parent.clone(),
            }));
        }
    }

    if target.parent != source.parent {
        return Decision::Apply(DropCommand::MoveToContainer {
            element: source_id.clone(),
            container: target.parent.clone(),
            index: target.index,
        });
    }

    // A bare canvas drop names no position, so a top-level element stays where it is.
    if target.region == DropRegion::Canvas && target.index.is_none() {
        return Decision::Unchanged(Unchanged::SamePosition);
    }

    let len = tree
        .siblings(source.parent.as_ref())
        .map_or(0, <[_]>::len);
    let last = len.saturating_sub(1);
    let to = match target.index {
        None => last,
        Some(ix) if ix > source.index => ix - 1,
        Some(ix) => ix,
    }
    .min(last);

    if to == source.index {
        Decision::Unchanged(Unchanged::SamePosition)
    } else {
        Decision::Apply(DropCommand::Reorder {
            parent: source.parent,
            from: source.index,
            to,
        })
    }
}
