use egui::{Pos2, Rect};

use crate::element::ElementId;
use crate::tree::ElementTree;

/// A screen area that can receive a drop: the canvas itself, or one element on it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropRegion {
    Canvas,
    Element(ElementId),
}

impl DropRegion {
    pub fn element(id: impl Into<ElementId>) -> Self {
        Self::Element(id.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Direction siblings are laid out in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    /// Top to bottom.
    #[default]
    Vertical,

    /// Left to right.
    Horizontal,
}

/// A hovered region resolved against the tree: where exactly the dragged element would land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropTarget {
    pub region: DropRegion,
    pub position: DropPosition,

    /// The list the drop lands in: `None` for the top level.
    pub parent: Option<ElementId>,

    /// Index in `parent`'s current children, before anything is detached. `None` appends.
    pub index: Option<usize>,
}

/// Containers (and the canvas) swallow drops; other elements split at their midpoint along
/// the layout axis.
pub(crate) fn position_in(is_container: bool, rect: Rect, pointer: Pos2, axis: Axis) -> DropPosition {
    if is_container {
        return DropPosition::Inside;
    }
    let before = match axis {
        Axis::Vertical => pointer.y < rect.center().y,
        Axis::Horizontal => pointer.x < rect.center().x,
    };
    if before {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

/// Where a drop onto `region` lands without any pointer geometry.
pub(crate) fn default_position(tree: &ElementTree, region: &DropRegion) -> Option<DropPosition> {
    match region {
        DropRegion::Canvas => Some(DropPosition::Inside),
        DropRegion::Element(id) => {
            let element = tree.find_element_by_id(id)?;
            Some(if element.is_container() {
                DropPosition::Inside
            } else {
                DropPosition::After
            })
        }
    }
}

/// Resolve `region` + `position` to a concrete parent list and index.
///
/// `None` if the region names an element that is not in `tree` (any more).
pub(crate) fn resolve(tree: &ElementTree, region: &DropRegion, position: DropPosition) -> Option<DropTarget> {
    let (parent, index, position) = match region {
        DropRegion::Canvas => (None, None, DropPosition::Inside),
        DropRegion::Element(id) => {
            let element = tree.find_element_by_id(id)?;
            let location = tree.location(id)?;
            match position {
                DropPosition::Inside if element.is_container() => {
                    (Some(id.clone()), None, DropPosition::Inside)
                }
                DropPosition::Before => (location.parent, Some(location.index), position),
                DropPosition::After | DropPosition::Inside => {
                    (location.parent, Some(location.index + 1), DropPosition::After)
                }
            }
        }
    };
    Some(DropTarget {
        region: region.clone(),
        position,
        parent,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PageBuilder;
    use crate::element::ElementType;
    use egui::Vec2;

    #[test]
    fn midpoint_rule_follows_axis() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 40.0));
        let upper_right = Pos2::new(90.0, 5.0);
        assert_eq!(
            position_in(false, rect, upper_right, Axis::Vertical),
            DropPosition::Before
        );
        assert_eq!(
            position_in(false, rect, upper_right, Axis::Horizontal),
            DropPosition::After
        );
        assert_eq!(
            position_in(true, rect, upper_right, Axis::Vertical),
            DropPosition::Inside
        );
    }

    #[test]
    fn resolves_against_tree() {
        let mut page = PageBuilder::new();
        let a = page.text("a");
        let b = page.text("b");
        let section = page.container(ElementType::Section, vec![a, b]);
        let (tree, _) = page.build(vec![section]);

        let before_b = resolve(&tree, &DropRegion::element("text-2"), DropPosition::Before).unwrap();
        assert_eq!(before_b.parent, Some(ElementId::from("section-3")));
        assert_eq!(before_b.index, Some(1));

        let into = resolve(&tree, &DropRegion::element("section-3"), DropPosition::Inside).unwrap();
        assert_eq!((into.parent, into.index), (Some(ElementId::from("section-3")), None));

        // Leaves cannot take a drop inside; it lands after them instead.
        let onto_leaf = resolve(&tree, &DropRegion::element("text-1"), DropPosition::Inside).unwrap();
        assert_eq!(onto_leaf.position, DropPosition::After);
        assert_eq!(onto_leaf.index, Some(1));

        let canvas = resolve(&tree, &DropRegion::Canvas, DropPosition::Before).unwrap();
        assert_eq!((canvas.parent, canvas.index), (None, None));

        assert!(resolve(&tree, &DropRegion::element("gone"), DropPosition::After).is_none());
    }
}
