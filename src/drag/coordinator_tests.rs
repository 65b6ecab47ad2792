use egui::{Pos2, Rect, Vec2};

use super::*;
use crate::builder::PageBuilder;
use crate::tree::TreeError;

fn id(s: &str) -> ElementId {
    ElementId::from(s)
}

fn child_ids(tree: &ElementTree, parent: Option<&str>) -> Vec<String> {
    let parent = parent.map(id);
    tree.siblings(parent.as_ref())
        .unwrap_or_default()
        .iter()
        .map(|e| e.id().to_string())
        .collect()
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, h))
}

/// ```text
/// section-4
/// ├── text-1
/// └── container-3
///     └── text-2
/// text-5
/// ```
fn sample() -> (ElementTree, IdGenerator) {
    let mut page = PageBuilder::new();
    let a = page.text("a");
    let b = page.text("b");
    let inner = page.container(ElementType::Container, vec![b]);
    let outer = page.container(ElementType::Section, vec![a, inner]);
    let c = page.text("c");
    page.build(vec![outer, c])
}

/// `text-1`, `text-2`, `text-3` side by side at the top level.
fn flat() -> (ElementTree, IdGenerator) {
    let mut page = PageBuilder::new();
    let roots = vec![page.text("1"), page.text("2"), page.text("3")];
    page.build(roots)
}

fn canvas_payload(tree: &ElementTree, source: &str) -> DragPayload {
    let source = id(source);
    let location = tree.location(&source);
    DragPayload::canvas(
        source,
        location.as_ref().map(|l| l.index),
        location.and_then(|l| l.parent),
    )
}

/// Start a gesture and release it over `region` without any hover in between.
fn drop_on(
    tree: &ElementTree,
    ids: &mut IdGenerator,
    payload: DragPayload,
    region: Option<DropRegion>,
) -> DropOutcome {
    let mut drag = DragSessionCoordinator::default();
    drag.gesture_start(payload, &ElementRegistry::builtin())
        .unwrap();
    drag.gesture_end(region.as_ref(), tree, ids)
}

#[test]
fn palette_drop_on_canvas_appends_at_top_level() {
    let (tree, mut ids) = sample();
    let outcome = drop_on(
        &tree,
        &mut ids,
        DragPayload::palette(ElementType::Image),
        Some(DropRegion::Canvas),
    );
    let DropOutcome::Dropped {
        command,
        tree: after,
        created,
        ..
    } = outcome
    else {
        panic!("expected a drop");
    };
    assert!(matches!(command, DropCommand::AddElement { index: None, .. }));
    assert_eq!(created, Some(id("image-6")));
    assert_eq!(child_ids(&after, None), ["section-4", "text-5", "image-6"]);
    // The input tree is untouched.
    assert_eq!(tree.count_elements(), 5);
}

#[test]
fn palette_drop_on_container_adds_inside() {
    let (tree, mut ids) = sample();
    let outcome = drop_on(
        &tree,
        &mut ids,
        DragPayload::palette(ElementType::Button),
        Some(DropRegion::element("container-3")),
    );
    let DropOutcome::Dropped { command, tree: after, .. } = outcome else {
        panic!("expected a drop");
    };
    assert!(matches!(
        command,
        DropCommand::AddToContainer { ref container, index: None, .. } if *container == id("container-3")
    ));
    assert_eq!(
        child_ids(&after, Some("container-3")),
        ["text-2", "button-6"]
    );
}

#[test]
fn palette_drop_uses_hover_position() {
    let (tree, mut ids) = sample();
    let mut drag = DragSessionCoordinator::default();
    drag.gesture_start(DragPayload::palette(ElementType::Divider), &ElementRegistry::builtin())
        .unwrap();

    let text_rect = rect(0.0, 100.0, 200.0, 40.0);
    let target = drag
        .pointer_over_region(&tree, DropRegion::element("text-1"), text_rect, Pos2::new(50.0, 105.0))
        .cloned()
        .unwrap();
    assert_eq!(target.position, DropPosition::Before);
    assert_eq!((target.parent.clone(), target.index), (Some(id("section-4")), Some(0)));
    assert_eq!(drag.phase(), DragPhase::Hovering);
    assert_eq!(drag.proxy().unwrap().pointer, Some(Pos2::new(50.0, 105.0)));

    let outcome = drag.gesture_end(Some(&DropRegion::element("text-1")), &tree, &mut ids);
    let after = outcome.tree().unwrap();
    assert_eq!(
        child_ids(after, Some("section-4")),
        ["divider-6", "text-1", "container-3"]
    );
    assert_eq!(drag.phase(), DragPhase::Idle);
}

#[test]
fn hover_on_another_region_is_not_trusted() {
    let (tree, mut ids) = sample();
    let mut drag = DragSessionCoordinator::default();
    drag.gesture_start(DragPayload::palette(ElementType::Text), &ElementRegistry::builtin())
        .unwrap();
    drag.pointer_over_region(
        &tree,
        DropRegion::element("text-1"),
        rect(0.0, 0.0, 100.0, 20.0),
        Pos2::new(1.0, 1.0),
    );

    // Released over text-5 instead: the default position for a leaf is after it.
    let outcome = drag.gesture_end(Some(&DropRegion::element("text-5")), &tree, &mut ids);
    assert_eq!(
        child_ids(outcome.tree().unwrap(), None),
        ["section-4", "text-5", "text-6"]
    );
}

#[test]
fn existing_element_moves_between_parents() {
    let (tree, mut ids) = sample();

    let into_section = drop_on(
        &tree,
        &mut ids,
        canvas_payload(&tree, "text-5"),
        Some(DropRegion::element("section-4")),
    );
    let DropOutcome::Dropped { command, tree: after, created, .. } = into_section else {
        panic!("expected a drop");
    };
    assert_eq!(
        command,
        DropCommand::MoveToContainer {
            element: id("text-5"),
            container: Some(id("section-4")),
            index: None,
        }
    );
    assert_eq!(created, None);
    assert_eq!(
        child_ids(&after, Some("section-4")),
        ["text-1", "container-3", "text-5"]
    );
    assert_eq!(child_ids(&after, None), ["section-4"]);

    let to_top = drop_on(
        &tree,
        &mut ids,
        canvas_payload(&tree, "text-2"),
        Some(DropRegion::Canvas),
    );
    let after = to_top.tree().unwrap();
    assert_eq!(child_ids(after, None), ["section-4", "text-5", "text-2"]);
    assert!(child_ids(after, Some("container-3")).is_empty());
    assert_eq!(after.count_elements(), tree.count_elements());
}

#[test]
fn same_parent_drop_reorders() {
    let (tree, mut ids) = flat();
    let mut drag = DragSessionCoordinator::default();
    let registry = ElementRegistry::builtin();
    let leaf = rect(0.0, 0.0, 100.0, 40.0);

    // text-3 before text-1.
    drag.gesture_start(canvas_payload(&tree, "text-3"), &registry).unwrap();
    drag.pointer_over_region(&tree, DropRegion::element("text-1"), leaf, Pos2::new(5.0, 5.0));
    let outcome = drag.gesture_end(Some(&DropRegion::element("text-1")), &tree, &mut ids);
    let DropOutcome::Dropped { command, tree: after, .. } = outcome else {
        panic!("expected a drop");
    };
    assert_eq!(
        command,
        DropCommand::Reorder {
            parent: None,
            from: 2,
            to: 0,
        }
    );
    assert_eq!(child_ids(&after, None), ["text-3", "text-1", "text-2"]);

    // text-1 after text-2: the index is counted once text-1 is out of the way.
    drag.gesture_start(canvas_payload(&tree, "text-1"), &registry).unwrap();
    drag.pointer_over_region(&tree, DropRegion::element("text-2"), leaf, Pos2::new(5.0, 35.0));
    let outcome = drag.gesture_end(Some(&DropRegion::element("text-2")), &tree, &mut ids);
    assert_eq!(
        child_ids(outcome.tree().unwrap(), None),
        ["text-2", "text-1", "text-3"]
    );
}

#[test]
fn drop_in_place_changes_nothing() {
    let (tree, mut ids) = flat();
    let mut drag = DragSessionCoordinator::default();
    let leaf = rect(0.0, 0.0, 100.0, 40.0);

    // text-1 before text-2 is where it already is.
    let session = drag
        .gesture_start(canvas_payload(&tree, "text-1"), &ElementRegistry::builtin())
        .unwrap();
    drag.pointer_over_region(&tree, DropRegion::element("text-2"), leaf, Pos2::new(5.0, 5.0));
    let outcome = drag.gesture_end(Some(&DropRegion::element("text-2")), &tree, &mut ids);
    assert_eq!(
        outcome,
        DropOutcome::Unchanged {
            session,
            reason: Unchanged::SamePosition,
        }
    );

    // The last element dropped on the canvas stays last.
    let outcome = drop_on(&tree, &mut ids, canvas_payload(&tree, "text-3"), Some(DropRegion::Canvas));
    assert!(matches!(
        outcome,
        DropOutcome::Unchanged {
            reason: Unchanged::SamePosition,
            ..
        }
    ));
}

#[test]
fn top_level_element_dropped_on_canvas_keeps_its_place() {
    let (tree, mut ids) = flat();
    for source in ["text-1", "text-2"] {
        let outcome = drop_on(&tree, &mut ids, canvas_payload(&tree, source), Some(DropRegion::Canvas));
        assert!(
            matches!(
                outcome,
                DropOutcome::Unchanged {
                    reason: Unchanged::SamePosition,
                    ..
                }
            ),
            "{source}: {outcome:?}"
        );
    }
    assert_eq!(child_ids(&tree, None), ["text-1", "text-2", "text-3"]);
}

#[test]
fn dropping_onto_itself_is_a_no_op() {
    let (tree, mut ids) = sample();
    for region in ["text-1", "container-3"] {
        let outcome = drop_on(
            &tree,
            &mut ids,
            canvas_payload(&tree, region),
            Some(DropRegion::element(region)),
        );
        assert!(
            matches!(
                outcome,
                DropOutcome::Unchanged {
                    reason: Unchanged::SelfDrop,
                    ..
                }
            ),
            "{region}: {outcome:?}"
        );
    }
}

#[test]
fn dropping_into_own_descendant_is_rejected() {
    let (tree, mut ids) = sample();
    let outcome = drop_on(
        &tree,
        &mut ids,
        canvas_payload(&tree, "section-4"),
        Some(DropRegion::element("container-3")),
    );
    assert_eq!(
        outcome,
        DropOutcome::Cancelled {
            session: Some(1),
            reason: CancelReason::Rejected(TreeError::SelfContainment {
                element: id("section-4"),
                target: id("container-3"),
            }),
        }
    );
}

#[test]
fn missing_source_or_target_cancels() {
    let (tree, mut ids) = sample();

    let ghost = DragPayload::canvas(id("ghost-9"), Some(0), None);
    let outcome = drop_on(&tree, &mut ids, ghost, Some(DropRegion::Canvas));
    assert!(matches!(
        outcome,
        DropOutcome::Cancelled {
            reason: CancelReason::SourceMissing(ref source),
            ..
        } if *source == id("ghost-9")
    ));

    let outcome = drop_on(
        &tree,
        &mut ids,
        DragPayload::palette(ElementType::Text),
        Some(DropRegion::element("gone")),
    );
    assert!(matches!(
        outcome,
        DropOutcome::Cancelled {
            reason: CancelReason::TargetMissing(_),
            ..
        }
    ));
}

#[test]
fn release_outside_cancels_and_second_release_is_ignored() {
    let (tree, mut ids) = sample();
    let mut drag = DragSessionCoordinator::default();
    let session = drag
        .gesture_start(DragPayload::palette(ElementType::Text), &ElementRegistry::builtin())
        .unwrap();

    assert_eq!(
        drag.gesture_end(None, &tree, &mut ids),
        DropOutcome::Cancelled {
            session: Some(session),
            reason: CancelReason::OutsideDroppable,
        }
    );
    assert_eq!(
        drag.gesture_end(Some(&DropRegion::Canvas), &tree, &mut ids),
        DropOutcome::Cancelled {
            session: None,
            reason: CancelReason::NoActiveGesture,
        }
    );
    assert_eq!(drag.last_session_id(), Some(session));
    assert_eq!(ids.peek(), 6, "no id was spent");
}

#[test]
fn abort_and_supersede() {
    let registry = ElementRegistry::builtin();
    let mut drag = DragSessionCoordinator::default();

    let first = drag.gesture_start(DragPayload::palette(ElementType::Text), &registry).unwrap();
    let second = drag.gesture_start(DragPayload::palette(ElementType::Image), &registry).unwrap();
    assert_ne!(first, second);
    assert_eq!(drag.last_session_id(), Some(first));
    assert_eq!(drag.session_id(), Some(second));
    assert_eq!(drag.payload(), Some(&DragPayload::palette(ElementType::Image)));

    assert_eq!(
        drag.abort(),
        DropOutcome::Cancelled {
            session: Some(second),
            reason: CancelReason::Aborted,
        }
    );
    assert_eq!(drag.phase(), DragPhase::Idle);
    assert!(matches!(
        drag.abort(),
        DropOutcome::Cancelled {
            session: None,
            reason: CancelReason::NoActiveGesture,
        }
    ));
}

#[test]
fn unusable_payloads_never_start_a_gesture() {
    let (tree, mut ids) = sample();
    let mut drag = DragSessionCoordinator::default();

    let err = drag
        .gesture_start_wire("{not json", &ElementRegistry::builtin())
        .unwrap_err();
    assert!(matches!(err, DragError::Payload(PayloadError::Json(_))));

    let err = drag
        .gesture_start(DragPayload::palette(ElementType::Video), &ElementRegistry::empty())
        .unwrap_err();
    assert!(matches!(err, DragError::MissingTemplate(ElementType::Video)));

    assert_eq!(drag.phase(), DragPhase::Idle);
    assert!(matches!(
        drag.gesture_end(Some(&DropRegion::Canvas), &tree, &mut ids),
        DropOutcome::Cancelled {
            reason: CancelReason::NoActiveGesture,
            ..
        }
    ));
}

#[test]
fn wire_payload_drives_a_move() {
    let (tree, mut ids) = sample();
    let mut drag = DragSessionCoordinator::default();
    drag.gesture_start_wire(
        r#"{"kind":"canvas-element","id":"text-1","index":0,"parentId":"section-4"}"#,
        &ElementRegistry::builtin(),
    )
    .unwrap();
    assert_eq!(drag.proxy().unwrap().label, "text-1");

    let outcome = drag.gesture_end(Some(&DropRegion::element("container-3")), &tree, &mut ids);
    assert_eq!(
        child_ids(outcome.tree().unwrap(), Some("container-3")),
        ["text-2", "text-1"]
    );
}

#[test]
fn phases_follow_the_pointer() {
    let (tree, _) = sample();
    let mut drag = DragSessionCoordinator::default();
    assert_eq!(drag.phase(), DragPhase::Idle);
    assert!(drag
        .pointer_over_region(&tree, DropRegion::Canvas, rect(0.0, 0.0, 10.0, 10.0), Pos2::ZERO)
        .is_none());

    drag.gesture_start(DragPayload::palette(ElementType::Text), &ElementRegistry::builtin())
        .unwrap();
    assert_eq!(drag.phase(), DragPhase::Dragging);

    drag.pointer_over_region(&tree, DropRegion::Canvas, rect(0.0, 0.0, 10.0, 10.0), Pos2::ZERO);
    assert_eq!(drag.phase(), DragPhase::Hovering);

    drag.pointer_left();
    assert_eq!(drag.phase(), DragPhase::Dragging);
    assert!(drag.hover_target().is_none());

    // A region that has disappeared from the tree clears the hover.
    drag.pointer_over_region(&tree, DropRegion::Canvas, rect(0.0, 0.0, 10.0, 10.0), Pos2::ZERO);
    drag.pointer_over_region(&tree, DropRegion::element("gone"), rect(0.0, 0.0, 10.0, 10.0), Pos2::ZERO);
    assert_eq!(drag.phase(), DragPhase::Dragging);
}

#[test]
fn collision_picks_the_hovered_region() {
    let (tree, mut ids) = sample();
    let mut drag = DragSessionCoordinator::default();
    drag.gesture_start(DragPayload::palette(ElementType::Image), &ElementRegistry::builtin())
        .unwrap();

    let candidates = [
        Candidate::new(DropRegion::element("section-4"), rect(0.0, 0.0, 400.0, 200.0)),
        Candidate::new(DropRegion::element("text-5"), rect(0.0, 220.0, 400.0, 40.0)),
    ];
    let dragged = rect(10.0, 215.0, 100.0, 40.0);
    let target = drag
        .pointer_over_candidates(&tree, dragged, Pos2::new(60.0, 250.0), &candidates)
        .cloned()
        .unwrap();
    assert_eq!(target.region, DropRegion::element("text-5"));
    assert_eq!(target.position, DropPosition::After);

    let report = drag.last_collision_report().unwrap();
    assert_eq!(
        report.best(CollisionAlgorithm::Smart).map(|m| m.via),
        Some(CollisionAlgorithm::IntersectionRatio)
    );

    let outcome = drag.gesture_end(Some(&target.region), &tree, &mut ids);
    assert_eq!(
        child_ids(outcome.tree().unwrap(), None),
        ["section-4", "text-5", "image-6"]
    );

    // Nothing in range: the hover is dropped.
    drag.gesture_start(DragPayload::palette(ElementType::Image), &ElementRegistry::builtin())
        .unwrap();
    assert!(drag
        .pointer_over_candidates(&tree, dragged, Pos2::ZERO, &[])
        .is_none());
    assert_eq!(drag.phase(), DragPhase::Dragging);
}

#[test]
fn repeated_region_uses_the_winning_rect() {
    let (tree, _ids) = sample();
    let mut drag = DragSessionCoordinator::default();
    drag.gesture_start(DragPayload::palette(ElementType::Image), &ElementRegistry::builtin())
        .unwrap();

    // text-5 is laid out twice; only the second copy is under the dragged rect.
    let candidates = [
        Candidate::new(DropRegion::element("text-5"), rect(0.0, 0.0, 400.0, 40.0)),
        Candidate::new(DropRegion::element("text-5"), rect(0.0, 300.0, 400.0, 40.0)),
    ];
    let dragged = rect(10.0, 295.0, 100.0, 40.0);
    let target = drag
        .pointer_over_candidates(&tree, dragged, Pos2::new(60.0, 305.0), &candidates)
        .cloned()
        .unwrap();
    assert_eq!(target.region, DropRegion::element("text-5"));
    assert_eq!(target.position, DropPosition::Before);

    let best = drag
        .last_collision_report()
        .and_then(|report| report.best(CollisionAlgorithm::Smart))
        .unwrap();
    assert_eq!(best.rect, candidates[1].rect);
}

#[test]
fn debug_log_records_sessions() {
    let (tree, mut ids) = sample();
    let options = EditorOptions {
        debug_event_log: true,
        ..Default::default()
    };
    let mut drag = DragSessionCoordinator::new(&options);
    drag.gesture_start(DragPayload::palette(ElementType::Text), &ElementRegistry::builtin())
        .unwrap();
    drag.gesture_end(Some(&DropRegion::Canvas), &tree, &mut ids);

    let text = drag.debug_log_text();
    assert!(text.starts_with("session START id=1 kind=panel-element"), "{text}");
    assert!(text.contains("session DROP id=1"), "{text}");

    drag.debug_log_clear();
    assert!(drag.debug_log_text().is_empty());
}
