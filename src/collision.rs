//! Ranking of droppable rectangles against the rectangle being dragged.
//!
//! Everything here is a pure function of its inputs. All algorithms run on every query so that
//! a debug overlay can show how they disagree; [`CollisionReport::best`] picks the one in use.

use egui::{Pos2, Rect};
use itertools::iproduct;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionAlgorithm {
    /// Distance between rectangle centers, smallest wins.
    CenterDistance,

    /// Smallest distance between any corner of one rectangle and any corner of the other.
    CornerDistance,

    /// Overlap area over the active rectangle's area, largest wins. Non-overlapping candidates
    /// never win.
    IntersectionRatio,

    /// Intersection ratio if anything overlaps, center distance otherwise.
    #[default]
    Smart,
}

/// A droppable rectangle, tagged with whatever identifies its owner.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<Id> {
    pub id: Id,
    pub rect: Rect,
}

impl<Id> Candidate<Id> {
    pub fn new(id: Id, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// The winning candidate of one algorithm and the score it won with: a distance in points, or
/// a ratio in `0.0..=1.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionMatch<Id> {
    pub id: Id,

    /// The winning candidate's rectangle. Ids need not be unique among candidates.
    pub rect: Rect,
    pub score: f32,

    /// Which algorithm produced this match. For [`CollisionAlgorithm::Smart`] this is the
    /// sub-algorithm that actually decided.
    pub via: CollisionAlgorithm,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollisionReport<Id> {
    pub center_distance: Option<CollisionMatch<Id>>,
    pub corner_distance: Option<CollisionMatch<Id>>,
    pub intersection_ratio: Option<CollisionMatch<Id>>,
    pub smart: Option<CollisionMatch<Id>>,
}

impl<Id> CollisionReport<Id> {
    pub fn best(&self, algorithm: CollisionAlgorithm) -> Option<&CollisionMatch<Id>> {
        match algorithm {
            CollisionAlgorithm::CenterDistance => self.center_distance.as_ref(),
            CollisionAlgorithm::CornerDistance => self.corner_distance.as_ref(),
            CollisionAlgorithm::IntersectionRatio => self.intersection_ratio.as_ref(),
            CollisionAlgorithm::Smart => self.smart.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.smart.is_none() && self.center_distance.is_none() && self.corner_distance.is_none()
    }
}

/// Run every algorithm over `candidates`.
///
/// Ties go to the candidate that comes first in `candidates`.
pub fn detect_collisions<Id: Clone>(active: Rect, candidates: &[Candidate<Id>]) -> CollisionReport<Id> {
    let center_distance = closest_center(active, candidates);
    let intersection_ratio = largest_intersection(active, candidates);
    let smart = smart_from(intersection_ratio.as_ref(), center_distance.as_ref());
    CollisionReport {
        center_distance,
        corner_distance: closest_corners(active, candidates),
        intersection_ratio,
        smart,
    }
}

/// Run one algorithm over `candidates`.
pub fn detect<Id: Clone>(
    algorithm: CollisionAlgorithm,
    active: Rect,
    candidates: &[Candidate<Id>],
) -> Option<CollisionMatch<Id>> {
    match algorithm {
        CollisionAlgorithm::CenterDistance => closest_center(active, candidates),
        CollisionAlgorithm::CornerDistance => closest_corners(active, candidates),
        CollisionAlgorithm::IntersectionRatio => largest_intersection(active, candidates),
        CollisionAlgorithm::Smart => {
            let intersection = largest_intersection(active, candidates);
            if intersection.is_some() {
                smart_from(intersection.as_ref(), None)
            } else {
                smart_from(None, closest_center(active, candidates).as_ref())
            }
        }
    }
}

pub fn closest_center<Id: Clone>(active: Rect, candidates: &[Candidate<Id>]) -> Option<CollisionMatch<Id>> {
    let center = active.center();
    pick(
        candidates,
        CollisionAlgorithm::CenterDistance,
        |rect| Some(center.distance(rect.center())),
        |score, best| score < best,
    )
}

pub fn closest_corners<Id: Clone>(active: Rect, candidates: &[Candidate<Id>]) -> Option<CollisionMatch<Id>> {
    let active_corners = corners(active);
    pick(
        candidates,
        CollisionAlgorithm::CornerDistance,
        |rect| {
            iproduct!(active_corners, corners(rect))
                .map(|(a, b)| a.distance(b))
                .reduce(f32::min)
        },
        |score, best| score < best,
    )
}

pub fn largest_intersection<Id: Clone>(
    active: Rect,
    candidates: &[Candidate<Id>],
) -> Option<CollisionMatch<Id>> {
    pick(
        candidates,
        CollisionAlgorithm::IntersectionRatio,
        |rect| intersection_ratio(active, rect),
        |score, best| score > best,
    )
}

fn smart_from<Id: Clone>(
    intersection: Option<&CollisionMatch<Id>>,
    center: Option<&CollisionMatch<Id>>,
) -> Option<CollisionMatch<Id>> {
    intersection.or(center).map(|m| CollisionMatch {
        id: m.id.clone(),
        rect: m.rect,
        score: m.score,
        via: m.via,
    })
}

/// Overlap of `candidate` with `active`, as a fraction of `active`'s area.
///
/// A degenerate (zero-area) active rectangle counts as fully inside any candidate that
/// contains its center. `None` means no overlap.
pub fn intersection_ratio(active: Rect, candidate: Rect) -> Option<f32> {
    let active_area = positive_area(active);
    if active_area <= 0.0 || !active_area.is_finite() {
        return candidate.contains(active.center()).then_some(1.0);
    }
    let overlap = overlap_area(active, candidate);
    (overlap > 0.0).then(|| (overlap / active_area).clamp(0.0, 1.0))
}

fn positive_area(rect: Rect) -> f32 {
    rect.width().max(0.0) * rect.height().max(0.0)
}

fn overlap_area(a: Rect, b: Rect) -> f32 {
    let width = (a.max.x.min(b.max.x) - a.min.x.max(b.min.x)).max(0.0);
    let height = (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0);
    width * height
}

fn corners(rect: Rect) -> [Pos2; 4] {
    [
        rect.left_top(),
        rect.right_top(),
        rect.left_bottom(),
        rect.right_bottom(),
    ]
}

/// First candidate with the best finite score. `better(score, best)` must be strict so that
/// ties keep the earlier candidate.
fn pick<Id: Clone>(
    candidates: &[Candidate<Id>],
    via: CollisionAlgorithm,
    score: impl Fn(Rect) -> Option<f32>,
    better: impl Fn(f32, f32) -> bool,
) -> Option<CollisionMatch<Id>> {
    let mut best: Option<(&Candidate<Id>, f32)> = None;
    for candidate in candidates {
        let Some(value) = score(candidate.rect).filter(|v| v.is_finite()) else {
            continue;
        };
        if best.is_none_or(|(_, current)| better(value, current)) {
            best = Some((candidate, value));
        }
    }
    best.map(|(candidate, score)| CollisionMatch {
        id: candidate.id.clone(),
        rect: candidate.rect,
        score,
        via,
    })
}
