use crate::geometry::{
    Point, Rect, Side, project_toward, rects_overlap, side_midpoint, squared_distance,
};

use super::types::LinkStyle;

/// Candidate side pairings for free links, in evaluation order.
const FREE_PAIRINGS: [(Side, Side); 4] = [
    (Side::Left, Side::Right),
    (Side::Right, Side::Left),
    (Side::Top, Side::Bottom),
    (Side::Bottom, Side::Top),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub start: Point,
    pub end: Point,
    /// Sides the anchors sit on; `None` when the angle projection was used.
    pub sides: Option<(Side, Side)>,
}

/// Resolves the attachment points of a link. Returns `None` for a free link
/// between overlapping cards, which has no meaningful anchor pair.
pub fn resolve_anchors(source: &Rect, target: &Rect, style: LinkStyle) -> Option<Anchors> {
    match style {
        LinkStyle::Orthogonal => Some(orthogonal_anchors(source, target)),
        LinkStyle::Free => {
            if rects_overlap(source, target) {
                return None;
            }
            let anchors = closest_side_anchors(source, target)
                .unwrap_or_else(|| projected_anchors(source, target));
            Some(anchors)
        }
    }
}

/// Orthogonal links always leave from the right and enter from the left.
pub fn orthogonal_anchors(source: &Rect, target: &Rect) -> Anchors {
    Anchors {
        start: side_midpoint(source, Side::Right),
        end: side_midpoint(target, Side::Left),
        sides: Some((Side::Right, Side::Left)),
    }
}

/// Picks the side pairing with the smallest squared distance; the first minimum
/// in [`FREE_PAIRINGS`] order wins. `None` when no distance compares (NaN input).
pub fn closest_side_anchors(source: &Rect, target: &Rect) -> Option<Anchors> {
    let mut best: Option<(f32, Anchors)> = None;
    for (from_side, to_side) in FREE_PAIRINGS {
        let start = side_midpoint(source, from_side);
        let end = side_midpoint(target, to_side);
        let dist = squared_distance(start, end);
        let better = match &best {
            Some((best_dist, _)) => dist < *best_dist,
            None => dist.is_finite(),
        };
        if better {
            best = Some((
                dist,
                Anchors {
                    start,
                    end,
                    sides: Some((from_side, to_side)),
                },
            ));
        }
    }
    best.map(|(_, anchors)| anchors)
}

pub fn projected_anchors(source: &Rect, target: &Rect) -> Anchors {
    Anchors {
        start: project_toward(source, target.center()),
        end: project_toward(target, source.center()),
        sides: None,
    }
}
