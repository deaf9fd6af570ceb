//! Link routing between two cards.
//!
//! [`compute_path`] is the single entry point. Orthogonal links first try the
//! canonical elbow from [`simple_path`]; only when that elbow is blocked and the
//! link asks to route around obstacles does the grid search in [`grid`] run. Free
//! links are a straight segment between the closest side midpoints.

mod anchors;
mod error;
pub mod grid;
mod obstacles;
mod types;

use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::geometry::Point;

pub use anchors::{Anchors, closest_side_anchors, orthogonal_anchors, resolve_anchors};
pub use error::RouteError;
pub use grid::{AStarFinder, BfsFinder, Cell, GridPathfinder, RoutingGrid, compress_path};
pub use obstacles::{obstacles_for_link, path_intersects_obstacles};
pub use types::{LinkPath, LinkRequest, LinkStyle};

/// Three-segment horizontal/vertical/horizontal route meeting at the mid x.
pub fn simple_path(start: Point, end: Point) -> Vec<Point> {
    let mid_x = (start.0 + end.0) / 2.0;
    vec![start, (mid_x, start.1), (mid_x, end.1), end]
}

/// Routes a link with the pathfinder selected in `config`.
///
/// Returns `None` when the link should not be drawn (a free link between
/// overlapping cards). Never fails: grid faults fall back to the simple path.
pub fn compute_path(request: &LinkRequest, config: &RoutingConfig) -> Option<LinkPath> {
    compute_path_with(request, config, &config.pathfinder)
}

/// Same as [`compute_path`] with an explicit grid search implementation.
pub fn compute_path_with<F: GridPathfinder + ?Sized>(
    request: &LinkRequest,
    config: &RoutingConfig,
    finder: &F,
) -> Option<LinkPath> {
    let anchors = resolve_anchors(&request.source, &request.target, request.style)?;
    match request.style {
        LinkStyle::Free => Some(LinkPath::from_points(vec![anchors.start, anchors.end])),
        LinkStyle::Orthogonal => Some(LinkPath::from_points(orthogonal_route(
            anchors.start,
            anchors.end,
            request,
            config,
            finder,
        ))),
    }
}

fn orthogonal_route<F: GridPathfinder + ?Sized>(
    start: Point,
    end: Point,
    request: &LinkRequest,
    config: &RoutingConfig,
    finder: &F,
) -> Vec<Point> {
    let simple = simple_path(start, end);
    if !request.route_around || request.obstacles.is_empty() {
        return simple;
    }
    if !path_intersects_obstacles(&simple, &request.obstacles, config.padding) {
        debug!("simple path clears all obstacles");
        return simple;
    }
    match grid::route_with_grid(start, end, &request.obstacles, config, finder) {
        Ok(Some(points)) => points,
        Ok(None) => {
            debug!("no grid route found, keeping simple path");
            simple
        }
        Err(err) => {
            warn!(error = %err, "grid routing failed, keeping simple path");
            simple
        }
    }
}
