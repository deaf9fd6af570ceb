use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Direct segment between the closest pair of side midpoints.
    Free,
    /// Right-of-source to left-of-target elbow route, optionally obstacle-avoiding.
    #[default]
    Orthogonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub source: Rect,
    pub target: Rect,
    #[serde(default)]
    pub style: LinkStyle,
    #[serde(default)]
    pub route_around: bool,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
}

impl LinkRequest {
    pub fn new(source: Rect, target: Rect, style: LinkStyle) -> Self {
        Self {
            source,
            target,
            style,
            route_around: false,
            obstacles: Vec::new(),
        }
    }

    pub fn route_around(mut self, obstacles: Vec<Rect>) -> Self {
        self.route_around = true;
        self.obstacles = obstacles;
        self
    }
}

/// A routed link: the polyline to draw plus the segment carrying the arrowhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPath {
    pub points: Vec<Point>,
    pub arrow: [Point; 2],
}

impl LinkPath {
    pub(crate) fn from_points(points: Vec<Point>) -> Self {
        let arrow = match points.as_slice() {
            [.., a, b] => [*a, *b],
            [only] => [*only, *only],
            [] => [(0.0, 0.0), (0.0, 0.0)],
        };
        Self { points, arrow }
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Flattened `[x0, y0, x1, y1, ...]` coordinates.
    pub fn flat(&self) -> Vec<f32> {
        self.points.iter().flat_map(|&(x, y)| [x, y]).collect()
    }
}
