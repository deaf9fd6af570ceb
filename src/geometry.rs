use serde::{Deserialize, Serialize};

/// World-space point `(x, y)`.
pub type Point = (f32, f32);

pub type Segment = (Point, Point);

const EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grows the rect by `pad` on every side.
    pub fn inflate(&self, pad: f32) -> Rect {
        Rect {
            x: self.x - pad,
            y: self.y - pad,
            width: self.width + pad * 2.0,
            height: self.height + pad * 2.0,
        }
    }

    pub fn same_origin(&self, other: &Rect) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// AABB overlap. Rects that only touch along an edge do not overlap.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    !(a.right() <= b.x || b.right() <= a.x || a.bottom() <= b.y || b.bottom() <= a.y)
}

pub fn side_midpoint(rect: &Rect, side: Side) -> Point {
    let (cx, cy) = rect.center();
    match side {
        Side::Left => (rect.x, cy),
        Side::Right => (rect.right(), cy),
        Side::Top => (cx, rect.y),
        Side::Bottom => (cx, rect.bottom()),
    }
}

pub fn squared_distance(p: Point, q: Point) -> f32 {
    let dx = q.0 - p.0;
    let dy = q.1 - p.1;
    dx * dx + dy * dy
}

pub fn point_inside_rect(x: f32, y: f32, rect: &Rect) -> bool {
    x >= rect.x && x <= rect.right() && y >= rect.y && y <= rect.bottom()
}

pub fn segments_intersect(s1: Segment, s2: Segment) -> bool {
    fn orient(a: Point, b: Point, c: Point) -> f32 {
        (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
    }
    fn on_segment(a: Point, b: Point, c: Point) -> bool {
        c.0 >= a.0.min(b.0) - EPS
            && c.0 <= a.0.max(b.0) + EPS
            && c.1 >= a.1.min(b.1) - EPS
            && c.1 <= a.1.max(b.1) + EPS
    }
    let ((a, b), (c, d)) = (s1, s2);
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    if (o1 > 0.0 && o2 < 0.0 || o1 < 0.0 && o2 > 0.0)
        && (o3 > 0.0 && o4 < 0.0 || o3 < 0.0 && o4 > 0.0)
    {
        return true;
    }
    (o1.abs() <= EPS && on_segment(a, b, c))
        || (o2.abs() <= EPS && on_segment(a, b, d))
        || (o3.abs() <= EPS && on_segment(c, d, a))
        || (o4.abs() <= EPS && on_segment(c, d, b))
}

/// True when segment `a`-`b` touches or crosses `rect` (boundary included).
pub fn segment_intersects_rect(a: Point, b: Point, rect: &Rect) -> bool {
    if a.0.max(b.0) < rect.x
        || a.0.min(b.0) > rect.right()
        || a.1.max(b.1) < rect.y
        || a.1.min(b.1) > rect.bottom()
    {
        return false;
    }
    if point_inside_rect(a.0, a.1, rect) || point_inside_rect(b.0, b.1, rect) {
        return true;
    }
    let corners = [
        (rect.x, rect.y),
        (rect.right(), rect.y),
        (rect.right(), rect.bottom()),
        (rect.x, rect.bottom()),
    ];
    (0..4).any(|idx| segments_intersect((a, b), (corners[idx], corners[(idx + 1) % 4])))
}

/// Casts a ray from the rect centre along the angle towards `toward` and returns
/// where it leaves the rect. Coincident centres project along the positive x axis.
pub fn project_toward(rect: &Rect, toward: Point) -> Point {
    let (cx, cy) = rect.center();
    let angle = (toward.1 - cy).atan2(toward.0 - cx);
    let (dir_y, dir_x) = angle.sin_cos();
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let t_x = if dir_x.abs() > EPS {
        half_w / dir_x.abs()
    } else {
        f32::INFINITY
    };
    let t_y = if dir_y.abs() > EPS {
        half_h / dir_y.abs()
    } else {
        f32::INFINITY
    };
    let t = t_x.min(t_y);
    if !t.is_finite() {
        return (cx, cy);
    }
    (cx + dir_x * t, cy + dir_y * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 0.0, 50.0, 50.0);
        assert!(!rects_overlap(&a, &b));
        assert!(rects_overlap(&a, &Rect::new(99.0, 99.0, 10.0, 10.0)));
    }

    #[test]
    fn midpoints_sit_on_edges() {
        let rect = Rect::new(10.0, 20.0, 200.0, 120.0);
        assert_eq!(side_midpoint(&rect, Side::Left), (10.0, 80.0));
        assert_eq!(side_midpoint(&rect, Side::Right), (210.0, 80.0));
        assert_eq!(side_midpoint(&rect, Side::Top), (110.0, 20.0));
        assert_eq!(side_midpoint(&rect, Side::Bottom), (110.0, 140.0));
    }

    #[test]
    fn collinear_overlap_counts_as_intersection() {
        assert!(segments_intersect(
            ((0.0, 0.0), (10.0, 0.0)),
            ((5.0, 0.0), (15.0, 0.0))
        ));
        assert!(!segments_intersect(
            ((0.0, 0.0), (10.0, 0.0)),
            ((11.0, 0.0), (15.0, 0.0))
        ));
        assert!(segments_intersect(
            ((0.0, 0.0), (10.0, 10.0)),
            ((0.0, 10.0), (10.0, 0.0))
        ));
    }

    #[test]
    fn segment_crossing_rect_without_endpoints_inside() {
        let rect = Rect::new(40.0, 40.0, 20.0, 20.0);
        assert!(segment_intersects_rect((0.0, 50.0), (100.0, 50.0), &rect));
        assert!(!segment_intersects_rect((0.0, 30.0), (100.0, 30.0), &rect));
    }

    #[test]
    fn projection_lands_on_boundary() {
        let rect = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(project_toward(&rect, (1000.0, 50.0)), (200.0, 50.0));
        let (x, y) = project_toward(&rect, (100.0, -500.0));
        assert!((x - 100.0).abs() < 1e-3 && y.abs() < 1e-3);
        assert_eq!(project_toward(&rect, rect.center()), (200.0, 50.0));
    }
}
