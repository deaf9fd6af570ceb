use crate::geometry::{Point, Rect, segment_intersects_rect};

/// Every card rect except the link's own endpoints. Endpoints are recognised by
/// origin, so another card parked exactly on the source or target origin is
/// dropped as well.
pub fn obstacles_for_link(cards: &[Rect], source: &Rect, target: &Rect) -> Vec<Rect> {
    cards
        .iter()
        .filter(|card| !card.same_origin(source) && !card.same_origin(target))
        .copied()
        .collect()
}

/// True as soon as any segment of `points` touches an obstacle grown by `padding`.
pub fn path_intersects_obstacles(points: &[Point], obstacles: &[Rect], padding: f32) -> bool {
    if points.len() < 2 || obstacles.is_empty() {
        return false;
    }
    let padded: Vec<Rect> = obstacles.iter().map(|obs| obs.inflate(padding)).collect();
    points.windows(2).any(|segment| {
        padded
            .iter()
            .any(|rect| segment_intersects_rect(segment[0], segment[1], rect))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_excluded_by_origin() {
        let source = Rect::new(0.0, 0.0, 200.0, 120.0);
        let target = Rect::new(400.0, 0.0, 200.0, 120.0);
        let other = Rect::new(250.0, 300.0, 100.0, 80.0);
        let twin = Rect::new(0.0, 0.0, 50.0, 50.0);
        let cards = [source, target, other, twin];
        assert_eq!(obstacles_for_link(&cards, &source, &target), vec![other]);
    }

    #[test]
    fn padding_widens_the_hit_area() {
        let obstacle = Rect::new(100.0, 100.0, 50.0, 50.0);
        let path = [(0.0, 90.0), (300.0, 90.0)];
        assert!(!path_intersects_obstacles(&path, &[obstacle], 0.0));
        assert!(path_intersects_obstacles(&path, &[obstacle], 20.0));
        assert!(!path_intersects_obstacles(&path, &[], 20.0));
    }
}
