use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use tracing::debug;

use crate::config::{PathfinderKind, RoutingConfig};
use crate::geometry::{Point, Rect, rects_overlap};

use super::error::RouteError;
use super::simple_path;

/// Grid coordinates `(column, row)`.
pub type Cell = (i32, i32);

/// Up, down, left, right. Diagonal steps are never generated, so the search cannot
/// squeeze between two obstacles that only meet at a corner.
const MOVES: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

// Path cost packs (steps, turns) into one integer so shorter routes always win and
// turn count only breaks ties between routes of equal length.
const STEP_COST: u64 = 1 << 32;
const TURN_COST: u64 = 1;

/// Walkability raster over the local routing region.
///
/// Cells are indexed relative to the start anchor, which sits exactly on the
/// corner of `anchor_cell`; cell `(ix, iy)` starts at
/// `anchor + (ix - anchor_cell.0, iy - anchor_cell.1) * cell`.
#[derive(Debug, Clone)]
pub struct RoutingGrid {
    cell: f32,
    anchor: Point,
    anchor_cell: Cell,
    cols: i32,
    rows: i32,
    blocked: Vec<bool>,
}

impl RoutingGrid {
    /// Rasterizes the region around `start`, `end` and every obstacle grown by
    /// `config.padding`, expanded by `config.margin_cells` on each side.
    pub fn build(
        start: Point,
        end: Point,
        obstacles: &[Rect],
        config: &RoutingConfig,
    ) -> Result<Self, RouteError> {
        let cell = config.cell_size;
        if !(cell.is_finite() && cell > 0.0) {
            return Err(RouteError::InvalidCellSize(cell));
        }
        let padded: Vec<Rect> = obstacles
            .iter()
            .map(|obs| obs.inflate(config.padding))
            .collect();

        let mut min_x = start.0.min(end.0);
        let mut min_y = start.1.min(end.1);
        let mut max_x = start.0.max(end.0);
        let mut max_y = start.1.max(end.1);
        for rect in &padded {
            min_x = min_x.min(rect.x);
            min_y = min_y.min(rect.y);
            max_x = max_x.max(rect.right());
            max_y = max_y.max(rect.bottom());
        }
        let margin = config.margin_cells as f32 * cell;
        min_x -= margin;
        min_y -= margin;
        max_x += margin;
        max_y += margin;
        if ![min_x, min_y, max_x, max_y, start.0, start.1, end.0, end.1]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(RouteError::NonFiniteBounds);
        }
        let before_x = ((start.0 - min_x) / cell).ceil();
        let before_y = ((start.1 - min_y) / cell).ceil();
        let cols_f = before_x + ((max_x - start.0) / cell).ceil().max(1.0);
        let rows_f = before_y + ((max_y - start.1) / cell).ceil().max(1.0);
        let total = f64::from(cols_f) * f64::from(rows_f);
        if !total.is_finite() || total > config.max_cells as f64 {
            return Err(RouteError::GridTooLarge {
                cols: cols_f as usize,
                rows: rows_f as usize,
                max: config.max_cells,
            });
        }
        let cols = cols_f as i32;
        let rows = rows_f as i32;

        let mut grid = Self {
            cell,
            anchor: start,
            anchor_cell: (before_x as i32, before_y as i32),
            cols,
            rows,
            blocked: vec![false; (cols as usize) * (rows as usize)],
        };
        for rect in &padded {
            grid.block_rect(rect);
        }
        Ok(grid)
    }

    fn offset_x(&self, x: f32) -> f32 {
        (x - self.anchor.0) / self.cell + self.anchor_cell.0 as f32
    }

    fn offset_y(&self, y: f32) -> f32 {
        (y - self.anchor.1) / self.cell + self.anchor_cell.1 as f32
    }

    fn block_rect(&mut self, rect: &Rect) {
        let start_x = (self.offset_x(rect.x).floor() as i32).max(0);
        let end_x = (self.offset_x(rect.right()).ceil() as i32).min(self.cols - 1);
        let start_y = (self.offset_y(rect.y).floor() as i32).max(0);
        let end_y = (self.offset_y(rect.bottom()).ceil() as i32).min(self.rows - 1);
        for iy in start_y..=end_y {
            for ix in start_x..=end_x {
                if rects_overlap(&self.cell_rect((ix, iy)), rect) {
                    let idx = self.index((ix, iy));
                    self.blocked[idx] = true;
                }
            }
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    pub fn contains(&self, (ix, iy): Cell) -> bool {
        ix >= 0 && iy >= 0 && ix < self.cols && iy < self.rows
    }

    pub fn index(&self, (ix, iy): Cell) -> usize {
        (iy * self.cols + ix) as usize
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.contains(cell) && !self.blocked[self.index(cell)]
    }

    pub fn set_walkable(&mut self, cell: Cell) {
        if self.contains(cell) {
            let idx = self.index(cell);
            self.blocked[idx] = false;
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }

    /// Cell containing the point, clamped to the grid.
    pub fn cell_for_point(&self, (x, y): Point) -> Cell {
        let ix = self.anchor_cell.0 + ((x - self.anchor.0) / self.cell).floor() as i32;
        let iy = self.anchor_cell.1 + ((y - self.anchor.1) / self.cell).floor() as i32;
        (ix.clamp(0, self.cols - 1), iy.clamp(0, self.rows - 1))
    }

    /// World position of a cell's top-left corner.
    pub fn cell_origin(&self, (ix, iy): Cell) -> Point {
        (
            self.anchor.0 + (ix - self.anchor_cell.0) as f32 * self.cell,
            self.anchor.1 + (iy - self.anchor_cell.1) as f32 * self.cell,
        )
    }

    fn cell_rect(&self, cell: Cell) -> Rect {
        let (x, y) = self.cell_origin(cell);
        Rect::new(x, y, self.cell, self.cell)
    }

    pub fn neighbors(&self, (ix, iy): Cell) -> impl Iterator<Item = Cell> + '_ {
        MOVES
            .iter()
            .map(move |(dx, dy)| (ix + dx, iy + dy))
            .filter(|next| self.is_walkable(*next))
    }
}

/// Search seam between the router and the shortest-path algorithm.
pub trait GridPathfinder {
    /// Returns the cells from `start` to `end` inclusive, or `None` when `end`
    /// cannot be reached with 4-directional moves over walkable cells.
    fn find_path(&self, grid: &RoutingGrid, start: Cell, end: Cell) -> Option<Vec<Cell>>;
}

/// A* with a Manhattan heuristic. Among shortest routes it returns one with the
/// fewest turns.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarFinder;

/// Plain breadth-first search; shortest in steps, turn count unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsFinder;

impl GridPathfinder for PathfinderKind {
    fn find_path(&self, grid: &RoutingGrid, start: Cell, end: Cell) -> Option<Vec<Cell>> {
        match self {
            PathfinderKind::AStar => AStarFinder.find_path(grid, start, end),
            PathfinderKind::Bfs => BfsFinder.find_path(grid, start, end),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SearchState {
    x: i32,
    y: i32,
    dir: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SearchEntry {
    est: u64,
    cost: u64,
    state: SearchState,
}

impl Ord for SearchEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .est
            .cmp(&self.est)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| self.state.y.cmp(&other.state.y))
            .then_with(|| self.state.x.cmp(&other.state.x))
            .then_with(|| self.state.dir.cmp(&other.state.dir))
    }
}

impl PartialOrd for SearchEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn manhattan(a: Cell, b: Cell) -> u64 {
    u64::from((a.0 - b.0).unsigned_abs() + (a.1 - b.1).unsigned_abs())
}

impl GridPathfinder for AStarFinder {
    fn find_path(&self, grid: &RoutingGrid, start: Cell, end: Cell) -> Option<Vec<Cell>> {
        if !grid.is_walkable(start) || !grid.is_walkable(end) {
            return None;
        }
        if start == end {
            return Some(vec![start]);
        }
        let state_index =
            |state: &SearchState| grid.index((state.x, state.y)) * 4 + state.dir as usize;

        let mut best_cost = vec![u64::MAX; grid.len() * 4];
        let mut prev: Vec<Option<SearchState>> = vec![None; grid.len() * 4];
        let mut heap = BinaryHeap::new();
        let start_est = manhattan(start, end).saturating_mul(STEP_COST);
        for dir in 0..4u8 {
            let state = SearchState {
                x: start.0,
                y: start.1,
                dir,
            };
            best_cost[state_index(&state)] = 0;
            heap.push(SearchEntry {
                est: start_est,
                cost: 0,
                state,
            });
        }

        let mut end_state = None;
        while let Some(SearchEntry { cost, state, .. }) = heap.pop() {
            if cost != best_cost[state_index(&state)] {
                continue;
            }
            if (state.x, state.y) == end {
                end_state = Some(state);
                break;
            }
            for (dir, (dx, dy)) in MOVES.iter().enumerate() {
                let next_cell = (state.x + dx, state.y + dy);
                if !grid.is_walkable(next_cell) {
                    continue;
                }
                let mut next_cost = cost.saturating_add(STEP_COST);
                if state.dir as usize != dir {
                    next_cost = next_cost.saturating_add(TURN_COST);
                }
                let next = SearchState {
                    x: next_cell.0,
                    y: next_cell.1,
                    dir: dir as u8,
                };
                let next_idx = state_index(&next);
                if next_cost >= best_cost[next_idx] {
                    continue;
                }
                best_cost[next_idx] = next_cost;
                prev[next_idx] = Some(state);
                let remaining = manhattan(next_cell, end).saturating_mul(STEP_COST);
                heap.push(SearchEntry {
                    est: next_cost.saturating_add(remaining),
                    cost: next_cost,
                    state: next,
                });
            }
        }

        let mut cur = end_state?;
        let mut cells = vec![(cur.x, cur.y)];
        while let Some(before) = prev[state_index(&cur)] {
            cells.push((before.x, before.y));
            cur = before;
        }
        cells.reverse();
        Some(cells)
    }
}

impl GridPathfinder for BfsFinder {
    fn find_path(&self, grid: &RoutingGrid, start: Cell, end: Cell) -> Option<Vec<Cell>> {
        if !grid.is_walkable(start) || !grid.is_walkable(end) {
            return None;
        }
        let mut visited = vec![false; grid.len()];
        let mut prev: Vec<Option<Cell>> = vec![None; grid.len()];
        let mut queue = VecDeque::from([start]);
        visited[grid.index(start)] = true;
        while let Some(cell) = queue.pop_front() {
            if cell == end {
                let mut cells = vec![cell];
                let mut cur = cell;
                while let Some(before) = prev[grid.index(cur)] {
                    cells.push(before);
                    cur = before;
                }
                cells.reverse();
                return Some(cells);
            }
            for next in grid.neighbors(cell) {
                let idx = grid.index(next);
                if !visited[idx] {
                    visited[idx] = true;
                    prev[idx] = Some(cell);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

/// Obstacle-avoiding orthogonal route from `start` to `end`. `Ok(None)` means the
/// search was exhausted without reaching `end`.
pub fn route_with_grid<F: GridPathfinder + ?Sized>(
    start: Point,
    end: Point,
    obstacles: &[Rect],
    config: &RoutingConfig,
    finder: &F,
) -> Result<Option<Vec<Point>>, RouteError> {
    let mut grid = RoutingGrid::build(start, end, obstacles, config)?;
    let start_cell = grid.cell_for_point(start);
    let end_cell = grid.cell_for_point(end);
    grid.set_walkable(start_cell);
    grid.set_walkable(end_cell);
    debug!(
        cols = grid.cols(),
        rows = grid.rows(),
        blocked = grid.blocked_count(),
        "routing grid built"
    );

    let Some(cells) = finder.find_path(&grid, start_cell, end_cell) else {
        debug!(?start_cell, ?end_cell, "grid search exhausted");
        return Ok(None);
    };
    let world: Vec<Point> = cells.iter().map(|&cell| grid.cell_origin(cell)).collect();
    Ok(Some(compress_path(&anchor_path(start, end, &world))))
}

/// Swaps the first and last grid points for the exact anchors, adding elbows so
/// the route leaves `start` and enters `end` horizontally.
fn anchor_path(start: Point, end: Point, world: &[Point]) -> Vec<Point> {
    if world.len() <= 2 {
        return simple_path(start, end);
    }
    let inner = &world[1..world.len() - 1];
    let mut points = Vec::with_capacity(world.len() + 2);
    points.push(start);
    if let Some(&first) = inner.first()
        && first.0 != start.0
        && first.1 != start.1
    {
        points.push((first.0, start.1));
    }
    points.extend_from_slice(inner);
    if let Some(&last) = inner.last()
        && last.0 != end.0
        && last.1 != end.1
    {
        points.push((last.0, end.1));
    }
    points.push(end);
    points
}

/// Drops repeated points and merges runs that continue along the same axis, so
/// only the corners of a route remain. Comparisons are exact: grid coordinates of
/// one row or column are computed identically.
pub fn compress_path(points: &[Point]) -> Vec<Point> {
    let same = |a: f32, b: f32| a == b;
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &point in points {
        if let Some(&last) = out.last()
            && same(last.0, point.0)
            && same(last.1, point.1)
        {
            continue;
        }
        if let [.., a, b] = out.as_slice() {
            let (a, b) = (*a, *b);
            if (same(a.0, b.0) && same(b.0, point.0)) || (same(a.1, b.1) && same(b.1, point.1)) {
                out.pop();
            }
        }
        out.push(point);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RoutingConfig {
        RoutingConfig::default()
    }

    #[test]
    fn grid_origin_snaps_to_start_anchor() {
        let obstacle = Rect::new(250.0, 50.0, 100.0, 80.0);
        let grid =
            RoutingGrid::build((200.0, 60.0), (400.0, 60.0), &[obstacle], &config()).unwrap();
        let start_cell = grid.cell_for_point((200.0, 60.0));
        assert_eq!(grid.cell_origin(start_cell), (200.0, 60.0));
        assert!(grid.is_walkable(start_cell));
        assert!(!grid.is_walkable(grid.cell_for_point((300.0, 90.0))));
    }

    #[test]
    fn cells_touching_padded_edge_stay_walkable() {
        let obstacle = Rect::new(100.0, 100.0, 40.0, 40.0);
        let grid = RoutingGrid::build((0.0, 0.0), (300.0, 0.0), &[obstacle], &config()).unwrap();
        // Padded obstacle spans x 80..160; grid lines fall on multiples of 20.
        assert!(!grid.is_walkable(grid.cell_for_point((85.0, 120.0))));
        assert!(grid.is_walkable(grid.cell_for_point((75.0, 120.0))));
        assert!(grid.is_walkable(grid.cell_for_point((165.0, 120.0))));
    }

    #[test]
    fn invalid_cell_size_is_a_fault() {
        let config = RoutingConfig {
            cell_size: 0.0,
            ..RoutingConfig::default()
        };
        let err = RoutingGrid::build((0.0, 0.0), (100.0, 0.0), &[], &config).unwrap_err();
        assert_eq!(err, RouteError::InvalidCellSize(0.0));
    }

    #[test]
    fn oversized_grid_is_a_fault() {
        let config = RoutingConfig {
            max_cells: 100,
            ..RoutingConfig::default()
        };
        let err = RoutingGrid::build((0.0, 0.0), (10_000.0, 0.0), &[], &config).unwrap_err();
        assert!(matches!(err, RouteError::GridTooLarge { max: 100, .. }));
    }

    #[test]
    fn non_finite_bounds_are_a_fault() {
        let err =
            RoutingGrid::build((f32::INFINITY, 0.0), (100.0, 0.0), &[], &config()).unwrap_err();
        assert_eq!(err, RouteError::NonFiniteBounds);
    }

    #[test]
    fn astar_and_bfs_agree_on_length() {
        let obstacles = [
            Rect::new(100.0, -100.0, 40.0, 200.0),
            Rect::new(220.0, 0.0, 40.0, 200.0),
        ];
        let grid = RoutingGrid::build((0.0, 0.0), (400.0, 0.0), &obstacles, &config()).unwrap();
        let start = grid.cell_for_point((0.0, 0.0));
        let end = grid.cell_for_point((400.0, 0.0));
        let astar = AStarFinder.find_path(&grid, start, end).unwrap();
        let bfs = BfsFinder.find_path(&grid, start, end).unwrap();
        assert_eq!(astar.len(), bfs.len());
        assert_eq!(astar.first(), Some(&start));
        assert_eq!(astar.last(), Some(&end));
        for pair in astar.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!((a.0 - b.0).abs() + (a.1 - b.1).abs(), 1);
            assert!(grid.is_walkable(b));
        }
    }

    #[test]
    fn astar_prefers_fewer_turns() {
        let grid = RoutingGrid::build((0.0, 0.0), (200.0, 200.0), &[], &config()).unwrap();
        let start = grid.cell_for_point((0.0, 0.0));
        let end = grid.cell_for_point((200.0, 200.0));
        let cells = AStarFinder.find_path(&grid, start, end).unwrap();
        let points: Vec<Point> = cells.iter().map(|&c| grid.cell_origin(c)).collect();
        assert_eq!(compress_path(&points).len(), 3);
    }

    #[test]
    fn walled_in_target_is_unreachable() {
        let end = (300.0, 0.0);
        let walls = [
            Rect::new(200.0, -140.0, 200.0, 40.0),
            Rect::new(200.0, 100.0, 200.0, 40.0),
            Rect::new(200.0, -140.0, 40.0, 280.0),
            Rect::new(360.0, -140.0, 40.0, 280.0),
        ];
        let routed = route_with_grid((0.0, 0.0), end, &walls, &config(), &AStarFinder).unwrap();
        assert!(routed.is_none());
    }

    #[test]
    fn compress_merges_collinear_runs() {
        let points = [
            (0.0, 0.0),
            (10.0, 0.0),
            (20.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (20.0, 20.0),
            (30.0, 20.0),
        ];
        assert_eq!(
            compress_path(&points),
            vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (30.0, 20.0)]
        );
    }

    #[test]
    fn routed_path_keeps_exact_anchors() {
        let start = (203.0, 61.0);
        let end = (407.0, 77.0);
        let obstacle = Rect::new(250.0, 40.0, 100.0, 80.0);
        let points = route_with_grid(start, end, &[obstacle], &config(), &AStarFinder)
            .unwrap()
            .unwrap();
        assert_eq!(points.first(), Some(&start));
        assert_eq!(points.last(), Some(&end));
        for pair in points.windows(2) {
            assert!(pair[0].0 == pair[1].0 || pair[0].1 == pair[1].1, "{pair:?}");
        }
        let n = points.len();
        assert_eq!(points[n - 2].1, end.1);
    }
}
