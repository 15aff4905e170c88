//! A* pathfinding on the navigation grid
//!
//! Eight-way search with integer costs (10 orthogonal, 14 diagonal) and
//! optional line-of-sight string pulling of the result.

use glam::Vec3;
use rustc_hash::FxHashSet;

use crate::ai::grid::{Grid, GridCoord};
use crate::core::PathfindingConfig;

/// Cost of an orthogonal step
pub const STRAIGHT_COST: u32 = 10;
/// Cost of a diagonal step (10 * sqrt 2, rounded)
pub const DIAGONAL_COST: u32 = 14;

/// Answers whether the straight segment between two points is unobstructed.
pub trait LineOfSight {
    /// True if nothing blocks the segment `from -> to`.
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(Vec3, Vec3) -> bool,
{
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        self(from, to)
    }
}

/// One step of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Cell the waypoint sits on
    pub coord: GridCoord,
    /// Cell center in world space
    pub world_position: Vec3,
}

/// Ordered waypoints from start to target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Wrap a list of waypoints
    #[must_use]
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// All waypoints
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Waypoint at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Check if the path has no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Lattice coordinates in order
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.waypoints.iter().map(|waypoint| waypoint.coord)
    }

    /// Same cells in the same order; world positions are not compared
    #[must_use]
    pub fn same_route(&self, other: &Self) -> bool {
        self.len() == other.len() && self.coords().eq(other.coords())
    }

    /// Index of the waypoint nearest to `position`, first one on ties
    #[must_use]
    pub fn closest_index(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            let distance = waypoint.world_position.distance_squared(position);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Polyline length in world units
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].world_position.distance(pair[1].world_position))
            .sum()
    }
}

/// Octile distance in integer cost units
#[must_use]
pub fn get_distance(a: GridCoord, b: GridCoord) -> u32 {
    let dst_x = a.x.abs_diff(b.x) as u32;
    let dst_y = a.y.abs_diff(b.y) as u32;

    if dst_x > dst_y {
        DIAGONAL_COST * dst_y + STRAIGHT_COST * (dst_x - dst_y)
    } else {
        DIAGONAL_COST * dst_x + STRAIGHT_COST * (dst_y - dst_x)
    }
}

/// Find a path using A*
///
/// Both endpoints are snapped with [`Grid::node_from_world_point`]. Returns
/// `None` if either lands on an unwalkable cell or the target cannot be
/// reached. The grid's search scratch is cleared first and left holding
/// this search's costs and parents afterwards.
#[must_use]
pub fn find_path(grid: &mut Grid, start: Vec3, target: Vec3) -> Option<Path> {
    let start_coord = grid.node_from_world_point(start);
    let target_coord = grid.node_from_world_point(target);

    if !grid.is_walkable(start_coord) || !grid.is_walkable(target_coord) {
        log::debug!(
            "No search: start {start_coord:?} walkable={}, target {target_coord:?} walkable={}",
            grid.is_walkable(start_coord),
            grid.is_walkable(target_coord)
        );
        return None;
    }

    grid.clear_search_scratch();

    let mut open_set = vec![start_coord];
    let mut in_open: FxHashSet<GridCoord> = FxHashSet::default();
    let mut closed_set: FxHashSet<GridCoord> = FxHashSet::default();
    in_open.insert(start_coord);

    while !open_set.is_empty() {
        let current = open_set.remove(lowest_cost_index(grid, &open_set));
        in_open.remove(&current);
        closed_set.insert(current);

        if current == target_coord {
            return Some(retrace_path(grid, start_coord, target_coord));
        }

        let current_g = grid.node(current).map_or(0, |node| node.g_cost);

        for neighbour in grid.neighbours(current) {
            if closed_set.contains(&neighbour) || !grid.is_walkable(neighbour) {
                continue;
            }

            let new_cost = current_g + get_distance(current, neighbour);
            let queued = in_open.contains(&neighbour);
            let Some(node) = grid.node_mut(neighbour) else {
                continue;
            };

            if new_cost < node.g_cost || !queued {
                node.g_cost = new_cost;
                node.h_cost = get_distance(neighbour, target_coord);
                node.parent = Some(current);

                if !queued {
                    open_set.push(neighbour);
                    in_open.insert(neighbour);
                }
            }
        }
    }

    log::debug!("No path from {start_coord:?} to {target_coord:?}");
    None
}

/// Open entry with the lowest f cost; lowest h cost breaks ties, then
/// insertion order
fn lowest_cost_index(grid: &Grid, open_set: &[GridCoord]) -> usize {
    let mut best = 0;
    let mut best_cost = (u32::MAX, u32::MAX);

    for (index, coord) in open_set.iter().enumerate() {
        let Some(node) = grid.node(*coord) else {
            continue;
        };
        let cost = (node.f_cost(), node.h_cost);
        if cost < best_cost {
            best = index;
            best_cost = cost;
        }
    }

    best
}

/// Walk parent links back from `end`, then reverse
fn retrace_path(grid: &Grid, start: GridCoord, end: GridCoord) -> Path {
    let limit = grid.size_x() * grid.size_y();
    let mut waypoints = Vec::new();
    let mut current = end;

    while let Some(node) = grid.node(current) {
        waypoints.push(Waypoint {
            coord: current,
            world_position: node.world_position,
        });

        if current == start || waypoints.len() > limit {
            break;
        }
        match node.parent {
            Some(parent) => current = parent,
            None => break,
        }
    }

    waypoints.reverse();
    Path::new(waypoints)
}

/// Remove waypoints made redundant by direct visibility
///
/// From each anchor, the path is scanned backwards from its end for the
/// farthest waypoint in sight; that waypoint becomes the next anchor. The
/// first and last waypoints always survive.
#[must_use]
pub fn smooth_path(path: &Path, los: &impl LineOfSight) -> Path {
    if path.len() <= 2 {
        return path.clone();
    }

    let waypoints = path.waypoints();
    let last = waypoints.len() - 1;
    let mut smoothed = Vec::with_capacity(waypoints.len());
    smoothed.push(waypoints[0]);

    let mut anchor = 0;
    while anchor < last {
        let from = waypoints[anchor].world_position;
        let next = ((anchor + 2)..=last)
            .rev()
            .find(|&candidate| los.has_line_of_sight(from, waypoints[candidate].world_position))
            .unwrap_or(anchor + 1);

        smoothed.push(waypoints[next]);
        anchor = next;
    }

    Path::new(smoothed)
}

/// Search front end holding the smoothing option
#[derive(Debug, Clone, Default)]
pub struct Pathfinder {
    smoothing: bool,
}

impl Pathfinder {
    /// Create a pathfinder from configuration
    #[must_use]
    pub fn new(config: &PathfindingConfig) -> Self {
        Self {
            smoothing: config.smoothing,
        }
    }

    /// Enable or disable smoothing
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Whether results are smoothed
    #[must_use]
    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Search with [`find_path`], then smooth if enabled
    #[must_use]
    pub fn find_path(
        &self,
        grid: &mut Grid,
        start: Vec3,
        target: Vec3,
        los: &impl LineOfSight,
    ) -> Option<Path> {
        let path = find_path(grid, start, target)?;
        if self.smoothing {
            let smoothed = smooth_path(&path, los);
            log::debug!("Smoothed path {} -> {} waypoints", path.len(), smoothed.len());
            Some(smoothed)
        } else {
            Some(path)
        }
    }
}
