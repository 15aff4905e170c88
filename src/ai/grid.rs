//! Navigation grid
//!
//! A fixed-size lattice of cells laid over the world around a movable
//! center. Walkability is rebuilt wholesale from an obstacle oracle, then
//! dilated twice: once by the configured obstacle padding and once by the
//! agent's footprint.

use glam::{Vec2, Vec3};
use smallvec::SmallVec;

use crate::core::GridConfig;

/// Answers whether a circle in world space overlaps an obstacle.
///
/// Queried once per cell per rebuild, at the cell center with the cell
/// radius.
pub trait ObstacleOracle {
    /// True if anything blocking lies within `radius` of `point`.
    fn is_obstacle(&self, point: Vec3, radius: f32) -> bool;
}

impl<F> ObstacleOracle for F
where
    F: Fn(Vec3, f32) -> bool,
{
    fn is_obstacle(&self, point: Vec3, radius: f32) -> bool {
        self(point, radius)
    }
}

/// Integer lattice coordinates of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl GridCoord {
    /// Create a coordinate
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for GridCoord {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// A single grid cell
///
/// The cost fields and `parent` are scratch space for the last search and
/// mean nothing until [`Grid::clear_search_scratch`] and a search have run.
#[derive(Debug, Clone)]
pub struct GridNode {
    /// Whether agents may stand here
    pub walkable: bool,
    /// Cell center in world space
    pub world_position: Vec3,
    coord: GridCoord,
    /// Cost from the search start
    pub g_cost: u32,
    /// Heuristic cost to the search target
    pub h_cost: u32,
    /// Predecessor on the cheapest known route
    pub parent: Option<GridCoord>,
}

impl GridNode {
    fn new(coord: GridCoord, world_position: Vec3) -> Self {
        Self {
            walkable: true,
            world_position,
            coord,
            g_cost: 0,
            h_cost: 0,
            parent: None,
        }
    }

    /// Lattice coordinates, fixed for the lifetime of the grid
    #[must_use]
    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Column
    #[must_use]
    pub fn grid_x(&self) -> usize {
        self.coord.x
    }

    /// Row
    #[must_use]
    pub fn grid_y(&self) -> usize {
        self.coord.y
    }

    /// Total estimated cost
    #[must_use]
    pub fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

/// A 2D navigation grid in the world x/y plane
#[derive(Debug, Clone)]
pub struct Grid {
    node_radius: f32,
    node_diameter: f32,
    world_size: Vec2,
    size_x: usize,
    size_y: usize,
    center: Vec3,
    obstacle_padding: usize,
    character_size: f32,
    anchor_bias: f32,
    /// Row-major, `y * size_x + x`
    nodes: Vec<GridNode>,
}

impl Grid {
    /// Create a grid centered on the origin with every cell walkable
    ///
    /// A non-positive or non-finite node radius falls back to the default,
    /// and the world size is widened to cover at least one cell.
    #[must_use]
    pub fn new(config: &GridConfig) -> Self {
        let defaults = GridConfig::default();
        let node_radius = if config.node_radius.is_finite() && config.node_radius > 0.0 {
            config.node_radius
        } else {
            log::warn!(
                "Invalid node radius {}, using {}",
                config.node_radius,
                defaults.node_radius
            );
            defaults.node_radius
        };
        let node_diameter = node_radius * 2.0;
        let world_size = if config.world_size.is_finite() {
            config.world_size.max(Vec2::splat(node_diameter))
        } else {
            log::warn!("Invalid world size {}, using {}", config.world_size, defaults.world_size);
            defaults.world_size
        };
        let size_x = ((world_size.x / node_diameter).round() as usize).max(1);
        let size_y = ((world_size.y / node_diameter).round() as usize).max(1);

        let mut grid = Self {
            node_radius,
            node_diameter,
            world_size,
            size_x,
            size_y,
            center: Vec3::ZERO,
            obstacle_padding: config.obstacle_padding,
            character_size: config.character_size,
            anchor_bias: config.anchor_bias,
            nodes: Vec::with_capacity(size_x * size_y),
        };

        for y in 0..size_y {
            for x in 0..size_x {
                let coord = GridCoord::new(x, y);
                let world_position = grid.cell_center(coord);
                grid.nodes.push(GridNode::new(coord, world_position));
            }
        }

        grid
    }

    /// Number of columns
    #[must_use]
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    /// Number of rows
    #[must_use]
    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// Half the cell edge
    #[must_use]
    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    /// Cell edge
    #[must_use]
    pub fn node_diameter(&self) -> f32 {
        self.node_diameter
    }

    /// World extent covered
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Current world anchor
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Footprint used for the second dilation pass
    #[must_use]
    pub fn character_size(&self) -> f32 {
        self.character_size
    }

    /// Dilation radius in cells derived from the character size
    #[must_use]
    pub fn character_padding(&self) -> usize {
        (self.character_size / self.node_diameter / 2.0).floor().max(0.0) as usize
    }

    /// All cells, row-major
    pub fn nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes.iter()
    }

    /// Cell at `coord`, if in bounds
    #[must_use]
    pub fn node(&self, coord: GridCoord) -> Option<&GridNode> {
        self.index(coord).and_then(|i| self.nodes.get(i))
    }

    /// Mutable cell at `coord`, if in bounds
    pub fn node_mut(&mut self, coord: GridCoord) -> Option<&mut GridNode> {
        self.index(coord).and_then(|i| self.nodes.get_mut(i))
    }

    /// Check if a cell is walkable; out-of-bounds cells are not
    #[must_use]
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.node(coord).is_some_and(|node| node.walkable)
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, coord: GridCoord, walkable: bool) {
        if let Some(node) = self.node_mut(coord) {
            node.walkable = walkable;
        }
    }

    /// Number of unwalkable cells
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.nodes.iter().filter(|node| !node.walkable).count()
    }

    /// Walkability of every cell, row-major
    #[must_use]
    pub fn walkable_mask(&self) -> Vec<bool> {
        self.nodes.iter().map(|node| node.walkable).collect()
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        (coord.x < self.size_x && coord.y < self.size_y).then(|| coord.y * self.size_x + coord.x)
    }

    fn bottom_left(&self) -> Vec3 {
        self.center - Vec3::X * self.world_size.x / 2.0 - Vec3::Y * self.world_size.y / 2.0
    }

    fn cell_center(&self, coord: GridCoord) -> Vec3 {
        self.bottom_left()
            + Vec3::X * (coord.x as f32 * self.node_diameter + self.node_radius)
            + Vec3::Y * (coord.y as f32 * self.node_diameter + self.node_radius)
    }

    /// Move the grid to `center` and recompute walkability
    ///
    /// Returns the number of blocked cells after padding.
    pub fn rebuild(&mut self, center: Vec3, oracle: &impl ObstacleOracle) -> usize {
        self.center = center;

        for i in 0..self.nodes.len() {
            let coord = self.nodes[i].coord;
            let world_position = self.cell_center(coord);
            let node = &mut self.nodes[i];
            node.world_position = world_position;
            node.walkable = !oracle.is_obstacle(world_position, self.node_radius);
        }

        let raw_blocked = self.blocked_count();
        let padded = self.dilate(self.obstacle_padding);
        let footprint = self.dilate(self.character_padding());
        let blocked = self.blocked_count();

        log::debug!(
            "Grid rebuilt at ({:.2}, {:.2}): {raw_blocked} blocked, +{padded} padding, +{footprint} footprint, {blocked}/{} total",
            center.x,
            center.y,
            self.nodes.len()
        );

        blocked
    }

    /// Block every walkable cell within `radius` cells (box window) of a
    /// blocked cell. Reads the mask as it was before the pass.
    fn dilate(&mut self, radius: usize) -> usize {
        if radius == 0 {
            return 0;
        }

        let blocked: Vec<bool> = self.nodes.iter().map(|node| !node.walkable).collect();
        let mut flips = Vec::new();

        for y in 0..self.size_y {
            for x in 0..self.size_x {
                let index = y * self.size_x + x;
                if blocked[index] {
                    continue;
                }

                let x_range = x.saturating_sub(radius)..=(x + radius).min(self.size_x - 1);
                let y_range = y.saturating_sub(radius)..=(y + radius).min(self.size_y - 1);
                let near_obstacle = y_range.into_iter().any(|wy| {
                    x_range
                        .clone()
                        .any(|wx| blocked[wy * self.size_x + wx])
                });

                if near_obstacle {
                    flips.push(index);
                }
            }
        }

        for &index in &flips {
            self.nodes[index].walkable = false;
        }
        flips.len()
    }

    /// Cell nearest to a world position; positions outside the grid clamp
    /// to the border
    #[must_use]
    pub fn node_from_world_point(&self, position: Vec3) -> GridCoord {
        let percent_x =
            ((position.x - self.center.x + self.world_size.x / 2.0) / self.world_size.x)
                .clamp(0.0, 1.0);
        let percent_y =
            ((position.y - self.center.y + self.world_size.y / 2.0) / self.world_size.y)
                .clamp(0.0, 1.0);

        let x = ((self.size_x - 1) as f32 * percent_x).round() as usize;
        let y = ((self.size_y - 1) as f32 * percent_y).round() as usize;
        GridCoord::new(x, y)
    }

    /// Up to eight in-bounds neighbours
    ///
    /// A diagonal is left out when either orthogonal cell between it and
    /// `coord` is unwalkable, so paths never clip a wall corner.
    #[must_use]
    pub fn neighbours(&self, coord: GridCoord) -> SmallVec<[GridCoord; 8]> {
        let mut result = SmallVec::new();

        for dy in -1isize..=1 {
            for dx in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let (Some(x), Some(y)) = (
                    coord.x.checked_add_signed(dx),
                    coord.y.checked_add_signed(dy),
                ) else {
                    continue;
                };
                if x >= self.size_x || y >= self.size_y {
                    continue;
                }

                if dx != 0
                    && dy != 0
                    && (!self.is_walkable(GridCoord::new(x, coord.y))
                        || !self.is_walkable(GridCoord::new(coord.x, y)))
                {
                    continue;
                }

                result.push(GridCoord::new(x, y));
            }
        }

        result
    }

    /// Walkable cell nearest to the center of `from`
    #[must_use]
    pub fn closest_walkable(&self, from: GridCoord) -> Option<GridCoord> {
        let origin = self.node(from)?.world_position;
        self.closest_walkable_to_world_point(origin)
    }

    /// Walkable cell whose center is nearest to `position`
    ///
    /// Ties go to the first cell in row-major order. `None` when nothing
    /// in the grid is walkable.
    #[must_use]
    pub fn closest_walkable_to_world_point(&self, position: Vec3) -> Option<GridCoord> {
        let mut best: Option<(GridCoord, f32)> = None;

        for node in self.nodes.iter().filter(|node| node.walkable) {
            let distance = node.world_position.distance_squared(position);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((node.coord, distance));
            }
        }

        best.map(|(coord, _)| coord)
    }

    /// Whether `position` lies within the grid's extent around its center
    #[must_use]
    pub fn is_inside_bounds(&self, position: Vec3) -> bool {
        (position.x - self.center.x).abs() <= self.world_size.x / 2.0
            && (position.y - self.center.y).abs() <= self.world_size.y / 2.0
    }

    /// Reset the search scratch of every cell
    pub fn clear_search_scratch(&mut self) {
        for node in &mut self.nodes {
            node.g_cost = 0;
            node.h_cost = 0;
            node.parent = None;
        }
    }

    /// Lattice-aligned anchor for an agent at `agent` heading along
    /// `heading`
    ///
    /// The anchor is pushed ahead by `heading * world_size * anchor_bias`,
    /// so the grid covers more ground in front of the agent than behind.
    #[must_use]
    pub fn anchor_for(&self, agent: Vec3, heading: Vec2) -> Vec3 {
        let bias = heading * self.world_size * self.anchor_bias;
        let snap = |value: f32| (value / self.node_diameter).round() * self.node_diameter;

        Vec3::new(snap(agent.x + bias.x), snap(agent.y + bias.y), agent.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: f32) -> GridConfig {
        GridConfig::default()
            .with_world_size(Vec2::splat(size))
            .with_character_size(0.0)
    }

    fn open(_: Vec3, _: f32) -> bool {
        false
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = Grid::new(&config(10.0));
        assert_eq!(grid.size_x(), 10);
        assert_eq!(grid.size_y(), 10);
        assert_eq!(grid.nodes().count(), 100);

        let wide = Grid::new(&config(10.0).with_node_radius(0.25));
        assert_eq!(wide.size_x(), 20);
    }

    #[test]
    fn test_unusable_sizes_fall_back() {
        let zero = Grid::new(&config(10.0).with_node_radius(0.0));
        assert_eq!(zero.node_radius(), 0.5);
        assert_eq!(zero.size_x(), 10);

        let negative = Grid::new(&config(10.0).with_node_radius(-1.0));
        assert_eq!(negative.size_y(), 10);

        let tiny = Grid::new(&config(0.0));
        assert_eq!((tiny.size_x(), tiny.size_y()), (1, 1));

        let unbounded = Grid::new(&config(f32::INFINITY));
        assert_eq!(unbounded.size_x(), 20);
    }

    #[test]
    fn test_cell_centers_map_back_to_their_cell() {
        let mut grid = Grid::new(&config(10.0));
        grid.rebuild(Vec3::new(3.0, -2.0, 0.0), &open);

        for node in grid.nodes() {
            assert_eq!(grid.node_from_world_point(node.world_position), node.coord());
        }
    }

    #[test]
    fn test_node_from_world_point_clamps() {
        let grid = Grid::new(&config(10.0));

        assert_eq!(
            grid.node_from_world_point(Vec3::new(-100.0, -100.0, 0.0)),
            GridCoord::new(0, 0)
        );
        assert_eq!(
            grid.node_from_world_point(Vec3::new(100.0, 0.2, 0.0)),
            GridCoord::new(9, 5)
        );
    }

    #[test]
    fn test_rebuild_without_obstacles() {
        let mut grid = Grid::new(&config(10.0));
        let blocked = grid.rebuild(Vec3::ZERO, &open);

        assert_eq!(blocked, 0);
        assert!(grid.nodes().all(|node| node.walkable));
    }

    #[test]
    fn test_obstacle_padding_blocks_box() {
        let mut grid = Grid::new(&config(10.0).with_obstacle_padding(1));
        // Only the cell centered at (0.5, 0.5) is an obstacle: coord (5, 5)
        let oracle = |p: Vec3, _r: f32| (p.x - 0.5).abs() < 0.1 && (p.y - 0.5).abs() < 0.1;
        let blocked = grid.rebuild(Vec3::ZERO, &oracle);

        assert_eq!(blocked, 9);
        for y in 4..=6 {
            for x in 4..=6 {
                assert!(!grid.is_walkable(GridCoord::new(x, y)));
            }
        }
        assert!(grid.is_walkable(GridCoord::new(3, 5)));
        assert!(grid.is_walkable(GridCoord::new(7, 7)));
    }

    #[test]
    fn test_padding_does_not_cascade() {
        let mut grid = Grid::new(&config(10.0).with_obstacle_padding(1));
        let oracle = |p: Vec3, _r: f32| (p.x + 4.5).abs() < 0.1 && (p.y + 4.5).abs() < 0.1;
        grid.rebuild(Vec3::ZERO, &oracle);

        // Corner cell plus its three in-bounds neighbours, nothing further
        assert_eq!(grid.blocked_count(), 4);
        assert!(grid.is_walkable(GridCoord::new(2, 0)));
    }

    #[test]
    fn test_character_padding_runs_after_obstacle_padding() {
        let cfg = config(20.0)
            .with_obstacle_padding(1)
            .with_character_size(2.0);
        let mut grid = Grid::new(&cfg);
        assert_eq!(grid.character_padding(), 1);

        let oracle = |p: Vec3, _r: f32| (p.x - 0.5).abs() < 0.1 && (p.y - 0.5).abs() < 0.1;
        grid.rebuild(Vec3::ZERO, &oracle);

        // One cell, padded by 1 then by 1 again: a 5x5 block
        assert_eq!(grid.blocked_count(), 25);
    }

    #[test]
    fn test_walkable_cells_keep_clearance() {
        let cfg = config(20.0).with_character_size(4.0);
        let mut grid = Grid::new(&cfg);
        let clearance = grid.character_padding();
        assert_eq!(clearance, 2);

        let oracle = |p: Vec3, _r: f32| p.x > 2.0 && p.x < 3.0 && p.y.abs() < 4.0;
        grid.rebuild(Vec3::ZERO, &oracle);

        let raw: Vec<GridCoord> = grid
            .nodes()
            .filter(|node| oracle(node.world_position, 0.5))
            .map(GridNode::coord)
            .collect();
        for node in grid.nodes().filter(|node| node.walkable) {
            for obstacle in &raw {
                let dx = node.grid_x().abs_diff(obstacle.x);
                let dy = node.grid_y().abs_diff(obstacle.y);
                assert!(dx.max(dy) > clearance);
            }
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let cfg = config(16.0)
            .with_obstacle_padding(1)
            .with_character_size(2.0);
        let mut grid = Grid::new(&cfg);
        let oracle = |p: Vec3, _r: f32| (p.x + 2.0).abs() < 1.0 && p.y > 0.0;

        grid.rebuild(Vec3::ZERO, &oracle);
        let first = grid.walkable_mask();
        grid.rebuild(Vec3::ZERO, &oracle);

        assert_eq!(grid.walkable_mask(), first);
    }

    #[test]
    fn test_neighbours_in_open_field() {
        let grid = Grid::new(&config(10.0));

        assert_eq!(grid.neighbours(GridCoord::new(5, 5)).len(), 8);
        assert_eq!(grid.neighbours(GridCoord::new(0, 0)).len(), 3);
        assert_eq!(grid.neighbours(GridCoord::new(9, 4)).len(), 5);
    }

    #[test]
    fn test_neighbours_skip_corner_cuts() {
        let mut grid = Grid::new(&config(10.0));
        grid.set_walkable(GridCoord::new(6, 5), false);

        let neighbours = grid.neighbours(GridCoord::new(5, 5));

        // Both diagonals past the blocked side cell are excluded
        assert!(!neighbours.contains(&GridCoord::new(6, 6)));
        assert!(!neighbours.contains(&GridCoord::new(6, 4)));
        // The blocked cell itself is still reported; searches filter it
        assert!(neighbours.contains(&GridCoord::new(6, 5)));
        assert!(neighbours.contains(&GridCoord::new(4, 6)));
        assert_eq!(neighbours.len(), 6);
    }

    #[test]
    fn test_closest_walkable() {
        let mut grid = Grid::new(&config(10.0));
        for x in 0..10 {
            for y in 0..10 {
                if x < 7 {
                    grid.set_walkable(GridCoord::new(x, y), false);
                }
            }
        }

        assert_eq!(
            grid.closest_walkable(GridCoord::new(2, 4)),
            Some(GridCoord::new(7, 4))
        );
        assert_eq!(
            grid.closest_walkable_to_world_point(Vec3::new(-50.0, 0.3, 0.0)),
            Some(GridCoord::new(7, 5))
        );
    }

    #[test]
    fn test_closest_walkable_ties_use_scan_order() {
        let mut grid = Grid::new(&config(3.0).with_node_radius(0.5));
        grid.set_walkable(GridCoord::new(1, 1), false);

        // All four orthogonal neighbours are equally close; (1, 0) comes first
        assert_eq!(
            grid.closest_walkable(GridCoord::new(1, 1)),
            Some(GridCoord::new(1, 0))
        );
    }

    #[test]
    fn test_closest_walkable_none_when_fully_blocked() {
        let mut grid = Grid::new(&config(4.0));
        grid.rebuild(Vec3::ZERO, &|_: Vec3, _: f32| true);
        assert_eq!(grid.closest_walkable(GridCoord::new(1, 1)), None);
    }

    #[test]
    fn test_is_inside_bounds_follows_center() {
        let mut grid = Grid::new(&config(10.0));
        assert!(grid.is_inside_bounds(Vec3::new(4.9, -4.9, 0.0)));
        assert!(!grid.is_inside_bounds(Vec3::new(5.1, 0.0, 0.0)));

        grid.rebuild(Vec3::new(10.0, 0.0, 0.0), &open);
        assert!(grid.is_inside_bounds(Vec3::new(14.0, 0.0, 0.0)));
        assert!(!grid.is_inside_bounds(Vec3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_clear_search_scratch() {
        let mut grid = Grid::new(&config(4.0));
        if let Some(node) = grid.node_mut(GridCoord::new(1, 2)) {
            node.g_cost = 30;
            node.h_cost = 14;
            node.parent = Some(GridCoord::new(0, 1));
        }
        assert_eq!(grid.node(GridCoord::new(1, 2)).unwrap().f_cost(), 44);

        grid.clear_search_scratch();

        let node = grid.node(GridCoord::new(1, 2)).unwrap();
        assert_eq!(node.f_cost(), 0);
        assert!(node.parent.is_none());
    }

    #[test]
    fn test_anchor_is_biased_and_snapped() {
        let grid = Grid::new(&config(20.0));

        let still = grid.anchor_for(Vec3::new(3.3, -1.6, 2.0), Vec2::ZERO);
        assert_eq!(still, Vec3::new(3.0, -2.0, 2.0));

        // 20 * 0.25 = 5 units ahead on x, 5 units down on y
        let moving = grid.anchor_for(Vec3::new(3.3, -1.6, 0.0), Vec2::new(1.0, -1.0));
        assert_eq!(moving, Vec3::new(8.0, -7.0, 0.0));
    }
}
