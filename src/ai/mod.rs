//! Grid navigation module
//!
//! Provides the walkability grid, A* search with optional path smoothing,
//! a waypoint follower and the refresh loop that ties them together.

mod follower;
mod grid;
mod navigator;
mod obstacles;
mod pathfinding;

pub use follower::{FollowState, HorizontalDirection, PathFollower, VerticalDirection};
pub use grid::{Grid, GridCoord, GridNode, ObstacleOracle};
pub use navigator::Navigator;
pub use obstacles::{Obstacle, ObstacleMap, ObstacleShape};
pub use pathfinding::{
    DIAGONAL_COST, LineOfSight, Path, Pathfinder, STRAIGHT_COST, Waypoint, find_path,
    get_distance, smooth_path,
};
