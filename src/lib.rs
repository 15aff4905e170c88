//! Grid-based navigation for 2D agents
//!
//! This crate provides:
//! - A walkability grid rebuilt around the agent from obstacle queries
//! - A* search on the grid with optional line-of-sight smoothing
//! - A waypoint follower that reports movement and direction events
//! - A refresh loop that keeps the path current as the world changes

pub mod ai;
pub mod core;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        FollowState, Grid, GridCoord, LineOfSight, Navigator, Obstacle, ObstacleMap,
        ObstacleOracle, Path, PathFollower, Pathfinder, Waypoint,
    };
    pub use crate::core::{EventListeners, NavConfig, NavDebug, NavEvent};
    pub use glam::{Vec2, Vec3};
}
