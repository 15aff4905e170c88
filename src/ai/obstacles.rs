//! Static obstacle sets
//!
//! A minimal collision world for the x/y plane: circles and axis-aligned
//! rectangles. It answers both environment queries the navigation core
//! needs, so hosts without a physics engine can plug it straight in.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::ai::grid::ObstacleOracle;
use crate::ai::pathfinding::LineOfSight;
use crate::core::ConfigError;

/// Geometric shape of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Disc
    Circle {
        /// Radius in world units
        radius: f32,
    },
    /// Axis-aligned box
    Rectangle {
        /// Half width and half height
        half_extents: Vec2,
    },
}

/// A shape placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Shape center in the x/y plane
    pub center: Vec2,
    /// Shape
    pub shape: ObstacleShape,
}

impl Obstacle {
    /// Disc obstacle
    #[must_use]
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            shape: ObstacleShape::Circle { radius },
        }
    }

    /// Box obstacle spanning `min..max`
    #[must_use]
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) / 2.0,
            shape: ObstacleShape::Rectangle {
                half_extents: (max - min).abs() / 2.0,
            },
        }
    }

    /// Whether a disc at `point` with `radius` overlaps this obstacle
    #[must_use]
    pub fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool {
        match self.shape {
            ObstacleShape::Circle { radius: own } => point.distance(self.center) < own + radius,
            ObstacleShape::Rectangle { half_extents } => {
                let closest = point.clamp(self.center - half_extents, self.center + half_extents);
                closest.distance(point) < radius || (closest == point)
            }
        }
    }

    /// Whether the segment `from -> to`, widened by `clearance`, touches
    /// this obstacle
    #[must_use]
    pub fn blocks_segment(&self, from: Vec2, to: Vec2, clearance: f32) -> bool {
        match self.shape {
            ObstacleShape::Circle { radius } => {
                distance_to_segment(self.center, from, to) < radius + clearance
            }
            ObstacleShape::Rectangle { half_extents } => {
                let grown = half_extents + Vec2::splat(clearance);
                segment_hits_box(from, to, self.center - grown, self.center + grown)
            }
        }
    }
}

/// Distance from `point` to the closest point of segment `a -> b`
fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Slab test of segment `a -> b` against the open box `min..max`
fn segment_hits_box(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> bool {
    let direction = b - a;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..2 {
        let (origin, delta, low, high) = (a[axis], direction[axis], min[axis], max[axis]);
        if delta.abs() <= f32::EPSILON {
            if origin <= low || origin >= high {
                return false;
            }
            continue;
        }

        let mut t0 = (low - origin) / delta;
        let mut t1 = (high - origin) / delta;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter >= t_exit {
            return false;
        }
    }

    true
}

/// A set of static obstacles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleMap {
    /// Shapes in the world
    pub obstacles: Vec<Obstacle>,
    /// Extra width of sight rays, so smoothed paths keep off walls
    #[serde(default)]
    pub sight_clearance: f32,
}

impl ObstacleMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle
    #[must_use]
    pub fn with(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Set the sight ray clearance
    #[must_use]
    pub fn with_sight_clearance(mut self, clearance: f32) -> Self {
        self.sight_clearance = clearance.max(0.0);
        self
    }

    /// Add an obstacle in place
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Number of obstacles
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Check if the map holds no obstacles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }
}

impl ObstacleOracle for ObstacleMap {
    fn is_obstacle(&self, point: Vec3, radius: f32) -> bool {
        let point = point.truncate();
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.overlaps_circle(point, radius))
    }
}

impl LineOfSight for ObstacleMap {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let (from, to) = (from.truncate(), to.truncate());
        !self
            .obstacles
            .iter()
            .any(|obstacle| obstacle.blocks_segment(from, to, self.sight_clearance))
    }
}
