//! Navigation configuration
//!
//! Loaded from RON or JSON. Every section falls back to its defaults, so a
//! file only needs the values it changes.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Grid layout and padding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Half the edge length of a cell
    pub node_radius: f32,
    /// World-space extent covered by the grid
    pub world_size: Vec2,
    /// Cells blocked around every obstacle cell
    pub obstacle_padding: usize,
    /// Agent footprint in world units, dilates obstacles a second time
    pub character_size: f32,
    /// How far the grid center is pushed ahead of the agent, as a fraction
    /// of the world size
    pub anchor_bias: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            node_radius: 0.5,
            world_size: Vec2::new(20.0, 20.0),
            obstacle_padding: 0,
            character_size: 1.0,
            anchor_bias: 0.25,
        }
    }
}

impl GridConfig {
    /// Set the cell radius
    #[must_use]
    pub fn with_node_radius(mut self, node_radius: f32) -> Self {
        self.node_radius = node_radius;
        self
    }

    /// Set the world extent
    #[must_use]
    pub fn with_world_size(mut self, world_size: Vec2) -> Self {
        self.world_size = world_size;
        self
    }

    /// Set obstacle padding in cells
    #[must_use]
    pub fn with_obstacle_padding(mut self, padding: usize) -> Self {
        self.obstacle_padding = padding;
        self
    }

    /// Set the agent footprint
    #[must_use]
    pub fn with_character_size(mut self, character_size: f32) -> Self {
        self.character_size = character_size;
        self
    }

    /// Set the recentering bias
    #[must_use]
    pub fn with_anchor_bias(mut self, anchor_bias: f32) -> Self {
        self.anchor_bias = anchor_bias;
        self
    }

    /// Edge length of a cell
    #[must_use]
    pub fn node_diameter(&self) -> f32 {
        self.node_radius * 2.0
    }
}

/// Search options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Post-process paths with line-of-sight string pulling
    pub smoothing: bool,
}

/// Path follower kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    /// World units per second
    pub move_speed: f32,
    /// Distance at which a waypoint counts as reached
    pub reach_threshold: f32,
    /// Reach distance used when paths are smoothed
    pub smoothed_reach_threshold: f32,
    /// Waypoints skipped past the closest one when a new unsmoothed path
    /// is picked up
    pub look_ahead: usize,
    /// Minimum per-tick displacement on an axis that counts as a direction
    pub direction_deadzone: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            reach_threshold: 0.25,
            smoothed_reach_threshold: 1.0,
            look_ahead: 2,
            direction_deadzone: 0.05,
        }
    }
}

impl FollowerConfig {
    /// Set movement speed
    #[must_use]
    pub fn with_move_speed(mut self, move_speed: f32) -> Self {
        self.move_speed = move_speed;
        self
    }

    /// Set look-ahead
    #[must_use]
    pub fn with_look_ahead(mut self, look_ahead: usize) -> Self {
        self.look_ahead = look_ahead;
        self
    }
}

/// Periodic rebuild-and-repath loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between periodic repaths
    pub period: f32,
    /// Repath immediately when the follower reverses direction
    pub repath_on_direction_change: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period: 0.25,
            repath_on_direction_change: true,
        }
    }
}

/// Full navigation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Grid layout
    pub grid: GridConfig,
    /// Search options
    pub pathfinding: PathfindingConfig,
    /// Follower kinematics
    pub follower: FollowerConfig,
    /// Refresh loop
    pub refresh: RefreshConfig,
}

impl NavConfig {
    /// Replace the grid section
    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Replace the follower section
    #[must_use]
    pub fn with_follower(mut self, follower: FollowerConfig) -> Self {
        self.follower = follower;
        self
    }

    /// Enable or disable path smoothing
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.pathfinding.smoothing = smoothing;
        self
    }

    /// Check values that would make the grid or follower degenerate
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if !grid.node_radius.is_finite() || grid.node_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid.node_radius must be positive, got {}",
                grid.node_radius
            )));
        }
        if grid.world_size.x < grid.node_diameter() || grid.world_size.y < grid.node_diameter() {
            return Err(ConfigError::Invalid(format!(
                "grid.world_size {} must cover at least one cell",
                grid.world_size
            )));
        }
        if grid.character_size < 0.0 {
            return Err(ConfigError::Invalid(
                "grid.character_size must not be negative".to_string(),
            ));
        }
        if !self.follower.move_speed.is_finite() || self.follower.move_speed < 0.0 {
            return Err(ConfigError::Invalid(
                "follower.move_speed must not be negative".to_string(),
            ));
        }
        if !self.refresh.period.is_finite() || self.refresh.period <= 0.0 {
            return Err(ConfigError::Invalid(
                "refresh.period must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Save to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Load from a file, picking the format from its extension
    ///
    /// `.json` is read as JSON; anything else as RON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::load_json(path)
        } else {
            Self::load_ron(path)
        }
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// Parsed, but the values are unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
