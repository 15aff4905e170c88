//! Path following
//!
//! Walks an agent along the active path at constant speed and reports
//! motion as edge-triggered [`NavEvent`]s. A new path may arrive at any
//! time; the follower picks it up from the waypoint nearest the agent.
//!
//! # Example
//!
//! ```ignore
//! let mut follower = PathFollower::new(&FollowerConfig::default(), false);
//! let mut events = Vec::new();
//!
//! follower.follow_path(path, agent, &mut events);
//! loop {
//!     agent = follower.tick(agent, dt, &mut events);
//!     for event in events.drain(..) {
//!         animator.handle(&event);
//!     }
//! }
//! ```

use std::fmt;

use glam::{Vec2, Vec3};

use crate::ai::pathfinding::{Path, Waypoint};
use crate::core::{FollowerConfig, NavEvent};

/// Follower state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowState {
    /// Not following anything
    #[default]
    Idle,
    /// Advancing along the active path
    Following,
}

impl FollowState {
    /// State name for debugging and logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Following => "Following",
        }
    }
}

impl fmt::Display for FollowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Last horizontal direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    /// Towards -x
    Left,
    /// Towards +x
    Right,
}

impl HorizontalDirection {
    /// Unit sign along x
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Last vertical direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    /// Towards +y
    Up,
    /// Towards -y
    Down,
}

impl VerticalDirection {
    /// Unit sign along y
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

/// Moves an agent along a [`Path`]
#[derive(Debug, Clone)]
pub struct PathFollower {
    move_speed: f32,
    reach_threshold: f32,
    smoothed_reach_threshold: f32,
    look_ahead: usize,
    direction_deadzone: f32,
    /// Paths arrive smoothed, so resume exactly and use the wider reach
    smoothing: bool,

    path: Path,
    current_index: usize,
    state: FollowState,
    is_moving: bool,
    last_horizontal: Option<HorizontalDirection>,
    last_vertical: Option<VerticalDirection>,
    last_position: Option<Vec3>,
    /// Set by `stop` or an empty path; the held route may be taken again
    released: bool,
}

impl PathFollower {
    /// Create an idle follower
    #[must_use]
    pub fn new(config: &FollowerConfig, smoothing: bool) -> Self {
        Self {
            move_speed: config.move_speed,
            reach_threshold: config.reach_threshold,
            smoothed_reach_threshold: config.smoothed_reach_threshold,
            look_ahead: config.look_ahead,
            direction_deadzone: config.direction_deadzone,
            smoothing,
            path: Path::default(),
            current_index: 0,
            state: FollowState::Idle,
            is_moving: false,
            last_horizontal: None,
            last_vertical: None,
            last_position: None,
            released: false,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Whether a path is being followed
    #[must_use]
    pub fn is_following(&self) -> bool {
        self.state == FollowState::Following
    }

    /// Whether the last tick changed the agent's position
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// The active path (kept after completion for inspection)
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the waypoint being walked towards
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Waypoint being walked towards, if following
    #[must_use]
    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        if self.is_following() {
            self.path.get(self.current_index)
        } else {
            None
        }
    }

    /// Last recorded horizontal direction
    #[must_use]
    pub fn last_horizontal(&self) -> Option<HorizontalDirection> {
        self.last_horizontal
    }

    /// Last recorded vertical direction
    #[must_use]
    pub fn last_vertical(&self) -> Option<VerticalDirection> {
        self.last_vertical
    }

    /// Last recorded directions as a vector with components in -1..=1
    #[must_use]
    pub fn heading(&self) -> Vec2 {
        Vec2::new(
            self.last_horizontal.map_or(0.0, HorizontalDirection::sign),
            self.last_vertical.map_or(0.0, VerticalDirection::sign),
        )
    }

    /// Distance at which the current waypoint counts as reached
    #[must_use]
    pub fn reach_threshold(&self) -> f32 {
        if self.smoothing {
            self.smoothed_reach_threshold
        } else {
            self.reach_threshold
        }
    }

    /// Set movement speed
    pub fn set_move_speed(&mut self, move_speed: f32) {
        self.move_speed = move_speed.max(0.0);
    }

    /// Replace the active path
    ///
    /// An empty path forces `Idle`. A path over the same cells as the held
    /// one changes nothing, whether it is still being walked or already
    /// completed, unless `stop` or an empty path released it. Otherwise the
    /// follower resumes at the waypoint nearest `position`, plus the
    /// look-ahead when paths are not smoothed. Returns whether the path was
    /// taken.
    pub fn follow_path(&mut self, path: Path, position: Vec3, events: &mut Vec<NavEvent>) -> bool {
        if path.is_empty() {
            self.state = FollowState::Idle;
            self.released = true;
            return false;
        }
        if !self.released && path.same_route(&self.path) {
            return false;
        }

        let closest = path.closest_index(position).unwrap_or(0);
        let last = path.len() - 1;
        self.current_index = if self.smoothing {
            closest
        } else {
            (closest + self.look_ahead).min(last)
        };

        log::debug!(
            "Following {} waypoints from index {} (closest {closest})",
            path.len(),
            self.current_index
        );

        events.push(NavEvent::PathAssigned {
            waypoints: path.len(),
        });
        self.path = path;
        self.state = FollowState::Following;
        self.released = false;
        true
    }

    /// Stop following; the path stays readable but no longer blocks the
    /// same route from being taken again
    pub fn stop(&mut self) {
        self.state = FollowState::Idle;
        self.released = true;
    }

    /// Advance the agent by `dt` seconds
    ///
    /// Returns the new position. Motion events are derived from the change
    /// since the previous tick, so a position moved by something else
    /// between ticks is reported too.
    pub fn tick(&mut self, position: Vec3, dt: f32, events: &mut Vec<NavEvent>) -> Vec3 {
        let next = self.advance(position, dt, events);
        self.track_motion(position, next, events);
        next
    }

    fn advance(&mut self, position: Vec3, dt: f32, events: &mut Vec<NavEvent>) -> Vec3 {
        if self.state != FollowState::Following {
            return position;
        }
        let Some(waypoint) = self.path.get(self.current_index) else {
            self.state = FollowState::Idle;
            return position;
        };

        let target = waypoint.world_position;
        let next = move_towards(position, target, self.move_speed * dt.max(0.0));

        if next.distance(target) < self.reach_threshold() {
            events.push(NavEvent::WaypointReached {
                index: self.current_index,
            });
            self.current_index += 1;

            if self.current_index >= self.path.len() {
                self.state = FollowState::Idle;
                events.push(NavEvent::PathCompleted);
                log::debug!("Path completed at ({:.2}, {:.2})", next.x, next.y);
            }
        }

        next
    }

    fn track_motion(&mut self, position: Vec3, next: Vec3, events: &mut Vec<NavEvent>) {
        let previous = self.last_position.unwrap_or(position);
        let delta = next - previous;
        self.last_position = Some(next);

        let moving = delta.length_squared() > 0.0;
        if moving != self.is_moving {
            self.is_moving = moving;
            events.push(if moving {
                NavEvent::StartMove
            } else {
                NavEvent::EndMove
            });
        }

        let horizontal = if delta.x > self.direction_deadzone {
            Some(HorizontalDirection::Right)
        } else if delta.x < -self.direction_deadzone {
            Some(HorizontalDirection::Left)
        } else {
            None
        };
        if let Some(direction) = horizontal.filter(|d| self.last_horizontal != Some(*d)) {
            self.last_horizontal = Some(direction);
            events.push(match direction {
                HorizontalDirection::Left => NavEvent::MovedLeft,
                HorizontalDirection::Right => NavEvent::MovedRight,
            });
            events.push(NavEvent::ChangedHorizontalSide);
        }

        let vertical = if delta.y > self.direction_deadzone {
            Some(VerticalDirection::Up)
        } else if delta.y < -self.direction_deadzone {
            Some(VerticalDirection::Down)
        } else {
            None
        };
        if let Some(direction) = vertical.filter(|d| self.last_vertical != Some(*d)) {
            self.last_vertical = Some(direction);
            events.push(match direction {
                VerticalDirection::Up => NavEvent::MovedUp,
                VerticalDirection::Down => NavEvent::MovedDown,
            });
            events.push(NavEvent::ChangedVerticalSide);
        }
    }
}

/// Step from `position` towards `target` by at most `max_distance`
fn move_towards(position: Vec3, target: Vec3, max_distance: f32) -> Vec3 {
    let to_target = target - position;
    let distance = to_target.length();
    if distance <= max_distance || distance <= f32::EPSILON {
        target
    } else {
        position + to_target / distance * max_distance
    }
}
