//! Grid refresh loop
//!
//! Owns one agent's grid, pathfinder and follower. Every frame the host
//! calls [`Navigator::update`]; the navigator advances the follower and,
//! when the refresh timer fires or the agent reverses direction, rebuilds
//! the grid around the agent and hands the follower a fresh path.
//!
//! Rebuild requests only raise a flag. However many arrive during one
//! update, at most one rebuild-and-repath runs, after the follower has
//! moved, so a search never overlaps a rebuild.

use std::time::Instant;

use glam::Vec3;

use crate::ai::follower::PathFollower;
use crate::ai::grid::{Grid, GridCoord, ObstacleOracle};
use crate::ai::pathfinding::{LineOfSight, Path, Pathfinder};
use crate::core::{EventListeners, EventQueue, NavConfig, NavDebug, NavEvent, Ticker};

/// Periodic rebuild-and-repath controller for one agent
#[derive(Debug)]
pub struct Navigator {
    grid: Grid,
    pathfinder: Pathfinder,
    follower: PathFollower,
    ticker: Ticker,
    listeners: EventListeners,
    queue: EventQueue,
    debug: NavDebug,
    follow_enabled: bool,
    repath_on_direction_change: bool,
    repath_pending: bool,
    /// Events produced during the current update
    frame_events: Vec<NavEvent>,
}

impl Navigator {
    /// Create a navigator; the first update always repaths
    #[must_use]
    pub fn new(config: &NavConfig) -> Self {
        let smoothing = config.pathfinding.smoothing;
        Self {
            grid: Grid::new(&config.grid),
            pathfinder: Pathfinder::new(&config.pathfinding),
            follower: PathFollower::new(&config.follower, smoothing),
            ticker: Ticker::new(config.refresh.period).primed(),
            listeners: EventListeners::new(),
            queue: EventQueue::new(),
            debug: NavDebug::new(),
            follow_enabled: true,
            repath_on_direction_change: config.refresh.repath_on_direction_change,
            repath_pending: false,
            frame_events: Vec::new(),
        }
    }

    /// The agent's grid as of the last rebuild
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The follower
    #[must_use]
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// The active path
    #[must_use]
    pub fn active_path(&self) -> &Path {
        self.follower.path()
    }

    /// Listener registry for this agent's events
    pub fn listeners_mut(&mut self) -> &mut EventListeners {
        &mut self.listeners
    }

    /// Events from the previous update
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.queue
    }

    /// Debug overlay state
    #[must_use]
    pub fn debug(&self) -> &NavDebug {
        &self.debug
    }

    /// Mutable debug overlay state
    pub fn debug_mut(&mut self) -> &mut NavDebug {
        &mut self.debug
    }

    /// Overlay text for the current state
    #[must_use]
    pub fn debug_lines(&self) -> Vec<String> {
        let route: Vec<(usize, usize)> = self
            .follower
            .path()
            .coords()
            .map(|coord| (coord.x, coord.y))
            .collect();
        self.debug.lines(self.follower.state().name(), &route)
    }

    /// Whether the agent may chase its target
    #[must_use]
    pub fn follow_enabled(&self) -> bool {
        self.follow_enabled
    }

    /// Allow or forbid chasing; forbidding also stops the follower
    pub fn set_follow_enabled(&mut self, enabled: bool) {
        self.follow_enabled = enabled;
        if !enabled {
            self.follower.stop();
            self.repath_pending = false;
        }
    }

    /// Ask for a rebuild-and-repath during the next update
    pub fn request_repath(&mut self) {
        if self.follow_enabled {
            self.repath_pending = true;
        }
    }

    /// Whether a rebuild-and-repath is waiting for the next update
    #[must_use]
    pub fn repath_pending(&self) -> bool {
        self.repath_pending
    }

    /// Advance one frame
    ///
    /// Moves the agent from `agent` towards `target` and returns its new
    /// position. Events of this frame reach listeners before returning and
    /// the event queue after the next call.
    pub fn update<E>(&mut self, env: &E, agent: Vec3, target: Vec3, dt: f32) -> Vec3
    where
        E: ObstacleOracle + LineOfSight,
    {
        self.queue.swap();
        self.frame_events.clear();

        if self.ticker.tick(dt) && self.should_chase(agent, target) {
            self.repath_pending = true;
        }

        let next = self.follower.tick(agent, dt, &mut self.frame_events);

        if self.repath_on_direction_change
            && self.follow_enabled
            && self.frame_events.iter().any(NavEvent::is_direction_change)
        {
            log::debug!("Direction changed, repathing early");
            self.repath_pending = true;
        }

        if self.repath_pending {
            self.repath_pending = false;
            self.rebuild_and_repath(env, next, target);
        }

        for event in self.frame_events.drain(..) {
            self.listeners.dispatch(&event);
            self.queue.push(event);
        }

        next
    }

    fn should_chase(&self, agent: Vec3, target: Vec3) -> bool {
        self.follow_enabled
            && agent.truncate().distance(target.truncate()) > self.grid.character_size()
    }

    /// Recenter, rebuild, resolve both ends to walkable cells and search.
    ///
    /// Returns whether the follower took a new path. A failed search keeps
    /// the previous path.
    fn rebuild_and_repath<E>(&mut self, env: &E, agent: Vec3, target: Vec3) -> bool
    where
        E: ObstacleOracle + LineOfSight,
    {
        let anchor = self.grid.anchor_for(agent, self.follower.heading());
        let blocked = self.grid.rebuild(anchor, env);
        self.debug
            .record_rebuild(blocked, self.grid.size_x() * self.grid.size_y());

        let Some((start, goal)) = self.resolve_endpoints(agent, target) else {
            log::warn!("No walkable cell in grid around ({:.2}, {:.2})", agent.x, agent.y);
            return false;
        };
        let (Some(start_node), Some(goal_node)) = (self.grid.node(start), self.grid.node(goal))
        else {
            return false;
        };
        let (start_position, goal_position) = (start_node.world_position, goal_node.world_position);

        let started = Instant::now();
        let path = self
            .pathfinder
            .find_path(&mut self.grid, start_position, goal_position, env);
        self.debug
            .search_stats
            .record(started.elapsed(), path.as_ref().map(Path::len));

        match path {
            Some(path) if !path.is_empty() => {
                self.follower.follow_path(path, agent, &mut self.frame_events)
            }
            _ => {
                log::debug!("No path from {start:?} to {goal:?}, keeping previous path");
                false
            }
        }
    }

    /// Snap the agent and target to walkable cells
    fn resolve_endpoints(&self, agent: Vec3, target: Vec3) -> Option<(GridCoord, GridCoord)> {
        let agent_cell = self.grid.node_from_world_point(agent);
        let start = if self.grid.is_walkable(agent_cell) {
            agent_cell
        } else {
            self.grid.closest_walkable(agent_cell)?
        };

        let target_cell = self.grid.node_from_world_point(target);
        let goal = if self.grid.is_inside_bounds(target) && self.grid.is_walkable(target_cell) {
            target_cell
        } else {
            self.grid.closest_walkable_to_world_point(target)?
        };

        Some((start, goal))
    }
}
