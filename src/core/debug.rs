//! Search statistics and debug overlay text

use std::collections::VecDeque;
use std::time::Duration;

/// Rolling statistics over recent path searches
#[derive(Debug)]
pub struct SearchStats {
    /// Search time history for averaging
    durations: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average search time in milliseconds
    avg_search_ms: f32,
    /// Slowest search in the window, in milliseconds
    max_search_ms: f32,
    /// Searches that produced a path
    successes: u64,
    /// Searches that found no path
    failures: u64,
    /// Waypoint count of the last successful search
    last_path_len: usize,
}

impl SearchStats {
    /// Create a new tracker
    #[must_use]
    pub fn new() -> Self {
        Self {
            durations: VecDeque::with_capacity(60),
            max_samples: 60,
            avg_search_ms: 0.0,
            max_search_ms: 0.0,
            successes: 0,
            failures: 0,
            last_path_len: 0,
        }
    }

    /// Record a search that returned `path_len` waypoints, or `None` when it
    /// found nothing
    pub fn record(&mut self, elapsed: Duration, path_len: Option<usize>) {
        match path_len {
            Some(len) => {
                self.successes += 1;
                self.last_path_len = len;
            }
            None => self.failures += 1,
        }

        if self.durations.len() >= self.max_samples {
            self.durations.pop_front();
        }
        self.durations.push_back(elapsed);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        if self.durations.is_empty() {
            return;
        }

        let mut total = Duration::ZERO;
        let mut max = Duration::ZERO;
        for &dt in &self.durations {
            total += dt;
            max = max.max(dt);
        }

        let count = self.durations.len() as f32;
        self.avg_search_ms = total.as_secs_f32() * 1000.0 / count;
        self.max_search_ms = max.as_secs_f32() * 1000.0;
    }

    /// Searches that produced a path
    #[must_use]
    pub fn successes(&self) -> u64 {
        self.successes
    }

    /// Searches that found no path
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Total searches recorded
    #[must_use]
    pub fn total(&self) -> u64 {
        self.successes + self.failures
    }

    /// Waypoint count of the last successful search
    #[must_use]
    pub fn last_path_len(&self) -> usize {
        self.last_path_len
    }

    /// Average search time in milliseconds
    #[must_use]
    pub fn avg_search_ms(&self) -> f32 {
        self.avg_search_ms
    }

    /// Get a formatted stats string
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "Searches: {} ok / {} failed | {:.3}ms avg (max: {:.3}) | last path: {}",
            self.successes,
            self.failures,
            self.avg_search_ms,
            self.max_search_ms,
            self.last_path_len
        )
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Debug overlay information for a navigating agent
#[derive(Debug, Default)]
pub struct NavDebug {
    /// Whether the overlay is shown
    pub enabled: bool,
    /// Search statistics
    pub search_stats: SearchStats,
    /// Grid rebuilds performed
    rebuilds: u64,
    /// Blocked cells after the last rebuild
    blocked_cells: usize,
    /// Cells in the grid
    total_cells: usize,
}

impl NavDebug {
    /// Create new debug info
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the overlay
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Record a finished grid rebuild
    pub fn record_rebuild(&mut self, blocked_cells: usize, total_cells: usize) {
        self.rebuilds += 1;
        self.blocked_cells = blocked_cells;
        self.total_cells = total_cells;
    }

    /// Grid rebuilds performed
    #[must_use]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Overlay text. `path` lists the active waypoints as lattice
    /// coordinates.
    #[must_use]
    pub fn lines(&self, state: &str, path: &[(usize, usize)]) -> Vec<String> {
        let route = path
            .iter()
            .map(|(x, y)| format!("({x},{y})"))
            .collect::<Vec<_>>()
            .join(" ");

        vec![
            self.search_stats.format_stats(),
            format!(
                "Grid: {} rebuilds | {}/{} cells blocked",
                self.rebuilds, self.blocked_cells, self.total_cells
            ),
            format!("Follower: {state} | {} waypoints", path.len()),
            format!("Path: {route}"),
        ]
    }
}
