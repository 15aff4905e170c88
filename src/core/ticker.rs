//! Fixed-period cooperative timer
//!
//! Driven by the host frame loop: feed it elapsed time, it reports when the
//! period has elapsed. No threads, no wall clock.

/// Fires once every `period` seconds of accumulated frame time.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: f32,
    elapsed: f32,
    paused: bool,
}

impl Ticker {
    /// Create a ticker that first fires after one full period.
    #[must_use]
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            elapsed: 0.0,
            paused: false,
        }
    }

    /// Make the next `tick` fire regardless of elapsed time.
    #[must_use]
    pub fn primed(mut self) -> Self {
        self.elapsed = self.period;
        self
    }

    /// Advance by `dt` seconds. Returns `true` if the period elapsed.
    ///
    /// Multiple periods elapsing in one call still fire once; the
    /// remainder carries over.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.paused {
            return false;
        }

        self.elapsed += dt.max(0.0);
        if self.elapsed < self.period {
            return false;
        }

        self.elapsed %= self.period;
        true
    }

    /// Stop accumulating time until `resume` is called.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after `pause`.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Restart the current period.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Period in seconds.
    #[must_use]
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Whether the ticker is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
