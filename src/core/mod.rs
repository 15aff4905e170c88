//! Core module
//!
//! Configuration, events, timing, logging and debug statistics

mod config;
mod debug;
mod events;
pub mod logging;
mod ticker;

pub use config::{
    ConfigError, FollowerConfig, GridConfig, NavConfig, PathfindingConfig, RefreshConfig,
};
pub use debug::{NavDebug, SearchStats};
pub use events::{EventListeners, EventQueue, ListenerId, NavEvent};
pub use ticker::Ticker;
