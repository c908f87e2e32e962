//! Catswp - swipe through random cats in your terminal
//!
//! This crate provides the core of the Catswp application: fetching a batch of images,
//! the swipe session state machine, gesture surfaces and the save and share actions.

pub mod actions;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod gesture;
pub mod loader;
pub mod logging;
pub mod source;
pub mod tui;

// Re-export primary types for convenience
pub use app::{App, View};
pub use cache::{ItemCache, LoadReport, LoadedBatch};
pub use config::UserConfig;
pub use domain::{
    DecisionOutcome, Direction, DisplayHandle, Item, ItemId, Phase, SessionTimings, SwipeSession,
};
pub use error::{CatswpError, Result};
pub use gesture::{DragTracker, GestureRegistry};
pub use source::{HttpImageSource, ImageSource};
