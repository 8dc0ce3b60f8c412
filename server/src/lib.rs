//! Glitch abilities server.
//!
//! Players own up to two equipped glitches, fire them with one key whose
//! target slot depends on a held modifier, and lose one at random on death.

pub mod commands;
pub mod config;
pub mod error;
pub mod glitch;
pub mod host;
pub mod limiter;
pub mod manager;
pub mod network;
pub mod recipes;
pub mod router;
pub mod service;
pub mod status;
pub mod timer;
pub mod world;

pub use error::{ConfigError, GlitchError};
pub use glitch::{Glitch, GlitchFactory, GlitchId};
pub use host::GameHost;
pub use manager::GlitchManager;
