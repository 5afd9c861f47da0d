//! Tick-driven agent control for a simulated 3-D world, plus the predicate trace logger that
//! records what the agents did.
//!
//! The runner binary wires these pieces to live simulator connections; tests and offline replay
//! use [`agent::ScriptedEnvironment`].

pub mod agent;
pub mod config;
pub mod error;
pub mod geometry;
pub mod trace;
pub mod world;

pub use error::ConfigError;
