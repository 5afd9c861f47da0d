//! Agent control: raw commands, the environment seam, and the per-agent action state machine.
//!
//! Actions are polled once per tick. They return `Ok(false)` while the goal is not yet met and
//! queue [`LogReport`]s for the trace logger as they make progress.

mod actions;
pub mod command;
pub mod controller;
pub mod environment;
pub mod movement;
pub mod overrides;
pub mod registry;
pub mod report;
pub mod scripted;

pub use command::Command;
pub use controller::{Agent, validate_agent_id};
pub use environment::Environment;
pub use movement::{MoveBand, Walk};
pub use overrides::{ActionKind, ActionOverride, RecipeItem};
pub use registry::AgentRegistry;
pub use report::{ItemHandoff, LogReport};
pub use scripted::ScriptedEnvironment;
