//! Fatal configuration errors.
//!
//! Precondition failures are not errors; actions report them as `Ok(false)`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("two agents can not share the id {0:?}")]
    DuplicateAgent(String),

    #[error("agent id {0:?} must be non-empty, must not be \"None\" and must not contain '-' or whitespace")]
    InvalidAgentId(String),

    #[error("no agent registered with id {0:?}")]
    UnknownAgent(String),

    #[error("closest-mob filter must be one of all/peaceful/hostile/food, got {0:?}")]
    UnknownMobFilter(String),

    #[error("closest-item filter must be one of all/food, got {0:?}")]
    UnknownItemFilter(String),

    #[error("unknown trace tracking flag {0:?}")]
    UnknownTrackingFlag(String),

    #[error("unknown item type {0:?}")]
    UnknownItem(String),

    #[error("inventory slot {slot} is out of range (0..{capacity})")]
    SlotOutOfRange { slot: usize, capacity: usize },

    #[error("stack quantity {quantity} is out of range (1..={max})")]
    QuantityOutOfRange { quantity: usize, max: usize },

    #[error("trace logger was already started")]
    LoggerAlreadyStarted,

    #[error("trace logger has not been started")]
    LoggerNotStarted,
}
