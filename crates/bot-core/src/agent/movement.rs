use serde::{Deserialize, Serialize};

use super::command::Command;

/// Walk rate used to keep closing slowly once inside the band.
pub const CRAWL_RATE: f64 = 0.4;

/// Inclusive horizontal-distance band an agent tries to hold around its target.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct MoveBand {
    pub min: f64,
    pub max: f64,
}

impl MoveBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min && distance <= self.max
    }

    pub fn classify(&self, distance: f64) -> Walk {
        if distance > self.max {
            Walk::Advance
        } else if distance < self.min {
            Walk::Retreat
        } else {
            Walk::InBand
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Advance,
    Retreat,
    InBand,
}

impl Walk {
    /// Walk command for this decision. In band, `hard_stop` halts instead of crawling forward.
    pub fn command(&self, hard_stop: bool) -> Command {
        match self {
            Walk::Advance => Command::Move(1.0),
            Walk::Retreat => Command::Move(-1.0),
            Walk::InBand if hard_stop => Command::Move(0.0),
            Walk::InBand => Command::Move(CRAWL_RATE),
        }
    }
}
