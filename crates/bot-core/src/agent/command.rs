use std::fmt;

use crate::world::ItemType;

/// Raw low-level command accepted by the simulator's control channel.
///
/// `Display` renders the exact text the simulator expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Continuous walk rate in `[-1, 1]`; negative walks backward.
    Move(f64),
    /// Continuous yaw rate in `[-1, 1]`.
    Turn(f64),
    /// Continuous pitch rate in `[-1, 1]`; positive looks down.
    Pitch(f64),
    Attack(bool),
    Craft(ItemType),
    DiscardCurrentItem,
    /// Hotbar key press/release; `slot` is zero based and rendered one based.
    Hotbar { slot: usize, pressed: bool },
    SwapInventoryItems(usize, usize),
}

impl Command {
    /// Commands that halt all continuous motion.
    pub fn stop_all() -> [Command; 4] {
        [
            Command::Move(0.0),
            Command::Turn(0.0),
            Command::Pitch(0.0),
            Command::Attack(false),
        ]
    }
}

fn flag(on: bool) -> u8 {
    u8::from(on)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(rate) => write!(f, "move {rate}"),
            Command::Turn(rate) => write!(f, "turn {rate}"),
            Command::Pitch(rate) => write!(f, "pitch {rate}"),
            Command::Attack(on) => write!(f, "attack {}", flag(*on)),
            Command::Craft(item) => write!(f, "craft {item}"),
            Command::DiscardCurrentItem => f.write_str("discardCurrentItem"),
            Command::Hotbar { slot, pressed } => {
                write!(f, "hotbar.{} {}", slot + 1, flag(*pressed))
            }
            Command::SwapInventoryItems(a, b) => write!(f, "swapInventoryItems {a} {b}"),
        }
    }
}
