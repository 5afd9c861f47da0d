use std::str::FromStr;

use bitflags::bitflags;

use crate::error::ConfigError;
use crate::world::{ItemFilter, MobFilter};

bitflags! {
    /// Extra state the trace keeps current for one agent.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct TrackingFlags: u32 {
        const CLOSEST_MOB          = 0x1;
        const CLOSEST_PEACEFUL_MOB = 0x2;
        const CLOSEST_HOSTILE_MOB  = 0x4;
        const CLOSEST_FOOD_MOB     = 0x8;
        const CLOSEST_FOOD_ITEM    = 0x10;
        const INVENTORY            = 0x20;
        const CLOSEST_ITEM         = 0x40;
    }
}

impl TrackingFlags {
    /// Parses one config name such as `closest_hostile_mob`.
    pub fn from_config_name(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "closest_mob" => Ok(Self::CLOSEST_MOB),
            "closest_peaceful_mob" => Ok(Self::CLOSEST_PEACEFUL_MOB),
            "closest_hostile_mob" => Ok(Self::CLOSEST_HOSTILE_MOB),
            "closest_food_mob" => Ok(Self::CLOSEST_FOOD_MOB),
            "closest_item" => Ok(Self::CLOSEST_ITEM),
            "closest_food_item" => Ok(Self::CLOSEST_FOOD_ITEM),
            "inventory" => Ok(Self::INVENTORY),
            _ => Err(ConfigError::UnknownTrackingFlag(name.to_string())),
        }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigError> {
        names
            .iter()
            .try_fold(Self::empty(), |acc, name| Ok(acc | Self::from_config_name(name.as_ref())?))
    }

    /// Closest-mob queries to refresh each tick, in a fixed order.
    pub fn mob_filters(&self) -> Vec<MobFilter> {
        [
            (Self::CLOSEST_MOB, MobFilter::All),
            (Self::CLOSEST_PEACEFUL_MOB, MobFilter::Peaceful),
            (Self::CLOSEST_HOSTILE_MOB, MobFilter::Hostile),
            (Self::CLOSEST_FOOD_MOB, MobFilter::Food),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, filter)| filter)
        .collect()
    }

    pub fn item_filters(&self) -> Vec<ItemFilter> {
        [
            (Self::CLOSEST_ITEM, ItemFilter::All),
            (Self::CLOSEST_FOOD_ITEM, ItemFilter::Food),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, filter)| filter)
        .collect()
    }
}

/// `closest_mob|inventory` style lists; `,` also separates.
impl FromStr for TrackingFlags {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s
            .split(['|', ','])
            .filter(|part| !part.trim().is_empty())
            .collect();
        Self::from_names(&names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_lists() {
        let flags: TrackingFlags = "closest_mob | inventory".parse().unwrap();
        assert_eq!(flags, TrackingFlags::CLOSEST_MOB | TrackingFlags::INVENTORY);
        assert_eq!("".parse::<TrackingFlags>().unwrap(), TrackingFlags::empty());
        assert_eq!(
            "closest_mob,glowing".parse::<TrackingFlags>(),
            Err(ConfigError::UnknownTrackingFlag("glowing".into()))
        );
    }

    #[test]
    fn config_names_sit_beside_flag_names() {
        assert_eq!(
            TrackingFlags::from_config_name(" Closest_Hostile_Mob "),
            Ok(TrackingFlags::CLOSEST_HOSTILE_MOB)
        );
        assert_eq!(
            TrackingFlags::from_name("CLOSEST_HOSTILE_MOB"),
            Some(TrackingFlags::CLOSEST_HOSTILE_MOB)
        );
        assert_eq!(TrackingFlags::from_name("closest_hostile_mob"), None);
    }

    #[test]
    fn filters_follow_flags() {
        let flags = TrackingFlags::CLOSEST_HOSTILE_MOB
            | TrackingFlags::CLOSEST_MOB
            | TrackingFlags::CLOSEST_FOOD_ITEM;
        assert_eq!(flags.mob_filters(), vec![MobFilter::All, MobFilter::Hostile]);
        assert_eq!(flags.item_filters(), vec![ItemFilter::Food]);
    }
}
