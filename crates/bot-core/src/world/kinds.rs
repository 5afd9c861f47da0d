use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Declares a fieldless enum together with its simulator name mapping.
macro_rules! named_kinds {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Name used by the simulator in observations and commands.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_kinds! {
    MobType {
        Bat => "Bat",
        Blaze => "Blaze",
        CaveSpider => "CaveSpider",
        Chicken => "Chicken",
        Cow => "Cow",
        Creeper => "Creeper",
        Donkey => "Donkey",
        Enderman => "Enderman",
        Endermite => "Endermite",
        Ghast => "Ghast",
        Guardian => "Guardian",
        Horse => "EntityHorse",
        Husk => "Husk",
        LavaSlime => "LavaSlime",
        Llama => "Llama",
        Mooshroom => "MushroomCow",
        Ocelot => "Ozelot",
        Parrot => "Parrot",
        Pig => "Pig",
        PigZombie => "PigZombie",
        PolarBear => "PolarBear",
        Rabbit => "Rabbit",
        Sheep => "Sheep",
        Silverfish => "Silverfish",
        Skeleton => "Skeleton",
        Slime => "Slime",
        Spider => "Spider",
        Squid => "Squid",
        Stray => "Stray",
        Villager => "Villager",
        Witch => "Witch",
        WitherSkeleton => "WitherSkeleton",
        Wolf => "Wolf",
        Zombie => "Zombie",
        ZombieVillager => "ZombieVillager",
    }
}

impl MobType {
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            MobType::Blaze
                | MobType::CaveSpider
                | MobType::Creeper
                | MobType::Enderman
                | MobType::Endermite
                | MobType::Ghast
                | MobType::Guardian
                | MobType::Husk
                | MobType::LavaSlime
                | MobType::PigZombie
                | MobType::Silverfish
                | MobType::Skeleton
                | MobType::Slime
                | MobType::Spider
                | MobType::Stray
                | MobType::Witch
                | MobType::WitherSkeleton
                | MobType::Zombie
                | MobType::ZombieVillager
        )
    }

    pub fn is_peaceful(&self) -> bool {
        !self.is_hostile()
    }

    /// Mobs that drop food when killed.
    pub fn is_food(&self) -> bool {
        matches!(
            self,
            MobType::Chicken
                | MobType::Cow
                | MobType::Mooshroom
                | MobType::Pig
                | MobType::Rabbit
                | MobType::Sheep
        )
    }
}

named_kinds! {
    ItemType {
        Apple => "apple",
        BakedPotato => "baked_potato",
        Beef => "beef",
        Bone => "bone",
        Bowl => "bowl",
        Bread => "bread",
        Carrot => "carrot",
        Chicken => "chicken",
        Cobblestone => "cobblestone",
        CookedBeef => "cooked_beef",
        CookedChicken => "cooked_chicken",
        CookedMutton => "cooked_mutton",
        CookedPorkchop => "cooked_porkchop",
        CookedRabbit => "cooked_rabbit",
        Cookie => "cookie",
        Diamond => "diamond",
        DiamondAxe => "diamond_axe",
        DiamondBoots => "diamond_boots",
        DiamondChestplate => "diamond_chestplate",
        DiamondHelmet => "diamond_helmet",
        DiamondLeggings => "diamond_leggings",
        DiamondPickaxe => "diamond_pickaxe",
        DiamondSword => "diamond_sword",
        Egg => "egg",
        Feather => "feather",
        GoldenApple => "golden_apple",
        Gunpowder => "gunpowder",
        IronIngot => "iron_ingot",
        IronSword => "iron_sword",
        Leather => "leather",
        Log => "log",
        MushroomStew => "mushroom_stew",
        Mutton => "mutton",
        Planks => "planks",
        Porkchop => "porkchop",
        Potato => "potato",
        PumpkinPie => "pumpkin_pie",
        Rabbit => "rabbit",
        RabbitStew => "rabbit_stew",
        RedMushroom => "red_mushroom",
        BrownMushroom => "brown_mushroom",
        RottenFlesh => "rotten_flesh",
        Stick => "stick",
        StoneSword => "stone_sword",
        String => "string",
        Sugar => "sugar",
        Wheat => "wheat",
        Wool => "wool",
        WoodenSword => "wooden_sword",
    }
}

impl ItemType {
    pub fn is_food(&self) -> bool {
        matches!(
            self,
            ItemType::Apple
                | ItemType::BakedPotato
                | ItemType::Beef
                | ItemType::Bread
                | ItemType::Carrot
                | ItemType::Chicken
                | ItemType::CookedBeef
                | ItemType::CookedChicken
                | ItemType::CookedMutton
                | ItemType::CookedPorkchop
                | ItemType::CookedRabbit
                | ItemType::Cookie
                | ItemType::GoldenApple
                | ItemType::MushroomStew
                | ItemType::Mutton
                | ItemType::Porkchop
                | ItemType::Potato
                | ItemType::PumpkinPie
                | ItemType::Rabbit
                | ItemType::RabbitStew
        )
    }
}

impl FromStr for ItemType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemType::from_name(s.trim()).ok_or_else(|| ConfigError::UnknownItem(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Category filter for closest-mob queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MobFilter {
    All,
    Peaceful,
    Hostile,
    Food,
}

impl MobFilter {
    pub fn matches(&self, mob: MobType) -> bool {
        match self {
            MobFilter::All => true,
            MobFilter::Peaceful => mob.is_peaceful(),
            MobFilter::Hostile => mob.is_hostile(),
            MobFilter::Food => mob.is_food(),
        }
    }

    /// Predicate name of the atom tracking this query's result.
    pub fn predicate(&self) -> &'static str {
        match self {
            MobFilter::All => "closest_mob",
            MobFilter::Peaceful => "closest_peaceful_mob",
            MobFilter::Hostile => "closest_hostile_mob",
            MobFilter::Food => "closest_food_mob",
        }
    }
}

impl FromStr for MobFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(MobFilter::All),
            "peaceful" => Ok(MobFilter::Peaceful),
            "hostile" => Ok(MobFilter::Hostile),
            "food" => Ok(MobFilter::Food),
            _ => Err(ConfigError::UnknownMobFilter(s.to_string())),
        }
    }
}

/// Category filter for closest-item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemFilter {
    All,
    Food,
}

impl ItemFilter {
    pub fn matches(&self, item: ItemType) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Food => item.is_food(),
        }
    }

    pub fn predicate(&self) -> &'static str {
        match self {
            ItemFilter::All => "closest_item",
            ItemFilter::Food => "closest_food_item",
        }
    }
}

impl FromStr for ItemFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ItemFilter::All),
            "food" => Ok(ItemFilter::Food),
            _ => Err(ConfigError::UnknownItemFilter(s.to_string())),
        }
    }
}
