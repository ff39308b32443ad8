//! Game object types and their static rewards.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Coarse category a raw location is sorted into before tiers are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameObjectCategory {
    Minion,
    Chest,
    EnergyStation,
}

impl fmt::Display for GameObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minion => write!(f, "minion"),
            Self::Chest => write!(f, "chest"),
            Self::EnergyStation => write!(f, "energy_station"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinionTier {
    Scout,
    Soldier,
    Captain,
}

impl MinionTier {
    pub const ALL: [MinionTier; 3] = [Self::Scout, Self::Soldier, Self::Captain];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestTier {
    Bronze,
    Silver,
    Gold,
}

/// Concrete in-game object placed at a spawn location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameObjectType {
    Minion { tier: MinionTier },
    Chest { tier: ChestTier },
    EnergyStation,
}

impl GameObjectType {
    pub fn category(&self) -> GameObjectCategory {
        match self {
            Self::Minion { .. } => GameObjectCategory::Minion,
            Self::Chest { .. } => GameObjectCategory::Chest,
            Self::EnergyStation => GameObjectCategory::EnergyStation,
        }
    }
}

impl fmt::Display for GameObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minion { tier } => write!(f, "minion:{:?}", tier),
            Self::Chest { tier } => write!(f, "chest:{:?}", tier),
            Self::EnergyStation => write!(f, "energy_station"),
        }
    }
}

/// Inventory items handed out by spawn locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardItem {
    FreeXp,
    Gold,
    Diamond,
    Energy,
    BronzeKey,
    SilverKey,
    GoldKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReward {
    pub item: RewardItem,
    pub quantity: u32,
}

/// Static reward parameters assigned together with the object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardParams {
    pub items: Vec<ItemReward>,
    pub xp: u32,
    /// Default cooldown before the location can be claimed again
    pub respawn_cooldown_secs: u64,
}

impl RewardParams {
    pub fn new(xp: u32, respawn_cooldown_secs: u64) -> Self {
        Self {
            items: Vec::new(),
            xp,
            respawn_cooldown_secs,
        }
    }

    pub fn with_item(mut self, item: RewardItem, quantity: u32) -> Self {
        self.items.push(ItemReward { item, quantity });
        self
    }

    /// Saturates at `Duration::MAX` for absurd values.
    pub fn respawn_cooldown(&self) -> Duration {
        i64::try_from(self.respawn_cooldown_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    /// Quantity of `item` granted, zero if absent.
    pub fn quantity_of(&self, item: RewardItem) -> u32 {
        self.items
            .iter()
            .filter(|r| r.item == item)
            .map(|r| r.quantity)
            .sum()
    }
}
