//! Spawn catalog: turns raw provider candidates into game objects.
//!
//! Classification is deterministic given the candidate's tags and position;
//! the injected random source is only consulted to pick among minion tiers
//! and, with [`SelectionPolicy::Random`], to choose which surplus candidates
//! to keep.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zoinkies_domain::{
    CellId, ChestTier, GameObjectCategory, GameObjectType, LatLng, LocationId, MinionTier,
    RawLocation, RewardItem, RewardParams, SpawnLocation,
};

use crate::infrastructure::ports::RandomPort;

/// Maps a set of place tags to a category. Rules are tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub category: GameObjectCategory,
    pub tags: Vec<String>,
}

impl TagRule {
    pub fn new(category: GameObjectCategory, tags: &[&str]) -> Self {
        Self {
            category,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn matches(&self, raw: &RawLocation) -> bool {
        self.tags.iter().any(|tag| raw.has_type(tag))
    }
}

/// Built-in tag rules. Anything unmatched becomes a minion.
pub fn default_tag_rules() -> Vec<TagRule> {
    vec![
        TagRule::new(
            GameObjectCategory::EnergyStation,
            &[
                "gas_station",
                "electric_vehicle_charging_station",
                "transit_station",
                "train_station",
                "bus_station",
            ],
        ),
        TagRule::new(
            GameObjectCategory::Chest,
            &[
                "park",
                "museum",
                "library",
                "tourist_attraction",
                "place_of_worship",
                "art_gallery",
            ],
        ),
    ]
}

/// Which candidates survive when a cell has more of one category than allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Keep the first candidates in provider order.
    #[default]
    ProviderOrder,
    /// Keep a random subset.
    Random,
    /// Keep the candidates closest to the cell centre.
    NearestToCellCenter,
}

/// Default respawn cooldown per category, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownTable {
    pub minion_secs: u64,
    pub chest_secs: u64,
    pub energy_station_secs: u64,
}

impl Default for CooldownTable {
    fn default() -> Self {
        Self {
            minion_secs: 300,
            chest_secs: 1800,
            energy_station_secs: 120,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub rules: Vec<TagRule>,
    /// Tiers a minion may be drawn from; never empty.
    pub minion_tiers: Vec<MinionTier>,
    pub selection_policy: SelectionPolicy,
    pub max_per_category: Option<usize>,
    pub cooldowns: CooldownTable,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            rules: default_tag_rules(),
            minion_tiers: MinionTier::ALL.to_vec(),
            selection_policy: SelectionPolicy::default(),
            max_per_category: None,
            cooldowns: CooldownTable::default(),
        }
    }
}

/// Why a candidate could not become a spawn location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unclassifiable {
    #[error("candidate has no place id")]
    MissingPlaceId,
    #[error("candidate {0} has no coordinates")]
    MissingCoordinates(String),
}

/// Result of classifying one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub id: LocationId,
    pub coordinates: LatLng,
    pub game_object_type: GameObjectType,
    pub rewards: RewardParams,
}

pub struct SpawnCatalog {
    config: CatalogConfig,
    random: Arc<dyn RandomPort>,
}

impl SpawnCatalog {
    pub fn new(mut config: CatalogConfig, random: Arc<dyn RandomPort>) -> Self {
        if config.minion_tiers.is_empty() {
            config.minion_tiers = MinionTier::ALL.to_vec();
        }
        Self { config, random }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Assign a game object type and rewards to one candidate.
    pub fn classify(
        &self,
        raw: &RawLocation,
        cell: CellId,
    ) -> Result<Classification, Unclassifiable> {
        let id = LocationId::new(raw.place_id.as_str()).map_err(|_| Unclassifiable::MissingPlaceId)?;
        let coordinates = raw
            .coordinates()
            .ok_or_else(|| Unclassifiable::MissingCoordinates(id.to_string()))?;

        let game_object_type = match self.category_for(raw) {
            GameObjectCategory::EnergyStation => GameObjectType::EnergyStation,
            GameObjectCategory::Chest => GameObjectType::Chest {
                tier: chest_tier(&coordinates, cell),
            },
            GameObjectCategory::Minion => GameObjectType::Minion {
                tier: self.pick_minion_tier(),
            },
        };
        let rewards = self.rewards_for(game_object_type);

        Ok(Classification {
            id,
            coordinates,
            game_object_type,
            rewards,
        })
    }

    /// Classify a provider answer for one cell into new spawn locations.
    ///
    /// Unclassifiable candidates and repeated ids are dropped and logged. The
    /// selection policy then trims each category to `max_per_category`.
    pub fn build_cell(&self, cell: CellId, raws: &[RawLocation]) -> Vec<SpawnLocation> {
        let mut seen = HashSet::new();
        let mut classified = Vec::with_capacity(raws.len());

        for raw in raws {
            match self.classify(raw, cell) {
                Ok(c) => {
                    if !seen.insert(c.id.clone()) {
                        tracing::debug!(cell = %cell, location_id = %c.id, "Duplicate candidate dropped");
                        continue;
                    }
                    let location = SpawnLocation::new(
                        c.id,
                        cell,
                        c.coordinates,
                        c.game_object_type,
                        c.rewards,
                    )
                    .with_name(raw.name.clone());
                    classified.push(location);
                }
                Err(reason) => {
                    tracing::warn!(cell = %cell, reason = %reason, "Dropping unclassifiable location");
                }
            }
        }

        self.select(cell, classified)
    }

    /// Static reward table.
    pub fn rewards_for(&self, game_object_type: GameObjectType) -> RewardParams {
        let cooldowns = &self.config.cooldowns;
        match game_object_type {
            GameObjectType::Minion { tier } => {
                let base = RewardParams::new(0, cooldowns.minion_secs);
                match tier {
                    MinionTier::Scout => RewardParams { xp: 10, ..base }
                        .with_item(RewardItem::FreeXp, 10)
                        .with_item(RewardItem::BronzeKey, 1),
                    MinionTier::Soldier => RewardParams { xp: 25, ..base }
                        .with_item(RewardItem::Gold, 10)
                        .with_item(RewardItem::SilverKey, 1),
                    MinionTier::Captain => RewardParams { xp: 50, ..base }
                        .with_item(RewardItem::Gold, 20)
                        .with_item(RewardItem::GoldKey, 1),
                }
            }
            GameObjectType::Chest { tier } => {
                let base = RewardParams::new(0, cooldowns.chest_secs);
                match tier {
                    ChestTier::Bronze => RewardParams { xp: 20, ..base }
                        .with_item(RewardItem::Gold, 25),
                    ChestTier::Silver => RewardParams { xp: 40, ..base }
                        .with_item(RewardItem::Gold, 50)
                        .with_item(RewardItem::Diamond, 1),
                    ChestTier::Gold => RewardParams { xp: 80, ..base }
                        .with_item(RewardItem::Gold, 100)
                        .with_item(RewardItem::Diamond, 3),
                }
            }
            GameObjectType::EnergyStation => {
                RewardParams::new(5, cooldowns.energy_station_secs).with_item(RewardItem::Energy, 50)
            }
        }
    }

    fn category_for(&self, raw: &RawLocation) -> GameObjectCategory {
        self.config
            .rules
            .iter()
            .find(|rule| rule.matches(raw))
            .map(|rule| rule.category)
            .unwrap_or(GameObjectCategory::Minion)
    }

    fn pick_minion_tier(&self) -> MinionTier {
        let tiers = &self.config.minion_tiers;
        let last = i32::try_from(tiers.len().saturating_sub(1)).unwrap_or(i32::MAX);
        let index = usize::try_from(self.random.gen_range(0, last)).unwrap_or(0);
        tiers.get(index).or(tiers.first()).copied().unwrap_or(MinionTier::Scout)
    }

    fn select(&self, cell: CellId, candidates: Vec<SpawnLocation>) -> Vec<SpawnLocation> {
        let Some(max) = self.config.max_per_category else {
            return candidates;
        };

        let mut by_category: HashMap<GameObjectCategory, Vec<usize>> = HashMap::new();
        for (i, location) in candidates.iter().enumerate() {
            by_category
                .entry(location.game_object_type().category())
                .or_default()
                .push(i);
        }

        let center = cell.center();
        let mut keep = HashSet::new();
        for (_, mut indices) in by_category {
            if indices.len() > max {
                match self.config.selection_policy {
                    SelectionPolicy::ProviderOrder => {}
                    SelectionPolicy::Random => self.shuffle(&mut indices),
                    SelectionPolicy::NearestToCellCenter => indices.sort_by(|a, b| {
                        let da = candidates[*a].coordinates().distance_meters(&center);
                        let db = candidates[*b].coordinates().distance_meters(&center);
                        da.total_cmp(&db)
                    }),
                }
                indices.truncate(max);
            }
            keep.extend(indices);
        }

        // Survivors stay in provider order
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(i, location)| keep.contains(&i).then_some(location))
            .collect()
    }

    /// Fisher-Yates over the injected random source.
    fn shuffle(&self, items: &mut [usize]) {
        for i in (1..items.len()).rev() {
            let upper = i32::try_from(i).unwrap_or(i32::MAX);
            let j = usize::try_from(self.random.gen_range(0, upper)).unwrap_or(0).min(i);
            items.swap(i, j);
        }
    }
}

/// Chest tier by distance from the cell centre, normalized by the cell's
/// half diagonal: inner third bronze, middle third silver, outer gold.
fn chest_tier(point: &LatLng, cell: CellId) -> ChestTier {
    let bounds = cell.bounds();
    let half_diagonal = bounds.half_diagonal_meters();
    if half_diagonal <= 0.0 {
        return ChestTier::Bronze;
    }
    let ratio = point.distance_meters(&bounds.center()) / half_diagonal;
    if ratio < 1.0 / 3.0 {
        ChestTier::Bronze
    } else if ratio < 2.0 / 3.0 {
        ChestTier::Silver
    } else {
        ChestTier::Gold
    }
}
