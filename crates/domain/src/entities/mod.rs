//! Domain entities - Core business objects with identity

mod game_object;
mod raw_location;
mod spawn_location;

pub use game_object::{
    ChestTier, GameObjectCategory, GameObjectType, ItemReward, MinionTier, RewardItem,
    RewardParams,
};
pub use raw_location::RawLocation;
pub use spawn_location::{SpawnLocation, SpawnState};
