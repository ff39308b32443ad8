//! Spawn location entity and its lifecycle.
//!
//! ```text
//! Available --claim--> Claimed --start_respawn--> Respawning
//!     ^                                               |
//!     +------------ deadline elapsed, seen on read ---+
//! ```
//!
//! Expiry is resolved lazily: every read that takes a `now` first moves an
//! elapsed `Respawning` location back to `Available`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game_object::{GameObjectType, RewardParams};
use crate::error::DomainError;
use crate::ids::LocationId;
use crate::spatial::CellId;
use crate::value_objects::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnState {
    Available,
    Claimed,
    Respawning,
}

impl std::fmt::Display for SpawnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Claimed => write!(f, "claimed"),
            Self::Respawning => write!(f, "respawning"),
        }
    }
}

/// A classified, stateful in-game object placement.
///
/// Identity, placement, type and rewards are fixed at construction. Only
/// `state` and `respawn_time` change, and only through the transitions below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnLocation {
    id: LocationId,
    cell: CellId,
    coordinates: LatLng,
    #[serde(default)]
    name: Option<String>,
    game_object_type: GameObjectType,
    rewards: RewardParams,
    state: SpawnState,
    respawn_time: Option<DateTime<Utc>>,
}

impl SpawnLocation {
    /// New locations always start out available.
    pub fn new(
        id: LocationId,
        cell: CellId,
        coordinates: LatLng,
        game_object_type: GameObjectType,
        rewards: RewardParams,
    ) -> Self {
        Self {
            id,
            cell,
            coordinates,
            name: None,
            game_object_type,
            rewards,
            state: SpawnState::Available,
            respawn_time: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    // Accessors

    pub fn id(&self) -> &LocationId {
        &self.id
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    pub fn coordinates(&self) -> LatLng {
        self.coordinates
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn game_object_type(&self) -> GameObjectType {
        self.game_object_type
    }

    pub fn rewards(&self) -> &RewardParams {
        &self.rewards
    }

    pub fn state(&self) -> SpawnState {
        self.state
    }

    pub fn respawn_time(&self) -> Option<DateTime<Utc>> {
        self.respawn_time
    }

    pub fn is_available(&self) -> bool {
        self.state == SpawnState::Available
    }

    // Transitions

    /// Move an elapsed respawn back to available.
    ///
    /// Returns `true` if the location changed state.
    pub fn resolve_expiry(&mut self, now: DateTime<Utc>) -> bool {
        match (self.state, self.respawn_time) {
            (SpawnState::Respawning, Some(deadline)) if now >= deadline => {
                self.state = SpawnState::Available;
                self.respawn_time = None;
                true
            }
            _ => false,
        }
    }

    /// Whether the location is still respawning at `now`, resolving expiry
    /// first.
    pub fn is_respawning_at(&mut self, now: DateTime<Utc>) -> bool {
        self.resolve_expiry(now);
        self.state == SpawnState::Respawning
    }

    /// Available -> Claimed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyClaimed` unless the location is available
    /// at `now`. The location is left untouched on error.
    pub fn claim(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.resolve_expiry(now);
        if self.state != SpawnState::Available {
            return Err(DomainError::already_claimed(self.id.as_str()));
        }
        self.state = SpawnState::Claimed;
        Ok(())
    }

    /// Claimed -> Respawning until `deadline`.
    ///
    /// A deadline equal to `now` completes the respawn at once: the location
    /// goes back to available and no `respawn_time` is recorded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStateTransition` if the location is not
    /// claimed, or `DomainError::InvalidCooldown` if `deadline` lies before
    /// `now`. The location is left untouched on error.
    pub fn start_respawn(
        &mut self,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.resolve_expiry(now);
        if self.state != SpawnState::Claimed {
            return Err(DomainError::invalid_state_transition(format!(
                "{} cannot start respawning from {}",
                self.id, self.state
            )));
        }
        if deadline < now {
            return Err(DomainError::invalid_cooldown(format!(
                "deadline {} is before {}",
                deadline, now
            )));
        }
        if deadline == now {
            self.state = SpawnState::Available;
            self.respawn_time = None;
            return Ok(());
        }
        self.state = SpawnState::Respawning;
        self.respawn_time = Some(deadline);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::game_object::MinionTier;
    use chrono::{Duration, TimeZone};

    fn location() -> SpawnLocation {
        let coordinates = LatLng::new(37.27, -122.04).unwrap();
        SpawnLocation::new(
            LocationId::new("ChIJ-test").unwrap(),
            CellId::containing(&coordinates, 15).unwrap(),
            coordinates,
            GameObjectType::Minion {
                tier: MinionTier::Scout,
            },
            RewardParams::new(10, 60),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn full_lifecycle_returns_to_available() {
        let mut loc = location();
        assert!(loc.is_available());

        loc.claim(t0()).unwrap();
        assert_eq!(loc.state(), SpawnState::Claimed);

        let deadline = t0() + Duration::seconds(60);
        loc.start_respawn(deadline, t0()).unwrap();
        assert_eq!(loc.respawn_time(), Some(deadline));

        assert!(loc.is_respawning_at(t0() + Duration::seconds(59)));
        assert!(!loc.is_respawning_at(deadline));
        assert_eq!(loc.state(), SpawnState::Available);
        assert!(loc.respawn_time().is_none());
    }

    #[test]
    fn second_claim_is_rejected() {
        let mut loc = location();
        loc.claim(t0()).unwrap();
        let err = loc.claim(t0()).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyClaimed { .. }));
        assert_eq!(loc.state(), SpawnState::Claimed);
    }

    #[test]
    fn claim_resolves_elapsed_respawn() {
        let mut loc = location();
        loc.claim(t0()).unwrap();
        loc.start_respawn(t0() + Duration::seconds(60), t0()).unwrap();

        assert!(loc.claim(t0() + Duration::seconds(30)).is_err());
        loc.claim(t0() + Duration::seconds(61)).unwrap();
        assert_eq!(loc.state(), SpawnState::Claimed);
    }

    #[test]
    fn start_respawn_from_available_is_invalid() {
        let mut loc = location();
        let before = loc.clone();
        let err = loc
            .start_respawn(t0() + Duration::seconds(60), t0())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        assert_eq!(loc, before);
    }

    #[test]
    fn start_respawn_twice_is_invalid() {
        let mut loc = location();
        loc.claim(t0()).unwrap();
        loc.start_respawn(t0() + Duration::seconds(60), t0()).unwrap();
        let err = loc
            .start_respawn(t0() + Duration::seconds(120), t0())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        assert_eq!(loc.respawn_time(), Some(t0() + Duration::seconds(60)));
    }

    #[test]
    fn deadline_in_the_past_is_rejected() {
        let mut loc = location();
        loc.claim(t0()).unwrap();
        let err = loc
            .start_respawn(t0() - Duration::seconds(1), t0())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidCooldown(_)));
        assert_eq!(loc.state(), SpawnState::Claimed);
    }

    #[test]
    fn zero_cooldown_is_immediately_available() {
        let mut loc = location();
        loc.claim(t0()).unwrap();
        loc.start_respawn(t0(), t0()).unwrap();

        assert_eq!(loc.state(), SpawnState::Available);
        assert_eq!(loc.respawn_time(), None);
        assert!(loc.claim(t0()).is_ok());
    }

    #[test]
    fn serializes_camel_case() {
        let loc = location();
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["id"], "ChIJ-test");
        assert_eq!(json["state"], "available");
        assert_eq!(json["gameObjectType"]["kind"], "minion");
        assert!(json["respawnTime"].is_null());
    }
}
