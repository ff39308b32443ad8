//! Declarative criteria sent to the playable locations provider.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Field mask paths the classifier relies on.
pub const DEFAULT_FIELDS_TO_RETURN: [&str; 3] = ["snapped_point", "place_id", "types"];

/// Provider-side cap on locations returned per criterion.
pub const MAX_LOCATION_COUNT: u32 = 1000;

/// Filter limiting type, count and returned fields of a provider query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationCriteria {
    /// Provider-side game object type key the results are grouped under
    pub game_object_type: i32,
    /// Maximum number of locations returned for this criterion
    pub max_location_count: u32,
    /// Optional attributes to fetch (field mask paths)
    pub fields_to_return: Vec<String>,
}

impl LocationCriteria {
    /// Create criteria with the default field mask.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `max_location_count` is zero or
    /// above [`MAX_LOCATION_COUNT`].
    pub fn new(game_object_type: i32, max_location_count: u32) -> Result<Self, DomainError> {
        if max_location_count == 0 || max_location_count > MAX_LOCATION_COUNT {
            return Err(DomainError::validation(format!(
                "max_location_count must be within 1..={}, got {}",
                MAX_LOCATION_COUNT, max_location_count
            )));
        }
        Ok(Self {
            game_object_type,
            max_location_count,
            fields_to_return: DEFAULT_FIELDS_TO_RETURN
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })
    }

    /// Add an extra field path, keeping the mask free of duplicates.
    pub fn with_field(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.fields_to_return.contains(&path) {
            self.fields_to_return.push(path);
        }
        self
    }

    /// The key the provider uses for this criterion in its response map.
    pub fn response_key(&self) -> String {
        self.game_object_type.to_string()
    }
}

impl Default for LocationCriteria {
    fn default() -> Self {
        Self {
            game_object_type: 0,
            max_location_count: 2,
            fields_to_return: DEFAULT_FIELDS_TO_RETURN
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
