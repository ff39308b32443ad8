//! Unclassified candidate returned by the playable-locations provider.

use serde::{Deserialize, Serialize};

use crate::value_objects::LatLng;

/// A provider candidate before the catalog assigns it a game object.
///
/// Every field except `place_id` is optional on the wire; the catalog decides
/// whether a candidate carries enough to become a spawn location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLocation {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub snapped_point: Option<LatLng>,
    #[serde(default)]
    pub center_point: Option<LatLng>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub plus_code: Option<String>,
}

impl RawLocation {
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            ..Default::default()
        }
    }

    pub fn with_snapped_point(mut self, point: LatLng) -> Self {
        self.snapped_point = Some(point);
        self
    }

    pub fn with_center_point(mut self, point: LatLng) -> Self {
        self.center_point = Some(point);
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Where the object is placed: the road-snapped point if present,
    /// otherwise the place centre.
    pub fn coordinates(&self) -> Option<LatLng> {
        self.snapped_point.or(self.center_point)
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}
