//! Geographic value objects: validated coordinates and rectangles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Mean Earth radius used for haversine distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLngRepr")]
pub struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl LatLng {
    /// Create a new coordinate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if either component is not finite,
    /// the latitude is outside [-90, 90] or the longitude outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(DomainError::validation("Coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation(format!(
                "Latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation(format!(
                "Longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a coordinate already known to be in range.
    pub(crate) fn from_trusted(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in meters.
    pub fn distance_meters(&self, other: &LatLng) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Deserialize)]
struct LatLngRepr {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<LatLngRepr> for LatLng {
    type Error = DomainError;

    fn try_from(repr: LatLngRepr) -> Result<Self, Self::Error> {
        Self::new(repr.latitude, repr.longitude)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.latitude, self.longitude)
    }
}

/// An axis-aligned latitude/longitude rectangle.
///
/// `low` is the southwest corner and is always strictly southwest of `high`.
/// Rectangles crossing the antimeridian are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLngRect {
    low: LatLng,
    high: LatLng,
}

impl LatLngRect {
    /// Create a rectangle from its southwest and northeast corners.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegion` unless `low` is strictly south
    /// and strictly west of `high`.
    pub fn new(low: LatLng, high: LatLng) -> Result<Self, DomainError> {
        if low.latitude >= high.latitude || low.longitude >= high.longitude {
            return Err(DomainError::invalid_region(format!(
                "low corner {} must be strictly southwest of high corner {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    /// Build a rectangle from raw degrees, reporting every failure as an
    /// invalid region.
    pub fn from_degrees(
        low_lat: f64,
        low_lng: f64,
        high_lat: f64,
        high_lng: f64,
    ) -> Result<Self, DomainError> {
        let low = LatLng::new(low_lat, low_lng).map_err(as_invalid_region)?;
        let high = LatLng::new(high_lat, high_lng).map_err(as_invalid_region)?;
        Self::new(low, high)
    }

    /// Build a rectangle whose corners are already known to be ordered.
    pub(crate) fn from_trusted(low: LatLng, high: LatLng) -> Self {
        Self { low, high }
    }

    pub fn low(&self) -> LatLng {
        self.low
    }

    pub fn high(&self) -> LatLng {
        self.high
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            latitude: (self.low.latitude + self.high.latitude) / 2.0,
            longitude: (self.low.longitude + self.high.longitude) / 2.0,
        }
    }

    /// Closed containment test.
    pub fn contains(&self, point: &LatLng) -> bool {
        (self.low.latitude..=self.high.latitude).contains(&point.latitude)
            && (self.low.longitude..=self.high.longitude).contains(&point.longitude)
    }

    /// Distance from the centre to a corner, in meters.
    pub fn half_diagonal_meters(&self) -> f64 {
        self.center().distance_meters(&self.high)
    }
}

fn as_invalid_region(err: DomainError) -> DomainError {
    match err {
        DomainError::Validation(msg) => DomainError::InvalidRegion(msg),
        other => other,
    }
}
