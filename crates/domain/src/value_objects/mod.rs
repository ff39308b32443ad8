//! Value objects - Immutable objects defined by their attributes

mod criteria;
mod geo;

pub use criteria::{LocationCriteria, DEFAULT_FIELDS_TO_RETURN, MAX_LOCATION_COUNT};
pub use geo::{LatLng, LatLngRect, EARTH_RADIUS_METERS};
