//! Hierarchical map cells.
//!
//! Cells are Web-Mercator tiles: at zoom `z` the world is split into
//! `2^z x 2^z` tiles, `x` growing eastward from the antimeridian and `y`
//! growing southward from the northern Mercator limit. Every tile has exactly
//! one parent at `z - 1`, which makes the scheme hierarchical. Cells are
//! addressed externally by their quadkey token (one base-4 digit per zoom
//! level), e.g. `"021230"`.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{LatLng, LatLngRect};

/// Northern/southern limit of the Mercator projection.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 24;

/// Identifier of one fixed-resolution map cell.
///
/// Ordering is row-major (north to south, then west to east) within a zoom
/// level, which keeps covering sets stable across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    zoom: u8,
    y: u32,
    x: u32,
}

impl CellId {
    /// Create a cell from tile coordinates.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the zoom is outside
    /// [`MIN_ZOOM`]..=[`MAX_ZOOM`] or either index is off the grid.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, DomainError> {
        validate_zoom(zoom)?;
        let side = tiles_per_side(zoom);
        if x >= side || y >= side {
            return Err(DomainError::validation(format!(
                "Tile ({}, {}) is outside the {}x{} grid at zoom {}",
                x, y, side, side, zoom
            )));
        }
        Ok(Self { zoom, y, x })
    }

    /// The cell at `zoom` containing `point`.
    ///
    /// Points beyond the Mercator limit fold into the first/last row and
    /// points on the eastern edge of the map fold into the last column.
    pub fn containing(point: &LatLng, zoom: u8) -> Result<Self, DomainError> {
        validate_zoom(zoom)?;
        Ok(Self::containing_at_valid_zoom(point, zoom))
    }

    pub(crate) fn containing_at_valid_zoom(point: &LatLng, zoom: u8) -> Self {
        Self {
            zoom,
            y: tile_y(point.latitude(), zoom),
            x: tile_x(point.longitude(), zoom),
        }
    }

    /// Tile coordinates produced by the covering walk are always on the grid.
    pub(crate) fn from_grid(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, y, x }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    /// The enclosing cell one level up, `None` at [`MIN_ZOOM`].
    pub fn parent(&self) -> Option<CellId> {
        if self.zoom <= MIN_ZOOM {
            return None;
        }
        Some(Self {
            zoom: self.zoom - 1,
            y: self.y >> 1,
            x: self.x >> 1,
        })
    }

    /// Geographic extent of the cell.
    ///
    /// Edge rows extend to the poles so that folded points stay inside.
    pub fn bounds(&self) -> LatLngRect {
        let side = tiles_per_side(self.zoom) as f64;
        let west = self.x as f64 / side * 360.0 - 180.0;
        let east = (self.x + 1) as f64 / side * 360.0 - 180.0;
        let north = row_north_edge(self.y, self.zoom);
        let south = row_north_edge(self.y + 1, self.zoom);

        LatLngRect::from_trusted(
            LatLng::from_trusted(south, west),
            LatLng::from_trusted(north, east),
        )
    }

    pub fn center(&self) -> LatLng {
        self.bounds().center()
    }

    /// Quadkey token, one digit per zoom level from coarse to fine.
    pub fn token(&self) -> String {
        (1..=self.zoom)
            .rev()
            .map(|level| {
                let mask = 1u32 << (level - 1);
                let mut digit = 0u8;
                if self.x & mask != 0 {
                    digit += 1;
                }
                if self.y & mask != 0 {
                    digit += 2;
                }
                char::from(b'0' + digit)
            })
            .collect()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for CellId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let zoom = u8::try_from(s.len())
            .map_err(|_| DomainError::validation(format!("Cell token too long: {}", s)))?;
        validate_zoom(zoom)?;

        let mut x = 0u32;
        let mut y = 0u32;
        for c in s.chars() {
            let digit = c
                .to_digit(4)
                .ok_or_else(|| DomainError::validation(format!("Invalid cell token: {}", s)))?;
            x = (x << 1) | (digit & 1);
            y = (y << 1) | (digit >> 1);
        }
        Ok(Self { zoom, y, x })
    }
}

impl TryFrom<String> for CellId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CellId> for String {
    fn from(value: CellId) -> Self {
        value.token()
    }
}

fn validate_zoom(zoom: u8) -> Result<(), DomainError> {
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(DomainError::validation(format!(
            "Zoom {} is outside {}..={}",
            zoom, MIN_ZOOM, MAX_ZOOM
        )));
    }
    Ok(())
}

pub(crate) fn tiles_per_side(zoom: u8) -> u32 {
    1u32 << zoom
}

pub(crate) fn tile_x(longitude: f64, zoom: u8) -> u32 {
    let side = tiles_per_side(zoom);
    let x = ((longitude + 180.0) / 360.0 * side as f64).floor();
    clamp_index(x, side)
}

pub(crate) fn tile_y(latitude: f64, zoom: u8) -> u32 {
    let side = tiles_per_side(zoom);
    let lat = latitude
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * side as f64).floor();
    clamp_index(y, side)
}

fn clamp_index(value: f64, side: u32) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= (side - 1) as f64 {
        side - 1
    } else {
        value as u32
    }
}

fn row_north_edge(y: u32, zoom: u8) -> f64 {
    let side = tiles_per_side(zoom);
    if y == 0 {
        return 90.0;
    }
    if y >= side {
        return -90.0;
    }
    (PI * (1.0 - 2.0 * y as f64 / side as f64))
        .sinh()
        .atan()
        .to_degrees()
}
