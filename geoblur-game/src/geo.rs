//! Great-circle helpers used for "how far off was that guess" feedback.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{COMPASS_OCTANT_DEGREES, EARTH_RADIUS_KM};

/// Eight-way compass direction from a guessed country towards the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompassArrow {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassArrow {
    /// Clockwise from north, one entry per 45° octant.
    pub const OCTANTS: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::North => "⬆️",
            Self::NorthEast => "↗️",
            Self::East => "➡️",
            Self::SouthEast => "↘️",
            Self::South => "⬇️",
            Self::SouthWest => "↙️",
            Self::West => "⬅️",
            Self::NorthWest => "↖️",
        }
    }

    /// Bucket a bearing in degrees into its octant. Any finite value is accepted
    /// and normalized first.
    #[must_use]
    pub fn from_bearing(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let shifted = (normalized + COMPASS_OCTANT_DEGREES / 2.0) / COMPASS_OCTANT_DEGREES;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (shifted.floor() as usize) % Self::OCTANTS.len();
        Self::OCTANTS[index]
    }
}

impl fmt::Display for CompassArrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Haversine distance in kilometres, rounded to the nearest whole kilometre.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> i64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    #[allow(clippy::cast_possible_truncation)]
    {
        (EARTH_RADIUS_KM * c).round() as i64
    }
}

/// Initial bearing from point 1 to point 2, normalized to `[0, 360)`.
#[must_use]
pub fn bearing_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let y = d_lon.sin() * lat2_r.cos();
    let x = lat1_r.cos() * lat2_r.sin() - lat1_r.sin() * lat2_r.cos() * d_lon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[must_use]
pub fn bearing_arrow(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> CompassArrow {
    CompassArrow::from_bearing(bearing_degrees(lat1, lon1, lat2, lon2))
}
