//! Placement of flat map coordinates on a sphere.
//!
//! Three coordinate domains are in play, each with its own named conversion:
//! - **Map percent** `[0, 100] × [0, 100]`: what the backend stores.
//! - **Normalized** `[0, 1] × [0, 1]`: the canonical domain for marker placement
//!   ([`MapPosition`], [`to_sphere_position`]).
//! - **Degree space** `[0, 360] × [0, 180]`: used for camera targeting
//!   ([`camera_focus_position`]) and for the human-readable degree readout
//!   ([`display_degrees`]).
//!
//! Policy, applied uniformly by every transform here: `x` wraps modulo the
//! domain width (the map is a cylinder around the globe), `y` clamps to the
//! domain (there is nothing past a pole), and non-finite values are rejected.

use std::f64::consts::{PI, TAU};

use super::Vec3;
use crate::error::{Axis, CoordinateError};

/// Upper bound of the backend's map percent domain.
pub const MAP_PERCENT_MAX: f64 = 100.0;

/// Width of degree space (longitude span).
pub const DEGREE_SPACE_WIDTH: f64 = 360.0;

/// Height of degree space (latitude span).
pub const DEGREE_SPACE_HEIGHT: f64 = 180.0;

/// Spherical angles in radians. Latitude is in `[-π/2, π/2]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_rad: f64,
    pub lat_rad: f64,
}

impl LonLat {
    /// Cartesian point on a sphere of `radius`, with `+y` through the north pole.
    pub fn to_cartesian(self, radius: f64) -> Vec3 {
        let cos_lat = self.lat_rad.cos();
        Vec3::new(
            radius * cos_lat * self.lon_rad.cos(),
            radius * self.lat_rad.sin(),
            radius * cos_lat * self.lon_rad.sin(),
        )
    }
}

/// A participant position in the normalized `[0, 1]` map domain.
///
/// Construction enforces the wrap/clamp policy, so a `MapPosition` is always
/// a valid input to the sphere mapper.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapPosition {
    x: f64,
    y: f64,
}

impl MapPosition {
    pub fn new(x: f64, y: f64) -> Result<Self, CoordinateError> {
        let x = finite(Axis::X, x)?;
        let y = finite(Axis::Y, y)?;
        Ok(Self {
            x: wrap_unit(x),
            y: clamp_unit(y),
        })
    }

    /// Converts backend map percent coordinates.
    pub fn from_percent(x: f64, y: f64) -> Result<Self, CoordinateError> {
        let x = finite(Axis::X, x)?;
        let y = finite(Axis::Y, y)?;
        Self::new(x / MAP_PERCENT_MAX, y / MAP_PERCENT_MAX)
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    /// Back to map percent, e.g. for echoing the value in a detail panel.
    pub fn to_percent(self) -> (f64, f64) {
        (self.x * MAP_PERCENT_MAX, self.y * MAP_PERCENT_MAX)
    }

    /// Scales into degree space, the input domain of the camera-focus and
    /// display conventions.
    pub fn to_degree_space(self) -> (f64, f64) {
        (self.x * DEGREE_SPACE_WIDTH, self.y * DEGREE_SPACE_HEIGHT)
    }

    pub fn lon_lat(self) -> LonLat {
        LonLat {
            lon_rad: self.x * TAU,
            lat_rad: (self.y - 0.5) * PI,
        }
    }

    pub fn to_sphere(self, radius: f64) -> Result<Vec3, CoordinateError> {
        let radius = valid_radius(radius)?;
        Ok(self.lon_lat().to_cartesian(radius))
    }
}

/// Longitude/latitude of a normalized map coordinate.
pub fn lon_lat(x: f64, y: f64) -> Result<LonLat, CoordinateError> {
    Ok(MapPosition::new(x, y)?.lon_lat())
}

/// Marker placement: normalized `(x, y)` to a point on the sphere of `radius`.
///
/// Longitude is `x · 2π` and latitude `(y − 0.5) · π`.
pub fn to_sphere_position(x: f64, y: f64, radius: f64) -> Result<Vec3, CoordinateError> {
    MapPosition::new(x, y)?.to_sphere(radius)
}

/// Camera targeting: degree-space `(x_deg, y_deg)` to a point on the sphere.
///
/// Longitude comes from `x_deg / 360` and latitude from `y_deg / 180 − 0.5`.
/// Kept apart from [`to_sphere_position`] because the input scaling differs.
pub fn camera_focus_position(
    x_deg: f64,
    y_deg: f64,
    radius: f64,
) -> Result<Vec3, CoordinateError> {
    let x_deg = finite(Axis::X, x_deg)?;
    let y_deg = finite(Axis::Y, y_deg)?;
    let radius = valid_radius(radius)?;
    let pos = MapPosition::new(x_deg / DEGREE_SPACE_WIDTH, y_deg / DEGREE_SPACE_HEIGHT)?;
    Ok(pos.lon_lat().to_cartesian(radius))
}

/// Degree-space coordinates as signed `(longitude°, latitude°)` for display.
pub fn display_degrees(x_deg: f64, y_deg: f64) -> (f64, f64) {
    (
        x_deg - DEGREE_SPACE_WIDTH / 2.0,
        y_deg - DEGREE_SPACE_HEIGHT / 2.0,
    )
}

fn finite(axis: Axis, value: f64) -> Result<f64, CoordinateError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoordinateError::NonFinite { axis, value })
    }
}

fn valid_radius(radius: f64) -> Result<f64, CoordinateError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(CoordinateError::InvalidRadius(radius))
    }
}

fn wrap_unit(v: f64) -> f64 {
    let w = v.rem_euclid(1.0);
    // rem_euclid rounds tiny negatives up to exactly 1.0.
    if w >= 1.0 { 0.0 } else { w }
}

fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
