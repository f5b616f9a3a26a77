use foundation::CoordinateError;
use foundation::math::{MapPosition, Vec3, camera_focus_position};

use crate::map_store::MapState;

/// Globe dimensions the camera frames against.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraRig {
    pub globe_radius: f64,
    /// Eye distance from the globe center as a multiple of `globe_radius`.
    /// Values at or below 1 would put the eye inside the globe and are raised
    /// to [`MIN_FOCUS_DISTANCE_FACTOR`].
    pub focus_distance_factor: f64,
}

pub const MIN_FOCUS_DISTANCE_FACTOR: f64 = 1.05;

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            globe_radius: 2.0,
            focus_distance_factor: 2.5,
        }
    }
}

/// Where the camera looks and sits when framing a participant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraFocus {
    /// Point on the globe surface.
    pub target: Vec3,
    /// Eye position along the same ray, outside the globe.
    pub eye: Vec3,
}

impl CameraRig {
    pub fn focus_on(&self, position: MapPosition) -> Result<CameraFocus, CoordinateError> {
        let (x_deg, y_deg) = position.to_degree_space();
        let target = camera_focus_position(x_deg, y_deg, self.globe_radius)?;
        let factor = if self.focus_distance_factor.is_finite() {
            self.focus_distance_factor.max(MIN_FOCUS_DISTANCE_FACTOR)
        } else {
            MIN_FOCUS_DISTANCE_FACTOR
        };
        Ok(CameraFocus {
            target,
            eye: target.scale(factor),
        })
    }
}

impl MapState {
    /// Camera framing for the selected participant, if any.
    pub fn camera_focus(&self, rig: &CameraRig) -> Option<Result<CameraFocus, CoordinateError>> {
        let selected = self.selected_participant()?;
        Some(rig.focus_on(selected.position))
    }
}
