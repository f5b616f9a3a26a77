/// Which input of a coordinate transform was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Rejected input to one of the coordinate transforms.
///
/// Out-of-range but finite coordinates are never an error: `x` wraps and `y`
/// clamps. Only values that cannot describe a point at all end up here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("coordinate {axis} is not finite: {value}")]
    NonFinite { axis: Axis, value: f64 },

    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
}
