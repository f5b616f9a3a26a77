pub mod camera;
pub mod change;
pub mod map_store;
pub mod markers;

pub use camera::*;
pub use change::*;
pub use map_store::*;
pub use markers::*;
