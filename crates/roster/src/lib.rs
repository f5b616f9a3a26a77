pub mod error;
pub mod model;
pub mod progress;
pub mod wire;

pub use error::*;
pub use model::*;
pub use progress::*;
pub use wire::*;
