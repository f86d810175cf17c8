pub mod error;
pub mod model;

pub use error::{ProfileError, ProfileResult};
pub use model::{BlockNumbering, Bounds, MachineProfile, PostProcessor};
