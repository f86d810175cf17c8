//! # CamKit Core
//!
//! Core types shared by the CamKit crates: the unified error type and the
//! geometry resolution seam through which operations check that the
//! objects, groups and images they reference still exist.

pub mod error;
pub mod scene;

pub use error::{Error, Result, SceneError};
pub use scene::{EntityKind, GeometryResolver, SceneIndex};
