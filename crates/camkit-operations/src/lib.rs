//! # CamKit Operations
//!
//! The CAM operation data model: the [`Operation`] record with its derived
//! feeds and stepover, dirty tags for cached artifacts, validity
//! gatekeeping and the background computation guard, plus the
//! [`CamSession`] that owns operations and chains.
//!
//! Toolpath generation, image generation and G-code export are done
//! elsewhere. They read operations from here, clear tags once their
//! artifacts are fresh, and refuse to act on invalid operations.

pub mod chain;
pub mod compute;
pub mod error;
pub mod fields;
pub mod geometry_source;
pub mod operation;
pub mod options;
pub mod orientation;
pub mod persistence;
pub mod session;
pub mod strategy;
pub mod sync;
pub mod tags;
pub mod validity;

pub use chain::{Chain, Direction};
pub use compute::{ComputeOutcome, ComputeState, PathStats};
pub use error::{OperationError, OperationResult};
pub use fields::{EditContext, EditReport, Effect, Field, FieldEdit};
pub use geometry_source::GeometrySource;
pub use operation::{
    AmbientParams, BridgeParams, CutterParams, FeedParams, GcodeParams, GeometryParams,
    ImageParams, MaterialParams, MovementParams, Operation, OperationParams, OptimisationParams,
    StepParams, StrategyParams,
};
pub use options::{
    AmbientBehaviour, CutType, CutterType, DrillType, MovementInsideOut, MovementType,
    PocketOption, SpindleRotation,
};
pub use orientation::OrientationRegistry;
pub use persistence::{SessionFile, SESSION_FORMAT_VERSION};
pub use session::{unique_name, CamSession};
pub use strategy::{MachineAxes, RotaryAxis, StartType, Strategy, Strategy4Axis, Strategy5Axis};
pub use sync::SYNC_EPSILON;
pub use tags::{DirtyTags, Tag};
pub use validity::INVALID_INPUT_WARNING;
