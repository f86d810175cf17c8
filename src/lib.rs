//! # CamKit
//!
//! The data model behind a CAM job: machining operations with derived
//! feeds and stepover, validity gatekeeping, dirty tags for cached
//! artifacts and a guard against overlapping background computations.
//!
//! ## Architecture
//!
//! CamKit is organized as a workspace with multiple crates:
//!
//! 1. **camkit-core** - Error type and the scene lookup seam
//! 2. **camkit-machine** - Machine profiles and post processor ids
//! 3. **camkit-operations** - Operations, chains, sessions and session files
//! 4. **camkit-settings** - Application settings
//! 5. **camkit** - Command line tool that integrates all crates

pub use camkit_core::{EntityKind, Error, GeometryResolver, Result, SceneError, SceneIndex};

pub use camkit_machine::{Bounds, MachineProfile, PostProcessor, ProfileError};

pub use camkit_operations::{
    unique_name, CamSession, Chain, ComputeOutcome, ComputeState, Direction, DirtyTags,
    EditContext, EditReport, Effect, Field, FieldEdit, GeometrySource, MachineAxes, Operation,
    OperationError, OperationParams, OperationResult, OrientationRegistry, PathStats, SessionFile,
    Strategy, Tag, INVALID_INPUT_WARNING, SESSION_FORMAT_VERSION, SYNC_EPSILON,
};

pub use camkit_settings::{CamSettings, ConfigError, LogLevel, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output on stderr, leaving stdout for command output
/// - RUST_LOG environment variable support, falling back to `level`
pub fn init_logging(level: LogLevel) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
