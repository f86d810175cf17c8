//! Machining strategies and axis configuration.

use serde::{Deserialize, Serialize};

/// Toolpath strategy of a 3-axis operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Cut the silhouette with an offset
    Cutout,
    Pocket,
    Drill,
    /// Parallel lines at any angle
    Parallel,
    Cross,
    Block,
    Spiral,
    Circles,
    /// Detect the outline, fill it like a pocket, then sample on the surface
    #[serde(rename = "OUTLINEFILL")]
    OutlineFill,
    Carve,
    /// Medial axis v-carve, used with V or ball cutters
    MedialAxis,
    /// Constant-z slices
    Waterline,
    /// Curve object converted directly to a path
    Curve,
    /// Mills only the negative corners of the model
    Pencil,
    Crazy,
    ProjectedCurve,
    FEngrave,
}

impl Strategy {
    /// Get all strategies
    pub fn all() -> &'static [Strategy] {
        &[
            Strategy::Cutout,
            Strategy::Pocket,
            Strategy::Drill,
            Strategy::Parallel,
            Strategy::Cross,
            Strategy::Block,
            Strategy::Spiral,
            Strategy::Circles,
            Strategy::OutlineFill,
            Strategy::Carve,
            Strategy::MedialAxis,
            Strategy::Waterline,
            Strategy::Curve,
            Strategy::Pencil,
            Strategy::Crazy,
            Strategy::ProjectedCurve,
            Strategy::FEngrave,
        ]
    }

    /// Strategies only offered when experimental features are enabled
    pub fn is_experimental(&self) -> bool {
        matches!(
            self,
            Self::Waterline
                | Self::Curve
                | Self::Pencil
                | Self::Crazy
                | Self::ProjectedCurve
                | Self::FEngrave
        )
    }

    /// Strategies selectable under the given experimental setting
    pub fn available(experimental: bool) -> Vec<Strategy> {
        Self::all()
            .iter()
            .copied()
            .filter(|s| experimental || !s.is_experimental())
            .collect()
    }

    /// Short description shown next to the strategy name
    pub fn description(&self) -> &'static str {
        match self {
            Self::Cutout => "Cut the silhouete with offset",
            Self::Pocket => "Pocket operation",
            Self::Drill => "Drill operation",
            Self::Parallel => "Parallel lines on any angle",
            Self::Cross => "Cross paths",
            Self::Block => "Block path",
            Self::Spiral => "Spiral path",
            Self::Circles => "Circles path",
            Self::OutlineFill => {
                "Detect outline and fill it with paths as pocket, then sample these paths on the 3d surface"
            }
            Self::Carve => "Carve a curve into the surface",
            Self::MedialAxis => "Engrave shapes of varying width with a single V or ball cutter stroke",
            Self::Waterline => "Waterline paths - constant z",
            Self::Curve => "Curve object gets converted directly to path",
            Self::Pencil => "Detects negative corners in the model and mills only those",
            Self::Crazy => "Engagement-driven adaptive paths",
            Self::ProjectedCurve => "Project one curve towards another curve",
            Self::FEngrave => "Engrave or v-carve using f-engrave",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Cutout
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cutout => write!(f, "Profile(Cutout)"),
            Self::Pocket => write!(f, "Pocket"),
            Self::Drill => write!(f, "Drill"),
            Self::Parallel => write!(f, "Parallel"),
            Self::Cross => write!(f, "Cross"),
            Self::Block => write!(f, "Block"),
            Self::Spiral => write!(f, "Spiral"),
            Self::Circles => write!(f, "Circles"),
            Self::OutlineFill => write!(f, "Outline Fill"),
            Self::Carve => write!(f, "Carve"),
            Self::MedialAxis => write!(f, "Medial axis - vcarve"),
            Self::Waterline => write!(f, "Waterline - EXPERIMENTAL"),
            Self::Curve => write!(f, "Curve to Path - EXPERIMENTAL"),
            Self::Pencil => write!(f, "Pencil - EXPERIMENTAL"),
            Self::Crazy => write!(f, "Crazy path - EXPERIMENTAL"),
            Self::ProjectedCurve => write!(f, "Projected curve - EXPERIMENTAL"),
            Self::FEngrave => write!(f, "F-Engrave - EXPERIMENTAL"),
        }
    }
}

/// Number of axes used by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MachineAxes {
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

impl MachineAxes {
    pub fn count(&self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }
}

impl Default for MachineAxes {
    fn default() -> Self {
        Self::Three
    }
}

impl std::fmt::Display for MachineAxes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} axis", self.count())
    }
}

/// Strategy of a 4-axis operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy4Axis {
    /// Parallel lines around the first rotary axis
    #[serde(rename = "PARALLELR")]
    ParallelAround,
    /// Parallel lines along the first rotary axis
    Parallel,
    /// Helix around the first rotary axis
    Helix,
    /// 3-axis strategies applied to the 4th axis. Not implemented yet.
    Indexed,
    Cross,
}

impl Default for Strategy4Axis {
    fn default() -> Self {
        Self::Parallel
    }
}

/// Strategy of a 5-axis operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy5Axis {
    /// 3-axis strategies rotated by the 4th and 5th axes
    Indexed,
}

impl Default for Strategy5Axis {
    fn default() -> Self {
        Self::Indexed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotaryAxis {
    X,
    Y,
    Z,
}

/// Where an operation starts cutting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartType {
    /// Start at a given z level
    #[serde(rename = "ZLEVEL")]
    ZLevel,
    /// Rest milling from the result of earlier operations in a chain
    #[serde(rename = "OPERATIONRESULT")]
    OperationResult,
}

impl Default for StartType {
    fn default() -> Self {
        Self::ZLevel
    }
}
