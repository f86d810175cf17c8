//! Cutter, movement and strategy-specific option enums.

use serde::{Deserialize, Serialize};

/// Type of cutter/tool bit used for the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CutterType {
    /// Flat end mill
    End,
    Ballnose,
    #[serde(rename = "VCARVE")]
    VCarve,
    /// Sphere cutter
    Ball,
    /// Modeled cutter, must be a closed mesh
    Custom,
}

impl Default for CutterType {
    fn default() -> Self {
        Self::End
    }
}

impl std::fmt::Display for CutterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::End => write!(f, "End"),
            Self::Ballnose => write!(f, "Ballnose"),
            Self::VCarve => write!(f, "V-carve"),
            Self::Ball => write!(f, "Sphere"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// Pocket starting position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PocketOption {
    Inside,
    Outside,
    Middle,
}

impl Default for PocketOption {
    fn default() -> Self {
        Self::Middle
    }
}

/// Which side of the curve a profile cuts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CutType {
    Outside,
    Inside,
    #[serde(rename = "ONLINE")]
    OnLine,
}

impl Default for CutType {
    fn default() -> Self {
        Self::Outside
    }
}

/// How drill holes are detected from curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrillType {
    /// Center of each symmetric curve
    #[serde(rename = "MIDDLE_SYMETRIC")]
    MiddleSymmetric,
    /// Center of every curve part
    #[serde(rename = "MIDDLE_ALL")]
    MiddleAll,
    /// Every point of the curve
    #[serde(rename = "ALL_POINTS")]
    AllPoints,
}

impl Default for DrillType {
    fn default() -> Self {
        Self::MiddleSymmetric
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Up milling
    Conventional,
    /// Down milling
    Climb,
    /// Zig zag, both with and against the spindle rotation
    Meander,
}

impl Default for MovementType {
    fn default() -> Self {
        Self::Climb
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpindleRotation {
    Cw,
    Ccw,
}

impl Default for SpindleRotation {
    fn default() -> Self {
        Self::Cw
    }
}

/// Approach to the piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementInsideOut {
    #[serde(rename = "INSIDEOUT")]
    InsideOut,
    #[serde(rename = "OUTSIDEIN")]
    OutsideIn,
}

impl Default for MovementInsideOut {
    fn default() -> Self {
        Self::InsideOut
    }
}

/// Handling of surfaces around the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmbientBehaviour {
    /// Everything is milled
    All,
    /// Only a band of `ambient_radius` around the object
    Around,
}

impl Default for AmbientBehaviour {
    fn default() -> Self {
        Self::All
    }
}
