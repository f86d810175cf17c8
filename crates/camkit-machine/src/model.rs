use crate::error::{ProfileError, ProfileResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// G-code dialect used when exporting operations for a machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PostProcessor {
    #[serde(rename = "ISO")]
    Iso,
    #[serde(rename = "MACH3")]
    Mach3,
    #[serde(rename = "EMC")]
    Emc,
    #[serde(rename = "FADAL")]
    Fadal,
    #[serde(rename = "GRBL")]
    Grbl,
    #[serde(rename = "HEIDENHAIN")]
    Heidenhain,
    #[serde(rename = "HEIDENHAIN530")]
    Heidenhain530,
    #[serde(rename = "TNC151")]
    Tnc151,
    #[serde(rename = "SIEGKX1")]
    SiegKx1,
    #[serde(rename = "CENTROID")]
    Centroid,
    #[serde(rename = "ANILAM")]
    Anilam,
    #[serde(rename = "GRAVOS")]
    Gravos,
    #[serde(rename = "WIN-PC")]
    WinPc,
    #[serde(rename = "SHOPBOT MTC")]
    ShopbotMtc,
    #[serde(rename = "LYNX_OTTER_O")]
    LynxOtterO,
}

impl PostProcessor {
    /// Get all post processors
    pub fn all() -> &'static [PostProcessor] {
        &[
            PostProcessor::Iso,
            PostProcessor::Mach3,
            PostProcessor::Emc,
            PostProcessor::Fadal,
            PostProcessor::Grbl,
            PostProcessor::Heidenhain,
            PostProcessor::Heidenhain530,
            PostProcessor::Tnc151,
            PostProcessor::SiegKx1,
            PostProcessor::Centroid,
            PostProcessor::Anilam,
            PostProcessor::Gravos,
            PostProcessor::WinPc,
            PostProcessor::ShopbotMtc,
            PostProcessor::LynxOtterO,
        ]
    }

    /// Identifier used in saved profiles
    pub fn id(&self) -> &'static str {
        match self {
            Self::Iso => "ISO",
            Self::Mach3 => "MACH3",
            Self::Emc => "EMC",
            Self::Fadal => "FADAL",
            Self::Grbl => "GRBL",
            Self::Heidenhain => "HEIDENHAIN",
            Self::Heidenhain530 => "HEIDENHAIN530",
            Self::Tnc151 => "TNC151",
            Self::SiegKx1 => "SIEGKX1",
            Self::Centroid => "CENTROID",
            Self::Anilam => "ANILAM",
            Self::Gravos => "GRAVOS",
            Self::WinPc => "WIN-PC",
            Self::ShopbotMtc => "SHOPBOT MTC",
            Self::LynxOtterO => "LYNX_OTTER_O",
        }
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::Mach3
    }
}

impl std::fmt::Display for PostProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iso => write!(f, "Iso"),
            Self::Mach3 => write!(f, "Mach3"),
            Self::Emc => write!(f, "LinuxCNC - EMC2"),
            Self::Fadal => write!(f, "Fadal"),
            Self::Grbl => write!(f, "grbl"),
            Self::Heidenhain => write!(f, "Heidenhain"),
            Self::Heidenhain530 => write!(f, "Heidenhain 530"),
            Self::Tnc151 => write!(f, "Heidenhain TNC151"),
            Self::SiegKx1 => write!(f, "Sieg KX1"),
            Self::Centroid => write!(f, "Centroid M40"),
            Self::Anilam => write!(f, "Anilam Crusader M"),
            Self::Gravos => write!(f, "Gravos"),
            Self::WinPc => write!(f, "WinPC-NC"),
            Self::ShopbotMtc => write!(f, "ShopBot MTC"),
            Self::LynxOtterO => write!(f, "Lynx Otter o"),
        }
    }
}

impl FromStr for PostProcessor {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProfileError::UnknownPostProcessor(wanted.to_string()))
    }
}

/// Minimum, maximum and default value of a machine capability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    /// Whether `value` lies within `[min, max]`
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }


    fn validate(&self, field: &str) -> ProfileResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.default.is_finite()) {
            return Err(ProfileError::ValueOutOfRange {
                field: field.to_string(),
                value: format!("{:?}", self),
            });
        }
        if self.min <= 0.0 {
            return Err(ProfileError::InvalidBounds {
                field: field.to_string(),
                reason: "minimum must be positive".to_string(),
            });
        }
        if self.min > self.max {
            return Err(ProfileError::InvalidBounds {
                field: field.to_string(),
                reason: "minimum above maximum".to_string(),
            });
        }
        if !self.contains(self.default) {
            return Err(ProfileError::InvalidBounds {
                field: field.to_string(),
                reason: "default outside minimum..maximum".to_string(),
            });
        }
        Ok(())
    }
}

/// Block number formatting for generated G-code (`N10`, `N20`, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockNumbering {
    pub enabled: bool,
    pub start: u32,
    pub increment: u32,
}

impl Default for BlockNumbering {
    fn default() -> Self {
        Self {
            enabled: false,
            start: 10,
            increment: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineProfile {
    pub id: String,
    pub name: String,
    pub post_processor: PostProcessor,

    // Positions (m)
    pub use_position_definitions: bool,
    pub starting_position: [f64; 3],
    pub tool_change_position: [f64; 3],
    pub ending_position: [f64; 3],
    pub working_area: [f64; 3],

    // Capabilities
    pub feedrate: Bounds,
    pub spindle: Bounds,
    /// Seconds to wait for the spindle to spin up before feeding
    pub spindle_start_time: f64,
    pub axis4: bool,
    pub axis5: bool,
    pub collet_size: f64,

    // Output
    pub split_files: bool,
    pub split_limit: u64,
    pub block_numbers: BlockNumbering,
    pub output_tool_definitions: bool,
    pub output_tool_change: bool,
    pub output_g43_on_tool_change: bool,
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Machine".to_string(),
            post_processor: PostProcessor::default(),
            use_position_definitions: false,
            starting_position: [0.0; 3],
            tool_change_position: [0.0; 3],
            ending_position: [0.0; 3],
            working_area: [0.5, 0.5, 0.1],
            feedrate: Bounds::new(0.00001, 2.0, 1.5),
            spindle: Bounds::new(5000.0, 30000.0, 15000.0),
            spindle_start_time: 0.0,
            axis4: false,
            axis5: false,
            collet_size: 33.0,
            split_files: true,
            split_limit: 800_000,
            block_numbers: BlockNumbering::default(),
            output_tool_definitions: true,
            output_tool_change: true,
            output_g43_on_tool_change: false,
        }
    }
}

impl MachineProfile {
    /// Number of axes the machine can drive (3, 4 or 5)
    pub fn axis_count(&self) -> u8 {
        3 + u8::from(self.axis4) + u8::from(self.axis5)
    }

    /// Validate the profile
    pub fn validate(&self) -> ProfileResult<()> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingField("name".to_string()));
        }

        self.feedrate.validate("feedrate")?;
        self.spindle.validate("spindle")?;

        if self.working_area.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ProfileError::ValueOutOfRange {
                field: "working_area".to_string(),
                value: format!("{:?}", self.working_area),
            });
        }

        if !self.spindle_start_time.is_finite() || self.spindle_start_time < 0.0 {
            return Err(ProfileError::ValueOutOfRange {
                field: "spindle_start_time".to_string(),
                value: self.spindle_start_time.to_string(),
            });
        }

        if !(1000..=20_000_000).contains(&self.split_limit) {
            return Err(ProfileError::ValueOutOfRange {
                field: "split_limit".to_string(),
                value: self.split_limit.to_string(),
            });
        }

        if self.block_numbers.enabled && self.block_numbers.increment == 0 {
            return Err(ProfileError::ValueOutOfRange {
                field: "block_numbers.increment".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }

    /// Whether a point lies inside the working area, measured from the origin
    pub fn within_working_area(&self, point: [f64; 3]) -> bool {
        point
            .iter()
            .zip(self.working_area.iter())
            .all(|(p, limit)| p.abs() <= *limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = MachineProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.axis_count(), 3);
        assert_eq!(profile.post_processor, PostProcessor::Mach3);
    }

    #[test]
    fn test_axis_count() {
        let profile = MachineProfile {
            axis4: true,
            axis5: true,
            ..Default::default()
        };
        assert_eq!(profile.axis_count(), 5);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let profile = MachineProfile {
            spindle: Bounds::new(30000.0, 5000.0, 15000.0),
            ..Default::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_default_outside_bounds_rejected() {
        let profile = MachineProfile {
            feedrate: Bounds::new(0.1, 2.0, 3.0),
            ..Default::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let profile = MachineProfile {
            name: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            profile.validate(),
            Err(ProfileError::MissingField("name".to_string()))
        );
    }

    #[test]
    fn test_post_processor_from_str() {
        assert_eq!("grbl".parse::<PostProcessor>(), Ok(PostProcessor::Grbl));
        assert_eq!(
            "SHOPBOT MTC".parse::<PostProcessor>(),
            Ok(PostProcessor::ShopbotMtc)
        );
        assert!("PLOTTER".parse::<PostProcessor>().is_err());
    }

    #[test]
    fn test_post_processor_serde_uses_ids() {
        let json = serde_json::to_string(&PostProcessor::WinPc).unwrap();
        assert_eq!(json, "\"WIN-PC\"");
        let back: PostProcessor = serde_json::from_str("\"EMC\"").unwrap();
        assert_eq!(back, PostProcessor::Emc);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(5000.0, 30000.0, 15000.0);
        assert!(bounds.contains(12000.0));
        assert!(bounds.contains(30000.0));
        assert!(!bounds.contains(100.0));
    }

    #[test]
    fn test_working_area() {
        let profile = MachineProfile::default();
        assert!(profile.within_working_area([0.2, -0.3, 0.05]));
        assert!(!profile.within_working_area([0.6, 0.0, 0.0]));
    }

    #[test]
    fn test_partial_profile_deserializes_with_defaults() {
        let profile: MachineProfile =
            serde_json::from_str(r#"{ "name": "Router", "post_processor": "GRBL" }"#).unwrap();
        assert_eq!(profile.name, "Router");
        assert_eq!(profile.post_processor, PostProcessor::Grbl);
        assert_eq!(profile.working_area, [0.5, 0.5, 0.1]);
    }
}
