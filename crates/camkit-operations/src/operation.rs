//! The operation record
//!
//! An [`Operation`] is one configured machining pass over a geometry source.
//! Its parameters are public to read but only change through
//! [`Operation::apply`] and the synchronizer methods, so the
//! derived values, dirty tags and validity flags always follow the edits.

use crate::compute::{ComputeState, PathStats};
use crate::geometry_source::GeometrySource;
use crate::options::{
    AmbientBehaviour, CutType, CutterType, DrillType, MovementInsideOut, MovementType,
    PocketOption, SpindleRotation,
};
use crate::strategy::{MachineAxes, RotaryAxis, StartType, Strategy, Strategy4Axis, Strategy5Axis};
use crate::tags::{DirtyTags, Tag};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Geometry the operation reads besides its main source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    pub source: GeometrySource,
    /// Curve projected by the projected-curve strategy
    pub curve_source: Option<String>,
    /// Curve projected onto
    pub curve_target: Option<String>,
    /// Apply mesh modifiers before sampling
    pub use_modifiers: bool,
    /// Curve restricting the machined area
    pub limit_curve: Option<String>,
    pub use_limit_curve: bool,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            source: GeometrySource::default(),
            curve_source: None,
            curve_target: None,
            use_modifiers: true,
            limit_curve: None,
            use_limit_curve: false,
        }
    }
}

/// Cutter geometry (meters, degrees for the tip angle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterParams {
    pub cutter_type: CutterType,
    /// Mesh used as the cutter when `cutter_type` is custom
    pub object_name: Option<String>,
    /// Tool number in the tool changer
    pub id: u32,
    pub diameter: f64,
    pub length: f64,
    pub flutes: u32,
    pub tip_angle: f64,
    pub description: String,
}

impl Default for CutterParams {
    fn default() -> Self {
        Self {
            cutter_type: CutterType::default(),
            object_name: None,
            id: 1,
            diameter: 0.003,
            length: 0.025,
            flutes: 2,
            tip_angle: 60.0,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub machine_axes: MachineAxes,
    pub strategy: Strategy,
    pub strategy_4axis: Strategy4Axis,
    pub strategy_5axis: Strategy5Axis,
    pub rotary_axis_1: RotaryAxis,
    pub rotary_axis_2: RotaryAxis,
    pub start_type: StartType,

    pub pocket_option: PocketOption,
    pub cut_type: CutType,
    /// Number of profile passes around the outline
    pub outlines_count: u32,
    pub drill_type: DrillType,
    pub carve_depth: f64,
    pub slice_detail: f64,
    pub waterline_fill: bool,
    pub waterline_project: bool,
    /// Angle of parallel paths, radians
    pub parallel_angle: f64,
    pub dist_along_paths: f64,
    /// Material left on the model for finishing
    pub skin: f64,
    /// Male/female inverse milling
    pub inverse: bool,

    pub array: bool,
    pub array_x_count: u32,
    pub array_y_count: u32,
    pub array_x_distance: f64,
    pub array_y_distance: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            machine_axes: MachineAxes::default(),
            strategy: Strategy::default(),
            strategy_4axis: Strategy4Axis::default(),
            strategy_5axis: Strategy5Axis::default(),
            rotary_axis_1: RotaryAxis::X,
            rotary_axis_2: RotaryAxis::Z,
            start_type: StartType::default(),
            pocket_option: PocketOption::default(),
            cut_type: CutType::default(),
            outlines_count: 1,
            drill_type: DrillType::default(),
            carve_depth: 0.001,
            slice_detail: 0.001,
            waterline_fill: true,
            waterline_project: true,
            parallel_angle: 0.0,
            dist_along_paths: 0.0002,
            skin: 0.0,
            inverse: false,
            array: false,
            array_x_count: 1,
            array_y_count: 1,
            array_x_distance: 0.01,
            array_y_distance: 0.01,
        }
    }
}

/// Stepover pair, kept consistent with the cutter diameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepParams {
    /// Percent of the cutter diameter
    pub stepover_perc: f64,
    /// Lateral distance between adjacent passes
    pub dist_between_paths: f64,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            stepover_perc: 40.0,
            dist_between_paths: 0.0012,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParams {
    pub use_layers: bool,
    pub stepdown: f64,
    /// Finish each shape down to depth before moving to the next
    pub first_down: bool,
    pub ramp: bool,
    pub ramp_out: bool,
    pub ramp_in_angle: f64,
    pub ramp_out_angle: f64,
    pub helix_enter: bool,
    /// Helix diameter in percent of the cutter diameter
    pub helix_diameter: f64,
    pub retract_tangential: bool,
    pub retract_radius: f64,
    pub retract_height: f64,
    pub minz_from_object: bool,
    pub minz: f64,
    pub maxz: f64,
    pub movement_type: MovementType,
    pub spindle_rotation: SpindleRotation,
    pub free_movement_height: f64,
    pub movement_insideout: MovementInsideOut,
    pub parallel_step_back: bool,
    /// Keep the cutter down between close paths
    pub stay_low: bool,
    pub merge_dist: f64,
    pub protect_vertical: bool,
    pub protect_vertical_limit: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            use_layers: true,
            stepdown: 0.01,
            first_down: false,
            ramp: false,
            ramp_out: false,
            ramp_in_angle: PI / 6.0,
            ramp_out_angle: PI / 6.0,
            helix_enter: false,
            helix_diameter: 90.0,
            retract_tangential: false,
            retract_radius: 0.001,
            retract_height: 0.001,
            minz_from_object: true,
            minz: -0.01,
            maxz: 0.0,
            movement_type: MovementType::default(),
            spindle_rotation: SpindleRotation::default(),
            free_movement_height: 0.01,
            movement_insideout: MovementInsideOut::default(),
            parallel_step_back: false,
            stay_low: true,
            merge_dist: 0.0,
            protect_vertical: true,
            protect_vertical_limit: PI / 45.0,
        }
    }
}

/// Feeds (m/min) and speeds (rpm)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedParams {
    pub feedrate: f64,
    /// Plunge feedrate in percent of `feedrate`
    pub plunge_feedrate_perc: f64,
    pub plunge_feedrate_val: f64,
    /// Moves steeper than this use the plunge feedrate, radians
    pub plunge_angle: f64,
    pub spindle_rpm: f64,
}

impl Default for FeedParams {
    fn default() -> Self {
        Self {
            feedrate: 1.0,
            plunge_feedrate_perc: 50.0,
            plunge_feedrate_val: 0.5,
            plunge_angle: PI / 6.0,
            spindle_rpm: 12000.0,
        }
    }
}

/// Placement of an image geometry source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageParams {
    pub scale_z: f64,
    pub size_x: f64,
    pub offset: [f64; 3],
    pub crop: bool,
    /// Crop start in percent of the image size (x, y)
    pub crop_start: [f64; 2],
    pub crop_end: [f64; 2],
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            scale_z: 0.01,
            size_x: 0.1,
            offset: [0.0; 3],
            crop: false,
            crop_start: [0.0, 0.0],
            crop_end: [100.0, 100.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientParams {
    pub behaviour: AmbientBehaviour,
    pub radius: f64,
    /// Keep the cutter inside the ambient area instead of its center
    pub cutter_restrict: bool,
}

impl Default for AmbientParams {
    fn default() -> Self {
        Self {
            behaviour: AmbientBehaviour::default(),
            radius: 0.01,
            cutter_restrict: true,
        }
    }
}

/// Sampling and path optimisation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimisationParams {
    /// Sample the mesh exactly instead of through a z-buffer image
    pub use_exact: bool,
    pub exact_subdivide_edges: bool,
    pub use_opencamlib: bool,
    pub pixsize: f64,
    /// Image resolution limit in megapixels
    pub imgres_limit: u32,
    pub circle_detail: u32,
    pub optimize: bool,
    pub optimize_threshold: f64,
    pub dont_merge: bool,
    pub simulation_detail: f64,
    pub do_simulation_feedrate: bool,
}

impl Default for OptimisationParams {
    fn default() -> Self {
        Self {
            use_exact: true,
            exact_subdivide_edges: false,
            use_opencamlib: false,
            pixsize: 0.0001,
            imgres_limit: 16,
            circle_detail: 64,
            optimize: true,
            optimize_threshold: 0.000002,
            dont_merge: false,
            simulation_detail: 0.0002,
            do_simulation_feedrate: false,
        }
    }
}

/// Holding tabs left on cutouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeParams {
    pub enabled: bool,
    pub width: f64,
    pub height: f64,
    /// Group holding the bridge curves
    pub group_name: Option<String>,
    pub use_modifiers: bool,
    pub per_curve: u32,
    pub max_distance: f64,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 0.002,
            height: 0.0005,
            group_name: None,
            use_modifiers: true,
            per_curve: 4,
            max_distance: 0.08,
        }
    }
}

/// Stock material block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    /// Size the stock from the model bounds
    pub from_model: bool,
    pub radius_around_model: f64,
    pub origin: [f64; 3],
    pub size: [f64; 3],
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            from_model: true,
            radius_around_model: 0.0,
            origin: [0.0; 3],
            size: [0.2, 0.2, 0.1],
        }
    }
}

/// Extra G-code emitted around the operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcodeParams {
    pub output_header: bool,
    pub header: String,
    pub output_trailer: bool,
    pub trailer: String,
}

impl Default for GcodeParams {
    fn default() -> Self {
        Self {
            output_header: false,
            header: "G53 G0".to_string(),
            output_trailer: false,
            trailer: "M02".to_string(),
        }
    }
}

/// All user-editable settings of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationParams {
    pub filename: String,
    pub auto_export: bool,
    pub geometry: GeometryParams,
    pub cutter: CutterParams,
    pub strategy: StrategyParams,
    pub steps: StepParams,
    pub movement: MovementParams,
    pub feeds: FeedParams,
    pub image: ImageParams,
    pub ambient: AmbientParams,
    pub optimisation: OptimisationParams,
    pub bridges: BridgeParams,
    pub material: MaterialParams,
    pub gcode: GcodeParams,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            filename: "Operation".to_string(),
            auto_export: true,
            geometry: GeometryParams::default(),
            cutter: CutterParams::default(),
            strategy: StrategyParams::default(),
            steps: StepParams::default(),
            movement: MovementParams::default(),
            feeds: FeedParams::default(),
            image: ImageParams::default(),
            ambient: AmbientParams::default(),
            optimisation: OptimisationParams::default(),
            bridges: BridgeParams::default(),
            material: MaterialParams::default(),
            gcode: GcodeParams::default(),
        }
    }
}

/// A configured machining pass over one geometry source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operation {
    pub(crate) name: String,
    pub(crate) params: OperationParams,
    /// Feed per flute per revolution
    pub(crate) chipload: f64,
    /// The toolpath must be recomputed before export
    pub(crate) changed: bool,
    pub(crate) valid: bool,
    /// Newline separated messages
    pub(crate) warnings: String,
    pub(crate) tags: DirtyTags,
    pub(crate) compute: ComputeState,
    /// Written by the last completed computation
    pub(crate) stats: Option<PathStats>,
}

impl Default for Operation {
    fn default() -> Self {
        Self::new("Operation", GeometrySource::default())
    }
}

impl Operation {
    /// Create an operation with default parameters
    ///
    /// The result is not validated against any scene; sessions revalidate
    /// it when it is added.
    pub fn new(name: impl Into<String>, source: GeometrySource) -> Self {
        let name = name.into();
        let mut params = OperationParams {
            filename: name.clone(),
            ..Default::default()
        };
        params.geometry.source = source;

        let mut op = Self {
            name,
            params,
            chipload: 0.0,
            changed: false,
            valid: true,
            warnings: String::new(),
            tags: DirtyTags::default(),
            compute: ComputeState::Idle,
            stats: None,
        };
        op.sync_derived();
        op
    }

    /// Recompute every derived value from its primary inputs
    pub(crate) fn sync_derived(&mut self) {
        self.params.steps.dist_between_paths =
            self.params.steps.stepover_perc / 100.0 * self.params.cutter.diameter;
        self.params.feeds.plunge_feedrate_val =
            self.params.feeds.plunge_feedrate_perc / 100.0 * self.params.feeds.feedrate;
        self.recompute_chipload();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn params(&self) -> &OperationParams {
        &self.params
    }

    pub fn geometry_source(&self) -> &GeometrySource {
        &self.params.geometry.source
    }

    pub fn strategy(&self) -> Strategy {
        self.params.strategy.strategy
    }

    pub fn chipload(&self) -> f64 {
        self.chipload
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn warnings(&self) -> &str {
        &self.warnings
    }

    pub fn tags(&self) -> &DirtyTags {
        &self.tags
    }

    pub fn is_tag_set(&self, tag: Tag) -> bool {
        self.tags.is_set(tag)
    }

    pub fn compute_state(&self) -> ComputeState {
        self.compute
    }

    pub fn stats(&self) -> Option<&PathStats> {
        self.stats.as_ref()
    }

    /// Whether the operation needs an orientation object
    pub fn uses_orientation(&self) -> bool {
        let s = &self.params.strategy;
        s.machine_axes == MachineAxes::Five
            || (s.machine_axes == MachineAxes::Four && s.strategy_4axis == Strategy4Axis::Indexed)
    }

    /// Append a warning line unless it is already present
    pub(crate) fn push_warning(&mut self, message: &str) {
        if self.warnings.lines().any(|line| line == message) {
            return;
        }
        if !self.warnings.is_empty() {
            self.warnings.push('\n');
        }
        self.warnings.push_str(message);
    }

    /// Remove a warning line if present
    pub(crate) fn drop_warning(&mut self, message: &str) {
        if !self.warnings.lines().any(|line| line == message) {
            return;
        }
        self.warnings = self
            .warnings
            .lines()
            .filter(|line| *line != message)
            .collect::<Vec<_>>()
            .join("\n");
    }

    /// Raise every dirty tag, as for a fresh copy
    pub(crate) fn invalidate_artifacts(&mut self) {
        self.tags.raise_all();
        self.changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_operation_derived_values() {
        let op = Operation::new("Roughing", GeometrySource::Object("Part".to_string()));
        assert_eq!(op.name(), "Roughing");
        assert_eq!(op.params().filename, "Roughing");
        assert!((op.params().steps.dist_between_paths - 0.0012).abs() < 1e-12);
        assert!((op.params().feeds.plunge_feedrate_val - 0.5).abs() < 1e-12);
        assert!((op.chipload() - 1.0 / (12000.0 * 2.0)).abs() < 1e-15);
    }

    #[test]
    fn test_new_operation_flags() {
        let op = Operation::default();
        assert!(op.is_valid());
        assert!(!op.is_changed());
        assert!(op.warnings().is_empty());
        assert_eq!(op.tags(), &DirtyTags::default());
        assert_eq!(op.compute_state(), ComputeState::Idle);
        assert!(op.stats().is_none());
    }

    #[test]
    fn test_push_warning_dedups() {
        let mut op = Operation::default();
        op.push_warning("first");
        op.push_warning("second");
        op.push_warning("first");
        assert_eq!(op.warnings(), "first\nsecond");
    }

    #[test]
    fn test_drop_warning() {
        let mut op = Operation::default();
        op.push_warning("first");
        op.push_warning("second");
        op.push_warning("third");
        op.drop_warning("second");
        assert_eq!(op.warnings(), "first\nthird");
        op.drop_warning("missing");
        assert_eq!(op.warnings(), "first\nthird");
        op.drop_warning("first");
        op.drop_warning("third");
        assert_eq!(op.warnings(), "");
    }

    #[test]
    fn test_uses_orientation() {
        let mut op = Operation::default();
        assert!(!op.uses_orientation());

        op.params.strategy.machine_axes = MachineAxes::Four;
        assert!(!op.uses_orientation());
        op.params.strategy.strategy_4axis = Strategy4Axis::Indexed;
        assert!(op.uses_orientation());

        op.params.strategy.machine_axes = MachineAxes::Five;
        assert!(op.uses_orientation());
    }

    #[test]
    fn test_partial_operation_deserializes_with_defaults() {
        let op: Operation = serde_json::from_str(
            r#"{ "name": "Finish", "params": { "cutter": { "diameter": 0.006 } } }"#,
        )
        .unwrap();
        assert_eq!(op.name(), "Finish");
        assert_eq!(op.params().cutter.diameter, 0.006);
        assert_eq!(op.params().cutter.flutes, 2);
        assert!(op.is_valid());
    }
}
