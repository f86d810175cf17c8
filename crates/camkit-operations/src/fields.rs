//! Field edits and their effects
//!
//! Every editable parameter has a [`FieldEdit`] variant carrying the new
//! value. [`Operation::apply`] writes the value and then runs the
//! [`Effect`]s listed for the field in a fixed table, so which tags an edit
//! raises depends only on which field was edited.

use crate::error::{OperationError, OperationResult};
use crate::geometry_source::GeometrySource;
use crate::operation::{Operation, OperationParams};
use crate::options::{
    AmbientBehaviour, CutType, CutterType, DrillType, MovementInsideOut, MovementType,
    PocketOption, SpindleRotation,
};
use crate::orientation::OrientationRegistry;
use crate::strategy::{MachineAxes, RotaryAxis, StartType, Strategy, Strategy4Axis, Strategy5Axis};
use crate::sync::{MIN_CUTTER_DIAMETER, MIN_FEEDRATE, MIN_SPINDLE_RPM};
use crate::tags::Tag;
use camkit_core::GeometryResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// One step run after a field was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Mark the toolpath for recomputation
    MarkChanged,
    /// Derive the distance between paths from the stepover percentage
    SyncStepoverDistance,
    /// Derive the stepover percentage from the distance between paths
    SyncStepoverPercent,
    /// Derive the plunge feedrate from its percentage
    SyncPlungeValue,
    /// Derive the plunge percentage from the plunge feedrate
    SyncPlungePercent,
    RecomputeChipload,
    RaiseOffset,
    RaiseZbuffer,
    /// Recheck the geometry source (raises offset and z-buffer)
    Revalidate,
    /// Update the orientation object, then exact mode
    ReconcileStrategy,
    ReconcileExactMode,
}

const NONE: &[Effect] = &[];
const CHANGED: &[Effect] = &[Effect::MarkChanged];
const OFFSET: &[Effect] = &[
    Effect::RecomputeChipload,
    Effect::MarkChanged,
    Effect::RaiseOffset,
];
const ZBUFFER: &[Effect] = &[
    Effect::MarkChanged,
    Effect::RaiseZbuffer,
    Effect::RaiseOffset,
];
const VALIDITY: &[Effect] = &[Effect::MarkChanged, Effect::Revalidate];
const STRATEGY: &[Effect] = &[
    Effect::MarkChanged,
    Effect::ReconcileStrategy,
    Effect::RaiseZbuffer,
    Effect::RaiseOffset,
];
const EXACT: &[Effect] = &[
    Effect::MarkChanged,
    Effect::RaiseZbuffer,
    Effect::RaiseOffset,
    Effect::ReconcileExactMode,
];
const INVERSE: &[Effect] = &[
    Effect::RecomputeChipload,
    Effect::MarkChanged,
    Effect::RaiseOffset,
    Effect::ReconcileExactMode,
];
const DIAMETER: &[Effect] = &[
    Effect::SyncStepoverDistance,
    Effect::RecomputeChipload,
    Effect::MarkChanged,
    Effect::RaiseZbuffer,
    Effect::RaiseOffset,
];
const CHIPLOAD: &[Effect] = &[Effect::RecomputeChipload, Effect::MarkChanged];
const FEEDRATE: &[Effect] = &[
    Effect::SyncPlungeValue,
    Effect::RecomputeChipload,
    Effect::MarkChanged,
];
const STEPOVER_PERCENT: &[Effect] = &[Effect::SyncStepoverDistance];
const STEPOVER_DISTANCE: &[Effect] = &[Effect::SyncStepoverPercent];
const PLUNGE_PERCENT: &[Effect] = &[Effect::SyncPlungeValue, Effect::RecomputeChipload];
const PLUNGE_VALUE: &[Effect] = &[Effect::SyncPlungePercent, Effect::RecomputeChipload];

/// Values that may be rejected as non-finite
trait FieldValue {
    fn is_finite(&self) -> bool {
        true
    }
}

impl FieldValue for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl<const N: usize> FieldValue for [f64; N] {
    fn is_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}

macro_rules! always_finite {
    ($($ty:ty),* $(,)?) => {
        $(impl FieldValue for $ty {})*
    };
}

always_finite!(
    bool,
    u32,
    String,
    Option<String>,
    GeometrySource,
    CutterType,
    MachineAxes,
    Strategy,
    Strategy4Axis,
    Strategy5Axis,
    RotaryAxis,
    StartType,
    PocketOption,
    CutType,
    DrillType,
    MovementType,
    SpindleRotation,
    MovementInsideOut,
    AmbientBehaviour,
);

macro_rules! fields {
    ($($variant:ident($ty:ty) => $($path:ident).+, $name:literal, $effects:ident;)*) => {
        /// A new value for one operation parameter
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "field", content = "value", rename_all = "snake_case")]
        pub enum FieldEdit {
            $($variant($ty),)*
        }

        /// Identifies an editable operation parameter
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Field {
            $($variant,)*
        }

        impl FieldEdit {
            pub fn field(&self) -> Field {
                match self {
                    $(Self::$variant(_) => Field::$variant,)*
                }
            }

            fn is_finite(&self) -> bool {
                match self {
                    $(Self::$variant(value) => FieldValue::is_finite(value),)*
                }
            }

            fn write(self, params: &mut OperationParams) {
                match self {
                    $(Self::$variant(value) => params.$($path).+ = value,)*
                }
            }
        }

        impl Field {
            pub fn all() -> &'static [Field] {
                &[$(Field::$variant,)*]
            }

            /// Parameter path as shown in logs and errors
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Steps run after the field was written, in order
            pub fn effects(&self) -> &'static [Effect] {
                match self {
                    $(Self::$variant => $effects,)*
                }
            }
        }
    };
}

fields! {
    Filename(String) => filename, "filename", CHANGED;
    AutoExport(bool) => auto_export, "auto_export", NONE;

    GeometrySource(GeometrySource) => geometry.source, "geometry.source", VALIDITY;
    CurveSource(Option<String>) => geometry.curve_source, "geometry.curve_source", VALIDITY;
    CurveTarget(Option<String>) => geometry.curve_target, "geometry.curve_target", VALIDITY;
    UseModifiers(bool) => geometry.use_modifiers, "geometry.use_modifiers", VALIDITY;
    LimitCurve(Option<String>) => geometry.limit_curve, "geometry.limit_curve", CHANGED;
    UseLimitCurve(bool) => geometry.use_limit_curve, "geometry.use_limit_curve", CHANGED;

    CutterType(CutterType) => cutter.cutter_type, "cutter.cutter_type", ZBUFFER;
    CutterObjectName(Option<String>) => cutter.object_name, "cutter.object_name", ZBUFFER;
    CutterId(u32) => cutter.id, "cutter.id", CHANGED;
    CutterDiameter(f64) => cutter.diameter, "cutter.diameter", DIAMETER;
    CutterLength(f64) => cutter.length, "cutter.length", OFFSET;
    CutterFlutes(u32) => cutter.flutes, "cutter.flutes", CHIPLOAD;
    CutterTipAngle(f64) => cutter.tip_angle, "cutter.tip_angle", OFFSET;
    CutterDescription(String) => cutter.description, "cutter.description", OFFSET;

    MachineAxes(MachineAxes) => strategy.machine_axes, "strategy.machine_axes", STRATEGY;
    Strategy(Strategy) => strategy.strategy, "strategy.strategy", STRATEGY;
    Strategy4Axis(Strategy4Axis) => strategy.strategy_4axis, "strategy.strategy_4axis", STRATEGY;
    Strategy5Axis(Strategy5Axis) => strategy.strategy_5axis, "strategy.strategy_5axis", STRATEGY;
    RotaryAxis1(RotaryAxis) => strategy.rotary_axis_1, "strategy.rotary_axis_1", STRATEGY;
    RotaryAxis2(RotaryAxis) => strategy.rotary_axis_2, "strategy.rotary_axis_2", STRATEGY;
    StartType(StartType) => strategy.start_type, "strategy.start_type", STRATEGY;
    PocketOption(PocketOption) => strategy.pocket_option, "strategy.pocket_option", CHANGED;
    CutType(CutType) => strategy.cut_type, "strategy.cut_type", CHANGED;
    OutlinesCount(u32) => strategy.outlines_count, "strategy.outlines_count", CHANGED;
    DrillType(DrillType) => strategy.drill_type, "strategy.drill_type", CHANGED;
    CarveDepth(f64) => strategy.carve_depth, "strategy.carve_depth", CHANGED;
    SliceDetail(f64) => strategy.slice_detail, "strategy.slice_detail", CHANGED;
    WaterlineFill(bool) => strategy.waterline_fill, "strategy.waterline_fill", CHANGED;
    WaterlineProject(bool) => strategy.waterline_project, "strategy.waterline_project", CHANGED;
    ParallelAngle(f64) => strategy.parallel_angle, "strategy.parallel_angle", CHANGED;
    DistAlongPaths(f64) => strategy.dist_along_paths, "strategy.dist_along_paths", CHANGED;
    Skin(f64) => strategy.skin, "strategy.skin", OFFSET;
    Inverse(bool) => strategy.inverse, "strategy.inverse", INVERSE;
    Array(bool) => strategy.array, "strategy.array", CHANGED;
    ArrayXCount(u32) => strategy.array_x_count, "strategy.array_x_count", CHANGED;
    ArrayYCount(u32) => strategy.array_y_count, "strategy.array_y_count", CHANGED;
    ArrayXDistance(f64) => strategy.array_x_distance, "strategy.array_x_distance", CHANGED;
    ArrayYDistance(f64) => strategy.array_y_distance, "strategy.array_y_distance", CHANGED;

    StepoverPercent(f64) => steps.stepover_perc, "steps.stepover_perc", STEPOVER_PERCENT;
    DistBetweenPaths(f64) => steps.dist_between_paths, "steps.dist_between_paths", STEPOVER_DISTANCE;

    UseLayers(bool) => movement.use_layers, "movement.use_layers", CHANGED;
    Stepdown(f64) => movement.stepdown, "movement.stepdown", CHANGED;
    FirstDown(bool) => movement.first_down, "movement.first_down", CHANGED;
    Ramp(bool) => movement.ramp, "movement.ramp", CHANGED;
    RampOut(bool) => movement.ramp_out, "movement.ramp_out", CHANGED;
    RampInAngle(f64) => movement.ramp_in_angle, "movement.ramp_in_angle", CHANGED;
    RampOutAngle(f64) => movement.ramp_out_angle, "movement.ramp_out_angle", CHANGED;
    HelixEnter(bool) => movement.helix_enter, "movement.helix_enter", CHANGED;
    HelixDiameter(f64) => movement.helix_diameter, "movement.helix_diameter", CHANGED;
    RetractTangential(bool) => movement.retract_tangential, "movement.retract_tangential", CHANGED;
    RetractRadius(f64) => movement.retract_radius, "movement.retract_radius", CHANGED;
    RetractHeight(f64) => movement.retract_height, "movement.retract_height", CHANGED;
    MinzFromObject(bool) => movement.minz_from_object, "movement.minz_from_object", CHANGED;
    Minz(f64) => movement.minz, "movement.minz", CHANGED;
    Maxz(f64) => movement.maxz, "movement.maxz", CHANGED;
    MovementType(MovementType) => movement.movement_type, "movement.movement_type", CHANGED;
    SpindleRotation(SpindleRotation) => movement.spindle_rotation, "movement.spindle_rotation", CHANGED;
    FreeMovementHeight(f64) => movement.free_movement_height, "movement.free_movement_height", CHANGED;
    MovementInsideOut(MovementInsideOut) => movement.movement_insideout, "movement.movement_insideout", CHANGED;
    ParallelStepBack(bool) => movement.parallel_step_back, "movement.parallel_step_back", CHANGED;
    StayLow(bool) => movement.stay_low, "movement.stay_low", CHANGED;
    MergeDist(f64) => movement.merge_dist, "movement.merge_dist", CHANGED;
    ProtectVertical(bool) => movement.protect_vertical, "movement.protect_vertical", NONE;
    ProtectVerticalLimit(f64) => movement.protect_vertical_limit, "movement.protect_vertical_limit", CHANGED;

    Feedrate(f64) => feeds.feedrate, "feeds.feedrate", FEEDRATE;
    PlungeFeedratePercent(f64) => feeds.plunge_feedrate_perc, "feeds.plunge_feedrate_perc", PLUNGE_PERCENT;
    PlungeFeedrateValue(f64) => feeds.plunge_feedrate_val, "feeds.plunge_feedrate_val", PLUNGE_VALUE;
    PlungeAngle(f64) => feeds.plunge_angle, "feeds.plunge_angle", CHANGED;
    SpindleRpm(f64) => feeds.spindle_rpm, "feeds.spindle_rpm", CHIPLOAD;

    ImageScaleZ(f64) => image.scale_z, "image.scale_z", ZBUFFER;
    ImageSizeX(f64) => image.size_x, "image.size_x", ZBUFFER;
    ImageOffset([f64; 3]) => image.offset, "image.offset", ZBUFFER;
    ImageCrop(bool) => image.crop, "image.crop", ZBUFFER;
    ImageCropStart([f64; 2]) => image.crop_start, "image.crop_start", ZBUFFER;
    ImageCropEnd([f64; 2]) => image.crop_end, "image.crop_end", ZBUFFER;

    AmbientBehaviour(AmbientBehaviour) => ambient.behaviour, "ambient.behaviour", ZBUFFER;
    AmbientRadius(f64) => ambient.radius, "ambient.radius", CHANGED;
    AmbientCutterRestrict(bool) => ambient.cutter_restrict, "ambient.cutter_restrict", CHANGED;

    UseExact(bool) => optimisation.use_exact, "optimisation.use_exact", EXACT;
    ExactSubdivideEdges(bool) => optimisation.exact_subdivide_edges, "optimisation.exact_subdivide_edges", EXACT;
    UseOpencamlib(bool) => optimisation.use_opencamlib, "optimisation.use_opencamlib", CHANGED;
    Pixsize(f64) => optimisation.pixsize, "optimisation.pixsize", ZBUFFER;
    ImgresLimit(u32) => optimisation.imgres_limit, "optimisation.imgres_limit", ZBUFFER;
    CircleDetail(u32) => optimisation.circle_detail, "optimisation.circle_detail", CHANGED;
    Optimize(bool) => optimisation.optimize, "optimisation.optimize", CHANGED;
    OptimizeThreshold(f64) => optimisation.optimize_threshold, "optimisation.optimize_threshold", CHANGED;
    DontMerge(bool) => optimisation.dont_merge, "optimisation.dont_merge", CHANGED;
    SimulationDetail(f64) => optimisation.simulation_detail, "optimisation.simulation_detail", CHANGED;
    DoSimulationFeedrate(bool) => optimisation.do_simulation_feedrate, "optimisation.do_simulation_feedrate", CHANGED;

    UseBridges(bool) => bridges.enabled, "bridges.enabled", CHANGED;
    BridgesWidth(f64) => bridges.width, "bridges.width", CHANGED;
    BridgesHeight(f64) => bridges.height, "bridges.height", CHANGED;
    BridgesGroupName(Option<String>) => bridges.group_name, "bridges.group_name", VALIDITY;
    UseBridgeModifiers(bool) => bridges.use_modifiers, "bridges.use_modifiers", CHANGED;
    BridgesPerCurve(u32) => bridges.per_curve, "bridges.per_curve", CHANGED;
    BridgesMaxDistance(f64) => bridges.max_distance, "bridges.max_distance", CHANGED;

    MaterialFromModel(bool) => material.from_model, "material.from_model", NONE;
    MaterialRadiusAroundModel(f64) => material.radius_around_model, "material.radius_around_model", NONE;
    MaterialOrigin([f64; 3]) => material.origin, "material.origin", NONE;
    MaterialSize([f64; 3]) => material.size, "material.size", NONE;

    OutputHeader(bool) => gcode.output_header, "gcode.output_header", NONE;
    GcodeHeader(String) => gcode.header, "gcode.header", NONE;
    OutputTrailer(bool) => gcode.output_trailer, "gcode.output_trailer", NONE;
    GcodeTrailer(String) => gcode.trailer, "gcode.trailer", NONE;
}

impl FieldEdit {
    /// Raise values below the arithmetic minimums the derived divisions need
    fn clamped(self) -> Self {
        match self {
            Self::CutterDiameter(v) => Self::CutterDiameter(v.max(MIN_CUTTER_DIAMETER)),
            Self::CutterFlutes(v) => Self::CutterFlutes(v.max(1)),
            Self::Feedrate(v) => Self::Feedrate(v.max(MIN_FEEDRATE)),
            Self::SpindleRpm(v) => Self::SpindleRpm(v.max(MIN_SPINDLE_RPM)),
            other => other,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What an edit needs from the owning session
pub struct EditContext<'a> {
    pub resolver: &'a dyn GeometryResolver,
    pub orientations: &'a mut OrientationRegistry,
    /// Whether experimental strategies may be selected
    pub experimental: bool,
}

/// Outcome of one field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    pub field: Field,
    /// Whether this edit set `changed`
    pub changed: bool,
    /// Tags raised by this edit, whether or not they were already set
    pub raised: BTreeSet<Tag>,
    /// Validity after the edit
    pub valid: bool,
}

impl Operation {
    /// Write one field and run its effects
    ///
    /// Non-finite numbers are rejected and experimental strategies need
    /// `ctx.experimental`. Cutter diameter, flutes, feedrate and spindle
    /// speed are raised to their minimums before the write.
    pub fn apply(
        &mut self,
        edit: FieldEdit,
        ctx: &mut EditContext<'_>,
    ) -> OperationResult<EditReport> {
        let field = edit.field();

        if !edit.is_finite() {
            return Err(OperationError::NonFiniteValue {
                operation: self.name.clone(),
                field: field.name().to_string(),
            });
        }
        if let FieldEdit::Strategy(strategy) = &edit {
            if strategy.is_experimental() && !ctx.experimental {
                return Err(OperationError::ExperimentalStrategy {
                    strategy: strategy.to_string(),
                });
            }
        }

        edit.clamped().write(&mut self.params);
        debug!("Operation '{}' set {}", self.name, field);

        let mut report = EditReport {
            field,
            changed: false,
            raised: BTreeSet::new(),
            valid: self.valid,
        };

        for effect in field.effects() {
            match effect {
                Effect::MarkChanged => {
                    self.changed = true;
                    report.changed = true;
                }
                Effect::SyncStepoverDistance => report.changed |= self.update_stepover_distance(),
                Effect::SyncStepoverPercent => report.changed |= self.update_stepover_percent(),
                Effect::SyncPlungeValue => report.changed |= self.update_plunge_value(),
                Effect::SyncPlungePercent => report.changed |= self.update_plunge_percent(),
                Effect::RecomputeChipload => self.recompute_chipload(),
                Effect::RaiseOffset => {
                    self.tags.raise(Tag::Offset);
                    report.raised.insert(Tag::Offset);
                }
                Effect::RaiseZbuffer => {
                    self.tags.raise(Tag::Zbuffer);
                    report.raised.insert(Tag::Zbuffer);
                }
                Effect::Revalidate => {
                    self.revalidate(ctx.resolver);
                    report.raised.insert(Tag::Offset);
                    report.raised.insert(Tag::Zbuffer);
                }
                Effect::ReconcileStrategy => {
                    self.reconcile_strategy(ctx.orientations);
                }
                Effect::ReconcileExactMode => {
                    self.reconcile_exact_mode();
                }
            }
        }

        report.valid = self.valid;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camkit_core::SceneIndex;

    fn setup() -> (Operation, SceneIndex, OrientationRegistry) {
        let mut scene = SceneIndex::new();
        scene.add_object("Cube").unwrap();
        let op = Operation::new("Op", GeometrySource::Object("Cube".to_string()));
        (op, scene, OrientationRegistry::new())
    }

    #[test]
    fn test_every_field_has_a_unique_name() {
        let names: BTreeSet<_> = Field::all().iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Field::all().len());
    }

    #[test]
    fn test_write_reaches_nested_param() {
        let (mut op, scene, mut orientations) = setup();
        let mut ctx = EditContext {
            resolver: &scene,
            orientations: &mut orientations,
            experimental: false,
        };
        op.apply(FieldEdit::Stepdown(0.002), &mut ctx).unwrap();
        assert_eq!(op.params().movement.stepdown, 0.002);

        op.apply(FieldEdit::GcodeTrailer("M30".to_string()), &mut ctx)
            .unwrap();
        assert_eq!(op.params().gcode.trailer, "M30");
    }

    #[test]
    fn test_clamped_minimums() {
        let (mut op, scene, mut orientations) = setup();
        let mut ctx = EditContext {
            resolver: &scene,
            orientations: &mut orientations,
            experimental: false,
        };
        op.apply(FieldEdit::CutterFlutes(0), &mut ctx).unwrap();
        op.apply(FieldEdit::SpindleRpm(0.0), &mut ctx).unwrap();
        assert_eq!(op.params().cutter.flutes, 1);
        assert_eq!(op.params().feeds.spindle_rpm, MIN_SPINDLE_RPM);
        assert!(op.chipload().is_finite());
    }

    #[test]
    fn test_experimental_strategy_gated() {
        let (mut op, scene, mut orientations) = setup();
        let mut ctx = EditContext {
            resolver: &scene,
            orientations: &mut orientations,
            experimental: false,
        };
        let err = op
            .apply(FieldEdit::Strategy(Strategy::Waterline), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, OperationError::ExperimentalStrategy { .. }));
        assert_eq!(op.strategy(), Strategy::Cutout);

        ctx.experimental = true;
        op.apply(FieldEdit::Strategy(Strategy::Waterline), &mut ctx)
            .unwrap();
        assert_eq!(op.strategy(), Strategy::Waterline);
        assert!(!op.params().optimisation.use_exact);
    }

    #[test]
    fn test_non_finite_rejected() {
        let (mut op, scene, mut orientations) = setup();
        let mut ctx = EditContext {
            resolver: &scene,
            orientations: &mut orientations,
            experimental: false,
        };
        let err = op
            .apply(FieldEdit::MaterialSize([0.1, f64::NAN, 0.1]), &mut ctx)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Non-finite value for 'material.size' on operation 'Op'"
        );
        assert_eq!(op.params().material.size, [0.2, 0.2, 0.1]);
    }

    #[test]
    fn test_field_edit_serde() {
        let edit: FieldEdit =
            serde_json::from_str(r#"{"field":"cutter_diameter","value":0.006}"#).unwrap();
        assert_eq!(edit, FieldEdit::CutterDiameter(0.006));
        assert_eq!(edit.field().name(), "cutter.diameter");
    }
}
