//! Validity and strategy gatekeeping
//!
//! Decides whether an operation has enough valid input to be computed and
//! switches off options the chosen strategy cannot honour. None of this
//! fails: problems become the `valid` flag plus warning lines, and
//! consumers check [`Operation::ensure_exportable`] before acting.

use crate::error::{OperationError, OperationResult};
use crate::geometry_source::GeometrySource;
use crate::operation::Operation;
use crate::orientation::OrientationRegistry;
use crate::strategy::{MachineAxes, Strategy, Strategy4Axis};
use crate::tags::Tag;
use camkit_core::{EntityKind, GeometryResolver};
use camkit_machine::MachineProfile;
use tracing::{debug, warn};

/// Warning of an operation whose geometry source does not resolve
pub const INVALID_INPUT_WARNING: &str = "Operation has no valid data input";

const IMAGE_EXACT_WARNING: &str = "Exact mode is not available for image sources, disabled";
const WATERLINE_EXACT_WARNING: &str = "Exact mode is not supported by waterline paths, disabled";
const POCKET_EXACT_WARNING: &str = "Exact mode is not supported by pockets, disabled";
const INVERSE_EXACT_WARNING: &str = "Exact mode is not supported with inverse milling, disabled";
const INDEXED_4AXIS_WARNING: &str = "4 axis indexed strategy is not implemented yet";

impl Operation {
    fn source_resolves(&self, resolver: &dyn GeometryResolver) -> bool {
        match &self.params.geometry.source {
            GeometrySource::Object(name) => resolver.exists(EntityKind::Object, name),
            GeometrySource::Group(name) => {
                resolver.exists(EntityKind::Group, name) && resolver.member_count(name) > 0
            }
            GeometrySource::Image(name) => resolver.exists(EntityKind::Image, name),
        }
    }

    fn is_indexed_4axis(&self) -> bool {
        let s = &self.params.strategy;
        s.machine_axes == MachineAxes::Four && s.strategy_4axis == Strategy4Axis::Indexed
    }

    /// Recheck the geometry source against the scene
    ///
    /// Resets `valid` and the warnings, then marks the operation invalid if
    /// the source no longer resolves. Image sources always drop exact mode.
    /// Both image tags are raised since the source may have changed shape.
    pub fn revalidate(&mut self, resolver: &dyn GeometryResolver) -> bool {
        self.valid = true;
        self.warnings.clear();

        if !self.source_resolves(resolver) {
            warn!(
                "Operation '{}': {} does not resolve",
                self.name, self.params.geometry.source
            );
            self.valid = false;
            self.push_warning(INVALID_INPUT_WARNING);
        }

        if self.params.geometry.source.is_image() && self.params.optimisation.use_exact {
            self.params.optimisation.use_exact = false;
            self.push_warning(IMAGE_EXACT_WARNING);
        }

        if self.is_indexed_4axis() {
            self.push_warning(INDEXED_4AXIS_WARNING);
        }

        self.tags.raise(Tag::Offset);
        self.tags.raise(Tag::Zbuffer);
        debug!("Operation '{}' valid: {}", self.name, self.valid);
        self.valid
    }

    /// Bring the orientation object and exact mode in line with the axis setup
    ///
    /// 5-axis and 4-axis indexed operations own an orientation object; all
    /// others have theirs removed.
    pub fn reconcile_strategy(&mut self, orientations: &mut OrientationRegistry) -> bool {
        if self.uses_orientation() {
            orientations.ensure(&self.name);
        } else {
            orientations.remove(&self.name);
        }

        if self.is_indexed_4axis() {
            warn!("Operation '{}': {}", self.name, INDEXED_4AXIS_WARNING);
            self.push_warning(INDEXED_4AXIS_WARNING);
        } else {
            self.drop_warning(INDEXED_4AXIS_WARNING);
        }

        self.reconcile_exact_mode()
    }

    /// Switch exact mode off where it cannot be used
    ///
    /// Exact sampling does not work with waterline or pocket strategies or
    /// with inverse milling. Returns whether exact mode was switched off.
    ///
    /// Correction warnings whose cause is gone are dropped first.
    pub fn reconcile_exact_mode(&mut self) -> bool {
        let strategy = self.params.strategy.strategy;
        let inverse = self.params.strategy.inverse;
        if strategy != Strategy::Waterline {
            self.drop_warning(WATERLINE_EXACT_WARNING);
        }
        if strategy != Strategy::Pocket {
            self.drop_warning(POCKET_EXACT_WARNING);
        }
        if !inverse {
            self.drop_warning(INVERSE_EXACT_WARNING);
        }

        if !self.params.optimisation.use_exact {
            return false;
        }

        let reason = match strategy {
            Strategy::Waterline => WATERLINE_EXACT_WARNING,
            Strategy::Pocket => POCKET_EXACT_WARNING,
            _ if inverse => INVERSE_EXACT_WARNING,
            _ => return false,
        };

        warn!("Operation '{}': {}", self.name, reason);
        self.params.optimisation.use_exact = false;
        self.push_warning(reason);
        true
    }

    /// Refuse to hand out an operation without valid input
    pub fn ensure_exportable(&self) -> OperationResult<()> {
        if self.valid {
            return Ok(());
        }
        let reason = if self.warnings.is_empty() {
            INVALID_INPUT_WARNING.to_string()
        } else {
            self.warnings.lines().collect::<Vec<_>>().join("; ")
        };
        Err(OperationError::Invalid {
            name: self.name.clone(),
            reason,
        })
    }

    /// Settings the machine cannot run
    ///
    /// Reported, not corrected: the same operation may be exported for
    /// another machine.
    pub fn machine_warnings(&self, machine: &MachineProfile) -> Vec<String> {
        let mut warnings = Vec::new();
        let feeds = &self.params.feeds;

        if !machine.feedrate.contains(feeds.feedrate) {
            warnings.push(format!(
                "Feedrate {} m/min is outside the machine range {}..{}",
                feeds.feedrate, machine.feedrate.min, machine.feedrate.max
            ));
        }
        if !machine.feedrate.contains(feeds.plunge_feedrate_val) {
            warnings.push(format!(
                "Plunge feedrate {} m/min is outside the machine range {}..{}",
                feeds.plunge_feedrate_val, machine.feedrate.min, machine.feedrate.max
            ));
        }
        if !machine.spindle.contains(feeds.spindle_rpm) {
            warnings.push(format!(
                "Spindle speed {} rpm is outside the machine range {}..{}",
                feeds.spindle_rpm, machine.spindle.min, machine.spindle.max
            ));
        }
        let axes = self.params.strategy.machine_axes.count();
        if axes > machine.axis_count() {
            warnings.push(format!(
                "Operation uses {} axes but machine '{}' has {}",
                axes,
                machine.name,
                machine.axis_count()
            ));
        }

        let material = &self.params.material;
        if !material.from_model {
            let far = [
                material.origin[0] + material.size[0],
                material.origin[1] + material.size[1],
                material.origin[2] + material.size[2],
            ];
            if !(machine.within_working_area(material.origin) && machine.within_working_area(far)) {
                warnings.push(format!(
                    "Stock at {:?} sized {:?} does not fit the working area {:?}",
                    material.origin, material.size, machine.working_area
                ));
            }
        }
        warnings
    }

    /// Lower a tag once its artifact has been regenerated
    pub fn clear_tag(&mut self, tag: Tag) {
        debug!("Operation '{}' clearing {} tag", self.name, tag);
        self.tags.clear(tag);
    }
}
