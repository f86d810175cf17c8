//! Derived-value synchronizer
//!
//! Keeps the stepover and plunge feedrate pairs consistent and recomputes
//! chipload. A write to one side of a pair computes the other side and
//! overwrites it only when the difference exceeds [`SYNC_EPSILON`]; writing
//! the computed side never fires the inverse computation, so the pair cannot
//! oscillate on floating point round-off.

use crate::error::{OperationError, OperationResult};
use crate::operation::Operation;
use tracing::{debug, warn};

/// Smallest difference that overwrites the dependent side of a pair
pub const SYNC_EPSILON: f64 = 1e-6;

/// Smallest cutter diameter accepted, meters
pub const MIN_CUTTER_DIAMETER: f64 = 0.000001;
/// Smallest feedrate accepted, meters per minute
pub const MIN_FEEDRATE: f64 = 0.00005;
/// Slowest spindle speed accepted, rpm
pub const MIN_SPINDLE_RPM: f64 = 100.0;

fn raise_to(value: f64, min: f64) -> f64 {
    if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

/// Overwrite `slot` with `value` when they differ by more than the epsilon
fn overwrite_if_changed(slot: &mut f64, value: f64) -> bool {
    if (value - *slot).abs() > SYNC_EPSILON {
        *slot = value;
        true
    } else {
        false
    }
}

impl Operation {
    fn check_finite(&self, field: &str, value: f64) -> OperationResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(OperationError::NonFiniteValue {
                operation: self.name.clone(),
                field: field.to_string(),
            })
        }
    }

    /// Set the stepover percentage and derive the distance between paths
    ///
    /// Returns whether the distance was overwritten (and `changed` set).
    pub fn set_stepover_percent(&mut self, pct: f64) -> OperationResult<bool> {
        self.check_finite("stepover_perc", pct)?;
        self.params.steps.stepover_perc = pct;
        Ok(self.update_stepover_distance())
    }

    /// Set the distance between paths and derive the stepover percentage
    pub fn set_stepover_distance(&mut self, dist: f64) -> OperationResult<bool> {
        self.check_finite("dist_between_paths", dist)?;
        self.params.steps.dist_between_paths = dist;
        Ok(self.update_stepover_percent())
    }

    /// Set the plunge feedrate percentage and derive the plunge feedrate
    pub fn set_plunge_percent(&mut self, pct: f64) -> OperationResult<bool> {
        self.check_finite("plunge_feedrate_perc", pct)?;
        self.params.feeds.plunge_feedrate_perc = pct;
        let changed = self.update_plunge_value();
        self.recompute_chipload();
        Ok(changed)
    }

    /// Set the plunge feedrate and derive its percentage of the feedrate
    pub fn set_plunge_value(&mut self, val: f64) -> OperationResult<bool> {
        self.check_finite("plunge_feedrate_val", val)?;
        self.params.feeds.plunge_feedrate_val = val;
        let changed = self.update_plunge_percent();
        self.recompute_chipload();
        Ok(changed)
    }

    /// `chipload = feedrate / (spindle_rpm * flutes)`
    pub fn recompute_chipload(&mut self) {
        let feeds = &self.params.feeds;
        let flutes = self.params.cutter.flutes.max(1);
        let rpm = feeds.spindle_rpm.max(MIN_SPINDLE_RPM);
        self.chipload = feeds.feedrate / (rpm * f64::from(flutes));
        debug!("Operation '{}' chipload {:.8}", self.name, self.chipload);
    }

    /// Raise primary inputs below the arithmetic minimums
    ///
    /// Returns whether anything was raised. Non-finite values end up at
    /// the minimum too.
    pub(crate) fn enforce_minimums(&mut self) -> bool {
        let cutter = &mut self.params.cutter;
        let feeds = &mut self.params.feeds;
        let before = (cutter.diameter, cutter.flutes, feeds.feedrate, feeds.spindle_rpm);

        cutter.diameter = raise_to(cutter.diameter, MIN_CUTTER_DIAMETER);
        cutter.flutes = cutter.flutes.max(1);
        feeds.feedrate = raise_to(feeds.feedrate, MIN_FEEDRATE);
        feeds.spindle_rpm = raise_to(feeds.spindle_rpm, MIN_SPINDLE_RPM);

        let after = (cutter.diameter, cutter.flutes, feeds.feedrate, feeds.spindle_rpm);
        let raised = before != after;
        if raised {
            warn!(
                "Operation '{}': raised cutter/feed inputs {:?} to {:?}",
                self.name, before, after
            );
        }
        raised
    }

    /// Rebuild an operation read from disk
    ///
    /// Stored derived values are not trusted: the percentages are primary,
    /// so the distance between paths, the plunge feedrate and the chipload
    /// are recomputed from them.
    pub(crate) fn restore_derived(&mut self) {
        self.enforce_minimums();
        let stored = (
            self.params.steps.dist_between_paths,
            self.params.feeds.plunge_feedrate_val,
        );
        self.sync_derived();
        let synced = (
            self.params.steps.dist_between_paths,
            self.params.feeds.plunge_feedrate_val,
        );
        if (stored.0 - synced.0).abs() > SYNC_EPSILON || (stored.1 - synced.1).abs() > SYNC_EPSILON
        {
            debug!(
                "Operation '{}': stored derived values {:?} replaced by {:?}",
                self.name, stored, synced
            );
            self.changed = true;
        }
    }

    pub(crate) fn update_stepover_distance(&mut self) -> bool {
        let dist = self.params.steps.stepover_perc / 100.0 * self.params.cutter.diameter;
        let changed = overwrite_if_changed(&mut self.params.steps.dist_between_paths, dist);
        self.changed |= changed;
        changed
    }

    pub(crate) fn update_stepover_percent(&mut self) -> bool {
        let diameter = self.params.cutter.diameter.max(MIN_CUTTER_DIAMETER);
        let pct = self.params.steps.dist_between_paths / diameter * 100.0;
        let changed = overwrite_if_changed(&mut self.params.steps.stepover_perc, pct);
        self.changed |= changed;
        changed
    }

    pub(crate) fn update_plunge_value(&mut self) -> bool {
        let val = self.params.feeds.plunge_feedrate_perc * self.params.feeds.feedrate / 100.0;
        let changed = overwrite_if_changed(&mut self.params.feeds.plunge_feedrate_val, val);
        self.changed |= changed;
        changed
    }

    pub(crate) fn update_plunge_percent(&mut self) -> bool {
        let feedrate = self.params.feeds.feedrate.max(MIN_FEEDRATE);
        let pct = self.params.feeds.plunge_feedrate_val / feedrate * 100.0;
        let changed = overwrite_if_changed(&mut self.params.feeds.plunge_feedrate_perc, pct);
        self.changed |= changed;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stepover_scenario() {
        let mut op = Operation::default();
        assert!((op.params().steps.dist_between_paths - 0.0012).abs() < 1e-9);
        assert!(!op.is_changed());

        assert!(op.set_stepover_percent(50.0).unwrap());
        assert!((op.params().steps.dist_between_paths - 0.0015).abs() < 1e-9);
        assert!(op.is_changed());
    }

    #[test]
    fn test_stepover_below_epsilon_is_ignored() {
        let mut op = Operation::default();
        let before = op.params().steps.dist_between_paths;
        // 0.0012 -> 0.0012000003: below the epsilon
        assert!(!op.set_stepover_percent(40.00001).unwrap());
        assert_eq!(op.params().steps.dist_between_paths, before);
        assert_eq!(op.params().steps.stepover_perc, 40.00001);
        assert!(!op.is_changed());
    }

    #[test]
    fn test_stepover_distance_derives_percent() {
        let mut op = Operation::default();
        assert!(op.set_stepover_distance(0.0006).unwrap());
        assert!((op.params().steps.stepover_perc - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_plunge_pair() {
        let mut op = Operation::default();
        assert!(op.set_plunge_percent(25.0).unwrap());
        assert!((op.params().feeds.plunge_feedrate_val - 0.25).abs() < 1e-12);

        assert!(op.set_plunge_value(0.8).unwrap());
        assert!((op.params().feeds.plunge_feedrate_perc - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut op = Operation::default();
        assert!(matches!(
            op.set_stepover_percent(f64::NAN),
            Err(OperationError::NonFiniteValue { .. })
        ));
        assert_eq!(op.params().steps.stepover_perc, 40.0);
        assert!(op.set_plunge_value(f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_diameter_does_not_divide_by_zero() {
        let mut op = Operation::default();
        op.params.cutter.diameter = 0.0;
        op.set_stepover_distance(0.001).unwrap();
        assert!(op.params().steps.stepover_perc.is_finite());

        op.params.feeds.feedrate = 0.0;
        op.set_plunge_value(0.5).unwrap();
        assert!(op.params().feeds.plunge_feedrate_perc.is_finite());
    }

    #[test]
    fn test_enforce_minimums() {
        let mut op = Operation::default();
        assert!(!op.enforce_minimums());

        op.params.cutter.diameter = -1.0;
        op.params.cutter.flutes = 0;
        op.params.feeds.feedrate = f64::NAN;
        op.params.feeds.spindle_rpm = 0.0;
        assert!(op.enforce_minimums());
        assert_eq!(op.params().cutter.diameter, MIN_CUTTER_DIAMETER);
        assert_eq!(op.params().cutter.flutes, 1);
        assert_eq!(op.params().feeds.feedrate, MIN_FEEDRATE);
        assert_eq!(op.params().feeds.spindle_rpm, MIN_SPINDLE_RPM);
    }

    #[test]
    fn test_restore_derived_recomputes_from_percentages() {
        let mut op = Operation::default();
        op.params.cutter.diameter = 0.006;
        op.params.feeds.feedrate = 2.0;
        op.restore_derived();
        assert!((op.params().steps.dist_between_paths - 0.0024).abs() < 1e-12);
        assert!((op.params().feeds.plunge_feedrate_val - 1.0).abs() < 1e-12);
        assert!(op.is_changed());
    }

    #[test]
    fn test_chipload() {
        let mut op = Operation::default();
        op.params.feeds.feedrate = 2.4;
        op.params.feeds.spindle_rpm = 24000.0;
        op.params.cutter.flutes = 4;
        op.recompute_chipload();
        assert!((op.chipload() - 0.000025).abs() < 1e-15);
    }
}
