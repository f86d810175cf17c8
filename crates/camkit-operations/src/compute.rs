//! Background computation guard
//!
//! Toolpath computation runs outside the data model. The guard only records
//! whether a computation is believed to be in flight so a second one is not
//! dispatched for the same operation. It never signals, kills or joins the
//! recorded process.

use crate::error::{OperationError, OperationResult};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Computation state of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ComputeState {
    Idle,
    Computing { pid: u32 },
}

impl Default for ComputeState {
    fn default() -> Self {
        Self::Idle
    }
}

impl ComputeState {
    pub fn is_computing(&self) -> bool {
        matches!(self, Self::Computing { .. })
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Computing { pid } => Some(*pid),
        }
    }
}

/// Results reported by a completed computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStats {
    /// Estimated machining time, minutes
    pub duration: f64,
    /// Deepest cut of the toolpath, meters
    pub max_cutdepth: f64,
}

/// How a computation ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComputeOutcome {
    Completed(PathStats),
    Cancelled,
}

impl Operation {
    pub fn is_computing(&self) -> bool {
        self.compute.is_computing()
    }

    pub fn pid(&self) -> Option<u32> {
        self.compute.pid()
    }

    /// Record that a background computation was dispatched as `pid`
    ///
    /// Refused while the operation is invalid or already computing.
    pub fn begin_computing(&mut self, pid: u32) -> OperationResult<()> {
        if let ComputeState::Computing { pid: running } = self.compute {
            return Err(OperationError::AlreadyComputing {
                name: self.name.clone(),
                pid: running,
            });
        }
        self.ensure_exportable()?;

        debug!("Operation '{}' computing in process {}", self.name, pid);
        self.compute = ComputeState::Computing { pid };
        Ok(())
    }

    /// Record the end of the computation
    ///
    /// Returns false when no computation was recorded. A completed run
    /// stores its statistics and clears `changed`; a cancelled run leaves
    /// `changed` as it was.
    pub fn end_computing(&mut self, outcome: ComputeOutcome) -> bool {
        let Some(pid) = self.compute.pid() else {
            debug!("Operation '{}' was not computing", self.name);
            return false;
        };
        self.compute = ComputeState::Idle;

        match outcome {
            ComputeOutcome::Completed(stats) => {
                debug!(
                    "Operation '{}' finished in process {}: {:.2} min, max depth {:.4} m",
                    self.name, pid, stats.duration, stats.max_cutdepth
                );
                self.stats = Some(stats);
                self.changed = false;
            }
            ComputeOutcome::Cancelled => {
                debug!("Operation '{}' cancelled in process {}", self.name, pid);
            }
        }
        true
    }

    /// Drop a computation left over from a previous session
    ///
    /// Returns the stale pid, if there was one.
    pub(crate) fn reset_stale_computation(&mut self) -> Option<u32> {
        let pid = self.compute.pid()?;
        warn!(
            "Resetting stale computation of operation '{}' (pid {})",
            self.name, pid
        );
        self.compute = ComputeState::Idle;
        Some(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_source::GeometrySource;

    fn op() -> Operation {
        Operation::new("Op", GeometrySource::Object("Cube".to_string()))
    }

    #[test]
    fn test_begin_and_complete() {
        let mut op = op();
        op.changed = true;
        op.begin_computing(100).unwrap();
        assert_eq!(op.pid(), Some(100));

        let stats = PathStats {
            duration: 12.5,
            max_cutdepth: -0.004,
        };
        assert!(op.end_computing(ComputeOutcome::Completed(stats)));
        assert!(!op.is_computing());
        assert!(!op.is_changed());
        assert_eq!(op.stats(), Some(&stats));
    }

    #[test]
    fn test_cancel_keeps_changed() {
        let mut op = op();
        op.changed = true;
        op.begin_computing(7).unwrap();
        assert!(op.end_computing(ComputeOutcome::Cancelled));
        assert!(op.is_changed());
        assert!(op.stats().is_none());
    }

    #[test]
    fn test_second_dispatch_refused() {
        let mut op = op();
        op.begin_computing(1).unwrap();
        let err = op.begin_computing(2).unwrap_err();
        assert!(matches!(
            err,
            OperationError::AlreadyComputing { pid: 1, .. }
        ));
        assert_eq!(op.pid(), Some(1));
    }

    #[test]
    fn test_invalid_operation_refused() {
        let mut op = op();
        op.valid = false;
        assert!(matches!(
            op.begin_computing(1),
            Err(OperationError::Invalid { .. })
        ));
        assert!(!op.is_computing());
    }

    #[test]
    fn test_end_without_begin() {
        let mut op = op();
        assert!(!op.end_computing(ComputeOutcome::Cancelled));
    }

    #[test]
    fn test_reset_stale_computation() {
        let mut op = op();
        op.compute = ComputeState::Computing { pid: 999_999 };
        assert_eq!(op.reset_stale_computation(), Some(999_999));
        assert_eq!(op.compute_state(), ComputeState::Idle);
        assert_eq!(op.reset_stale_computation(), None);
    }

    #[test]
    fn test_compute_state_serde() {
        let json = serde_json::to_string(&ComputeState::Computing { pid: 12 }).unwrap();
        assert_eq!(json, r#"{"state":"computing","pid":12}"#);
        let idle: ComputeState = serde_json::from_str(r#"{"state":"idle"}"#).unwrap();
        assert_eq!(idle, ComputeState::Idle);
    }
}
