//! Chains of operations exported as one job
//!
//! A chain references operations by name; it owns none of them. Its
//! `valid` and `computing` flags are independent of its members' flags and
//! are maintained by the session.

use crate::error::{OperationError, OperationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Direction of a reorder step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Ordered operation references exported together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chain {
    pub(crate) name: String,
    pub filename: String,
    pub(crate) operations: Vec<String>,
    pub(crate) valid: bool,
    pub(crate) computing: bool,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new("Chain")
    }
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            filename: name.clone(),
            name,
            operations: Vec::new(),
            valid: false,
            computing: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced operation names in export order
    pub fn operations(&self) -> &[String] {
        &self.operations
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_computing(&self) -> bool {
        self.computing
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.iter().any(|o| o == operation)
    }

    pub(crate) fn push(&mut self, operation: &str) {
        self.operations.push(operation.to_string());
    }

    /// Drop the reference at `index`
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.operations.len() {
            Some(self.operations.remove(index))
        } else {
            None
        }
    }

    /// Drop every reference to `operation`, returning how many there were
    pub(crate) fn remove_references(&mut self, operation: &str) -> usize {
        let before = self.operations.len();
        self.operations.retain(|o| o != operation);
        before - self.operations.len()
    }

    pub(crate) fn rename_references(&mut self, old: &str, new: &str) {
        for reference in self.operations.iter_mut().filter(|o| *o == old) {
            *reference = new.to_string();
        }
    }

    /// Swap the reference at `index` with its neighbour
    ///
    /// Returns the new index; references at either end stay where they are.
    pub(crate) fn move_reference(&mut self, index: usize, direction: Direction) -> usize {
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.operations.len() => index + 1,
            _ => return index,
        };
        self.operations.swap(index, target);
        target
    }

    /// Record a dispatched export computation
    pub fn begin_computing(&mut self) -> OperationResult<()> {
        if !self.valid {
            return Err(OperationError::Invalid {
                name: self.name.clone(),
                reason: "chain is empty or references invalid operations".to_string(),
            });
        }
        if self.computing {
            return Err(OperationError::ChainComputing(self.name.clone()));
        }
        debug!("Chain '{}' computing", self.name);
        self.computing = true;
        Ok(())
    }

    pub fn end_computing(&mut self) -> bool {
        std::mem::replace(&mut self.computing, false)
    }

    pub(crate) fn reset_stale_computation(&mut self) -> bool {
        if self.computing {
            warn!("Resetting stale computation of chain '{}'", self.name);
            self.computing = false;
            true
        } else {
            false
        }
    }
}
