//! The operation collection of one CAM session
//!
//! [`CamSession`] owns the operations, the chains that reference them and
//! the orientation registry. Every method that needs the scene takes a
//! [`GeometryResolver`] argument; the session never looks anything up on
//! its own.

use crate::chain::{Chain, Direction};
use crate::compute::{ComputeOutcome, ComputeState};
use crate::error::{OperationError, OperationResult};
use crate::fields::{EditContext, EditReport, FieldEdit};
use crate::geometry_source::GeometrySource;
use crate::operation::Operation;
use crate::orientation::OrientationRegistry;
use crate::tags::Tag;
use camkit_core::GeometryResolver;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Return `base`, or `base.001`, `base.002`, ... if it is taken
///
/// An existing three digit suffix on `base` is replaced, not extended.
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }

    let stem = match base.rsplit_once('.') {
        Some((stem, suffix)) if suffix.len() == 3 && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            stem
        }
        _ => base,
    };

    let mut counter = 1u32;
    loop {
        let candidate = format!("{}.{:03}", stem, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn non_empty(name: &str) -> OperationResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        Err(OperationError::EmptyName)
    } else {
        Ok(name)
    }
}

/// Operations, chains and orientation objects of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CamSession {
    operations: Vec<Operation>,
    chains: Vec<Chain>,
    orientations: OrientationRegistry,
    active_operation: Option<usize>,
    active_chain: Option<usize>,
    /// Allow experimental strategies to be selected
    experimental: bool,
}

impl CamSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_experimental(experimental: bool) -> Self {
        Self {
            experimental,
            ..Default::default()
        }
    }

    pub fn experimental(&self) -> bool {
        self.experimental
    }

    /// Operations already using an experimental strategy keep it
    pub fn set_experimental(&mut self, experimental: bool) {
        self.experimental = experimental;
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn orientations(&self) -> &OrientationRegistry {
        &self.orientations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn index_of(&self, name: &str) -> OperationResult<usize> {
        self.operations
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| OperationError::UnknownOperation(name.to_string()))
    }

    fn chain_index(&self, name: &str) -> OperationResult<usize> {
        self.chains
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| OperationError::UnknownChain(name.to_string()))
    }

    fn operation_name_taken(&self, name: &str) -> bool {
        self.operations.iter().any(|o| o.name == name)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|o| o.name == name)
    }

    pub fn active_operation(&self) -> Option<&Operation> {
        self.active_operation.and_then(|i| self.operations.get(i))
    }

    pub fn set_active_operation(&mut self, name: &str) -> OperationResult<()> {
        self.active_operation = Some(self.index_of(name)?);
        Ok(())
    }

    /// Add a new operation with default parameters
    ///
    /// The name is made unique and the operation is validated against the
    /// scene before it becomes the active operation.
    pub fn add_operation(
        &mut self,
        name: &str,
        source: GeometrySource,
        resolver: &dyn GeometryResolver,
    ) -> OperationResult<&Operation> {
        let name = unique_name(non_empty(name)?, |n| self.operation_name_taken(n));
        let mut op = Operation::new(name, source);
        op.revalidate(resolver);
        op.reconcile_strategy(&mut self.orientations);

        info!(
            "Added operation '{}' on {} (valid: {})",
            op.name,
            op.geometry_source(),
            op.valid
        );
        let index = self.operations.len();
        self.operations.push(op);
        self.active_operation = Some(index);
        Ok(&self.operations[index])
    }

    /// Remove an operation along with its chain references and orientation object
    pub fn remove_operation(&mut self, name: &str) -> OperationResult<Operation> {
        let index = self.index_of(name)?;
        let op = self.operations.remove(index);
        self.orientations.remove(name);

        for chain in &mut self.chains {
            let removed = chain.remove_references(name);
            if removed > 0 {
                debug!(
                    "Removed {} reference(s) to '{}' from chain '{}'",
                    removed, name, chain.name
                );
            }
        }
        self.revalidate_chains();

        self.active_operation = match self.active_operation {
            _ if self.operations.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.operations.len() - 1)),
            None => None,
        };

        info!("Removed operation '{}'", name);
        Ok(op)
    }

    /// Copy an operation as `<name>_copy`, placed right after the original
    ///
    /// The copy starts idle with every tag raised and `changed` set.
    pub fn duplicate_operation(&mut self, name: &str) -> OperationResult<&Operation> {
        let index = self.index_of(name)?;
        let new_name = unique_name(&format!("{}_copy", name), |n| self.operation_name_taken(n));

        let mut copy = self.operations[index].clone();
        copy.set_name(new_name.clone());
        copy.params.filename = new_name.clone();
        copy.compute = ComputeState::Idle;
        copy.stats = None;
        copy.invalidate_artifacts();
        if copy.uses_orientation() {
            self.orientations.ensure(&new_name);
        }

        info!("Duplicated operation '{}' as '{}'", name, new_name);
        self.operations.insert(index + 1, copy);
        self.active_operation = Some(index + 1);
        Ok(&self.operations[index + 1])
    }

    /// Rename an operation, following it in chains and the orientation registry
    pub fn rename_operation(&mut self, old: &str, new: &str) -> OperationResult<()> {
        let new = non_empty(new)?;
        let index = self.index_of(old)?;
        if old == new {
            return Ok(());
        }
        if self.operation_name_taken(new) {
            return Err(OperationError::DuplicateName(new.to_string()));
        }

        self.operations[index].set_name(new.to_string());
        for chain in &mut self.chains {
            chain.rename_references(old, new);
        }
        self.orientations.rename(old, new);
        info!("Renamed operation '{}' to '{}'", old, new);
        Ok(())
    }

    /// Move an operation one place up or down, returning its new index
    pub fn move_operation(&mut self, name: &str, direction: Direction) -> OperationResult<usize> {
        let index = self.index_of(name)?;
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.operations.len() => index + 1,
            _ => return Ok(index),
        };
        self.operations.swap(index, target);
        if self.active_operation == Some(index) {
            self.active_operation = Some(target);
        } else if self.active_operation == Some(target) {
            self.active_operation = Some(index);
        }
        Ok(target)
    }

    /// Edit one field of an operation
    pub fn edit_operation(
        &mut self,
        name: &str,
        edit: FieldEdit,
        resolver: &dyn GeometryResolver,
    ) -> OperationResult<EditReport> {
        let index = self.index_of(name)?;
        let op = &mut self.operations[index];
        let was_valid = op.valid;

        let mut ctx = EditContext {
            resolver,
            orientations: &mut self.orientations,
            experimental: self.experimental,
        };
        let report = op.apply(edit, &mut ctx)?;

        if report.valid != was_valid {
            self.revalidate_chains();
        }
        Ok(report)
    }

    pub fn clear_tag(&mut self, name: &str, tag: Tag) -> OperationResult<()> {
        let index = self.index_of(name)?;
        self.operations[index].clear_tag(tag);
        Ok(())
    }

    pub fn begin_computing(&mut self, name: &str, pid: u32) -> OperationResult<()> {
        let index = self.index_of(name)?;
        self.operations[index].begin_computing(pid)
    }

    pub fn end_computing(&mut self, name: &str, outcome: ComputeOutcome) -> OperationResult<bool> {
        let index = self.index_of(name)?;
        Ok(self.operations[index].end_computing(outcome))
    }

    /// Recheck every operation against the scene, returning how many are invalid
    pub fn revalidate_all(&mut self, resolver: &dyn GeometryResolver) -> usize {
        let invalid = self
            .operations
            .iter_mut()
            .map(|op| op.revalidate(resolver))
            .filter(|valid| !valid)
            .count();
        self.revalidate_chains();
        debug!(
            "Revalidated {} operations, {} invalid",
            self.operations.len(),
            invalid
        );
        invalid
    }

    /// Rebuild the derived values of every operation after a load
    pub(crate) fn restore_derived(&mut self) {
        for op in &mut self.operations {
            op.restore_derived();
        }
    }

    /// Reset computations left over from a previous session
    ///
    /// Run once at session start. Recorded processes are presumed dead and
    /// are not contacted. Returns the number of operations and chains reset.
    pub fn reset_all_computing_flags(&mut self) -> usize {
        let operations = self
            .operations
            .iter_mut()
            .filter_map(|op| op.reset_stale_computation())
            .count();
        let chains = self
            .chains
            .iter_mut()
            .map(|chain| chain.reset_stale_computation())
            .filter(|reset| *reset)
            .count();

        if operations + chains > 0 {
            info!(
                "Recovered {} operation(s) and {} chain(s) from interrupted computations",
                operations, chains
            );
        }
        operations + chains
    }

    pub fn chain(&self, name: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.name == name)
    }

    pub fn chain_mut(&mut self, name: &str) -> Option<&mut Chain> {
        self.chains.iter_mut().find(|c| c.name == name)
    }

    pub fn active_chain(&self) -> Option<&Chain> {
        self.active_chain.and_then(|i| self.chains.get(i))
    }

    pub fn add_chain(&mut self, name: &str) -> OperationResult<&Chain> {
        let name = unique_name(non_empty(name)?, |n| self.chains.iter().any(|c| c.name == n));
        info!("Added chain '{}'", name);
        let index = self.chains.len();
        self.chains.push(Chain::new(name));
        self.active_chain = Some(index);
        Ok(&self.chains[index])
    }

    pub fn remove_chain(&mut self, name: &str) -> OperationResult<Chain> {
        let index = self.chain_index(name)?;
        let chain = self.chains.remove(index);
        self.active_chain = match self.active_chain {
            _ if self.chains.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.chains.len() - 1)),
            None => None,
        };
        info!("Removed chain '{}'", name);
        Ok(chain)
    }

    /// Append an operation reference to a chain
    pub fn add_to_chain(&mut self, chain: &str, operation: &str) -> OperationResult<()> {
        self.index_of(operation)?;
        let index = self.chain_index(chain)?;
        self.chains[index].push(operation);
        self.revalidate_chains();
        Ok(())
    }

    /// Drop the reference at `position` from a chain
    pub fn remove_from_chain(
        &mut self,
        chain: &str,
        position: usize,
    ) -> OperationResult<Option<String>> {
        let index = self.chain_index(chain)?;
        let removed = self.chains[index].remove_at(position);
        self.revalidate_chains();
        Ok(removed)
    }

    pub fn move_in_chain(
        &mut self,
        chain: &str,
        position: usize,
        direction: Direction,
    ) -> OperationResult<usize> {
        let index = self.chain_index(chain)?;
        Ok(self.chains[index].move_reference(position, direction))
    }

    /// Recompute chain validity from the current operations
    ///
    /// A chain is valid when it is not empty and every reference names an
    /// existing, valid operation.
    pub fn revalidate_chains(&mut self) {
        let operations = &self.operations;
        for chain in &mut self.chains {
            chain.valid = !chain.operations.is_empty()
                && chain.operations.iter().all(|name| {
                    operations
                        .iter()
                        .any(|op| op.name == *name && op.valid)
                });
        }
    }

    /// The operations of a chain in export order
    ///
    /// Refused when the chain or any member is invalid.
    pub fn chain_operations(&self, chain: &str) -> OperationResult<Vec<&Operation>> {
        let index = self.chain_index(chain)?;
        let chain = &self.chains[index];
        if !chain.valid {
            return Err(OperationError::Invalid {
                name: chain.name.clone(),
                reason: "chain is empty or references invalid operations".to_string(),
            });
        }

        chain
            .operations
            .iter()
            .map(|name| -> OperationResult<&Operation> {
                let op = self
                    .operation(name)
                    .ok_or_else(|| OperationError::UnknownOperation(name.clone()))?;
                op.ensure_exportable()?;
                Ok(op)
            })
            .collect()
    }

    pub fn begin_chain_computing(&mut self, chain: &str) -> OperationResult<()> {
        let index = self.chain_index(chain)?;
        self.chains[index].begin_computing()
    }

    pub fn end_chain_computing(&mut self, chain: &str) -> OperationResult<bool> {
        let index = self.chain_index(chain)?;
        Ok(self.chains[index].end_computing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name() {
        let taken = ["Op", "Op.001", "Op.002"];
        let is_taken = |n: &str| taken.contains(&n);
        assert_eq!(unique_name("New", is_taken), "New");
        assert_eq!(unique_name("Op", is_taken), "Op.003");
        assert_eq!(unique_name("Op.001", is_taken), "Op.003");
        assert_eq!(unique_name("v1.5", |n| n == "v1.5"), "v1.5.001");
    }

    #[test]
    fn test_empty_names_rejected() {
        let mut session = CamSession::new();
        let scene = camkit_core::SceneIndex::new();
        assert!(matches!(
            session.add_operation("  ", GeometrySource::default(), &scene),
            Err(OperationError::EmptyName)
        ));
        assert!(matches!(session.add_chain(""), Err(OperationError::EmptyName)));
    }
}
