//! Orientation objects of indexed multi-axis operations
//!
//! A 5-axis (or 4-axis indexed) operation machines the part from a rotated
//! frame described by an auxiliary orientation object. The registry tracks
//! which operations own one; the host creates and deletes the actual scene
//! objects from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the orientation object owned by `operation`
pub fn orientation_object_name(operation: &str) -> String {
    format!("{} orientation", operation)
}

/// Orientation objects keyed by owning operation name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationRegistry {
    objects: BTreeMap<String, String>,
}

impl OrientationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `operation` owns an orientation object, returning its name
    pub fn ensure(&mut self, operation: &str) -> &str {
        self.objects
            .entry(operation.to_string())
            .or_insert_with(|| {
                let name = orientation_object_name(operation);
                debug!("Adding orientation object '{}'", name);
                name
            })
    }

    /// Drop the orientation object of `operation`
    pub fn remove(&mut self, operation: &str) -> Option<String> {
        let removed = self.objects.remove(operation);
        if let Some(name) = &removed {
            debug!("Removing orientation object '{}'", name);
        }
        removed
    }

    /// Move ownership to a renamed operation
    ///
    /// The object is renamed along with its owner.
    pub fn rename(&mut self, old: &str, new: &str) {
        if self.objects.remove(old).is_some() {
            self.objects
                .insert(new.to_string(), orientation_object_name(new));
        }
    }

    pub fn get(&self, operation: &str) -> Option<&str> {
        self.objects.get(operation).map(String::as_str)
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.objects.contains_key(operation)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
