//! Geometry resolution
//!
//! Operations reference their geometry by name. The host application owns
//! the actual meshes, curves and images; the data model only needs to ask
//! whether a name currently resolves. [`GeometryResolver`] is that seam, and
//! [`SceneIndex`] is a plain in-memory inventory implementing it.

use crate::error::{Error, Result, SceneError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Kind of entity a geometry source can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A single mesh, curve or text object
    Object,
    /// A named group of objects
    Group,
    /// A loaded height-map image
    Image,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Group => write!(f, "group"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Resolves geometry source names against the host scene
pub trait GeometryResolver {
    /// Whether an entity of `kind` named `name` currently exists
    fn exists(&self, kind: EntityKind, name: &str) -> bool;

    /// Number of members of the named group, 0 when the group is missing
    fn member_count(&self, group: &str) -> usize;
}

impl<T: GeometryResolver + ?Sized> GeometryResolver for &T {
    fn exists(&self, kind: EntityKind, name: &str) -> bool {
        (**self).exists(kind, name)
    }

    fn member_count(&self, group: &str) -> usize {
        (**self).member_count(group)
    }
}

/// In-memory scene inventory
///
/// Holds only names: objects, groups with their member object names, and
/// images. Serializable so an inventory snapshot can be handed to the
/// command-line tools as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneIndex {
    objects: BTreeSet<String>,
    groups: BTreeMap<String, Vec<String>>,
    images: BTreeSet<String>,
}

impl SceneIndex {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object
    pub fn add_object(&mut self, name: impl Into<String>) -> Result<()> {
        let name = non_empty(EntityKind::Object, name.into())?;
        if !self.objects.insert(name.clone()) {
            return Err(duplicate(EntityKind::Object, name));
        }
        Ok(())
    }

    /// Register a group with its member object names
    pub fn add_group<I, S>(&mut self, name: impl Into<String>, members: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = non_empty(EntityKind::Group, name.into())?;
        if self.groups.contains_key(&name) {
            return Err(duplicate(EntityKind::Group, name));
        }
        let members = members.into_iter().map(Into::into).collect();
        self.groups.insert(name, members);
        Ok(())
    }

    /// Register an image
    pub fn add_image(&mut self, name: impl Into<String>) -> Result<()> {
        let name = non_empty(EntityKind::Image, name.into())?;
        if !self.images.insert(name.clone()) {
            return Err(duplicate(EntityKind::Image, name));
        }
        Ok(())
    }

    /// Remove an entity. Returns true if it was present.
    pub fn remove(&mut self, kind: EntityKind, name: &str) -> bool {
        let removed = match kind {
            EntityKind::Object => self.objects.remove(name),
            EntityKind::Group => self.groups.remove(name).is_some(),
            EntityKind::Image => self.images.remove(name),
        };
        if removed {
            tracing::debug!("Removed {} '{}' from scene index", kind, name);
        }
        removed
    }

    /// Total number of registered entities
    pub fn len(&self) -> usize {
        self.objects.len() + self.groups.len() + self.images.len()
    }

    /// Check if the inventory is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load an inventory snapshot from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let index: Self = serde_json::from_str(&content).map_err(|e| {
            Error::from(SceneError::InvalidInventory {
                reason: e.to_string(),
            })
        })?;
        tracing::debug!(
            "Loaded scene index from {}: {} entities",
            path.display(),
            index.len()
        );
        Ok(index)
    }
}

impl GeometryResolver for SceneIndex {
    fn exists(&self, kind: EntityKind, name: &str) -> bool {
        match kind {
            EntityKind::Object => self.objects.contains(name),
            EntityKind::Group => self.groups.contains_key(name),
            EntityKind::Image => self.images.contains(name),
        }
    }

    fn member_count(&self, group: &str) -> usize {
        self.groups.get(group).map_or(0, Vec::len)
    }
}

fn non_empty(kind: EntityKind, name: String) -> Result<String> {
    if name.trim().is_empty() {
        return Err(SceneError::EmptyName {
            kind: kind.to_string(),
        }
        .into());
    }
    Ok(name)
}

fn duplicate(kind: EntityKind, name: String) -> Error {
    SceneError::DuplicateEntity {
        kind: kind.to_string(),
        name,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_registered_entities() {
        let mut scene = SceneIndex::new();
        scene.add_object("Cube").unwrap();
        scene.add_group("Parts", ["Cube"]).unwrap();
        scene.add_image("heightmap.png").unwrap();

        assert!(scene.exists(EntityKind::Object, "Cube"));
        assert!(scene.exists(EntityKind::Group, "Parts"));
        assert!(scene.exists(EntityKind::Image, "heightmap.png"));
        assert!(!scene.exists(EntityKind::Object, "Parts"));
        assert_eq!(scene.member_count("Parts"), 1);
        assert_eq!(scene.member_count("Missing"), 0);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_rejects_duplicates_and_empty_names() {
        let mut scene = SceneIndex::new();
        scene.add_object("Cube").unwrap();
        assert!(scene.add_object("Cube").unwrap_err().is_scene_error());
        assert!(scene.add_image("  ").is_err());
        assert!(scene.add_group("", Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_remove() {
        let mut scene = SceneIndex::new();
        scene.add_group("Empty", Vec::<String>::new()).unwrap();
        assert!(scene.exists(EntityKind::Group, "Empty"));
        assert_eq!(scene.member_count("Empty"), 0);
        assert!(scene.remove(EntityKind::Group, "Empty"));
        assert!(!scene.remove(EntityKind::Group, "Empty"));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_resolver_through_reference() {
        fn count<R: GeometryResolver>(resolver: R) -> usize {
            resolver.member_count("Parts")
        }
        let mut scene = SceneIndex::new();
        scene.add_group("Parts", ["A", "B"]).unwrap();
        assert_eq!(count(&scene), 2);
    }
}
