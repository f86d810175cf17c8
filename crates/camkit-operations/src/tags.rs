//! Dirty tags for cached derived artifacts.
//!
//! Each expensive artifact an operation depends on has one tag. Edits only
//! ever raise tags; the generator that consumes an artifact clears its tag
//! once it has produced a fresh one.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A cached artifact that can go stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    /// Height image used for surface sampling
    Zbuffer,
    /// Offset image used for roughing collision avoidance
    Offset,
    /// Silhouette polygon
    Silhouette,
    /// Ambient area polygon
    Ambient,
    /// Collision world
    Collision,
}

impl Tag {
    pub fn all() -> &'static [Tag] {
        &[
            Tag::Zbuffer,
            Tag::Offset,
            Tag::Silhouette,
            Tag::Ambient,
            Tag::Collision,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Zbuffer => "zbuffer",
            Self::Offset => "offset",
            Self::Silhouette => "silhouette",
            Self::Ambient => "ambient",
            Self::Collision => "collision",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tag: {}", s))
    }
}

/// Stale flags of an operation's artifacts
///
/// Every tag starts raised: a new operation has no artifacts yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirtyTags {
    pub zbuffer: bool,
    pub offset: bool,
    pub silhouette: bool,
    pub ambient: bool,
    pub collision: bool,
}

impl Default for DirtyTags {
    fn default() -> Self {
        Self {
            zbuffer: true,
            offset: true,
            silhouette: true,
            ambient: true,
            collision: true,
        }
    }
}

impl DirtyTags {
    /// All tags lowered
    pub fn clean() -> Self {
        Self {
            zbuffer: false,
            offset: false,
            silhouette: false,
            ambient: false,
            collision: false,
        }
    }

    fn slot(&mut self, tag: Tag) -> &mut bool {
        match tag {
            Tag::Zbuffer => &mut self.zbuffer,
            Tag::Offset => &mut self.offset,
            Tag::Silhouette => &mut self.silhouette,
            Tag::Ambient => &mut self.ambient,
            Tag::Collision => &mut self.collision,
        }
    }

    pub fn is_set(&self, tag: Tag) -> bool {
        match tag {
            Tag::Zbuffer => self.zbuffer,
            Tag::Offset => self.offset,
            Tag::Silhouette => self.silhouette,
            Tag::Ambient => self.ambient,
            Tag::Collision => self.collision,
        }
    }

    /// Raise a tag. Never touches any other tag.
    pub fn raise(&mut self, tag: Tag) {
        *self.slot(tag) = true;
    }

    pub fn raise_all(&mut self) {
        *self = Self::default();
    }

    /// Lower a tag after its artifact was regenerated
    pub fn clear(&mut self, tag: Tag) {
        *self.slot(tag) = false;
    }

    /// Tags currently raised, in declaration order
    pub fn raised(&self) -> Vec<Tag> {
        Tag::all()
            .iter()
            .copied()
            .filter(|t| self.is_set(*t))
            .collect()
    }
}
