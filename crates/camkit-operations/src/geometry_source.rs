use camkit_core::EntityKind;
use serde::{Deserialize, Serialize};

/// The scene entity an operation machines, referenced by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeometrySource {
    Object(String),
    /// Valid only while the group has at least one member
    Group(String),
    /// Height map; exact mode is never used with images
    Image(String),
}

impl GeometrySource {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Object(_) => EntityKind::Object,
            Self::Group(_) => EntityKind::Group,
            Self::Image(_) => EntityKind::Image,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Object(name) | Self::Group(name) | Self::Image(name) => name,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

impl Default for GeometrySource {
    fn default() -> Self {
        Self::Object(String::new())
    }
}

impl std::fmt::Display for GeometrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_name() {
        let source = GeometrySource::Group("Parts".to_string());
        assert_eq!(source.kind(), EntityKind::Group);
        assert_eq!(source.name(), "Parts");
        assert!(!source.is_image());
        assert_eq!(source.to_string(), "group 'Parts'");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&GeometrySource::Image("height".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"IMAGE","name":"height"}"#);
    }
}
