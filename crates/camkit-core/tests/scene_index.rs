use camkit_core::{EntityKind, GeometryResolver, SceneIndex};
use std::io::Write;

#[test]
fn test_load_scene_index_from_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "objects": ["Cube", "Suzanne"],
            "groups": {{ "Parts": ["Cube", "Suzanne"], "Empty": [] }},
            "images": ["relief.png"]
        }}"#
    )
    .unwrap();

    let scene = SceneIndex::load_from_file(file.path()).unwrap();
    assert!(scene.exists(EntityKind::Object, "Suzanne"));
    assert_eq!(scene.member_count("Parts"), 2);
    assert_eq!(scene.member_count("Empty"), 0);
    assert!(scene.exists(EntityKind::Image, "relief.png"));
}

#[test]
fn test_missing_sections_default_to_empty() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "images": ["a.png"] }}"#).unwrap();

    let scene = SceneIndex::load_from_file(file.path()).unwrap();
    assert_eq!(scene.len(), 1);
    assert!(!scene.exists(EntityKind::Object, "a.png"));
}

#[test]
fn test_invalid_inventory_is_scene_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = SceneIndex::load_from_file(file.path()).unwrap_err();
    assert!(err.is_scene_error());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SceneIndex::load_from_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(err.is_io_error());
}
