use camkit_core::SceneIndex;
use camkit_operations::{
    EditContext, FieldEdit, GeometrySource, Operation, OrientationRegistry, SYNC_EPSILON,
};
use proptest::prelude::*;

fn operation_with_diameter(diameter: f64) -> Operation {
    let mut scene = SceneIndex::new();
    scene.add_object("Part").unwrap();
    let mut orientations = OrientationRegistry::new();
    let mut op = Operation::new("Op", GeometrySource::Object("Part".to_string()));
    let mut ctx = EditContext {
        resolver: &scene,
        orientations: &mut orientations,
        experimental: false,
    };
    op.apply(FieldEdit::CutterDiameter(diameter), &mut ctx)
        .unwrap();
    op
}

proptest! {
    #[test]
    fn stepover_percent_sets_distance(diameter in 0.00001f64..10.0, pct in 0.0f64..=100.0) {
        let mut op = operation_with_diameter(diameter);
        op.set_stepover_percent(pct).unwrap();

        let expected = diameter * pct / 100.0;
        prop_assert!((op.params().steps.dist_between_paths - expected).abs() <= SYNC_EPSILON);
        prop_assert_eq!(op.params().steps.stepover_perc, pct);
    }

    #[test]
    fn stepover_distance_round_trips(diameter in 0.0001f64..10.0, dist in 0.00001f64..=32.0) {
        let mut op = operation_with_diameter(diameter);
        op.set_stepover_distance(dist).unwrap();

        let pct = op.params().steps.stepover_perc;
        op.set_stepover_percent(pct).unwrap();
        prop_assert!((op.params().steps.dist_between_paths - dist).abs() <= SYNC_EPSILON);
    }

    #[test]
    fn plunge_value_follows_feedrate(feedrate in 0.0001f64..50.0, pct in 0.1f64..=100.0) {
        let mut op = Operation::default();
        let mut scene = SceneIndex::new();
        scene.add_object("Part").unwrap();
        let mut orientations = OrientationRegistry::new();
        let mut ctx = EditContext {
            resolver: &scene,
            orientations: &mut orientations,
            experimental: false,
        };
        op.apply(FieldEdit::Feedrate(feedrate), &mut ctx).unwrap();
        op.set_plunge_percent(pct).unwrap();

        let expected = pct / 100.0 * feedrate;
        prop_assert!((op.params().feeds.plunge_feedrate_val - expected).abs() <= SYNC_EPSILON);
        prop_assert!(op.chipload().is_finite());
    }
}

#[test]
fn stepover_scenario() {
    let mut op = operation_with_diameter(0.003);
    assert!((op.params().steps.dist_between_paths - 0.0012).abs() < 1e-9);

    op.set_stepover_percent(50.0).unwrap();
    assert!((op.params().steps.dist_between_paths - 0.0015).abs() < 1e-9);
    assert!(op.is_changed());
}

#[test]
fn stepover_edits_through_apply() {
    let mut scene = SceneIndex::new();
    scene.add_object("Part").unwrap();
    let mut orientations = OrientationRegistry::new();
    let mut op = Operation::new("Op", GeometrySource::Object("Part".to_string()));
    let mut ctx = EditContext {
        resolver: &scene,
        orientations: &mut orientations,
        experimental: false,
    };

    let report = op
        .apply(FieldEdit::StepoverPercent(50.0), &mut ctx)
        .unwrap();
    assert!(report.changed);
    assert!(report.raised.is_empty());
    assert!((op.params().steps.dist_between_paths - 0.0015).abs() < 1e-9);

    let report = op
        .apply(FieldEdit::DistBetweenPaths(0.0015), &mut ctx)
        .unwrap();
    assert!(!report.changed);
    assert_eq!(op.params().steps.stepover_perc, 50.0);
}

#[test]
fn diameter_edit_updates_distance_and_chipload() {
    let op = operation_with_diameter(0.006);
    assert!((op.params().steps.dist_between_paths - 0.0024).abs() < 1e-9);
    assert!((op.chipload() - 1.0 / (12000.0 * 2.0)).abs() < 1e-15);
    assert!(op.is_changed());
}

#[test]
fn feedrate_edit_updates_plunge_and_chipload() {
    let mut scene = SceneIndex::new();
    scene.add_object("Part").unwrap();
    let mut orientations = OrientationRegistry::new();
    let mut op = Operation::new("Op", GeometrySource::Object("Part".to_string()));
    let mut ctx = EditContext {
        resolver: &scene,
        orientations: &mut orientations,
        experimental: false,
    };

    op.apply(FieldEdit::Feedrate(2.0), &mut ctx).unwrap();
    assert!((op.params().feeds.plunge_feedrate_val - 1.0).abs() < 1e-12);
    assert!((op.chipload() - 2.0 / (12000.0 * 2.0)).abs() < 1e-15);

    op.apply(FieldEdit::PlungeFeedrateValue(0.5), &mut ctx)
        .unwrap();
    assert!((op.params().feeds.plunge_feedrate_perc - 25.0).abs() < 1e-9);

    op.apply(FieldEdit::CutterFlutes(4), &mut ctx).unwrap();
    assert!((op.chipload() - 2.0 / (12000.0 * 4.0)).abs() < 1e-15);
}
