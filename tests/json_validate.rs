use kbdiagram::{Ease, LayoutConfig, PhaseKind, build};

#[test]
fn json_fixture_validates() {
    let s = include_str!("data/compact_layout.json");
    let cfg = LayoutConfig::from_json_str(s).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.ease, Ease::InOutCubic);
    // unspecified fields come from the reference board
    assert_eq!(cfg.outline_points_mm.len(), 21);
    assert_eq!(cfg.cable.connector_size_mm, (4.0, 8.0));
}

#[test]
fn json_fixture_builds() {
    let cfg = LayoutConfig::from_json_str(include_str!("data/compact_layout.json")).unwrap();
    let d = build(&cfg).unwrap();
    assert_eq!(d.phases.len(), 4 * 5 + 3 + 12 + 9);
    assert!(d.phases.iter().all(|p| p.ease == Ease::InOutCubic));
    assert_eq!(
        d.phases
            .iter()
            .filter(|p| matches!(p.kind, PhaseKind::ColumnStagger { .. }))
            .count(),
        3
    );
}

#[test]
fn json_fixture_with_short_table_is_rejected() {
    let mut v: serde_json::Value =
        serde_json::from_str(include_str!("data/compact_layout.json")).unwrap();
    v["thumb_angles"].as_array_mut().unwrap().pop();
    let cfg: LayoutConfig = serde_json::from_value(v).unwrap();
    assert_eq!(build(&cfg).unwrap_err().field(), Some("thumb_angles"));
}
