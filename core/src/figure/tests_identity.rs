use proptest::prelude::*;

use super::Figure;
use crate::error::GeometryError;
use crate::registry::GeomKind;

#[test]
fn points_are_cached() {
    let mut fig = Figure::new();
    let a = fig.point("A").unwrap();
    assert_eq!(fig.point("A").unwrap(), a);
    assert_eq!(fig.registry().count(GeomKind::Point), 1);
}

#[test]
fn invalid_point_labels_are_rejected() {
    let mut fig = Figure::new();
    assert!(matches!(
        fig.point(""),
        Err(GeometryError::MalformedConstruction(_))
    ));
    assert!(matches!(
        fig.point("A "),
        Err(GeometryError::MalformedConstruction(_))
    ));
    // Multi-character labels are allowed, even though unconventional.
    fig.point("mypoint").unwrap();
}

#[test]
fn segments_are_cached_regardless_of_endpoint_order() {
    let mut fig = Figure::new();
    let ab = fig.segment_str("A B").unwrap();
    assert_eq!(fig.segment_str("B A").unwrap(), ab);
    assert_eq!(fig.label(ab), "A B");
    // Identical object means identical measure.
    let m = fig.measure(ab).unwrap();
    let ba = fig.segment_str("B A").unwrap();
    assert_eq!(fig.measure(ba).unwrap(), m);
}

#[test]
fn segments_implicitly_create_points() {
    let mut fig = Figure::new();
    fig.segment_str("A B").unwrap();
    assert!(fig.registry().lookup(GeomKind::Point, "A").is_some());
    assert!(fig.registry().lookup(GeomKind::Point, "B").is_some());
}

#[test]
fn degenerate_segments_are_rejected() {
    let mut fig = Figure::new();
    assert!(fig.segment_str("A").is_err());
    assert!(fig.segment_str("A B C").is_err());
    assert!(fig.segment_str("A A").is_err());
}

#[test]
fn angle_identity_is_vertex_sensitive() {
    let mut fig = Figure::new();
    let abc = fig.angle_str("A B C").unwrap();
    // Reversing the traversal keeps the vertex, so the angle is the same.
    assert_eq!(fig.angle_str("C B A").unwrap(), abc);
    // A different middle point is a different angle.
    let acb = fig.angle_str("A C B").unwrap();
    assert_ne!(acb, abc);
    assert_eq!(fig.label(abc), "A B C");
    assert_eq!(fig.label(acb), "A C B");
}

#[test]
fn angles_require_three_distinct_points() {
    let mut fig = Figure::new();
    assert!(fig.angle_str("A B").is_err());
    assert!(fig.angle_str("A B A").is_err());
}

#[test]
fn polygon_rotations_are_one_object() {
    let mut fig = Figure::new();
    let t = fig.triangle_str("A B C").unwrap();
    assert_eq!(fig.triangle_str("B C A").unwrap(), t);
    assert_eq!(fig.triangle_str("C A B").unwrap(), t);
    assert_eq!(fig.label(t), "A B C");
    let q = fig.polygon_str("D E F G").unwrap();
    assert_eq!(fig.polygon_str("F G D E").unwrap(), q);
}

#[test]
fn reversed_polygon_orientation_conflicts() {
    let mut fig = Figure::new();
    fig.triangle_str("A B C").unwrap();
    assert!(matches!(
        fig.triangle_str("C B A"),
        Err(GeometryError::IdentityConflict(_))
    ));
    fig.polygon_str("D E F G").unwrap();
    assert!(matches!(
        fig.polygon_str("D F E G"),
        Err(GeometryError::IdentityConflict(_))
    ));
    assert!(matches!(
        fig.polygon_str("E D G F"),
        Err(GeometryError::IdentityConflict(_))
    ));
}

#[test]
fn triangle_registers_sides_and_corners() {
    let mut fig = Figure::new();
    fig.triangle_str("A B C").unwrap();
    assert_eq!(fig.registry().count(GeomKind::Point), 3);
    assert_eq!(fig.registry().count(GeomKind::Segment), 3);
    assert_eq!(fig.registry().count(GeomKind::Angle), 3);
    for key in ["A B", "B C", "A C"] {
        let seg = fig.registry().lookup(GeomKind::Segment, key);
        assert!(seg.is_some(), "missing side {key}");
        assert_eq!(fig.value(seg.unwrap()), None);
    }
    for key in ["A B C", "B C A", "C A B"] {
        let angle = fig.angle_str(key).unwrap();
        assert_eq!(fig.value(angle), None);
    }
    // Re-fetching the corner angles did not create anything new.
    assert_eq!(fig.registry().count(GeomKind::Angle), 3);
}

#[test]
fn quadrilateral_registers_wrapping_sides() {
    let mut fig = Figure::new();
    fig.polygon_str("A B C D").unwrap();
    let segs = fig.registry().ids_of(GeomKind::Segment);
    let labels: Vec<&str> = segs.iter().map(|s| fig.label(*s)).collect();
    assert_eq!(labels, ["A B", "A D", "B C", "C D"]);
}

#[test]
fn lines_sharing_points_merge() {
    let mut fig = Figure::new();
    let l1 = fig.line_str("A X B C D").unwrap();
    let l2 = fig.line_str("C F E B A").unwrap();
    assert_eq!(l1, l2);
    assert_eq!(fig.label(l1), "A X B E F C D");
    assert_eq!(fig.registry().count(GeomKind::Line), 1);
}

#[test]
fn line_requires_two_points() {
    let mut fig = Figure::new();
    assert!(fig.line_str("A").is_err());
}

#[test]
fn inconsistent_line_alignment_is_rejected() {
    let mut fig = Figure::new();
    fig.line_str("A B C").unwrap();
    // B and C in reversed relative order cannot be aligned with A B C.
    assert!(matches!(
        fig.line_str("A C B"),
        Err(GeometryError::MalformedConstruction(_))
    ));
}

#[test]
fn registry_snapshot_round_trips() {
    let mut fig = Figure::new();
    fig.triangle_str("A B C").unwrap();
    let json = serde_json::to_string(&fig).unwrap();
    let back: Figure = serde_json::from_str(&json).unwrap();
    assert_eq!(back.registry().count(GeomKind::Segment), 3);
    assert!(back.registry().lookup(GeomKind::Segment, "A C").is_some());
    assert!(fig.registry().snapshot().is_object());
}

proptest! {
    #[test]
    fn segment_identity_ignores_order(a in "[A-Z][a-z0-9]{0,2}", b in "[A-Z][a-z0-9]{0,2}") {
        prop_assume!(a != b);
        let mut fig = Figure::new();
        let pa = fig.point(&a).unwrap();
        let pb = fig.point(&b).unwrap();
        prop_assert_eq!(fig.segment([pa, pb]).unwrap(), fig.segment([pb, pa]).unwrap());
        prop_assert_eq!(fig.registry().count(GeomKind::Segment), 1);
    }

    #[test]
    fn triangle_identity_ignores_rotation(
        labels in proptest::collection::hash_set("[A-Z][a-z0-9]{0,2}", 3),
        rot in 0usize..3,
    ) {
        let labels: Vec<String> = labels.into_iter().collect();
        let mut fig = Figure::new();
        let pts: Vec<_> = labels.iter().map(|l| fig.point(l).unwrap()).collect();
        let t = fig.triangle([pts[0], pts[1], pts[2]]).unwrap();
        let rotated = [pts[rot % 3], pts[(rot + 1) % 3], pts[(rot + 2) % 3]];
        prop_assert_eq!(fig.triangle(rotated).unwrap(), t);
    }
}
