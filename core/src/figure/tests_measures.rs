use super::Figure;
use crate::error::GeometryError;

#[test]
fn measures_are_lazy_and_stable() {
    let mut fig = Figure::new();
    let ab = fig.segment_str("A B").unwrap();
    assert_eq!(fig.value(ab), None);
    let m = fig.measure(ab).unwrap();
    assert_eq!(fig.measure(ab).unwrap(), m);
    assert_eq!(fig.measures().name(m), "mSegment1");
}

#[test]
fn points_and_lines_carry_no_measure() {
    let mut fig = Figure::new();
    let p = fig.point("A").unwrap();
    assert!(matches!(
        fig.measure(p),
        Err(GeometryError::MalformedConstruction(_))
    ));
    let l = fig.line_str("A B").unwrap();
    assert!(fig.measure(l).is_err());
}

#[test]
fn set_measure_binds_and_rejects_conflicts() {
    let mut fig = Figure::new();
    let ab = fig.segment_str("A B").unwrap();
    fig.set_measure(ab, 5.0).unwrap();
    assert_eq!(fig.value(ab), Some(5.0));
    fig.set_measure(ab, 5.0).unwrap();
    let err = fig.set_measure(ab, 7.0).unwrap_err();
    assert!(matches!(err, GeometryError::MeasureConflict(_)));
    assert_eq!(fig.value(ab), Some(5.0));
}

#[test]
fn binding_is_visible_through_either_spelling() {
    let mut fig = Figure::new();
    let ab = fig.segment_str("A B").unwrap();
    fig.set_measure(ab, 3.0).unwrap();
    let ba = fig.segment_str("B A").unwrap();
    assert_eq!(fig.value(ba), Some(3.0));
}

#[test]
fn equate_chains_propagate_bindings() {
    let mut fig = Figure::new();
    let x = fig.segment_str("A B").unwrap();
    let y = fig.segment_str("C D").unwrap();
    let z = fig.segment_str("E F").unwrap();
    fig.equate(x, y).unwrap();
    fig.equate(y, z).unwrap();
    fig.set_measure(x, 5.0).unwrap();
    assert_eq!(fig.value(y), Some(5.0));
    assert_eq!(fig.value(z), Some(5.0));
}

#[test]
fn equate_against_a_bound_measure_adopts_its_value() {
    let mut fig = Figure::new();
    let x = fig.segment_str("A B").unwrap();
    let y = fig.segment_str("C D").unwrap();
    fig.set_measure(y, 8.0).unwrap();
    fig.equate(x, y).unwrap();
    assert_eq!(fig.value(x), Some(8.0));
}

#[test]
fn equate_of_conflicting_bound_measures_fails() {
    let mut fig = Figure::new();
    let x = fig.segment_str("A B").unwrap();
    let y = fig.segment_str("C D").unwrap();
    fig.set_measure(x, 4.0).unwrap();
    fig.set_measure(y, 6.0).unwrap();
    assert!(matches!(
        fig.equate(x, y),
        Err(GeometryError::MeasureConflict(_))
    ));
    assert_eq!(fig.value(x), Some(4.0));
    assert_eq!(fig.value(y), Some(6.0));
}

#[test]
fn equating_a_segment_with_an_angle_fails() {
    let mut fig = Figure::new();
    let seg = fig.segment_str("A B").unwrap();
    let ang = fig.angle_str("A B C").unwrap();
    assert!(matches!(
        fig.equate(seg, ang),
        Err(GeometryError::MeasureConflict(_))
    ));
}

#[test]
fn measure_domains_are_enforced() {
    let mut fig = Figure::new();
    let seg = fig.segment_str("A B").unwrap();
    assert!(fig.set_measure(seg, -1.0).is_err());
    assert!(fig.set_measure(seg, 0.0).is_err());
    let ang = fig.angle_str("A B C").unwrap();
    assert!(fig.set_measure(ang, 360.0).is_err());
    fig.set_measure(ang, 90.0).unwrap();
}
