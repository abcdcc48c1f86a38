//! Linear theorems over constructed figures.
//!
//! Theorems are external collaborators of the core: each one inspects
//! already-constructed objects and posts expressions into the figure's
//! pending system. None of them solves anything itself; call
//! [`Figure::solve_system`] once the relevant facts are registered.

use crate::equations::LinearExpr;
use crate::error::{GeometryError, Result};
use crate::figure::Figure;
use crate::registry::{ObjId, Shape};

/// Every segment on `line` spanning interior points equals the sum of its
/// atomic subsegments (the consecutive-point pieces it covers).
pub fn subsegment_sum(fig: &mut Figure, line: ObjId) -> Result<()> {
    let pts = match &fig.registry().get(line).shape {
        Shape::Line { points } => points.clone(),
        other => {
            return Err(GeometryError::MalformedConstruction(format!(
                "subsegment_sum expects a line, got a {}",
                other.kind().name()
            )))
        }
    };
    let n = pts.len();
    for span in 2..n {
        for i in 0..(n - span) {
            let whole = fig.segment([pts[i], pts[i + span]])?;
            let whole_m = fig.measure(whole)?;
            let mut expr = LinearExpr::new().plus(whole_m);
            for j in i..(i + span) {
                let part = fig.segment([pts[j], pts[j + 1]])?;
                let part_m = fig.measure(part)?;
                expr = expr.minus(part_m);
            }
            fig.post(expr)?;
        }
    }
    Ok(())
}

/// The interior angles of an n-gon sum to (n − 2) · 180 degrees.
pub fn polygon_angle_sum(fig: &mut Figure, polygon: ObjId) -> Result<()> {
    let vertices = match &fig.registry().get(polygon).shape {
        Shape::Polygon { vertices } => vertices.clone(),
        other => {
            return Err(GeometryError::MalformedConstruction(format!(
                "polygon_angle_sum expects a polygon, got a {}",
                other.kind().name()
            )))
        }
    };
    let n = vertices.len();
    let mut expr = LinearExpr::new().offset(-((n as f64 - 2.0) * 180.0));
    for i in 0..n {
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];
        let corner = fig.angle([prev, vertices[i], next])?;
        let m = fig.measure(corner)?;
        expr = expr.plus(m);
    }
    fig.post(expr)?;
    Ok(())
}

/// The given angles together form a straight angle: their measures sum
/// to 180 degrees.
pub fn supplementary_angles(fig: &mut Figure, angles: &[ObjId]) -> Result<()> {
    if angles.len() < 2 {
        return Err(GeometryError::MalformedConstruction(
            "supplementary angles require at least two angles".into(),
        ));
    }
    let mut expr = LinearExpr::new().offset(-180.0);
    for &angle in angles {
        if !matches!(fig.registry().get(angle).shape, Shape::Angle { .. }) {
            return Err(GeometryError::MalformedConstruction(format!(
                "'{}' is not an angle",
                fig.label(angle)
            )));
        }
        let m = fig.measure(angle)?;
        expr = expr.plus(m);
    }
    fig.post(expr)?;
    Ok(())
}
