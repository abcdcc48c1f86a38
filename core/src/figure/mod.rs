//! The figure context: constructors, canonicalization and the solve API.
//!
//! A [`Figure`] is one isolated geometric scene. It owns the object
//! registry, the measure classes and the pending equation set, and every
//! constructor and query goes through it, so separate figures never share
//! state and tests get isolation for free. Multi-threaded callers should
//! serialize whole operations behind a single lock; nothing here blocks or
//! suspends.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::equations::{EquationSet, LinearExpr};
use crate::error::{GeometryError, Result};
use crate::measure::{MeasureId, MeasureKind, MeasureTable};
use crate::registry::{GeomKind, ObjId, Registry, Shape};

mod notation;

#[cfg(test)]
mod tests_identity;
#[cfg(test)]
mod tests_measures;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Figure {
    registry: Registry,
    measures: MeasureTable,
    equations: EquationSet,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn measures(&self) -> &MeasureTable {
        &self.measures
    }

    pub fn pending_equations(&self) -> usize {
        self.equations.pending_len()
    }

    /// Canonical label of any registered object.
    pub fn label(&self, id: ObjId) -> &str {
        &self.registry.get(id).label
    }

    // --- construction ----------------------------------------------------

    /// A point named by a label. Same label, same point.
    pub fn point(&mut self, label: &str) -> Result<ObjId> {
        if label.is_empty() {
            return Err(GeometryError::MalformedConstruction(
                "empty point label".into(),
            ));
        }
        if label.chars().any(char::is_whitespace) {
            return Err(GeometryError::MalformedConstruction(format!(
                "whitespace in point label '{label}'"
            )));
        }
        Ok(self
            .registry
            .lookup_or_create(GeomKind::Point, label, || Shape::Point))
    }

    /// The segment between two distinct points; endpoint order is
    /// irrelevant.
    pub fn segment(&mut self, endpoints: [ObjId; 2]) -> Result<ObjId> {
        self.expect_points(&endpoints)?;
        if endpoints[0] == endpoints[1] {
            return Err(GeometryError::MalformedConstruction(
                "segment endpoints must be distinct".into(),
            ));
        }
        let mut ordered = endpoints;
        if self.label(ordered[1]) < self.label(ordered[0]) {
            ordered.swap(0, 1);
        }
        let label = format!("{} {}", self.label(ordered[0]), self.label(ordered[1]));
        Ok(self
            .registry
            .lookup_or_create(GeomKind::Segment, &label, || Shape::Segment {
                endpoints: ordered,
            }))
    }

    /// The angle at the middle point of an ordered triple. The two arm
    /// points are an unordered pair: `angle([A, B, C])` and
    /// `angle([C, B, A])` are the same angle, while a different middle
    /// point is a different angle.
    pub fn angle(&mut self, pts: [ObjId; 3]) -> Result<ObjId> {
        self.expect_points(&pts)?;
        self.expect_distinct(&pts)?;
        let vertex = pts[1];
        let mut arms = [pts[0], pts[2]];
        if self.label(arms[1]) < self.label(arms[0]) {
            arms.swap(0, 1);
        }
        let label = format!(
            "{} {} {}",
            self.label(arms[0]),
            self.label(vertex),
            self.label(arms[1])
        );
        Ok(self
            .registry
            .lookup_or_create(GeomKind::Angle, &label, || Shape::Angle { vertex, arms }))
    }

    /// A polygon from an ordered cyclic vertex sequence. Rotations of one
    /// traversal are the same polygon; any other ordering of the same point
    /// set (the mirror traversal included) conflicts with the registered
    /// one. Construction registers the boundary segments and the interior
    /// angles through the same deduplicating constructors.
    pub fn polygon(&mut self, vertices: &[ObjId]) -> Result<ObjId> {
        self.expect_points(vertices)?;
        if vertices.len() < 3 {
            return Err(GeometryError::MalformedConstruction(format!(
                "polygon requires at least 3 points, got {}",
                vertices.len()
            )));
        }
        self.expect_distinct(vertices)?;
        let canonical = self.canonical_rotation(vertices);
        let label = self.join_labels(&canonical);
        if let Some(existing) = self.registry.lookup(GeomKind::Polygon, &label) {
            return Ok(existing);
        }
        if let Some(other) = self.registry.search_by_point_set(GeomKind::Polygon, &canonical) {
            return Err(GeometryError::IdentityConflict(format!(
                "polygon {label} traverses the same points as registered polygon {}",
                self.label(other)
            )));
        }
        // All validation is done; nothing below can fail and leave partial
        // implicit state behind.
        let id = self
            .registry
            .lookup_or_create(GeomKind::Polygon, &label, || Shape::Polygon {
                vertices: canonical.clone(),
            });
        let n = canonical.len();
        for i in 0..n {
            self.segment([canonical[i], canonical[(i + 1) % n]])?;
        }
        for i in 0..n {
            let prev = canonical[(i + n - 1) % n];
            let next = canonical[(i + 1) % n];
            self.angle([prev, canonical[i], next])?;
        }
        debug!(polygon = %label, "registered polygon");
        Ok(id)
    }

    /// A polygon with exactly three vertices.
    pub fn triangle(&mut self, vertices: [ObjId; 3]) -> Result<ObjId> {
        self.polygon(&vertices)
    }

    /// A line through ≥2 ordered collinear points. A new line sharing two
    /// or more points with registered lines is merged with them when the
    /// sequences can be aligned consistently.
    pub fn line(&mut self, pts: &[ObjId]) -> Result<ObjId> {
        self.expect_points(pts)?;
        if pts.len() < 2 {
            return Err(GeometryError::MalformedConstruction(format!(
                "line requires at least 2 points, got {}",
                pts.len()
            )));
        }
        self.expect_distinct(pts)?;
        let canonical = self.line_canonical(pts.to_vec());
        let label = self.join_labels(&canonical);
        if let Some(id) = self.registry.lookup(GeomKind::Line, &label) {
            return Ok(id);
        }

        let mut overlapping: Vec<ObjId> = Vec::new();
        for id in self.registry.ids_of(GeomKind::Line) {
            let Shape::Line { points } = &self.registry.get(id).shape else {
                continue;
            };
            if points.iter().filter(|p| pts.contains(p)).count() > 1 {
                overlapping.push(id);
            }
        }
        if overlapping.is_empty() {
            return Ok(self
                .registry
                .lookup_or_create(GeomKind::Line, &label, || Shape::Line {
                    points: canonical,
                }));
        }

        let mut merged = canonical;
        for &id in &overlapping {
            let Shape::Line { points } = &self.registry.get(id).shape else {
                continue;
            };
            merged = self.merge_collinear(&points.clone(), &merged)?;
        }
        let merged = self.line_canonical(merged);
        let new_label = self.join_labels(&merged);
        let retained = overlapping[0];
        for &id in &overlapping[1..] {
            self.registry.remove(id);
        }
        self.registry.relabel(retained, new_label);
        if let Shape::Line { points } = &mut self.registry.get_mut(retained).shape {
            *points = merged;
        }
        debug!(line = self.label(retained), "merged collinear lines");
        Ok(retained)
    }

    // --- measures --------------------------------------------------------

    /// The object's measure handle, created on first access. Segments carry
    /// lengths, angles angular measures, polygons areas; points and lines
    /// carry nothing.
    pub fn measure(&mut self, obj: ObjId) -> Result<MeasureId> {
        let kind = self.registry.get(obj).shape.kind();
        let mkind = match kind {
            GeomKind::Segment => MeasureKind::Length,
            GeomKind::Angle => MeasureKind::Angular,
            GeomKind::Polygon => MeasureKind::Area,
            GeomKind::Point | GeomKind::Line => {
                return Err(GeometryError::MalformedConstruction(format!(
                    "a {} carries no measure",
                    kind.name()
                )))
            }
        };
        if let Some(m) = self.registry.get(obj).measure {
            return Ok(m);
        }
        let name = format!("m{}", self.registry.auto_label(kind));
        let m = self.measures.create(mkind, name);
        self.registry.get_mut(obj).measure = Some(m);
        Ok(m)
    }

    /// The object's resolved value, or `None` while it is unknown.
    pub fn value(&self, obj: ObjId) -> Option<f64> {
        self.registry
            .get(obj)
            .measure
            .and_then(|m| self.measures.value(m))
    }

    /// Bind the object's measure to a concrete value.
    pub fn set_measure(&mut self, obj: ObjId, value: f64) -> Result<()> {
        let m = self.measure(obj)?;
        self.measures.bind(m, value)
    }

    /// Declare two objects' measures equal, merging their unknowns.
    pub fn equate(&mut self, a: ObjId, b: ObjId) -> Result<()> {
        let ma = self.measure(a)?;
        let mb = self.measure(b)?;
        self.measures.unify(ma, mb).map(|_| ())
    }

    // --- equations -------------------------------------------------------

    /// Register a theorem-generated expression into the pending system.
    /// Returns `false` when the expression adds nothing new.
    pub fn post(&mut self, expr: LinearExpr) -> Result<bool> {
        self.equations.post(expr, &self.measures)
    }

    /// Solve the accumulated system and return the objects whose measures
    /// became bound. On contradiction, measures and the pending set are
    /// left exactly as they were.
    pub fn solve_system(&mut self) -> Result<Vec<ObjId>> {
        let bound = self.equations.solve(&mut self.measures)?;
        if bound.is_empty() {
            return Ok(Vec::new());
        }
        let roots: HashSet<MeasureId> = bound.into_iter().collect();
        let mut out = Vec::new();
        for (id, entry) in self.registry.iter() {
            if let Some(m) = entry.measure {
                if roots.contains(&self.measures.find(m)) {
                    out.push(id);
                }
            }
        }
        Ok(out)
    }

    /// Solve the system, then report this object's value. `Ok(None)` means
    /// the accumulated equations do not pin the value down yet.
    pub fn solve(&mut self, obj: ObjId) -> Result<Option<f64>> {
        let m = self.measure(obj)?;
        self.solve_system()?;
        Ok(self.measures.value(m))
    }

    // --- canonicalization helpers ----------------------------------------

    fn expect_points(&self, ids: &[ObjId]) -> Result<()> {
        for &id in ids {
            if self.registry.get(id).shape.kind() != GeomKind::Point {
                return Err(GeometryError::MalformedConstruction(format!(
                    "'{}' is a {}, not a point",
                    self.label(id),
                    self.registry.get(id).shape.kind().name()
                )));
            }
        }
        Ok(())
    }

    fn expect_distinct(&self, ids: &[ObjId]) -> Result<()> {
        let unique: HashSet<ObjId> = ids.iter().copied().collect();
        if unique.len() != ids.len() {
            return Err(GeometryError::MalformedConstruction(
                "points are not all distinct".into(),
            ));
        }
        Ok(())
    }

    /// Rotate a cyclic sequence so the lexically smallest label comes
    /// first, preserving relative order.
    fn canonical_rotation(&self, pts: &[ObjId]) -> Vec<ObjId> {
        let start = pts
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| self.label(**a).cmp(self.label(**b)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        pts[start..].iter().chain(&pts[..start]).copied().collect()
    }

    /// Orient a point sequence so the lexically smaller endpoint leads.
    fn line_canonical(&self, mut pts: Vec<ObjId>) -> Vec<ObjId> {
        if let (Some(first), Some(last)) = (pts.first(), pts.last()) {
            if self.label(*last) < self.label(*first) {
                pts.reverse();
            }
        }
        pts
    }

    fn join_labels(&self, pts: &[ObjId]) -> String {
        pts.iter()
            .map(|p| self.label(*p))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Align and merge two collinear point sequences.
    fn merge_collinear(&self, a: &[ObjId], b: &[ObjId]) -> Result<Vec<ObjId>> {
        let common_a: Vec<ObjId> = a.iter().copied().filter(|p| b.contains(p)).collect();
        if common_a.len() < 2 {
            return Err(GeometryError::MalformedConstruction(format!(
                "collinear sequences {} and {} share fewer than two points",
                self.join_labels(a),
                self.join_labels(b)
            )));
        }
        let common_b: Vec<ObjId> = b.iter().copied().filter(|p| a.contains(p)).collect();
        if common_a == common_b {
            self.order_preserving_merge(a, b)
        } else if common_a.iter().eq(common_b.iter().rev()) {
            let reversed: Vec<ObjId> = b.iter().rev().copied().collect();
            self.order_preserving_merge(a, &reversed)
        } else {
            Err(GeometryError::MalformedConstruction(format!(
                "collinear sequences {} and {} cannot be aligned consistently",
                self.join_labels(a),
                self.join_labels(b)
            )))
        }
    }

    fn order_preserving_merge(&self, a: &[ObjId], b: &[ObjId]) -> Result<Vec<ObjId>> {
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] == b[j] {
                out.push(a[i]);
                i += 1;
                j += 1;
            } else if b[j..].contains(&a[i]) {
                out.push(b[j]);
                j += 1;
            } else if a[i..].contains(&b[j]) {
                out.push(a[i]);
                i += 1;
            } else {
                return Err(GeometryError::MalformedConstruction(format!(
                    "order of collinear sequences {} and {} is ambiguous",
                    self.join_labels(a),
                    self.join_labels(b)
                )));
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        Ok(out)
    }
}
