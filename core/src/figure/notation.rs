//! Space-delimited point notation, e.g. `"A B C"`.
//!
//! A convenience layer over the typed constructors: each token names a
//! point, created on first use. Arity and distinctness are validated by the
//! constructors themselves.

use crate::error::{GeometryError, Result};
use crate::registry::ObjId;

use super::Figure;

impl Figure {
    /// Parse whitespace-separated point labels, creating the points.
    pub fn points_str(&mut self, notation: &str) -> Result<Vec<ObjId>> {
        let labels: Vec<&str> = notation.split_whitespace().collect();
        if labels.is_empty() {
            return Err(GeometryError::MalformedConstruction(
                "empty point notation".into(),
            ));
        }
        labels.into_iter().map(|l| self.point(l)).collect()
    }

    pub fn segment_str(&mut self, notation: &str) -> Result<ObjId> {
        let pts = self.points_str(notation)?;
        let pair = Self::fixed::<2>(pts, "segment")?;
        self.segment(pair)
    }

    pub fn angle_str(&mut self, notation: &str) -> Result<ObjId> {
        let pts = self.points_str(notation)?;
        let triple = Self::fixed::<3>(pts, "angle")?;
        self.angle(triple)
    }

    pub fn triangle_str(&mut self, notation: &str) -> Result<ObjId> {
        let pts = self.points_str(notation)?;
        let triple = Self::fixed::<3>(pts, "triangle")?;
        self.triangle(triple)
    }

    pub fn polygon_str(&mut self, notation: &str) -> Result<ObjId> {
        let pts = self.points_str(notation)?;
        self.polygon(&pts)
    }

    pub fn line_str(&mut self, notation: &str) -> Result<ObjId> {
        let pts = self.points_str(notation)?;
        self.line(&pts)
    }

    fn fixed<const N: usize>(pts: Vec<ObjId>, what: &str) -> Result<[ObjId; N]> {
        let n = pts.len();
        pts.try_into().map_err(|_| {
            GeometryError::MalformedConstruction(format!(
                "{what} requires exactly {} points, got {n}",
                N
            ))
        })
    }
}
