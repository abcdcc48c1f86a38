//! Measure unknowns and their equivalence classes.
//!
//! Every measurable object owns one [`MeasureId`]. Declaring two measures
//! equal merges their underlying unknowns into one class (a union-find
//! forest); binding a concrete value at any member makes it visible to the
//! whole class through the shared root.

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};

/// Tolerance when comparing bound values.
pub(crate) const VALUE_EPS: f64 = 1e-9;

/// The geometric dimension a measure quantifies. The kinds differ only by
/// the domain a concrete value must lie in, not by algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureKind {
    /// Segment length, strictly positive.
    Length,
    /// Interior angle in degrees, strictly between 0 and 360.
    Angular,
    /// Polygon area, strictly positive.
    Area,
}

impl MeasureKind {
    /// Check a concrete value against the dimension's domain.
    pub(crate) fn check(self, value: f64) -> Result<()> {
        let ok = match self {
            MeasureKind::Length | MeasureKind::Area => value > 0.0,
            MeasureKind::Angular => value > 0.0 && value < 360.0,
        };
        if ok {
            Ok(())
        } else {
            Err(GeometryError::MeasureConflict(format!(
                "{value} is outside the domain of a {self:?} measure"
            )))
        }
    }
}

/// Handle to a measure unknown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MeasureId(u32);

impl MeasureId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    /// Union-find parent; self-referential at class roots.
    parent: u32,
    rank: u8,
    kind: MeasureKind,
    /// Symbol name for display and diagnostics, e.g. "mSegment3".
    name: String,
    /// Concrete value. Meaningful at class roots only.
    value: Option<f64>,
}

/// Union-find forest over measure unknowns.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MeasureTable {
    slots: Vec<Slot>,
}

impl MeasureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh unbound unknown.
    pub fn create(&mut self, kind: MeasureKind, name: String) -> MeasureId {
        let id = self.slots.len() as u32;
        self.slots.push(Slot {
            parent: id,
            rank: 0,
            kind,
            name,
            value: None,
        });
        MeasureId(id)
    }

    /// Class representative. Classes stay tiny, so the walk skips path
    /// compression and works on a shared borrow.
    pub fn find(&self, id: MeasureId) -> MeasureId {
        let mut cur = id.0;
        while self.slots[cur as usize].parent != cur {
            cur = self.slots[cur as usize].parent;
        }
        MeasureId(cur)
    }

    pub fn kind(&self, id: MeasureId) -> MeasureKind {
        self.slots[self.find(id).index()].kind
    }

    /// Symbol name of the class representative.
    pub fn name(&self, id: MeasureId) -> &str {
        &self.slots[self.find(id).index()].name
    }

    /// The bound value, or `None` while the class is still unknown.
    pub fn value(&self, id: MeasureId) -> Option<f64> {
        self.slots[self.find(id).index()].value
    }

    pub fn is_bound(&self, id: MeasureId) -> bool {
        self.value(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bind the class of `id` to a concrete value.
    ///
    /// Rebinding to the same value is a no-op; a different value or a value
    /// outside the measure kind's domain is a conflict. The binding is
    /// visible to every member of the class.
    pub fn bind(&mut self, id: MeasureId, value: f64) -> Result<()> {
        let root = self.find(id);
        let slot = &self.slots[root.index()];
        slot.kind.check(value)?;
        match slot.value {
            Some(bound) if (bound - value).abs() <= VALUE_EPS => Ok(()),
            Some(bound) => Err(GeometryError::MeasureConflict(format!(
                "{} is {bound}; cannot rebind to {value}",
                slot.name
            ))),
            None => {
                self.slots[root.index()].value = Some(value);
                Ok(())
            }
        }
    }

    /// Merge the classes of `a` and `b`, asserting the measures are equal
    /// from now on.
    ///
    /// If exactly one side is bound, the merged class carries that value; two
    /// different bound values are a conflict and the merge does not happen.
    /// Returns the surviving representative.
    pub fn unify(&mut self, a: MeasureId, b: MeasureId) -> Result<MeasureId> {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return Ok(ra);
        }
        let sa = &self.slots[ra.index()];
        let sb = &self.slots[rb.index()];
        if sa.kind != sb.kind {
            return Err(GeometryError::MeasureConflict(format!(
                "cannot equate {} ({:?}) with {} ({:?})",
                sa.name, sa.kind, sb.name, sb.kind
            )));
        }
        let merged = match (sa.value, sb.value) {
            (Some(x), Some(y)) if (x - y).abs() > VALUE_EPS => {
                return Err(GeometryError::MeasureConflict(format!(
                    "cannot equate {} = {x} with {} = {y}",
                    sa.name, sb.name
                )))
            }
            (Some(x), _) => Some(x),
            (None, y) => y,
        };
        let (winner, loser) = if sa.rank >= sb.rank { (ra, rb) } else { (rb, ra) };
        self.slots[loser.index()].parent = winner.0;
        if self.slots[winner.index()].rank == self.slots[loser.index()].rank {
            self.slots[winner.index()].rank += 1;
        }
        self.slots[winner.index()].value = merged;
        Ok(winner)
    }
}
