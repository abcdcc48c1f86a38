//! Object identity: arena storage plus a canonical-key index.
//!
//! Two constructions denoting the same physical entity must resolve to one
//! shared object. The registry guarantees this by keying every entry on its
//! kind and canonical label; constructors canonicalize their input and route
//! through [`Registry::lookup_or_create`] before allocating anything.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::measure::MeasureId;

/// The closed set of geometric kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GeomKind {
    Point,
    Line,
    Segment,
    Angle,
    Polygon,
}

impl GeomKind {
    pub fn name(self) -> &'static str {
        match self {
            GeomKind::Point => "Point",
            GeomKind::Line => "Line",
            GeomKind::Segment => "Segment",
            GeomKind::Angle => "Angle",
            GeomKind::Polygon => "Polygon",
        }
    }
}

/// Stable handle into the registry arena.
///
/// Cross-references between objects (segment endpoints, angle vertices,
/// polygon vertices) store these, never the entries themselves, since one
/// point is shared by many owners. Handles stay valid for the life of the
/// registry, including after [`Registry::remove`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjId(u32);

impl ObjId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind-specific defining data of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point,
    /// Ordered collinear points.
    Line { points: Vec<ObjId> },
    /// Endpoints in canonical (label-sorted) order.
    Segment { endpoints: [ObjId; 2] },
    /// Arms in canonical (label-sorted) order.
    Angle { vertex: ObjId, arms: [ObjId; 2] },
    /// Vertices in canonical rotation (lexically smallest label first).
    Polygon { vertices: Vec<ObjId> },
}

impl Shape {
    pub fn kind(&self) -> GeomKind {
        match self {
            Shape::Point => GeomKind::Point,
            Shape::Line { .. } => GeomKind::Line,
            Shape::Segment { .. } => GeomKind::Segment,
            Shape::Angle { .. } => GeomKind::Angle,
            Shape::Polygon { .. } => GeomKind::Polygon,
        }
    }

    /// The defining points of the shape.
    pub fn points(&self) -> Vec<ObjId> {
        match self {
            Shape::Point => Vec::new(),
            Shape::Line { points } => points.clone(),
            Shape::Segment { endpoints } => endpoints.to_vec(),
            Shape::Angle { vertex, arms } => vec![arms[0], *vertex, arms[1]],
            Shape::Polygon { vertices } => vertices.clone(),
        }
    }
}

/// One registered object: canonical label, defining data and the lazily
/// assigned measure handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub label: String,
    pub shape: Shape,
    pub measure: Option<MeasureId>,
}

/// Identity table mapping kind + canonical label to the single live
/// instance for that key.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Registry {
    arena: Vec<Entry>,
    index: HashMap<GeomKind, HashMap<String, ObjId>>,
    auto_counters: HashMap<GeomKind, u64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, kind: GeomKind, label: &str) -> Option<ObjId> {
        self.index.get(&kind).and_then(|m| m.get(label)).copied()
    }

    /// Return the existing instance for `(kind, label)` or build, store and
    /// return a new one. This is the dedup point; it never fails on a
    /// duplicate key.
    pub fn lookup_or_create(
        &mut self,
        kind: GeomKind,
        label: &str,
        build: impl FnOnce() -> Shape,
    ) -> ObjId {
        if let Some(id) = self.lookup(kind, label) {
            return id;
        }
        let id = ObjId::from_index(self.arena.len());
        let shape = build();
        debug_assert_eq!(shape.kind(), kind);
        self.arena.push(Entry {
            label: label.to_owned(),
            shape,
            measure: None,
        });
        self.index
            .entry(kind)
            .or_default()
            .insert(label.to_owned(), id);
        trace!(kind = kind.name(), label, "registered");
        id
    }

    pub fn get(&self, id: ObjId) -> &Entry {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: ObjId) -> &mut Entry {
        &mut self.arena[id.index()]
    }

    /// Find a registered instance of `kind` covering exactly this set of
    /// points, regardless of stored order. Polygon orientation checks need
    /// this rotation-insensitive notion of identity.
    pub fn search_by_point_set(&self, kind: GeomKind, points: &[ObjId]) -> Option<ObjId> {
        let want: HashSet<ObjId> = points.iter().copied().collect();
        let by_label = self.index.get(&kind)?;
        by_label
            .values()
            .find(|id| {
                let got = self.get(**id).shape.points();
                got.len() == want.len() && got.iter().all(|p| want.contains(p))
            })
            .copied()
    }

    /// Fresh label for an implicitly created object of `kind`, e.g.
    /// "Segment3". Derived canonical labels always contain a space
    /// separator, so a generated label can never collide with one.
    pub fn auto_label(&mut self, kind: GeomKind) -> String {
        let n = self.auto_counters.entry(kind).or_insert(0);
        *n += 1;
        format!("{}{}", kind.name(), n)
    }

    /// Evict an entry from the index. Handles already held stay usable, but
    /// future lookups for its key will miss.
    pub fn remove(&mut self, id: ObjId) {
        let entry = &self.arena[id.index()];
        if let Some(by_label) = self.index.get_mut(&entry.shape.kind()) {
            by_label.remove(&entry.label);
        }
    }

    /// Rekey an entry under a new canonical label (line merging changes the
    /// surviving line's key).
    pub fn relabel(&mut self, id: ObjId, new_label: String) {
        let kind = self.arena[id.index()].shape.kind();
        let old = std::mem::replace(&mut self.arena[id.index()].label, new_label.clone());
        if let Some(by_label) = self.index.get_mut(&kind) {
            by_label.remove(&old);
            by_label.insert(new_label, id);
        }
    }

    /// The full current object table, kind → canonical label → handle.
    pub fn entries(&self) -> &HashMap<GeomKind, HashMap<String, ObjId>> {
        &self.index
    }

    /// Indexed instances of one kind, ordered by label for deterministic
    /// traversal.
    pub fn ids_of(&self, kind: GeomKind) -> Vec<ObjId> {
        let mut ids: Vec<ObjId> = self
            .index
            .get(&kind)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default();
        ids.sort_by(|a, b| self.get(*a).label.cmp(&self.get(*b).label));
        ids
    }

    pub fn count(&self, kind: GeomKind) -> usize {
        self.index.get(&kind).map_or(0, HashMap::len)
    }

    /// Every entry ever allocated, including ones evicted from the index.
    pub fn iter(&self) -> impl Iterator<Item = (ObjId, &Entry)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(i, e)| (ObjId::from_index(i), e))
    }

    /// JSON view of the registry for diagnostics and snapshots.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
