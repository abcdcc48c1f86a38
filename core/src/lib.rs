//! Symbolic plane geometry: deduplicated geometric objects, shared unknown
//! measures and a linear constraint solver.
//!
//! Objects (points, lines, segments, angles, polygons) are identified by
//! canonical keys, so every spelling of the same physical entity resolves
//! to one handle. Unknown measures are symbolic until theorems supply
//! enough equations to pin them down:
//!
//! ```
//! use planimetry_core::{theorems, Figure};
//!
//! let mut fig = Figure::new();
//! let line = fig.line_str("A B C D E").unwrap();
//! theorems::subsegment_sum(&mut fig, line).unwrap();
//! let ac = fig.segment_str("A C").unwrap();
//! fig.set_measure(ac, 5.0).unwrap();
//! let ce = fig.segment_str("C E").unwrap();
//! fig.set_measure(ce, 12.0).unwrap();
//! let be = fig.segment_str("B E").unwrap();
//! fig.set_measure(be, 15.0).unwrap();
//! let ab = fig.segment_str("A B").unwrap();
//! assert_eq!(fig.solve(ab).unwrap(), Some(2.0));
//! ```

pub mod equations;
pub mod error;
pub mod figure;
pub mod measure;
pub mod registry;
pub mod theorems;

pub use equations::LinearExpr;
pub use error::{GeometryError, Result};
pub use figure::Figure;
pub use measure::{MeasureId, MeasureKind};
pub use registry::{GeomKind, ObjId, Registry, Shape};

pub fn version() -> &'static str {
    "0.1.0"
}
