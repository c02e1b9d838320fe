//! Symmetry-compressed tensor container
//!
//! A tensor of rank r has r slots, each carrying a [`SlotSpec`]: index kind
//! (spatial or spacetime), valence, spatial dimension and frame. Slots are
//! partitioned into symmetry classes; storage keeps one component per class
//! of multi-indices that differ only by permutations within a class.
//!
//! # Architecture
//!
//! - **index**: per-slot metadata
//! - **symmetry**: symmetry partitions, canonical multi-indices, storage layout
//! - **structure**: rank + slot metadata + symmetry of one tensor shape
//! - **component**: element types (`f64`, `DataVector`)
//! - **dense**: the materialized tensor

mod component;
mod dense;
mod index;
mod structure;
mod symmetry;

pub use component::{Component, DataVector};
pub use dense::Tensor;
pub use index::{Frame, IndexKind, SlotSpec, Valence};
pub use structure::TensorStructure;
pub use symmetry::{MultiIndex, Symmetry};

pub(crate) use symmetry::MultiIndexIter;
