//! Tensor shape: slot metadata plus symmetry.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{ExprError, Result};

use super::index::SlotSpec;
use super::symmetry::{Layout, Symmetry};

/// Rank, per-slot metadata and symmetry of a tensor.
///
/// The storage layout is derived once on construction and shared between
/// clones, so structures are cheap to copy around plans and results.
#[derive(Clone, Debug)]
pub struct TensorStructure {
    slots: Vec<SlotSpec>,
    symmetry: Symmetry,
    layout: Arc<Layout>,
}

impl TensorStructure {
    /// Build a structure from symmetry class ids (one per slot) and slot metadata.
    ///
    /// Slots sharing a class must have identical metadata.
    pub fn new(symmetry: &[usize], slots: Vec<SlotSpec>) -> Result<Self> {
        if symmetry.len() != slots.len() {
            return Err(ExprError::SymmetryRank {
                slots: slots.len(),
                classes: symmetry.len(),
            });
        }
        Self::with_symmetry(Symmetry::new(symmetry), slots)
    }

    /// Structure without any symmetric slots
    pub fn asymmetric(slots: Vec<SlotSpec>) -> Self {
        let symmetry = Symmetry::asymmetric(slots.len());
        Self::from_parts(symmetry, slots)
    }

    /// Rank 0
    pub fn scalar() -> Self {
        Self::asymmetric(Vec::new())
    }

    pub fn with_symmetry(symmetry: Symmetry, slots: Vec<SlotSpec>) -> Result<Self> {
        if symmetry.rank() != slots.len() {
            return Err(ExprError::SymmetryRank {
                slots: slots.len(),
                classes: symmetry.rank(),
            });
        }
        for first in 0..slots.len() {
            for second in (first + 1)..slots.len() {
                if symmetry.same_class(first, second) && slots[first] != slots[second] {
                    return Err(ExprError::SymmetricSlotMismatch { first, second });
                }
            }
        }
        Ok(Self::from_parts(symmetry, slots))
    }

    fn from_parts(symmetry: Symmetry, slots: Vec<SlotSpec>) -> Self {
        let extents: Vec<usize> = slots.iter().map(SlotSpec::extent).collect();
        let layout = Arc::new(Layout::build(&extents, &symmetry));
        Self {
            slots,
            symmetry,
            layout,
        }
    }

    pub fn rank(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    pub fn slot(&self, position: usize) -> &SlotSpec {
        &self.slots[position]
    }

    pub fn symmetry(&self) -> &Symmetry {
        &self.symmetry
    }

    /// Extent of each slot
    pub fn extents(&self) -> &[usize] {
        self.layout.extents()
    }

    /// Number of independent (stored) components
    pub fn num_components(&self) -> usize {
        self.layout.len()
    }

    /// Storage position of a (possibly non-canonical) multi-index
    pub fn storage_index(&self, index: &[usize]) -> Option<usize> {
        self.layout.storage_index(index)
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl PartialEq for TensorStructure {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots && self.symmetry == other.symmetry
    }
}

impl Eq for TensorStructure {}

impl Hash for TensorStructure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slots.hash(state);
        self.symmetry.hash(state);
    }
}
