//! Symmetry partitions and symmetry-compressed storage layout.
//!
//! A tensor's slots are partitioned into symmetry classes: permuting the
//! values of slots within one class does not change the component. Storage
//! keeps one component per equivalence class of multi-indices, the
//! *canonical* one, whose values are ascending (in slot order) within each
//! symmetry class.
//!
//! The [`Layout`] table is built once per tensor shape and maps every
//! row-major multi-index to the storage position of its canonical
//! representative.

use smallvec::SmallVec;

/// Stack allocation threshold for multi-indices
pub(crate) const STACK_RANK: usize = 4;

/// A component index: one value per slot.
pub type MultiIndex = SmallVec<[usize; STACK_RANK]>;

/// Symmetry partition over the slots of a tensor.
///
/// Stores one class id per slot. Ids are renumbered by first appearance so
/// `[3, 3, 1]` and `[0, 0, 1]` describe the same partition and compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symmetry {
    classes: Vec<usize>,
}

impl Symmetry {
    /// Build a partition from arbitrary class ids (equal id = symmetric).
    pub fn new(ids: &[usize]) -> Self {
        let mut seen: Vec<usize> = Vec::new();
        let classes = ids
            .iter()
            .map(|id| match seen.iter().position(|s| s == id) {
                Some(pos) => pos,
                None => {
                    seen.push(*id);
                    seen.len() - 1
                }
            })
            .collect();
        Self { classes }
    }

    /// Every slot in its own class.
    pub fn asymmetric(rank: usize) -> Self {
        Self {
            classes: (0..rank).collect(),
        }
    }

    /// All slots in one class.
    pub fn symmetric(rank: usize) -> Self {
        Self {
            classes: vec![0; rank],
        }
    }

    pub fn rank(&self) -> usize {
        self.classes.len()
    }

    /// Class id of each slot
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn class_of(&self, slot: usize) -> usize {
        self.classes[slot]
    }

    pub fn num_classes(&self) -> usize {
        self.classes.iter().copied().max().map_or(0, |m| m + 1)
    }

    pub fn same_class(&self, first: usize, second: usize) -> bool {
        self.classes[first] == self.classes[second]
    }

    /// Slot positions of each class, in slot order.
    fn class_slots(&self) -> Vec<MultiIndex> {
        let mut groups = vec![MultiIndex::new(); self.num_classes()];
        for (slot, &class) in self.classes.iter().enumerate() {
            groups[class].push(slot);
        }
        groups
    }

    /// Canonical representative of `index` under this symmetry.
    pub fn canonicalize(&self, index: &[usize]) -> MultiIndex {
        let mut canonical = MultiIndex::from_slice(index);
        for slots in self.class_slots() {
            if slots.len() < 2 {
                continue;
            }
            let mut values: MultiIndex = slots.iter().map(|&s| index[s]).collect();
            values.sort_unstable();
            for (&slot, value) in slots.iter().zip(values) {
                canonical[slot] = value;
            }
        }
        canonical
    }

    /// Check if `index` is its own canonical representative
    pub fn is_canonical(&self, index: &[usize]) -> bool {
        self.canonicalize(index).as_slice() == index
    }
}

/// Storage table for one tensor shape.
#[derive(Debug)]
pub(crate) struct Layout {
    extents: MultiIndex,
    /// Row-major flat index -> storage position
    lookup: Vec<usize>,
    /// Storage position -> canonical multi-index
    canonical: Vec<MultiIndex>,
}

impl Layout {
    pub(crate) fn build(extents: &[usize], symmetry: &Symmetry) -> Self {
        let total: usize = extents.iter().product();
        let mut lookup = Vec::with_capacity(total);
        let mut canonical: Vec<MultiIndex> = Vec::new();

        // Within a class the canonical index sorts values ascending, so it is
        // never later in row-major order than any index it represents.
        for index in MultiIndexIter::new(extents) {
            let canon = symmetry.canonicalize(&index);
            if canon == index {
                lookup.push(canonical.len());
                canonical.push(index);
            } else {
                let flat = flat_index(extents, &canon);
                lookup.push(lookup[flat]);
            }
        }

        Self {
            extents: MultiIndex::from_slice(extents),
            lookup,
            canonical,
        }
    }

    pub(crate) fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Number of stored components
    pub(crate) fn len(&self) -> usize {
        self.canonical.len()
    }

    /// Storage position of `index`, or None if out of bounds.
    pub(crate) fn storage_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.extents.len()
            || index.iter().zip(&self.extents).any(|(v, e)| v >= e)
        {
            return None;
        }
        Some(self.lookup[flat_index(&self.extents, index)])
    }

    pub(crate) fn canonical(&self, position: usize) -> &[usize] {
        &self.canonical[position]
    }
}

fn flat_index(extents: &[usize], index: &[usize]) -> usize {
    index
        .iter()
        .zip(extents)
        .fold(0, |acc, (&value, &extent)| acc * extent + value)
}

// ============================================================================
// ITERATORS
// ============================================================================

/// Iterator over all multi-indices of a shape, in row-major order.
pub(crate) struct MultiIndexIter {
    extents: MultiIndex,
    current: MultiIndex,
    done: bool,
}

impl MultiIndexIter {
    pub(crate) fn new(extents: &[usize]) -> Self {
        let done = extents.contains(&0);
        Self {
            extents: MultiIndex::from_slice(extents),
            current: MultiIndex::from_elem(0, extents.len()),
            done,
        }
    }
}

impl Iterator for MultiIndexIter {
    type Item = MultiIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.extents.is_empty() {
            self.done = true;
            return Some(MultiIndex::new());
        }

        let result = self.current.clone();

        // Advance (odometer style)
        for i in (0..self.extents.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.extents[i] {
                break;
            }
            self.current[i] = 0;
            if i == 0 {
                self.done = true;
            }
        }

        Some(result)
    }
}
