//! Dense, symmetry-compressed tensor (materialized).

use super::structure::TensorStructure;

/// A dense tensor storing one component per symmetry-equivalence class.
///
/// Components are addressed by a multi-index with one value per slot. Any
/// permutation of values within a symmetry class addresses the same stored
/// component.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T> {
    structure: TensorStructure,
    data: Vec<T>,
}

impl<T: Clone> Tensor<T> {
    /// Create a tensor with every component set to `fill`
    pub fn new(structure: TensorStructure, fill: T) -> Self {
        let data = vec![fill; structure.num_components()];
        Self { structure, data }
    }
}

impl<T> Tensor<T> {
    /// Rank-0 tensor holding `value`
    pub fn scalar(value: T) -> Self {
        Self {
            structure: TensorStructure::scalar(),
            data: vec![value],
        }
    }

    /// Create a tensor by evaluating `f` once per stored component.
    ///
    /// `f` receives the canonical multi-index of each component, in storage order.
    pub fn from_fn(structure: TensorStructure, mut f: impl FnMut(&[usize]) -> T) -> Self {
        let layout = structure.layout();
        let data = (0..layout.len()).map(|pos| f(layout.canonical(pos))).collect();
        Self { structure, data }
    }

    pub fn structure(&self) -> &TensorStructure {
        &self.structure
    }

    pub fn rank(&self) -> usize {
        self.structure.rank()
    }

    /// Number of stored (independent) components
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Component at `index`, or None if the index is out of bounds
    pub fn try_get(&self, index: &[usize]) -> Option<&T> {
        self.structure.storage_index(index).map(|pos| &self.data[pos])
    }

    /// Component at `index`.
    ///
    /// # Panics
    /// If `index` has the wrong length or a value exceeds its slot's extent.
    pub fn get(&self, index: &[usize]) -> &T {
        let pos = self.position(index);
        &self.data[pos]
    }

    pub fn get_mut(&mut self, index: &[usize]) -> &mut T {
        let pos = self.position(index);
        &mut self.data[pos]
    }

    /// Set the component at `index` (and every symmetric image of it)
    pub fn set(&mut self, index: &[usize], value: T) {
        *self.get_mut(index) = value;
    }

    /// Stored components with their canonical multi-indices
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], &T)> {
        let layout = self.structure.layout();
        self.data
            .iter()
            .enumerate()
            .map(move |(pos, value)| (layout.canonical(pos), value))
    }

    /// Stored components in storage order
    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub(crate) fn from_parts(structure: TensorStructure, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), structure.num_components());
        Self { structure, data }
    }

    fn position(&self, index: &[usize]) -> usize {
        match self.structure.storage_index(index) {
            Some(pos) => pos,
            None => panic!(
                "component index {:?} out of bounds for extents {:?}",
                index,
                self.structure.extents()
            ),
        }
    }
}
