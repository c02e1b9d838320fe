//! Index resolution and contraction planning.
//!
//! Every expression node carries an [`IndexSignature`]: the free indices it
//! exposes (with the effective slot metadata of each) and the labels already
//! summed inside it. Signatures are computed bottom-up as the tree is built,
//! so structural errors surface at construction.
//!
//! Free indices also carry a *symmetry group*. Two free indices in the same
//! group are interchangeable in every term of the expression, which makes the
//! corresponding output slots symmetric.

use indexmap::IndexMap;

use crate::error::{ExprError, Result};
use crate::tensor::{IndexKind, SlotSpec, Symmetry, TensorStructure, Valence};

use super::token::{GenericIndex, IndexToken, join};

/// A free index of an expression node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FreeIndex {
    pub index: GenericIndex,
    /// Effective metadata: token valence, and spatial kind when a spatial
    /// label ranges over a spacetime slot
    pub spec: SlotSpec,
    pub group: usize,
}

/// Free and summed indices of an expression node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct IndexSignature {
    pub free: Vec<FreeIndex>,
    pub dummies: Vec<char>,
    pub groups: usize,
}

impl IndexSignature {
    fn find(&self, label: char) -> Option<&FreeIndex> {
        self.free.iter().find(|free| free.index.label == label)
    }

    fn mentions(&self, label: char) -> bool {
        self.find(label).is_some() || self.dummies.contains(&label)
    }

    pub fn rank(&self) -> usize {
        self.free.len()
    }

    fn describe(&self) -> String {
        join(self.free.iter().map(|free| free.index))
    }
}

/// How one tensor slot is addressed during evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SlotBinding {
    /// Component = value of `label` + `offset`
    Label { label: char, offset: usize },
    /// Fixed component
    Fixed(usize),
}

/// A summed label and the number of values it ranges over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Contraction {
    pub label: char,
    pub extent: usize,
}

/// Result of resolving one leaf.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedLeaf {
    pub bindings: Vec<SlotBinding>,
    pub traces: Vec<Contraction>,
    pub signature: IndexSignature,
}

/// Output structure plus how each output slot is addressed.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedOutput {
    pub structure: TensorStructure,
    pub bindings: Vec<SlotBinding>,
}

// ============================================================================
// SLOT BINDING
// ============================================================================

/// Effective metadata and binding of a generic token attached to `slot`.
fn bind_generic(
    position: usize,
    slot: &SlotSpec,
    index: GenericIndex,
) -> Result<(SlotSpec, usize)> {
    let spec = slot.with_valence(index.valence);
    match (slot.kind, index.kind) {
        (IndexKind::Spatial, IndexKind::Spatial) | (IndexKind::Spacetime, IndexKind::Spacetime) => {
            Ok((spec, 0))
        }
        // Spatial label on a spacetime slot skips the time component
        (IndexKind::Spacetime, IndexKind::Spatial) => Ok((spec.with_kind(IndexKind::Spatial), 1)),
        (IndexKind::Spatial, IndexKind::Spacetime) => Err(ExprError::SpacetimeLabelOnSpatialSlot {
            label: index.label,
            slot: position,
        }),
    }
}

fn bind_time(position: usize, slot: &SlotSpec, token: &IndexToken) -> Result<SlotBinding> {
    if slot.kind != IndexKind::Spacetime {
        return Err(ExprError::TimeIndexOnSpatialSlot { slot: position });
    }
    if token.valence() != slot.valence {
        return Err(ExprError::TimeIndexValence { slot: position });
    }
    Ok(SlotBinding::Fixed(0))
}

/// Contracted pairs must range over the same components of the same frame.
fn contractible(left: &SlotSpec, right: &SlotSpec) -> bool {
    left.kind == right.kind && left.dim == right.dim && left.frame == right.frame
}

/// Classify a label seen twice: contraction if valences are opposite.
fn pair_up(first: &FreeIndex, second: &FreeIndex) -> Result<Contraction> {
    let label = first.index.label;
    if first.index.kind != second.index.kind {
        return Err(ExprError::LabelKindConflict { label });
    }
    if first.index.valence == second.index.valence {
        return Err(ExprError::RepeatedIndex { label });
    }
    if !contractible(&first.spec, &second.spec) {
        return Err(ExprError::IncompatibleContraction {
            label,
            left: first.spec,
            right: second.spec,
        });
    }
    Ok(Contraction {
        label,
        extent: first.spec.extent(),
    })
}

// ============================================================================
// NODES
// ============================================================================

/// Resolve the token list of a single tensor operand.
///
/// A label appearing twice with opposite valences is a trace over that pair
/// of slots.
pub(crate) fn resolve_leaf(
    structure: &TensorStructure,
    tokens: &[IndexToken],
) -> Result<ResolvedLeaf> {
    if tokens.len() != structure.rank() {
        return Err(ExprError::RankMismatch {
            rank: structure.rank(),
            got: tokens.len(),
        });
    }

    let symmetry = structure.symmetry();
    let mut bindings = Vec::with_capacity(tokens.len());
    let mut seen: IndexMap<char, Vec<FreeIndex>> = IndexMap::new();
    let mut groups: IndexMap<(usize, IndexKind, Valence), usize> = IndexMap::new();

    for (position, (token, slot)) in tokens.iter().zip(structure.slots()).enumerate() {
        match token {
            IndexToken::Time(_) => bindings.push(bind_time(position, slot, token)?),
            IndexToken::Generic(index) => {
                let (spec, offset) = bind_generic(position, slot, *index)?;
                let key = (symmetry.class_of(position), index.kind, index.valence);
                let next = groups.len();
                let group = *groups.entry(key).or_insert(next);
                bindings.push(SlotBinding::Label {
                    label: index.label,
                    offset,
                });
                seen.entry(index.label).or_default().push(FreeIndex {
                    index: *index,
                    spec,
                    group,
                });
            }
        }
    }

    let mut signature = IndexSignature {
        groups: groups.len(),
        ..IndexSignature::default()
    };
    let mut traces = Vec::new();
    for (label, occurrences) in seen {
        match occurrences.as_slice() {
            [single] => signature.free.push(*single),
            [first, second] => {
                traces.push(pair_up(first, second)?);
                signature.dummies.push(label);
            }
            _ => return Err(ExprError::ReusedIndex { label }),
        }
    }

    Ok(ResolvedLeaf {
        bindings,
        traces,
        signature,
    })
}

/// Resolve a product: common labels with opposite valence contract away.
pub(crate) fn resolve_product(
    left: &IndexSignature,
    right: &IndexSignature,
) -> Result<(IndexSignature, Vec<Contraction>)> {
    for &label in &right.dummies {
        if left.mentions(label) {
            return Err(ExprError::ReusedIndex { label });
        }
    }
    for &label in &left.dummies {
        if right.mentions(label) {
            return Err(ExprError::ReusedIndex { label });
        }
    }

    let mut contractions = Vec::new();
    for free in &right.free {
        if let Some(other) = left.find(free.index.label) {
            contractions.push(pair_up(other, free)?);
        }
    }
    let contracted = |label: char| contractions.iter().any(|c: &Contraction| c.label == label);

    let mut free: Vec<FreeIndex> = left
        .free
        .iter()
        .filter(|f| !contracted(f.index.label))
        .copied()
        .collect();
    free.extend(
        right
            .free
            .iter()
            .filter(|f| !contracted(f.index.label))
            .map(|f| FreeIndex {
                group: f.group + left.groups,
                ..*f
            }),
    );

    let mut dummies = left.dummies.clone();
    dummies.extend(&right.dummies);
    dummies.extend(contractions.iter().map(|c| c.label));

    let signature = IndexSignature {
        free,
        dummies,
        groups: left.groups + right.groups,
    };
    Ok((signature, contractions))
}

/// Resolve a sum: both terms must expose the same free indices.
///
/// The result keeps the left term's order. Two free indices share a group
/// only if they share one in both terms.
pub(crate) fn resolve_sum(left: &IndexSignature, right: &IndexSignature) -> Result<IndexSignature> {
    let same_set = left.free.len() == right.free.len()
        && left
            .free
            .iter()
            .all(|l| right.free.iter().any(|r| r.index == l.index));
    if !same_set {
        return Err(ExprError::MismatchedSumIndices {
            left: left.describe(),
            right: right.describe(),
        });
    }

    let mut groups: IndexMap<(usize, usize), usize> = IndexMap::new();
    let mut free = Vec::with_capacity(left.free.len());
    for l in &left.free {
        let Some(r) = right.free.iter().find(|r| r.index == l.index) else {
            continue;
        };
        if l.spec != r.spec {
            return Err(ExprError::IncompatibleSumIndex {
                label: l.index.label,
                left: l.spec,
                right: r.spec,
            });
        }
        let next = groups.len();
        let group = *groups.entry((l.group, r.group)).or_insert(next);
        free.push(FreeIndex { group, ..*l });
    }

    let mut dummies = left.dummies.clone();
    for &label in &right.dummies {
        if !dummies.contains(&label) {
            dummies.push(label);
        }
    }
    for f in &free {
        if dummies.contains(&f.index.label) {
            return Err(ExprError::ReusedIndex {
                label: f.index.label,
            });
        }
    }

    Ok(IndexSignature {
        free,
        dummies,
        groups: groups.len(),
    })
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Check that the generic output tokens are exactly the free indices.
fn check_output_labels(signature: &IndexSignature, output: &[GenericIndex]) -> Result<()> {
    for (pos, index) in output.iter().enumerate() {
        if output[..pos].iter().any(|o| o.label == index.label) {
            return Err(ExprError::DuplicateOutputIndex { label: index.label });
        }
    }
    let matches = output.len() == signature.free.len()
        && output
            .iter()
            .all(|o| signature.free.iter().any(|f| f.index == *o));
    if !matches {
        return Err(ExprError::OutputMismatch {
            expected: signature.describe(),
            got: join(output),
        });
    }
    Ok(())
}

fn free_index(signature: &IndexSignature, index: GenericIndex) -> Result<&FreeIndex> {
    signature
        .find(index.label)
        .ok_or_else(|| ExprError::OutputMismatch {
            expected: signature.describe(),
            got: index.to_string(),
        })
}

/// Output structure for allocating evaluation.
///
/// Slots follow `output`; each slot takes the effective metadata of its free
/// index, and slots whose indices share a group are symmetric.
pub(crate) fn resolve_output(
    signature: &IndexSignature,
    output: &[IndexToken],
) -> Result<ResolvedOutput> {
    let mut generic = Vec::with_capacity(output.len());
    for token in output {
        match token {
            IndexToken::Generic(index) => generic.push(*index),
            IndexToken::Time(_) => return Err(ExprError::TimeIndexNeedsTarget),
        }
    }
    check_output_labels(signature, &generic)?;

    let mut slots = Vec::with_capacity(generic.len());
    let mut classes = Vec::with_capacity(generic.len());
    let mut bindings = Vec::with_capacity(generic.len());
    for index in &generic {
        let free = free_index(signature, *index)?;
        slots.push(free.spec);
        classes.push(free.group);
        bindings.push(SlotBinding::Label {
            label: index.label,
            offset: 0,
        });
    }

    let structure = TensorStructure::with_symmetry(Symmetry::new(&classes), slots)?;
    Ok(ResolvedOutput {
        structure,
        bindings,
    })
}

/// Bindings for in-place evaluation into a tensor with `target` structure.
///
/// Time tokens pin their slot; a spatial label on a spacetime slot writes
/// components `1..=dim` only.
pub(crate) fn resolve_target(
    signature: &IndexSignature,
    output: &[IndexToken],
    target: &TensorStructure,
) -> Result<ResolvedOutput> {
    if output.len() != target.rank() {
        return Err(ExprError::RankMismatch {
            rank: target.rank(),
            got: output.len(),
        });
    }
    let generic: Vec<GenericIndex> = output.iter().filter_map(IndexToken::generic).collect();
    check_output_labels(signature, &generic)?;

    let mut bindings = Vec::with_capacity(output.len());
    for (position, (token, slot)) in output.iter().zip(target.slots()).enumerate() {
        match token {
            IndexToken::Time(_) => bindings.push(bind_time(position, slot, token)?),
            IndexToken::Generic(index) => {
                let (spec, offset) = bind_generic(position, slot, *index)?;
                let free = free_index(signature, *index)?;
                if spec != free.spec {
                    return Err(ExprError::IncompatibleOutputSlot {
                        slot: position,
                        label: index.label,
                        slot_spec: spec,
                        index_spec: free.spec,
                    });
                }
                bindings.push(SlotBinding::Label {
                    label: index.label,
                    offset,
                });
            }
        }
    }

    Ok(ResolvedOutput {
        structure: target.clone(),
        bindings,
    })
}
