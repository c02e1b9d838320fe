//! Expression trees over indexed tensors.
//!
//! Leaves borrow tensors from the caller and tag each slot with an
//! [`IndexToken`]. Nodes are combined with `+`, `-`, `*` and unary `-`;
//! indices are resolved as each node is built, so an `Expr` that exists is
//! structurally valid. Numeric literals are rank-0 leaves.

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::Result;
use crate::tensor::{Component, Tensor, TensorStructure};

use super::resolve::{
    Contraction, IndexSignature, SlotBinding, resolve_leaf, resolve_product, resolve_sum,
};
use super::token::IndexToken;

/// A tensor operand tagged with index tokens.
#[derive(Clone, Debug)]
pub(crate) struct Leaf<'a, T> {
    pub tensor: &'a Tensor<T>,
    pub tokens: Vec<IndexToken>,
    pub bindings: Vec<SlotBinding>,
    pub traces: Vec<Contraction>,
}

#[derive(Clone, Debug)]
pub(crate) enum ExprKind<'a, T> {
    Leaf(Leaf<'a, T>),
    Literal(f64),
    Negate(Box<Expr<'a, T>>),
    Sum(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    Product {
        left: Box<Expr<'a, T>>,
        right: Box<Expr<'a, T>>,
        contractions: Vec<Contraction>,
    },
}

/// An index-notation expression, resolved and ready to evaluate.
#[derive(Clone, Debug)]
pub struct Expr<'a, T> {
    kind: ExprKind<'a, T>,
    signature: IndexSignature,
}

/// Structure of an expression with values stripped out.
///
/// Two expressions with equal shapes resolve identically, so one evaluation
/// plan serves both.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Shape {
    Leaf {
        structure: TensorStructure,
        tokens: Vec<IndexToken>,
    },
    Literal,
    Negate(Box<Shape>),
    Sum(Box<Shape>, Box<Shape>),
    Product(Box<Shape>, Box<Shape>),
}

impl<'a, T: Component> Expr<'a, T> {
    /// Tag `tensor` with one token per slot
    pub fn leaf(tensor: &'a Tensor<T>, tokens: &[IndexToken]) -> Result<Self> {
        let resolved = resolve_leaf(tensor.structure(), tokens)?;
        Ok(Self {
            kind: ExprKind::Leaf(Leaf {
                tensor,
                tokens: tokens.to_vec(),
                bindings: resolved.bindings,
                traces: resolved.traces,
            }),
            signature: resolved.signature,
        })
    }

    /// Rank-0 constant, broadcast to the element shape of the tensor operands
    pub fn literal(value: f64) -> Self {
        Self {
            kind: ExprKind::Literal(value),
            signature: IndexSignature::default(),
        }
    }

    pub fn try_add(self, rhs: Self) -> Result<Self> {
        let signature = resolve_sum(&self.signature, &rhs.signature)?;
        Ok(Self {
            kind: ExprKind::Sum(Box::new(self), Box::new(rhs)),
            signature,
        })
    }

    pub fn try_sub(self, rhs: Self) -> Result<Self> {
        self.try_add(rhs.negate())
    }

    /// Product; labels common to both sides with opposite valence are summed.
    pub fn try_mul(self, rhs: Self) -> Result<Self> {
        let (signature, contractions) = resolve_product(&self.signature, &rhs.signature)?;
        Ok(Self {
            kind: ExprKind::Product {
                left: Box::new(self),
                right: Box::new(rhs),
                contractions,
            },
            signature,
        })
    }

    pub fn negate(self) -> Self {
        let signature = self.signature.clone();
        Self {
            kind: ExprKind::Negate(Box::new(self)),
            signature,
        }
    }

    /// Free indices in natural (evaluation) order
    pub fn free_indices(&self) -> Vec<IndexToken> {
        self.signature
            .free
            .iter()
            .map(|free| IndexToken::Generic(free.index))
            .collect()
    }

    pub fn rank(&self) -> usize {
        self.signature.rank()
    }

    pub(crate) fn kind(&self) -> &ExprKind<'a, T> {
        &self.kind
    }

    pub(crate) fn signature(&self) -> &IndexSignature {
        &self.signature
    }

    /// Tensor operands in left-to-right order
    pub(crate) fn operands(&self) -> Vec<&'a Tensor<T>> {
        let mut out = Vec::new();
        self.visit(&mut |kind| {
            if let ExprKind::Leaf(leaf) = kind {
                out.push(leaf.tensor);
            }
        });
        out
    }

    /// Literal values in left-to-right order
    pub(crate) fn literals(&self) -> Vec<f64> {
        let mut out = Vec::new();
        self.visit(&mut |kind| {
            if let ExprKind::Literal(value) = kind {
                out.push(*value);
            }
        });
        out
    }

    pub(crate) fn shape(&self) -> Shape {
        match &self.kind {
            ExprKind::Leaf(leaf) => Shape::Leaf {
                structure: leaf.tensor.structure().clone(),
                tokens: leaf.tokens.clone(),
            },
            ExprKind::Literal(_) => Shape::Literal,
            ExprKind::Negate(inner) => Shape::Negate(Box::new(inner.shape())),
            ExprKind::Sum(left, right) => {
                Shape::Sum(Box::new(left.shape()), Box::new(right.shape()))
            }
            ExprKind::Product { left, right, .. } => {
                Shape::Product(Box::new(left.shape()), Box::new(right.shape()))
            }
        }
    }

    fn visit(&self, f: &mut impl FnMut(&ExprKind<'a, T>)) {
        f(&self.kind);
        match &self.kind {
            ExprKind::Leaf(_) | ExprKind::Literal(_) => {}
            ExprKind::Negate(inner) => inner.visit(f),
            ExprKind::Sum(left, right) | ExprKind::Product { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
        }
    }
}

impl<T: Component> Tensor<T> {
    /// Tag this tensor with index tokens, one per slot
    pub fn expr(&self, tokens: &[IndexToken]) -> Result<Expr<'_, T>> {
        Expr::leaf(self, tokens)
    }

    /// Like [`Tensor::expr`], panicking on an invalid token list
    pub fn ix(&self, tokens: &[IndexToken]) -> Expr<'_, T> {
        match Expr::leaf(self, tokens) {
            Ok(expr) => expr,
            Err(err) => panic!("invalid tensor operand: {}", err),
        }
    }
}

// ============================================================================
// OPERATORS
// ============================================================================

impl<'a, T: Component> Add for Expr<'a, T> {
    type Output = Expr<'a, T>;

    fn add(self, rhs: Self) -> Self::Output {
        match self.try_add(rhs) {
            Ok(expr) => expr,
            Err(err) => panic!("invalid tensor sum: {}", err),
        }
    }
}

impl<'a, T: Component> Sub for Expr<'a, T> {
    type Output = Expr<'a, T>;

    fn sub(self, rhs: Self) -> Self::Output {
        match self.try_sub(rhs) {
            Ok(expr) => expr,
            Err(err) => panic!("invalid tensor difference: {}", err),
        }
    }
}

impl<'a, T: Component> Mul for Expr<'a, T> {
    type Output = Expr<'a, T>;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.try_mul(rhs) {
            Ok(expr) => expr,
            Err(err) => panic!("invalid tensor product: {}", err),
        }
    }
}

impl<'a, T: Component> Neg for Expr<'a, T> {
    type Output = Expr<'a, T>;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

macro_rules! literal_ops {
    ($($trait:ident $method:ident),*) => {$(
        impl<'a, T: Component> $trait<f64> for Expr<'a, T> {
            type Output = Expr<'a, T>;

            fn $method(self, rhs: f64) -> Self::Output {
                let rhs: Expr<'a, T> = Expr::literal(rhs);
                $trait::$method(self, rhs)
            }
        }

        impl<'a, T: Component> $trait<Expr<'a, T>> for f64 {
            type Output = Expr<'a, T>;

            fn $method(self, rhs: Expr<'a, T>) -> Self::Output {
                let lhs: Expr<'a, T> = Expr::literal(self);
                $trait::$method(lhs, rhs)
            }
        }
    )*};
}

literal_ops!(Add add, Sub sub, Mul mul);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExprError;
    use crate::expr::indices as ti;
    use crate::tensor::{Frame, SlotSpec, Valence};

    fn spacetime_vector(valence: Valence) -> Tensor<f64> {
        let slot = SlotSpec::spacetime(3, valence, Frame::Inertial);
        Tensor::from_fn(TensorStructure::asymmetric(vec![slot]), |idx| idx[0] as f64)
    }

    #[test]
    fn test_free_indices_after_contraction() {
        let r = spacetime_vector(Valence::Up);
        let s = spacetime_vector(Valence::Lo);
        let expr = r.ix(&[ti::A]) * s.ix(&[ti::a]) * s.ix(&[ti::b]);
        assert_eq!(expr.free_indices(), vec![ti::b]);
        assert_eq!(expr.operands().len(), 3);
    }

    #[test]
    fn test_sum_requires_same_free_indices() {
        let r = spacetime_vector(Valence::Lo);
        let err = r.ix(&[ti::a]).try_add(r.ix(&[ti::b])).unwrap_err();
        assert!(matches!(err, ExprError::MismatchedSumIndices { .. }));
    }

    #[test]
    fn test_literals_collected_in_order() {
        let r = Tensor::scalar(2.0);
        let expr = 3.0 * r.ix(&[]) - 1.5;
        assert_eq!(expr.literals(), vec![3.0, 1.5]);
        assert_eq!(expr.rank(), 0);
    }

    #[test]
    fn test_equal_shapes_for_different_values() {
        let r = spacetime_vector(Valence::Lo);
        let s = Tensor::new(r.structure().clone(), 9.0);
        assert_eq!(r.ix(&[ti::a]).shape(), s.ix(&[ti::a]).shape());
        assert_ne!(r.ix(&[ti::a]).shape(), s.ix(&[ti::b]).shape());
    }

    #[test]
    #[should_panic(expected = "invalid tensor product")]
    fn test_same_valence_product_panics() {
        let r = spacetime_vector(Valence::Lo);
        let _ = r.ix(&[ti::a]) * r.ix(&[ti::a]);
    }
}
