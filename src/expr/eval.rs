//! Evaluation entry points.

use crate::error::Result;
use crate::tensor::{Component, Tensor};

use super::plan::Plan;
use super::token::IndexToken;
use super::tree::Expr;

/// Evaluate `expr` into a new tensor whose slots follow `output`.
///
/// `output` must list exactly the free indices of `expr`, in any order. The
/// result's slot metadata comes from the operand slots each free index was
/// attached to; result slots are symmetric when every term of the expression
/// is symmetric in the corresponding indices.
///
/// ```
/// use tensorex::indices as ti;
/// use tensorex::{Frame, SlotSpec, Tensor, TensorStructure, Valence, evaluate};
///
/// let slot = SlotSpec::spatial(3, Valence::Lo, Frame::Grid);
/// let s = Tensor::from_fn(TensorStructure::asymmetric(vec![slot, slot]), |idx| {
///     (3 * idx[0] + idx[1]) as f64
/// });
/// let r = Tensor::scalar(2.0);
///
/// let l = evaluate(&[ti::j, ti::i], &(r.ix(&[]) * s.ix(&[ti::i, ti::j]))).unwrap();
/// assert_eq!(*l.get(&[2, 0]), 2.0 * s.get(&[0, 2]));
/// ```
pub fn evaluate<T: Component>(output: &[IndexToken], expr: &Expr<'_, T>) -> Result<Tensor<T>> {
    Plan::for_output(expr, output)?.execute_new(expr)
}

/// Evaluate `expr` into the components of `target` it reaches.
///
/// `output` assigns one token per target slot. A time token pins its slot to
/// component 0 and a spatial label on a spacetime slot covers components
/// `1..=dim`; every other component of `target` is left unchanged, so callers
/// needing a fully defined result must initialize `target` first.
pub fn evaluate_into<T: Component>(
    target: &mut Tensor<T>,
    output: &[IndexToken],
    expr: &Expr<'_, T>,
) -> Result<()> {
    Plan::for_target(expr, output, target.structure())?.execute_into(target, expr)
}
