//! Compile parsed notation to expressions.
//!
//! Operand names are looked up in caller-supplied [`Bindings`]; index symbols
//! map to tokens with [`IndexToken::from_symbol`].

use indexmap::IndexMap;

use crate::ast::{Operand, Spanned, Statement, Term};
use crate::error::{ExprError, Result};
use crate::tensor::{Component, Tensor};

use super::eval::{evaluate, evaluate_into};
use super::token::IndexToken;
use super::tree::Expr;

/// Named tensors available to notation, in insertion order
#[derive(Debug)]
pub struct Bindings<'a, T> {
    tensors: IndexMap<String, &'a Tensor<T>>,
}

impl<T> Default for Bindings<'_, T> {
    fn default() -> Self {
        Self {
            tensors: IndexMap::new(),
        }
    }
}

impl<'a, T> Bindings<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the tensor previously bound to it
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        tensor: &'a Tensor<T>,
    ) -> Option<&'a Tensor<T>> {
        self.tensors.insert(name.into(), tensor)
    }

    /// Builder-style [`Bindings::insert`]
    pub fn with(mut self, name: impl Into<String>, tensor: &'a Tensor<T>) -> Self {
        self.insert(name, tensor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&'a Tensor<T>> {
        self.tensors.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }
}

/// An expression plus the output order it should be evaluated with
#[derive(Clone, Debug)]
pub struct CompiledStatement<'a, T> {
    pub target: Option<String>,
    pub output: Vec<IndexToken>,
    pub expr: Expr<'a, T>,
}

fn index_tokens(indices: &[Spanned<String>]) -> Result<Vec<IndexToken>> {
    indices
        .iter()
        .map(|symbol| {
            IndexToken::from_symbol(&symbol.node).ok_or_else(|| ExprError::UnknownIndex {
                symbol: symbol.node.clone(),
                span: symbol.span,
            })
        })
        .collect()
}

fn compile_operand<'a, T: Component>(
    op: &Operand,
    bindings: &Bindings<'a, T>,
) -> Result<Expr<'a, T>> {
    let tensor = bindings
        .get(&op.name.node)
        .ok_or_else(|| ExprError::UnknownOperand {
            name: op.name.node.clone(),
            span: op.name.span,
        })?;
    Expr::leaf(tensor, &index_tokens(&op.indices)?)
}

/// Compile an expression
pub fn compile_term<'a, T: Component>(
    term: &Term,
    bindings: &Bindings<'a, T>,
) -> Result<Expr<'a, T>> {
    match term {
        Term::Number(value) => Ok(Expr::literal(*value)),
        Term::Operand(op) => compile_operand(op, bindings),
        Term::Neg(inner) => Ok(compile_term(inner, bindings)?.negate()),
        Term::Add(l, r) => compile_term(l, bindings)?.try_add(compile_term(r, bindings)?),
        Term::Sub(l, r) => compile_term(l, bindings)?.try_sub(compile_term(r, bindings)?),
        Term::Mul(l, r) => compile_term(l, bindings)?.try_mul(compile_term(r, bindings)?),
    }
}

/// Compile a statement.
///
/// The output order is the target's index list, or the natural order of the
/// free indices when there is no target.
pub fn compile_statement<'a, T: Component>(
    statement: &Statement,
    bindings: &Bindings<'a, T>,
) -> Result<CompiledStatement<'a, T>> {
    let expr = compile_term(&statement.value, bindings)?;
    let (target, output) = match &statement.target {
        Some(target) => (Some(target.name.node.clone()), index_tokens(&target.indices)?),
        None => (None, expr.free_indices()),
    };
    Ok(CompiledStatement {
        target,
        output,
        expr,
    })
}

/// Parse, compile and evaluate `source` into a new tensor
pub fn evaluate_notation<T: Component>(
    source: &str,
    bindings: &Bindings<'_, T>,
) -> Result<Tensor<T>> {
    let statement = crate::parse(source)?;
    let compiled = compile_statement(&statement, bindings)?;
    evaluate(&compiled.output, &compiled.expr)
}

/// Parse, compile and evaluate `source` into `target`, see [`evaluate_into`]
pub fn evaluate_notation_into<T: Component>(
    source: &str,
    bindings: &Bindings<'_, T>,
    target: &mut Tensor<T>,
) -> Result<()> {
    let statement = crate::parse(source)?;
    let compiled = compile_statement(&statement, bindings)?;
    evaluate_into(target, &compiled.output, &compiled.expr)
}
