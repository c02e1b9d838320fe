//! Tensorex: index-notation evaluation of symmetry-compressed tensors
//!
//! Tensors store one component per symmetry class. Expressions tag tensor
//! slots with generic indices (`R(A) * S(a, b)`), contract repeated labels of
//! opposite valence, and evaluate into a new tensor or into selected
//! components of an existing one.
//!
//! ```
//! use tensorex::indices as ti;
//! use tensorex::{Frame, SlotSpec, Tensor, TensorStructure, Valence, evaluate};
//!
//! let up = SlotSpec::spacetime(3, Valence::Up, Frame::Inertial);
//! let lo = SlotSpec::spacetime(3, Valence::Lo, Frame::Inertial);
//! let r = Tensor::from_fn(TensorStructure::asymmetric(vec![up]), |idx| idx[0] as f64);
//! let s = Tensor::from_fn(TensorStructure::asymmetric(vec![lo]), |idx| idx[0] as f64 + 1.0);
//!
//! let dot = evaluate(&[], &(r.ix(&[ti::A]) * s.ix(&[ti::a]))).unwrap();
//! assert_eq!(*dot.get(&[]), 0.0 * 1.0 + 1.0 * 2.0 + 2.0 * 3.0 + 3.0 * 4.0);
//! ```

pub mod ast;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod tensor;

pub use error::{ExprError, Result};
pub use expr::*;
pub use lexer::lexer;
pub use parser::parser;
pub use pretty::{pretty_print, pretty_print_term};
pub use tensor::{
    Component, DataVector, Frame, IndexKind, MultiIndex, SlotSpec, Symmetry, Tensor,
    TensorStructure, Valence,
};

/// Parse one index-notation statement
pub fn parse(input: &str) -> Result<ast::Statement> {
    use chumsky::prelude::*;

    let tokens = lexer::lexer()
        .parse(input)
        .map_err(|errs| ExprError::Notation(error::format_lexer_errors(input, errs)))?;

    let len = input.len();
    parser::parser()
        .parse(chumsky::Stream::from_iter(len..len + 1, tokens.into_iter()))
        .map_err(|errs| ExprError::Notation(error::format_parser_errors(input, errs)))
}
