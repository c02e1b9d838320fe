//! Abstract syntax tree for index notation
//!
//! A statement is an optional target followed by an expression:
//! `L(j, i) = R * S(i, j) + 2 * T(j, i)`.

use std::fmt;

/// A span in the source code, for error reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A node with source location
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A named tensor with its index symbols: `S(i, J)`, `R()` or `R`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    pub name: Spanned<String>,
    pub indices: Vec<Spanned<String>>,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.node)?;
        if !self.indices.is_empty() {
            let indices: Vec<&str> = self.indices.iter().map(|i| i.node.as_str()).collect();
            write!(f, "({})", indices.join(", "))?;
        }
        Ok(())
    }
}

/// Expressions
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Numeric literal
    Number(f64),
    /// Indexed tensor
    Operand(Operand),
    /// `-t`
    Neg(Box<Term>),
    /// `a + b`
    Add(Box<Term>, Box<Term>),
    /// `a - b`
    Sub(Box<Term>, Box<Term>),
    /// `a * b`
    Mul(Box<Term>, Box<Term>),
}

impl Term {
    /// Operands in left-to-right order
    pub fn operands(&self) -> Vec<&Operand> {
        let mut out = Vec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands<'a>(&'a self, out: &mut Vec<&'a Operand>) {
        match self {
            Term::Number(_) => {}
            Term::Operand(op) => out.push(op),
            Term::Neg(inner) => inner.collect_operands(out),
            Term::Add(l, r) | Term::Sub(l, r) | Term::Mul(l, r) => {
                l.collect_operands(out);
                r.collect_operands(out);
            }
        }
    }
}

/// `[target =] value`
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub target: Option<Operand>,
    pub value: Term,
}
