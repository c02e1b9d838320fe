//! Pretty-printer for index notation
//!
//! Renders AST back to source syntax for round-trip testing. Parentheses are
//! emitted only where precedence or left-associativity requires them, so
//! parsing the output yields the same tree.

use crate::ast::*;

/// Binding strength, loosest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Sum,
    Product,
    Unary,
    Atom,
}

fn prec(t: &Term) -> Prec {
    match t {
        Term::Add(..) | Term::Sub(..) => Prec::Sum,
        Term::Mul(..) => Prec::Product,
        Term::Neg(_) => Prec::Unary,
        Term::Number(_) | Term::Operand(_) => Prec::Atom,
    }
}

/// A pretty-printer accumulating output
#[derive(Default)]
pub struct Pretty {
    output: String,
}

impl Pretty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }
}

// ============ Pretty-printing implementations ============

impl Pretty {
    pub fn statement(&mut self, s: &Statement) {
        if let Some(target) = &s.target {
            self.operand(target);
            self.write(" = ");
        }
        self.term(&s.value);
    }

    pub fn operand(&mut self, op: &Operand) {
        self.write(&op.to_string());
    }

    pub fn term(&mut self, t: &Term) {
        match t {
            Term::Number(v) => self.write(&v.to_string()),
            Term::Operand(op) => self.operand(op),
            Term::Neg(inner) => {
                self.write("-");
                self.term_at(inner, Prec::Unary);
            }
            Term::Add(l, r) => self.binary(l, " + ", r, Prec::Sum),
            Term::Sub(l, r) => self.binary(l, " - ", r, Prec::Sum),
            Term::Mul(l, r) => self.binary(l, " * ", r, Prec::Product),
        }
    }

    /// Left operand at the operator's precedence, right one level tighter
    fn binary(&mut self, l: &Term, op: &str, r: &Term, at: Prec) {
        self.term_at(l, at);
        self.write(op);
        let right = match at {
            Prec::Sum => Prec::Product,
            _ => Prec::Unary,
        };
        self.term_at(r, right);
    }

    fn term_at(&mut self, t: &Term, min: Prec) {
        if prec(t) < min {
            self.write("(");
            self.term(t);
            self.write(")");
        } else {
            self.term(t);
        }
    }
}

/// Render a statement as canonical notation
pub fn pretty_print(statement: &Statement) -> String {
    let mut p = Pretty::new();
    p.statement(statement);
    p.finish()
}

/// Render an expression as canonical notation
pub fn pretty_print_term(term: &Term) -> String {
    let mut p = Pretty::new();
    p.term(term);
    p.finish()
}
