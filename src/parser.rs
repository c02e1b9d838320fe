//! Parser for index notation
//!
//! Parses token streams into AST. Precedence, loosest first: `+`/`-`
//! (left-assoc), `*` (left-assoc), unary `-`.

use chumsky::prelude::*;

use crate::ast::*;
use crate::lexer::{Span, Token};

/// Create a parser for a single statement
pub fn parser() -> impl Parser<Token, Statement, Error = Simple<Token>> + Clone {
    let target = operand().then_ignore(just(Token::Eq)).or_not();

    target
        .then(term())
        .then_ignore(end())
        .map(|(target, value)| Statement { target, value })
}

fn to_span(span: Span) -> crate::ast::Span {
    crate::ast::Span::new(span.start, span.end)
}

// ============================================================================
// Helpers
// ============================================================================

fn ident() -> impl Parser<Token, Spanned<String>, Error = Simple<Token>> + Clone {
    select! { Token::Ident(s) => s }.map_with_span(|s, span| Spanned::new(s, to_span(span)))
}

/// `Name`, `Name()` or `Name(i, J, ...)`
fn operand() -> impl Parser<Token, Operand, Error = Simple<Token>> + Clone {
    let indices = ident()
        .separated_by(just(Token::Comma))
        .delimited_by(just(Token::LParen), just(Token::RParen));

    ident()
        .then(indices.or_not())
        .map(|(name, indices)| Operand {
            name,
            indices: indices.unwrap_or_default(),
        })
}

fn number() -> impl Parser<Token, f64, Error = Simple<Token>> + Clone {
    select! { Token::Number(s) => s }.try_map(|s, span| {
        s.parse::<f64>()
            .map_err(|_| Simple::custom(span, format!("invalid number '{}'", s)))
    })
}

// ============================================================================
// Terms
// ============================================================================

#[derive(Clone, Copy)]
enum AddOp {
    Add,
    Sub,
}

fn term() -> impl Parser<Token, Term, Error = Simple<Token>> + Clone {
    recursive(|term| {
        let paren_term = term
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = choice((
            number().map(Term::Number),
            operand().map(Term::Operand),
            paren_term,
        ));

        // Unary minus: `--R` is `-(-R)`
        let unary = just(Token::Minus)
            .repeated()
            .then(atom)
            .foldr(|_, t| Term::Neg(Box::new(t)));

        let product = unary
            .clone()
            .then(just(Token::Star).ignore_then(unary).repeated())
            .foldl(|a, b| Term::Mul(Box::new(a), Box::new(b)));

        let add_op = choice((
            just(Token::Plus).to(AddOp::Add),
            just(Token::Minus).to(AddOp::Sub),
        ));

        product
            .clone()
            .then(add_op.then(product).repeated())
            .foldl(|a, (op, b)| match op {
                AddOp::Add => Term::Add(Box::new(a), Box::new(b)),
                AddOp::Sub => Term::Sub(Box::new(a), Box::new(b)),
            })
    })
}
