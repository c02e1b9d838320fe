//! Lexer for index notation
//!
//! Tokenizes source into a stream for the parser.

use chumsky::prelude::*;
use std::ops::Range;

/// Token types for index notation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    // Identifiers (operand names and index symbols)
    Ident(String),

    // Numeric literal, kept as written
    Number(String),

    // Punctuation
    LParen, // (
    RParen, // )
    Comma,  // ,
    Plus,   // +
    Minus,  // -
    Star,   // *
    Eq,     // =
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{}", s),
            Token::Number(s) => write!(f, "{}", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Eq => write!(f, "="),
        }
    }
}

/// Type alias for spans
pub type Span = Range<usize>;

/// Create a lexer for index notation
pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    let ident = text::ident().map(Token::Ident);

    // `12`, `0.5`; a sign is a separate token
    let number = text::int(10)
        .then(just('.').ignore_then(text::digits(10)).or_not())
        .map(|(int, frac): (String, Option<String>)| match frac {
            Some(frac) => Token::Number(format!("{}.{}", int, frac)),
            None => Token::Number(int),
        });

    let punctuation = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(',').to(Token::Comma),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('=').to(Token::Eq),
    ));

    // Comments: # to end of line
    let line_comment = just('#')
        .then(none_of('\n').repeated())
        .then(just('\n').or_not())
        .ignored();

    let token_or_skip = line_comment
        .to(None)
        .or(choice((number, ident, punctuation)).map(Some));

    token_or_skip
        .map_with_span(|opt_tok, span| opt_tok.map(|tok| (tok, span)))
        .padded()
        .repeated()
        .then_ignore(end())
        .map(|items| items.into_iter().flatten().collect())
}

// Unit tests in tests/unit_parsing.rs
