//! Generic index tokens.
//!
//! A token tags one slot of a tensor operand. Generic tokens carry a label,
//! a valence and a kind; they take part in matching (contraction) and become
//! free indices of the result. The time token pins a spacetime slot to
//! component 0 and never takes part in matching.

use std::fmt;

use crate::tensor::{IndexKind, Valence};

/// A labelled index: letter + valence + kind.
///
/// The valence is the role of the label in matching, independent of the
/// valence of the slot it is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericIndex {
    pub label: char,
    pub valence: Valence,
    pub kind: IndexKind,
}

impl GenericIndex {
    /// Same label with the opposite valence
    pub fn raised_or_lowered(self) -> Self {
        Self {
            valence: self.valence.opposite(),
            ..self
        }
    }
}

/// Index descriptor attached to an operand slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexToken {
    /// Ranges over the slot and participates in matching
    Generic(GenericIndex),
    /// Pinned to the time component of a spacetime slot
    Time(Valence),
}

impl IndexToken {
    pub const fn spatial(label: char, valence: Valence) -> Self {
        IndexToken::Generic(GenericIndex {
            label,
            valence,
            kind: IndexKind::Spatial,
        })
    }

    pub const fn spacetime(label: char, valence: Valence) -> Self {
        IndexToken::Generic(GenericIndex {
            label,
            valence,
            kind: IndexKind::Spacetime,
        })
    }

    pub const fn time(valence: Valence) -> Self {
        IndexToken::Time(valence)
    }

    /// Parse a one-letter index symbol.
    ///
    /// `a`-`h` are spacetime labels, `i`-`n` spatial labels and `t` the time
    /// index. Lowercase is lower valence, uppercase upper valence.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let mut chars = symbol.chars();
        let c = chars.next()?;
        if chars.next().is_some() || !c.is_ascii_alphabetic() {
            return None;
        }
        let valence = if c.is_ascii_uppercase() {
            Valence::Up
        } else {
            Valence::Lo
        };
        let label = c.to_ascii_lowercase();
        match label {
            'a'..='h' => Some(IndexToken::spacetime(label, valence)),
            'i'..='n' => Some(IndexToken::spatial(label, valence)),
            't' => Some(IndexToken::time(valence)),
            _ => None,
        }
    }

    pub fn generic(&self) -> Option<GenericIndex> {
        match self {
            IndexToken::Generic(index) => Some(*index),
            IndexToken::Time(_) => None,
        }
    }

    pub fn label(&self) -> Option<char> {
        self.generic().map(|index| index.label)
    }

    pub fn valence(&self) -> Valence {
        match self {
            IndexToken::Generic(index) => index.valence,
            IndexToken::Time(valence) => *valence,
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, IndexToken::Time(_))
    }
}

impl From<GenericIndex> for IndexToken {
    fn from(index: GenericIndex) -> Self {
        IndexToken::Generic(index)
    }
}

fn with_valence(c: char, valence: Valence) -> char {
    match valence {
        Valence::Up => c.to_ascii_uppercase(),
        Valence::Lo => c.to_ascii_lowercase(),
    }
}

impl fmt::Display for GenericIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", with_valence(self.label, self.valence))
    }
}

impl fmt::Display for IndexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexToken::Generic(index) => index.fmt(f),
            IndexToken::Time(valence) => write!(f, "{}", with_valence('t', *valence)),
        }
    }
}

/// Join tokens as `a, B, i`
pub(crate) fn join<I: fmt::Display>(items: impl IntoIterator<Item = I>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Predefined index tokens.
///
/// Conventionally imported as `use tensorex::indices as ti;` and written
/// `ti::a`, `ti::J`, `ti::T`.
#[allow(non_upper_case_globals)]
pub mod indices {
    use super::IndexToken;
    use crate::tensor::Valence::{Lo, Up};

    pub const a: IndexToken = IndexToken::spacetime('a', Lo);
    pub const b: IndexToken = IndexToken::spacetime('b', Lo);
    pub const c: IndexToken = IndexToken::spacetime('c', Lo);
    pub const d: IndexToken = IndexToken::spacetime('d', Lo);
    pub const e: IndexToken = IndexToken::spacetime('e', Lo);
    pub const f: IndexToken = IndexToken::spacetime('f', Lo);
    pub const g: IndexToken = IndexToken::spacetime('g', Lo);
    pub const h: IndexToken = IndexToken::spacetime('h', Lo);
    pub const A: IndexToken = IndexToken::spacetime('a', Up);
    pub const B: IndexToken = IndexToken::spacetime('b', Up);
    pub const C: IndexToken = IndexToken::spacetime('c', Up);
    pub const D: IndexToken = IndexToken::spacetime('d', Up);
    pub const E: IndexToken = IndexToken::spacetime('e', Up);
    pub const F: IndexToken = IndexToken::spacetime('f', Up);
    pub const G: IndexToken = IndexToken::spacetime('g', Up);
    pub const H: IndexToken = IndexToken::spacetime('h', Up);

    pub const i: IndexToken = IndexToken::spatial('i', Lo);
    pub const j: IndexToken = IndexToken::spatial('j', Lo);
    pub const k: IndexToken = IndexToken::spatial('k', Lo);
    pub const l: IndexToken = IndexToken::spatial('l', Lo);
    pub const m: IndexToken = IndexToken::spatial('m', Lo);
    pub const n: IndexToken = IndexToken::spatial('n', Lo);
    pub const I: IndexToken = IndexToken::spatial('i', Up);
    pub const J: IndexToken = IndexToken::spatial('j', Up);
    pub const K: IndexToken = IndexToken::spatial('k', Up);
    pub const L: IndexToken = IndexToken::spatial('l', Up);
    pub const M: IndexToken = IndexToken::spatial('m', Up);
    pub const N: IndexToken = IndexToken::spatial('n', Up);

    /// Time component, lower
    pub const t: IndexToken = IndexToken::time(Lo);
    /// Time component, upper
    pub const T: IndexToken = IndexToken::time(Up);
}
