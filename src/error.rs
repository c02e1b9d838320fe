//! Error types for tensor expressions
//!
//! Structural errors are reported while an expression is assembled or bound
//! to an output; evaluation itself cannot fail once a plan exists. Notation
//! errors are rendered with ariadne over the source text.

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::prelude::Simple;
use thiserror::Error;

use crate::ast::Span;
use crate::lexer::Token;
use crate::tensor::SlotSpec;

/// Result type alias using the crate's error
pub type Result<T> = std::result::Result<T, ExprError>;

/// Errors raised while building, binding or planning tensor expressions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// Index list length differs from the tensor rank
    #[error("tensor of rank {rank} indexed with {got} indices")]
    RankMismatch { rank: usize, got: usize },

    /// Symmetry partition does not cover every slot exactly once
    #[error("symmetry has {classes} entries but tensor has {slots} slots")]
    SymmetryRank { slots: usize, classes: usize },

    /// Slots in one symmetry class must have identical metadata
    #[error("slots {first} and {second} are symmetric but have different index types")]
    SymmetricSlotMismatch { first: usize, second: usize },

    /// A spacetime label cannot range over a spatial slot
    #[error("spacetime index '{label}' used for spatial slot {slot}")]
    SpacetimeLabelOnSpatialSlot { label: char, slot: usize },

    /// Time tokens may only pin spacetime slots
    #[error("time index used for spatial slot {slot}")]
    TimeIndexOnSpatialSlot { slot: usize },

    /// Time token valence must match the slot it pins
    #[error("time index valence does not match slot {slot}")]
    TimeIndexValence { slot: usize },

    /// One label used with two different index kinds
    #[error("index '{label}' used as both spatial and spacetime")]
    LabelKindConflict { label: char },

    /// Same label with the same valence twice: neither free nor contractible
    #[error("index '{label}' repeated with the same valence")]
    RepeatedIndex { label: char },

    /// A label may appear at most twice in a product
    #[error("index '{label}' appears more than twice")]
    ReusedIndex { label: char },

    /// Contracted slots must agree in extent, kind and frame
    #[error("cannot contract index '{label}': {left} vs {right}")]
    IncompatibleContraction {
        label: char,
        left: SlotSpec,
        right: SlotSpec,
    },

    /// Sum operands must expose the same free indices
    #[error("cannot add expressions with free indices ({left}) and ({right})")]
    MismatchedSumIndices { left: String, right: String },

    /// Free index appears in both sum operands with different metadata
    #[error("index '{label}' has incompatible types in sum: {left} vs {right}")]
    IncompatibleSumIndex {
        label: char,
        left: SlotSpec,
        right: SlotSpec,
    },

    /// Declared output indices differ from the expression's free indices
    #[error("output indices ({got}) do not match free indices ({expected})")]
    OutputMismatch { expected: String, got: String },

    /// Same label twice in the output list
    #[error("output index '{label}' listed twice")]
    DuplicateOutputIndex { label: char },

    /// Target slot cannot hold the free index assigned to it
    #[error("output slot {slot} ({slot_spec}) cannot hold index '{label}' ({index_spec})")]
    IncompatibleOutputSlot {
        slot: usize,
        label: char,
        slot_spec: SlotSpec,
        index_spec: SlotSpec,
    },

    /// Allocating evaluation cannot infer the type of a time-pinned slot
    #[error("time index on the output requires evaluating into an existing tensor")]
    TimeIndexNeedsTarget,

    /// Literals alone do not determine the element shape
    #[error("expression has no tensor operand")]
    NoTensorOperand,

    /// Every tensor operand has zero stored components
    #[error("tensor operands hold no components to take the element shape from")]
    EmptyOperands,

    #[error("unknown operand '{name}'")]
    UnknownOperand { name: String, span: Span },

    #[error("unknown index symbol '{symbol}'")]
    UnknownIndex { symbol: String, span: Span },

    /// Rendered lexer/parser report
    #[error("{0}")]
    Notation(String),
}

impl ExprError {
    /// Source location, for errors raised while binding notation
    pub fn span(&self) -> Option<Span> {
        match self {
            ExprError::UnknownOperand { span, .. } | ExprError::UnknownIndex { span, .. } => {
                Some(*span)
            }
            _ => None,
        }
    }
}

// ============================================================================
// REPORT FORMATTING
// ============================================================================

fn render(source: &str, span: std::ops::Range<usize>, title: &str, message: String) -> String {
    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, (), span.start)
        .with_message(title)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish();

    if report.write(Source::from(source), &mut output).is_err() {
        return title.to_string();
    }
    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}

/// Format lexer errors into a user-friendly string
pub fn format_lexer_errors(source: &str, errors: Vec<Simple<char>>) -> String {
    errors
        .into_iter()
        .map(|error| {
            let found = error
                .found()
                .map(|c| format!("'{}'", c))
                .unwrap_or_else(|| "end of input".to_string());
            render(
                source,
                error.span(),
                "Lexical error",
                format!("Unexpected character {}", found),
            )
        })
        .collect()
}

/// Format parser errors into a user-friendly string
pub fn format_parser_errors(source: &str, errors: Vec<Simple<Token>>) -> String {
    errors
        .into_iter()
        .map(|error| {
            let span = error.span();
            let start = span.start.min(source.len());
            let end = span.end.min(source.len()).max(start);
            render(source, start..end, "Parse error", format_parser_error(&error))
        })
        .collect()
}

/// Format a binding error that carries a span, or fall back to its message
pub fn format_notation_error(source: &str, error: &ExprError) -> String {
    match error.span() {
        Some(span) => {
            let start = span.start.min(source.len());
            let end = span.end.min(source.len()).max(start);
            render(source, start..end, "Binding error", error.to_string())
        }
        None => error.to_string(),
    }
}

fn format_parser_error(error: &Simple<Token>) -> String {
    use chumsky::error::SimpleReason;

    if let SimpleReason::Custom(msg) = error.reason() {
        return msg.clone();
    }

    let found = error
        .found()
        .map(|t| format!("'{}'", t))
        .unwrap_or_else(|| "end of input".to_string());

    let expected: Vec<String> = error
        .expected()
        .filter_map(|opt| opt.as_ref())
        .map(|t| format!("'{}'", t))
        .collect();

    if expected.is_empty() {
        format!("Unexpected token {}", found)
    } else {
        format!("Unexpected {}, expected one of: {}", found, expected.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_report_mentions_name() {
        let source = "R(a) * Q(A)";
        let error = ExprError::UnknownOperand {
            name: "Q".to_string(),
            span: Span::new(7, 8),
        };
        let report = format_notation_error(source, &error);
        assert!(report.contains("unknown operand 'Q'"));
    }

    #[test]
    fn test_structural_error_message() {
        let error = ExprError::RepeatedIndex { label: 'a' };
        assert_eq!(error.to_string(), "index 'a' repeated with the same valence");
        assert_eq!(format_notation_error("", &error), error.to_string());
    }
}
