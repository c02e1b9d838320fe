//! Index-notation expressions over tensors
//!
//! Leaves tag tensor slots with generic index tokens; operators combine them
//! into a tree whose indices are resolved as it is built. Evaluation turns a
//! tree plus an output index order into a [`Plan`] and executes it.
//!
//! # Architecture
//!
//! - **token**: generic index tokens and the time token
//! - **tree**: expression nodes and operator overloads
//! - **resolve**: free/contracted index classification, output shapes
//! - **plan**: register-based evaluation plans and their execution
//! - **eval**: allocating and in-place entry points
//! - **cache**: LRU plan cache keyed by expression shape
//! - **compile**: binding parsed notation to tensors

mod cache;
mod compile;
mod eval;
mod plan;
mod resolve;
mod token;
mod tree;

pub use cache::{CacheConfig, CacheStats, DEFAULT_PLAN_CACHE_CAPACITY, PlanCache};
pub use compile::{
    Bindings, CompiledStatement, compile_statement, compile_term, evaluate_notation,
    evaluate_notation_into,
};
pub use eval::{evaluate, evaluate_into};
pub use plan::Plan;
pub use token::{GenericIndex, IndexToken, indices};
pub use tree::Expr;
