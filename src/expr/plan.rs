//! Evaluation plans.
//!
//! A [`Plan`] is the resolved form of an expression shape: every label gets a
//! register, every operand slot an accessor reading a register (plus offset)
//! or a fixed component, and every summed label a loop. Plans refer to
//! operands and literals by position and hold no element values, so one plan
//! serves any expression of the same shape and any element type.
//!
//! Execution visits each output component once, sets the registers of the
//! free labels from its multi-index, and walks the plan tree: products and
//! traces run an odometer over their loops, accumulating one term per step.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{ExprError, Result};
use crate::tensor::{Component, MultiIndex, MultiIndexIter, Tensor, TensorStructure};

use super::resolve::{Contraction, ResolvedOutput, SlotBinding, resolve_output, resolve_target};
use super::token::IndexToken;
use super::tree::{Expr, ExprKind};

/// Where one slot's component comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Accessor {
    Register { reg: usize, offset: usize },
    Fixed(usize),
}

impl Accessor {
    fn component(&self, registers: &[usize]) -> usize {
        match *self {
            Accessor::Register { reg, offset } => registers[reg] + offset,
            Accessor::Fixed(component) => component,
        }
    }
}

/// A summed register and its range `0..extent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Loop {
    reg: usize,
    extent: usize,
}

#[derive(Clone, Debug)]
enum PlanNode {
    Leaf {
        operand: usize,
        accessors: SmallVec<[Accessor; 4]>,
        traces: Vec<Loop>,
    },
    Literal {
        literal: usize,
    },
    Negate(Box<PlanNode>),
    Sum(Box<PlanNode>, Box<PlanNode>),
    Product {
        left: Box<PlanNode>,
        right: Box<PlanNode>,
        loops: Vec<Loop>,
    },
}

/// Resolved evaluation plan for one expression shape and output.
#[derive(Clone, Debug)]
pub struct Plan {
    root: PlanNode,
    registers: usize,
    operands: usize,
    literals: usize,
    output: TensorStructure,
    /// Per output slot
    accessors: Vec<Accessor>,
    /// Per output slot: first component and number of components written
    ranges: Vec<(usize, usize)>,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[derive(Default)]
struct PlanBuilder {
    registers: IndexMap<char, usize>,
    operands: usize,
    literals: usize,
}

impl PlanBuilder {
    fn register(&mut self, label: char) -> usize {
        let next = self.registers.len();
        *self.registers.entry(label).or_insert(next)
    }

    fn accessor(&mut self, binding: &SlotBinding) -> Accessor {
        match *binding {
            SlotBinding::Label { label, offset } => Accessor::Register {
                reg: self.register(label),
                offset,
            },
            SlotBinding::Fixed(component) => Accessor::Fixed(component),
        }
    }

    fn loops(&mut self, contractions: &[Contraction]) -> Vec<Loop> {
        contractions
            .iter()
            .map(|c| Loop {
                reg: self.register(c.label),
                extent: c.extent,
            })
            .collect()
    }

    fn node<T: Component>(&mut self, expr: &Expr<'_, T>) -> PlanNode {
        match expr.kind() {
            ExprKind::Leaf(leaf) => {
                let operand = self.operands;
                self.operands += 1;
                PlanNode::Leaf {
                    operand,
                    accessors: leaf.bindings.iter().map(|b| self.accessor(b)).collect(),
                    traces: self.loops(&leaf.traces),
                }
            }
            ExprKind::Literal(_) => {
                let literal = self.literals;
                self.literals += 1;
                PlanNode::Literal { literal }
            }
            ExprKind::Negate(inner) => PlanNode::Negate(Box::new(self.node(inner))),
            ExprKind::Sum(left, right) => {
                let left = self.node(left);
                let right = self.node(right);
                PlanNode::Sum(Box::new(left), Box::new(right))
            }
            ExprKind::Product {
                left,
                right,
                contractions,
            } => {
                let left = self.node(left);
                let right = self.node(right);
                PlanNode::Product {
                    left: Box::new(left),
                    right: Box::new(right),
                    loops: self.loops(contractions),
                }
            }
        }
    }

    fn finish<T: Component>(mut self, expr: &Expr<'_, T>, resolved: ResolvedOutput) -> Plan {
        let root = self.node(expr);
        let accessors: Vec<Accessor> = resolved
            .bindings
            .iter()
            .map(|b| self.accessor(b))
            .collect();
        let ranges = resolved
            .bindings
            .iter()
            .zip(resolved.structure.slots())
            .map(|(binding, slot)| match *binding {
                SlotBinding::Label { offset, .. } => (offset, slot.extent() - offset),
                SlotBinding::Fixed(component) => (component, 1),
            })
            .collect();

        debug!(
            operands = self.operands,
            literals = self.literals,
            registers = self.registers.len(),
            rank = resolved.structure.rank(),
            "built evaluation plan"
        );

        Plan {
            root,
            registers: self.registers.len(),
            operands: self.operands,
            literals: self.literals,
            output: resolved.structure,
            accessors,
            ranges,
        }
    }
}

impl Plan {
    /// Plan for allocating evaluation with free indices ordered as `output`
    pub fn for_output<T: Component>(expr: &Expr<'_, T>, output: &[IndexToken]) -> Result<Self> {
        let resolved = resolve_output(expr.signature(), output)?;
        Ok(PlanBuilder::default().finish(expr, resolved))
    }

    /// Plan for evaluation into a tensor with structure `target`
    pub fn for_target<T: Component>(
        expr: &Expr<'_, T>,
        output: &[IndexToken],
        target: &TensorStructure,
    ) -> Result<Self> {
        let resolved = resolve_target(expr.signature(), output, target)?;
        Ok(PlanBuilder::default().finish(expr, resolved))
    }

    /// Structure of the result (or of the target, for in-place plans)
    pub fn output(&self) -> &TensorStructure {
        &self.output
    }

    pub fn num_registers(&self) -> usize {
        self.registers
    }

    fn load(&self, index: &[usize], registers: &mut [usize]) {
        for (accessor, &value) in self.accessors.iter().zip(index) {
            if let Accessor::Register { reg, offset } = *accessor {
                registers[reg] = value - offset;
            }
        }
    }

    fn bind<'a, T: Component>(&self, expr: &Expr<'a, T>) -> Result<Bound<'_, 'a, T>> {
        let operands = expr.operands();
        debug_assert_eq!(operands.len(), self.operands);
        if operands.is_empty() {
            return Err(ExprError::NoTensorOperand);
        }
        let template = operands
            .iter()
            .find_map(|t| t.values().first())
            .cloned()
            .ok_or(ExprError::EmptyOperands)?;
        let literals: Vec<T> = expr
            .literals()
            .into_iter()
            .map(|value| T::splat_like(value, &template))
            .collect();
        debug_assert_eq!(literals.len(), self.literals);
        Ok(Bound {
            plan: self,
            operands,
            literals,
            template,
        })
    }

    /// Evaluate `expr` into a new tensor
    pub(crate) fn execute_new<T: Component>(&self, expr: &Expr<'_, T>) -> Result<Tensor<T>> {
        if self.operands > 0 && self.output.num_components() == 0 {
            return Ok(Tensor::from_parts(self.output.clone(), Vec::new()));
        }
        let bound = self.bind(expr)?;
        let mut registers = vec![0; self.registers];
        let result = Tensor::from_fn(self.output.clone(), |index| {
            self.load(index, &mut registers);
            bound.eval(&bound.plan.root, &mut registers)
        });
        trace!(components = result.len(), "evaluated expression");
        Ok(result)
    }

    /// Evaluate `expr` into the reachable components of `target`.
    ///
    /// Each reachable stored component is computed once, from its first
    /// reachable multi-index in row-major order. Unreachable components keep
    /// their previous values.
    pub(crate) fn execute_into<T: Component>(
        &self,
        target: &mut Tensor<T>,
        expr: &Expr<'_, T>,
    ) -> Result<()> {
        debug_assert_eq!(target.structure(), &self.output);
        if self.operands > 0 && self.ranges.iter().any(|&(_, len)| len == 0) {
            return Ok(());
        }
        let bound = self.bind(expr)?;
        let mut registers = vec![0; self.registers];
        let mut written = vec![false; target.len()];
        let lengths: MultiIndex = self.ranges.iter().map(|&(_, len)| len).collect();
        let mut count = 0usize;

        for local in MultiIndexIter::new(&lengths) {
            let index: MultiIndex = local
                .iter()
                .zip(&self.ranges)
                .map(|(value, &(start, _))| value + start)
                .collect();
            let Some(pos) = self.output.storage_index(&index) else {
                continue;
            };
            if written[pos] {
                continue;
            }
            written[pos] = true;
            self.load(&index, &mut registers);
            target.values_mut()[pos] = bound.eval(&self.root, &mut registers);
            count += 1;
        }

        trace!(components = count, "evaluated expression in place");
        Ok(())
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

/// A plan with operands and literal values attached.
struct Bound<'p, 'a, T> {
    plan: &'p Plan,
    operands: Vec<&'a Tensor<T>>,
    literals: Vec<T>,
    template: T,
}

impl<T: Component> Bound<'_, '_, T> {
    fn eval(&self, node: &PlanNode, registers: &mut [usize]) -> T {
        match node {
            PlanNode::Leaf {
                operand,
                accessors,
                traces,
            } => {
                let tensor = self.operands[*operand];
                contract_over(traces, registers, &self.template, |registers| {
                    let index: MultiIndex =
                        accessors.iter().map(|a| a.component(registers)).collect();
                    tensor.get(&index).clone()
                })
            }
            PlanNode::Literal { literal } => self.literals[*literal].clone(),
            PlanNode::Negate(inner) => self.eval(inner, registers).negated(),
            PlanNode::Sum(left, right) => {
                let lhs = self.eval(left, registers);
                lhs.sum_with(&self.eval(right, registers))
            }
            PlanNode::Product { left, right, loops } => {
                contract_over(loops, registers, &self.template, |registers| {
                    let lhs = self.eval(left, registers);
                    lhs.product_with(&self.eval(right, registers))
                })
            }
        }
    }
}

/// Sum `term` over every assignment of the loop registers (odometer order).
///
/// With no loops, `term` is evaluated once.
fn contract_over<T: Component>(
    loops: &[Loop],
    registers: &mut [usize],
    template: &T,
    mut term: impl FnMut(&mut [usize]) -> T,
) -> T {
    if loops.iter().any(|l| l.extent == 0) {
        return template.zero_like();
    }
    for l in loops {
        registers[l.reg] = 0;
    }

    let mut acc = term(registers);
    loop {
        // Advance (odometer style)
        let mut i = loops.len();
        loop {
            if i == 0 {
                return acc;
            }
            i -= 1;
            let reg = loops[i].reg;
            registers[reg] += 1;
            if registers[reg] < loops[i].extent {
                break;
            }
            registers[reg] = 0;
        }
        acc.accumulate(&term(registers));
    }
}
