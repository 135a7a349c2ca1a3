// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Definite pattern bindings of boolean expressions.

use kettle_ast::expr::{BinOp, Expr, ExprKind, UnaryOp};
use kettle_ast::symbol::{BindingId, SymbolTable};

/// Oracle for the bindings a condition guarantees.
///
/// `match_bindings(cond, true)` returns the bindings definitely assigned
/// when `cond` evaluates to `true`, and likewise for `false`. The only
/// side effect allowed is interning merged binding symbols in `symbols`.
pub trait MatchBindings {
    fn match_bindings(&self, symbols: &mut SymbolTable, cond: &Expr, when_true: bool) -> Vec<BindingId>;

    /// Bindings guaranteed by either outcome of `cond`.
    fn all_bindings(&self, symbols: &mut SymbolTable, cond: &Expr) -> Vec<BindingId> {
        let mut out = self.match_bindings(symbols, cond, true);
        out.extend(self.match_bindings(symbols, cond, false));
        out
    }
}

impl<F> MatchBindings for F
where
    F: Fn(&mut SymbolTable, &Expr, bool) -> Vec<BindingId>,
{
    fn match_bindings(&self, symbols: &mut SymbolTable, cond: &Expr, when_true: bool) -> Vec<BindingId> {
        self(symbols, cond, when_true)
    }
}

/// Structural binding rules for type-test patterns, `!`, `&&` and `||`.
///
/// - `e instanceof T x` introduces `x` when true.
/// - `!e` swaps the two outcomes.
/// - `a && b` when true: union of both sides; when false: intersection.
/// - `a || b` when true: intersection of both sides; when false: union.
///
/// An intersection pairs bindings with the same name and type and unifies
/// each pair into one merged binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchBindingsComputer;

impl MatchBindings for MatchBindingsComputer {
    fn match_bindings(&self, symbols: &mut SymbolTable, cond: &Expr, when_true: bool) -> Vec<BindingId> {
        compute(symbols, cond, when_true)
    }
}

fn compute(symbols: &mut SymbolTable, expr: &Expr, when_true: bool) -> Vec<BindingId> {
    match &expr.kind {
        ExprKind::TypeTest { pattern, .. } => {
            if when_true {
                vec![pattern.binding]
            } else {
                Vec::new()
            }
        }
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => compute(symbols, operand, !when_true),
        ExprKind::Binary {
            op: BinOp::And,
            left,
            right,
        } => {
            let l = compute(symbols, left, when_true);
            let r = compute(symbols, right, when_true);
            if when_true {
                union(symbols, l, r)
            } else {
                intersection(symbols, l, r)
            }
        }
        ExprKind::Binary {
            op: BinOp::Or,
            left,
            right,
        } => {
            let l = compute(symbols, left, when_true);
            let r = compute(symbols, right, when_true);
            if when_true {
                intersection(symbols, l, r)
            } else {
                union(symbols, l, r)
            }
        }
        _ => Vec::new(),
    }
}

fn union(symbols: &SymbolTable, mut left: Vec<BindingId>, right: Vec<BindingId>) -> Vec<BindingId> {
    for b in right {
        if !left.iter().any(|&a| symbols.is_alias_for(a, b)) {
            left.push(b);
        }
    }
    left
}

fn intersection(symbols: &mut SymbolTable, left: Vec<BindingId>, right: Vec<BindingId>) -> Vec<BindingId> {
    let mut out = Vec::new();
    for a in left {
        let partner = right.iter().copied().find(|&b| {
            match (symbols.binding(a), symbols.binding(b)) {
                (Some(x), Some(y)) => x.name == y.name && x.ty == y.ty,
                _ => false,
            }
        });
        if let Some(b) = partner {
            if let Some(merged) = symbols.merge(a, b) {
                log::trace!("unified bindings {:?} and {:?} as {:?}", a, b, merged);
                out.push(merged);
            }
        }
    }
    out
}
