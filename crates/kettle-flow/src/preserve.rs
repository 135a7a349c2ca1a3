// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Bindings that outlive the statement introducing them.
//!
//! `if (!(o instanceof String s)) return; use(s);` keeps `s` in scope after
//! the `if`. Such bindings are marked *preserved* so that lowering may
//! declare their storage in the enclosing block.

use kettle_ast::decl::{ClassDecl, Program};
use kettle_ast::expr::{ExprKind, Literal};
use kettle_ast::stmt::{Stmt, StmtKind};
use kettle_ast::symbol::SymbolTable;

use crate::bindings::{MatchBindings, MatchBindingsComputer};

/// Mark preserved bindings throughout a program using the structural rules.
pub fn preserve_bindings(program: &mut Program) {
    let Program { classes, symbols } = program;
    preserve_in(&MatchBindingsComputer, classes, symbols);
}

/// Mark preserved bindings in `classes` using an arbitrary flow oracle.
pub fn preserve_in<M: MatchBindings + ?Sized>(flow: &M, classes: &[ClassDecl], symbols: &mut SymbolTable) {
    for class in classes {
        for method in &class.methods {
            if let Some(body) = &method.body {
                preserve_walk(flow, body, None, symbols);
            }
        }
    }
}

/// Visit `stmt` and everything nested in it. `label` is the label directly
/// attached to `stmt`, if any.
fn preserve_walk<M: MatchBindings + ?Sized>(flow: &M, stmt: &Stmt, label: Option<&str>, symbols: &mut SymbolTable) {
    preserve_stmt(flow, stmt, label, symbols);
    match &stmt.kind {
        StmtKind::Block(stmts) => {
            for s in stmts {
                preserve_walk(flow, s, None, symbols);
            }
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            preserve_walk(flow, then_branch, None, symbols);
            if let Some(e) = else_branch {
                preserve_walk(flow, e, None, symbols);
            }
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => preserve_walk(flow, body, None, symbols),
        StmtKind::For { init, body, .. } => {
            for s in init {
                preserve_walk(flow, s, None, symbols);
            }
            preserve_walk(flow, body, None, symbols);
        }
        StmtKind::Labeled { label, body } => preserve_walk(flow, body, Some(label), symbols),
        StmtKind::Expr(_)
        | StmtKind::Local { .. }
        | StmtKind::Return(_)
        | StmtKind::Break(_)
        | StmtKind::Continue(_) => {}
    }
}

fn preserve_stmt<M: MatchBindings + ?Sized>(flow: &M, stmt: &Stmt, label: Option<&str>, symbols: &mut SymbolTable) {
    let escaping = match &stmt.kind {
        StmtKind::If {
            cond,
            then_branch,
            else_branch: None,
        } => {
            if can_complete_normally(then_branch) {
                Vec::new()
            } else {
                flow.match_bindings(symbols, cond, false)
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch: Some(else_branch),
        } => match (can_complete_normally(then_branch), can_complete_normally(else_branch)) {
            (false, true) => flow.match_bindings(symbols, cond, false),
            (true, false) => flow.match_bindings(symbols, cond, true),
            _ => Vec::new(),
        },
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            if breaks_to(body, label, false) {
                Vec::new()
            } else {
                flow.match_bindings(symbols, cond, false)
            }
        }
        StmtKind::For {
            cond: Some(cond),
            body,
            ..
        } => {
            if breaks_to(body, label, false) {
                Vec::new()
            } else {
                flow.match_bindings(symbols, cond, false)
            }
        }
        _ => Vec::new(),
    };
    for binding in escaping {
        log::trace!("binding {:?} escapes statement {:?}", binding, stmt.id);
        symbols.preserve(binding);
    }
}

/// Conservative reachability: whether execution can fall off the end of
/// `stmt`.
pub fn can_complete_normally(stmt: &Stmt) -> bool {
    completes(stmt, None)
}

/// Like [`can_complete_normally`], for a statement labeled `label`.
fn completes(stmt: &Stmt, label: Option<&str>) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) | StmtKind::Break(_) | StmtKind::Continue(_) => false,
        StmtKind::Block(stmts) => stmts.iter().all(can_complete_normally),
        StmtKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => can_complete_normally(then_branch) || can_complete_normally(else_branch),
        StmtKind::While { cond, body } => !is_constant_true(cond) || breaks_to(body, label, false),
        StmtKind::For { cond: None, body, .. } => breaks_to(body, label, false),
        StmtKind::For { cond: Some(cond), body, .. } => !is_constant_true(cond) || breaks_to(body, label, false),
        StmtKind::DoWhile { body, cond } => {
            (can_complete_normally(body) && !is_constant_true(cond)) || breaks_to(body, label, false)
        }
        StmtKind::Labeled { label, body } => completes(body, Some(label)) || breaks_to(body, Some(label), true),
        _ => true,
    }
}

fn is_constant_true(expr: &kettle_ast::expr::Expr) -> bool {
    matches!(expr.kind, ExprKind::Literal(Literal::Bool(true)))
}

/// Whether `body` contains a `break` whose target is the loop owning it.
///
/// `label` is that loop's label. An unlabeled `break` targets the innermost
/// loop, so it only counts outside nested loops. A labeled `break` counts
/// only when it names `label`; breaks to outer statements leave the loop
/// without completing it.
fn breaks_to(body: &Stmt, label: Option<&str>, nested: bool) -> bool {
    match &body.kind {
        StmtKind::Break(None) => !nested,
        StmtKind::Break(Some(target)) => Some(target.as_str()) == label,
        StmtKind::Block(stmts) => stmts.iter().any(|s| breaks_to(s, label, nested)),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            breaks_to(then_branch, label, nested)
                || else_branch.as_deref().is_some_and(|e| breaks_to(e, label, nested))
        }
        StmtKind::Labeled { label: inner, body } => {
            // An inner statement reusing the label shadows it.
            Some(inner.as_str()) != label && breaks_to(body, label, nested)
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } | StmtKind::For { body, .. } => {
            breaks_to(body, label, true)
        }
        _ => false,
    }
}
