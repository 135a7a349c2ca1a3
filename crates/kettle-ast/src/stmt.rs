// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement tree nodes.

use crate::expr::Expr;
use crate::symbol::VarId;
use crate::{NodeId, Span};

/// A statement in the tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),
    /// Local variable declaration
    Local {
        var: VarId,
        init: Option<Expr>,
    },
    /// Braced statement sequence
    Block(Vec<Stmt>),
    /// If statement
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// While loop
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// Do-while loop
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    /// C-style for loop; a missing condition loops forever
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        step: Vec<Expr>,
        body: Box<Stmt>,
    },
    /// Labeled statement
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    /// Return statement
    Return(Option<Expr>),
    /// Break statement
    Break(Option<String>),
    /// Continue statement
    Continue(Option<String>),
}

impl Stmt {
    /// Visit every nested statement, `self` first.
    pub fn walk(&self, f: &mut dyn FnMut(&Stmt)) {
        f(self);
        match &self.kind {
            StmtKind::Block(stmts) => {
                for s in stmts {
                    s.walk(f);
                }
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                then_branch.walk(f);
                if let Some(e) = else_branch {
                    e.walk(f);
                }
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Labeled { body, .. } => body.walk(f),
            StmtKind::For { init, body, .. } => {
                for s in init {
                    s.walk(f);
                }
                body.walk(f);
            }
            StmtKind::Expr(_)
            | StmtKind::Local { .. }
            | StmtKind::Return(_)
            | StmtKind::Break(_)
            | StmtKind::Continue(_) => {}
        }
    }

    /// Visit every expression (and sub-expression) under this statement.
    pub fn walk_exprs(&self, f: &mut dyn FnMut(&Expr)) {
        self.walk(&mut |stmt| match &stmt.kind {
            StmtKind::Expr(e) => e.walk(&mut *f),
            StmtKind::Local { init: Some(e), .. } => e.walk(&mut *f),
            StmtKind::If { cond, .. } | StmtKind::While { cond, .. } | StmtKind::DoWhile { cond, .. } => {
                cond.walk(&mut *f)
            }
            StmtKind::For { cond, step, .. } => {
                if let Some(c) = cond {
                    c.walk(&mut *f);
                }
                for e in step {
                    e.walk(&mut *f);
                }
            }
            StmtKind::Return(Some(e)) => e.walk(&mut *f),
            _ => {}
        });
    }
}
