// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement execution.

use kettle_ast::stmt::{Stmt, StmtKind};
use kettle_ast::symbol::Sym;

use crate::value::Value;

use super::operators::coerce;
use super::{Interpreter, RuntimeError};

/// What a loop does after one run of its body.
enum Flow {
    Next,
    Exit,
}

/// Absorb the jumps that target the loop labeled `label` (or any
/// unlabeled jump); everything else propagates.
fn loop_flow(result: Result<(), RuntimeError>, label: Option<&str>) -> Result<Flow, RuntimeError> {
    match result {
        Ok(()) => Ok(Flow::Next),
        Err(RuntimeError::Break(None)) => Ok(Flow::Exit),
        Err(RuntimeError::Continue(None)) => Ok(Flow::Next),
        Err(RuntimeError::Break(Some(l))) if Some(l.as_str()) == label => Ok(Flow::Exit),
        Err(RuntimeError::Continue(Some(l))) if Some(l.as_str()) == label => Ok(Flow::Next),
        Err(e) => Err(e),
    }
}

impl<'p> Interpreter<'p> {
    pub(super) fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }

            StmtKind::Local { var, init } => {
                if let Some(init) = init {
                    let value = self.eval_expr(init)?;
                    let value = match self.program.symbols.var(*var) {
                        Some(sym) => coerce(&sym.ty, value)?,
                        None => value,
                    };
                    self.env.set(Sym::Var(*var), value);
                }
                Ok(())
            }

            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.exec_stmt(s)?;
                }
                Ok(())
            }

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(cond)? {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(())
                }
            }

            StmtKind::While { .. } | StmtKind::DoWhile { .. } | StmtKind::For { .. } => self.exec_loop(stmt, None),

            StmtKind::Labeled { label, body } => match &body.kind {
                StmtKind::While { .. } | StmtKind::DoWhile { .. } | StmtKind::For { .. } => {
                    self.exec_loop(body, Some(label.as_str()))
                }
                _ => match self.exec_stmt(body) {
                    Err(RuntimeError::Break(Some(l))) if l == *label => Ok(()),
                    other => other,
                },
            },

            StmtKind::Return(value) => {
                let value = match value {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                Err(RuntimeError::Return(value))
            }

            StmtKind::Break(label) => Err(RuntimeError::Break(label.clone())),

            StmtKind::Continue(label) => Err(RuntimeError::Continue(label.clone())),
        }
    }

    fn exec_loop(&mut self, stmt: &Stmt, label: Option<&str>) -> Result<(), RuntimeError> {
        match &stmt.kind {
            StmtKind::While { cond, body } => {
                while self.eval_bool(cond)? {
                    if let Flow::Exit = loop_flow(self.exec_stmt(body), label)? {
                        break;
                    }
                }
                Ok(())
            }

            StmtKind::DoWhile { body, cond } => {
                loop {
                    if let Flow::Exit = loop_flow(self.exec_stmt(body), label)? {
                        break;
                    }
                    if !self.eval_bool(cond)? {
                        break;
                    }
                }
                Ok(())
            }

            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                for s in init {
                    self.exec_stmt(s)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval_bool(cond)? {
                            break;
                        }
                    }
                    if let Flow::Exit = loop_flow(self.exec_stmt(body), label)? {
                        break;
                    }
                    for e in step {
                        self.eval_expr(e)?;
                    }
                }
                Ok(())
            }

            _ => self.exec_stmt(stmt),
        }
    }
}
