// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lowering visitor.
//!
//! Trees are consumed and rebuilt bottom-up. Nodes that contain no pattern
//! keep their IDs, types and spans, so pattern-free input comes back equal
//! to what went in.

use kettle_ast::decl::{ClassDecl, MethodDecl};
use kettle_ast::expr::{BinOp, BindingPattern, Expr, ExprKind, LocalDef};
use kettle_ast::make::TreeMaker;
use kettle_ast::stmt::{Stmt, StmtKind};
use kettle_ast::symbol::{BindingId, Sym, SymbolTable, VarId};
use kettle_ast::types::{ClassHierarchy, Type};
use kettle_ast::Span;
use kettle_flow::MatchBindings;

use crate::context::{BindingStack, FrameKind, Hoist};
use crate::defaults::default_value;
use crate::error::LowerError;

/// First node ID handed out by the pass, clear of attribution's IDs.
const FIRST_SYNTHETIC_ID: u32 = 1_000_000;

/// A lowered statement plus the declarations that must run just before it.
struct Decorated {
    decls: Vec<Stmt>,
    stmt: Stmt,
}

/// Rewrites type-test patterns into plain type tests and binding storage.
pub struct PatternLowering<'a, M: MatchBindings + ?Sized> {
    symbols: &'a mut SymbolTable,
    hierarchy: &'a ClassHierarchy,
    flow: &'a M,
    make: TreeMaker,
}

impl<'a, M: MatchBindings + ?Sized> PatternLowering<'a, M> {
    pub fn new(symbols: &'a mut SymbolTable, hierarchy: &'a ClassHierarchy, flow: &'a M) -> Self {
        Self {
            symbols,
            hierarchy,
            flow,
            make: TreeMaker::starting_at(FIRST_SYNTHETIC_ID),
        }
    }

    /// Lower every method of `class` under a fresh binding stack.
    pub fn lower_class(&mut self, class: ClassDecl) -> Result<ClassDecl, LowerError> {
        let mut cx = BindingStack::new();
        let ClassDecl {
            id,
            name,
            superclass,
            interfaces,
            methods,
            span,
        } = class;
        log::trace!("lowering patterns in class {}", name);

        let methods = methods
            .into_iter()
            .map(|m| self.lower_method(&mut cx, m))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ClassDecl {
            id,
            name,
            superclass,
            interfaces,
            methods,
            span,
        })
    }

    fn lower_method(&mut self, cx: &mut BindingStack, mut method: MethodDecl) -> Result<MethodDecl, LowerError> {
        if let Some(body) = method.body.take() {
            method.body = Some(self.lower_stmt(cx, body)?);
        }
        Ok(method)
    }

    // === Statements ===

    pub fn lower_stmt(&mut self, cx: &mut BindingStack, stmt: Stmt) -> Result<Stmt, LowerError> {
        let Decorated { decls, stmt } = self.lower_stmt_parts(cx, stmt)?;
        if decls.is_empty() {
            return Ok(stmt);
        }
        let mut stmts = decls;
        let span = stmt.span;
        stmts.push(stmt);
        Ok(self.make.at(span).block(stmts))
    }

    fn lower_stmt_parts(&mut self, cx: &mut BindingStack, stmt: Stmt) -> Result<Decorated, LowerError> {
        let Stmt { id, kind, span } = stmt;
        let kind = match kind {
            StmtKind::Expr(e) => StmtKind::Expr(self.lower_expr(cx, e)?),
            StmtKind::Local { var, init } => StmtKind::Local {
                var,
                init: self.lower_opt_expr(cx, init)?,
            },
            StmtKind::Block(stmts) => {
                let mut frame = cx.push(FrameKind::Block, &[], self.symbols);
                let mut out = Vec::with_capacity(stmts.len());
                for s in stmts {
                    let lowered = self.lower_stmt(&mut frame, s)?;
                    out.extend(frame.take_hoisted());
                    out.push(lowered);
                }
                StmtKind::Block(out)
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let bindings = self.flow.all_bindings(self.symbols, &cond);
                let mut frame = cx.push(FrameKind::Statement, &bindings, self.symbols);
                let cond = self.lower_expr(&mut frame, cond)?;
                let then_branch = Box::new(self.lower_stmt(&mut frame, *then_branch)?);
                let else_branch = match else_branch {
                    Some(e) => Some(Box::new(self.lower_stmt(&mut frame, *e)?)),
                    None => None,
                };
                let kind = StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                };
                return self.decorate_statement(&mut frame, Stmt { id, kind, span });
            }
            StmtKind::While { cond, body } => {
                let bindings = self.flow.all_bindings(self.symbols, &cond);
                let mut frame = cx.push(FrameKind::Statement, &bindings, self.symbols);
                let cond = self.lower_expr(&mut frame, cond)?;
                let body = Box::new(self.lower_stmt(&mut frame, *body)?);
                let kind = StmtKind::While { cond, body };
                return self.decorate_statement(&mut frame, Stmt { id, kind, span });
            }
            StmtKind::DoWhile { body, cond } => {
                let bindings = self.flow.all_bindings(self.symbols, &cond);
                let mut frame = cx.push(FrameKind::Statement, &bindings, self.symbols);
                let body = Box::new(self.lower_stmt(&mut frame, *body)?);
                let cond = self.lower_expr(&mut frame, cond)?;
                let kind = StmtKind::DoWhile { body, cond };
                return self.decorate_statement(&mut frame, Stmt { id, kind, span });
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let bindings = match &cond {
                    Some(c) => self.flow.all_bindings(self.symbols, c),
                    None => Vec::new(),
                };
                let mut frame = cx.push(FrameKind::Statement, &bindings, self.symbols);
                let init = init
                    .into_iter()
                    .map(|s| self.lower_stmt(&mut frame, s))
                    .collect::<Result<Vec<_>, _>>()?;
                let cond = self.lower_opt_expr(&mut frame, cond)?;
                let step = self.lower_exprs(&mut frame, step)?;
                let body = Box::new(self.lower_stmt(&mut frame, *body)?);
                let kind = StmtKind::For {
                    init,
                    cond,
                    step,
                    body,
                };
                return self.decorate_statement(&mut frame, Stmt { id, kind, span });
            }
            StmtKind::Labeled { label, body } => {
                // Declarations go outside the label so that `continue label`
                // still names the loop.
                let Decorated { decls, stmt: body } = self.lower_stmt_parts(cx, *body)?;
                let kind = StmtKind::Labeled {
                    label,
                    body: Box::new(body),
                };
                return Ok(Decorated {
                    decls,
                    stmt: Stmt { id, kind, span },
                });
            }
            StmtKind::Return(value) => StmtKind::Return(self.lower_opt_expr(cx, value)?),
            kind @ (StmtKind::Break(_) | StmtKind::Continue(_)) => kind,
        };
        Ok(Decorated {
            decls: Vec::new(),
            stmt: Stmt { id, kind, span },
        })
    }

    /// Declare the current frame's storage in front of `stmt`, offering each
    /// declaration to the enclosing frame first.
    fn decorate_statement(&mut self, cx: &mut BindingStack, stmt: Stmt) -> Result<Decorated, LowerError> {
        let mut decls = Vec::new();
        for slot in cx.slots().to_vec() {
            let decl = self.storage_decl(stmt.span, slot.var)?;
            match cx.try_hoist(self.symbols, slot.binding, decl) {
                Hoist::Accepted => {}
                Hoist::Rejected(decl) => decls.push(decl),
            }
        }
        Ok(Decorated { decls, stmt })
    }

    fn storage_decl(&mut self, span: Span, var: VarId) -> Result<Stmt, LowerError> {
        let ty = self.storage_type(var)?;
        self.make.at(span);
        let init = default_value(&mut self.make, &ty)?;
        Ok(self.make.local(var, Some(init)))
    }

    fn storage_type(&self, var: VarId) -> Result<Type, LowerError> {
        self.symbols
            .var(var)
            .map(|v| v.ty.erasure())
            .ok_or(LowerError::UnknownVar(var))
    }

    // === Expressions ===

    pub fn lower_expr(&mut self, cx: &mut BindingStack, expr: Expr) -> Result<Expr, LowerError> {
        let Expr { id, kind, ty, span } = expr;
        let kind = match kind {
            ExprKind::Ident(Sym::Binding(binding)) => return self.lower_binding_ref(cx, binding, ty, span),
            kind @ (ExprKind::Literal(_) | ExprKind::Ident(Sym::Var(_))) => kind,
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: Box::new(self.lower_expr(cx, *operand)?),
            },
            ExprKind::Binary { op, left, right } => {
                let bindings = match op {
                    BinOp::And => self.flow.match_bindings(self.symbols, &left, true),
                    BinOp::Or => self.flow.match_bindings(self.symbols, &left, false),
                    _ => Vec::new(),
                };
                let mut frame = cx.push(FrameKind::Binary, &bindings, self.symbols);
                let left = Box::new(self.lower_expr(&mut frame, *left)?);
                let right = Box::new(self.lower_expr(&mut frame, *right)?);
                let kind = ExprKind::Binary { op, left, right };
                return self.decorate_expression(&frame, Expr { id, kind, ty, span });
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let bindings = self.flow.all_bindings(self.symbols, &cond);
                let mut frame = cx.push(FrameKind::Conditional, &bindings, self.symbols);
                let cond = Box::new(self.lower_expr(&mut frame, *cond)?);
                let then_expr = Box::new(self.lower_expr(&mut frame, *then_expr)?);
                let else_expr = Box::new(self.lower_expr(&mut frame, *else_expr)?);
                let kind = ExprKind::Conditional {
                    cond,
                    then_expr,
                    else_expr,
                };
                return self.decorate_expression(&frame, Expr { id, kind, ty, span });
            }
            ExprKind::Assign { target, value } => ExprKind::Assign {
                target: Box::new(self.lower_expr(cx, *target)?),
                value: Box::new(self.lower_expr(cx, *value)?),
            },
            ExprKind::Cast { target, expr } => ExprKind::Cast {
                target,
                expr: Box::new(self.lower_expr(cx, *expr)?),
            },
            ExprKind::InstanceOf { expr, target } => ExprKind::InstanceOf {
                expr: Box::new(self.lower_expr(cx, *expr)?),
                target,
            },
            ExprKind::TypeTest { expr, pattern } => return self.lower_type_test(cx, *expr, pattern, span),
            ExprKind::Call { name, args } => ExprKind::Call {
                name,
                args: self.lower_exprs(cx, args)?,
            },
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => ExprKind::MethodCall {
                receiver: Box::new(self.lower_expr(cx, *receiver)?),
                method,
                args: self.lower_exprs(cx, args)?,
            },
            ExprKind::LetExpr { defs, body } => {
                let defs = defs
                    .into_iter()
                    .map(|d| {
                        Ok(LocalDef {
                            var: d.var,
                            init: self.lower_expr(cx, d.init)?,
                        })
                    })
                    .collect::<Result<Vec<_>, LowerError>>()?;
                ExprKind::LetExpr {
                    defs,
                    body: Box::new(self.lower_expr(cx, *body)?),
                }
            }
        };
        Ok(Expr { id, kind, ty, span })
    }

    fn lower_exprs(&mut self, cx: &mut BindingStack, exprs: Vec<Expr>) -> Result<Vec<Expr>, LowerError> {
        exprs.into_iter().map(|e| self.lower_expr(cx, e)).collect()
    }

    fn lower_opt_expr(&mut self, cx: &mut BindingStack, expr: Option<Expr>) -> Result<Option<Expr>, LowerError> {
        expr.map(|e| self.lower_expr(cx, e)).transpose()
    }

    fn lower_binding_ref(
        &mut self,
        cx: &BindingStack,
        binding: BindingId,
        ty: Type,
        span: Span,
    ) -> Result<Expr, LowerError> {
        match cx.resolve(self.symbols, binding) {
            Some(var) => Ok(self.make.at(span).var(var, ty)),
            None => {
                let name = self
                    .symbols
                    .binding(binding)
                    .map(|b| b.name.clone())
                    .ok_or(LowerError::UnknownBinding(binding))?;
                Err(LowerError::UnresolvedBinding { name, span })
            }
        }
    }

    /// `E instanceof T x` becomes
    /// `(let t = E'; in t instanceof T && ((x = (T) t) == (T) t))`,
    /// where the second conjunct is present only when `x` has storage in
    /// scope and the first degenerates to `true` when the match is certain.
    fn lower_type_test(
        &mut self,
        cx: &mut BindingStack,
        operand: Expr,
        pattern: BindingPattern,
        span: Span,
    ) -> Result<Expr, LowerError> {
        let operand_ty = operand.ty.clone();
        let operand = self.lower_expr(cx, operand)?;

        let binding = self
            .symbols
            .binding(pattern.binding)
            .ok_or(LowerError::UnknownBinding(pattern.binding))?;
        let name = format!("{}$temp", binding.name);
        let owner = binding.owner.clone();
        let target = binding.ty.erasure().boxed_type_or_type();

        let temp_ty = if operand_ty.is_null() {
            Type::object()
        } else {
            operand_ty.clone()
        };
        let temp = self.symbols.new_synthetic(name, temp_ty.clone(), owner);

        self.make.at(span);
        let certain = pattern.declared.is_none()
            || operand_ty.is_primitive()
            || (!operand_ty.is_null() && self.hierarchy.is_subtype(&operand_ty, &target));
        let mut test = if certain {
            self.make.bool(true)
        } else {
            let t = self.make.var(temp, temp_ty.clone());
            self.make.instance_of(t, target.clone())
        };

        if let Some(var) = cx.resolve(self.symbols, pattern.binding) {
            let var_ty = self.storage_type(var)?;
            let primitive = var_ty.is_primitive();
            let slot = self.make.var(var, var_ty);
            let t = self.make.var(temp, temp_ty.clone());
            let value = self.make.cast(target.clone(), t);
            let mut assign = self.make.assign(slot, value);
            if primitive {
                // Compare the boxed values by reference; a primitive `==`
                // would reject NaN.
                assign = self.make.cast(target.clone(), assign);
            }
            let t = self.make.var(temp, temp_ty);
            let again = self.make.cast(target, t);
            let same = self.make.binary(BinOp::Eq, assign, again);
            test = self.make.and(test, same);
        } else {
            log::trace!("binding {:?} has no storage here; testing only", pattern.binding);
        }

        let def = LocalDef {
            var: temp,
            init: operand,
        };
        Ok(self.make.let_expr(vec![def], test))
    }

    /// Scope the current frame's storage around `expr`.
    fn decorate_expression(&mut self, cx: &BindingStack, expr: Expr) -> Result<Expr, LowerError> {
        let slots = cx.slots();
        if slots.is_empty() {
            return Ok(expr);
        }
        self.make.at(expr.span);
        let mut defs = Vec::with_capacity(slots.len());
        for slot in slots {
            let ty = self.storage_type(slot.var)?;
            let init = default_value(&mut self.make, &ty)?;
            defs.push(LocalDef { var: slot.var, init });
        }
        Ok(self.make.let_expr(defs, expr))
    }
}
