// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Factory for attributed tree nodes.
//!
//! Every node gets a fresh `NodeId` and the maker's current span, so passes
//! can synthesize trees positioned at the construct they replace.

use crate::decl::{ClassDecl, MethodDecl};
use crate::expr::{BinOp, BindingPattern, Expr, ExprKind, Literal, LocalDef, UnaryOp};
use crate::stmt::{Stmt, StmtKind};
use crate::symbol::{BindingId, Sym, SymbolTable, VarId};
use crate::types::{PrimitiveKind, Type};
use crate::{NodeId, Span};

/// Builds expressions and statements with fresh node IDs.
#[derive(Debug, Clone)]
pub struct TreeMaker {
    next_id: u32,
    span: Span,
}

impl TreeMaker {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Start numbering at `first`, e.g. to stay clear of IDs assigned
    /// by an earlier phase.
    pub fn starting_at(first: u32) -> Self {
        Self {
            next_id: first,
            span: Span::default(),
        }
    }

    /// Position subsequently made nodes at `span`.
    pub fn at(&mut self, span: Span) -> &mut Self {
        self.span = span;
        self
    }

    pub fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn expr(&mut self, kind: ExprKind, ty: Type) -> Expr {
        Expr {
            id: self.fresh_id(),
            kind,
            ty,
            span: self.span,
        }
    }

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        Stmt {
            id: self.fresh_id(),
            kind,
            span: self.span,
        }
    }

    // === Expressions ===

    pub fn literal(&mut self, lit: Literal) -> Expr {
        let ty = match &lit {
            Literal::Bool(_) => Type::boolean(),
            Literal::Int(_) => Type::int(),
            Literal::Long(_) => Type::Primitive(PrimitiveKind::Long),
            Literal::Float(_) => Type::Primitive(PrimitiveKind::Float),
            Literal::Double(_) => Type::Primitive(PrimitiveKind::Double),
            Literal::Char(_) => Type::Primitive(PrimitiveKind::Char),
            Literal::String(_) => Type::string(),
            Literal::Null => Type::Null,
        };
        self.expr(ExprKind::Literal(lit), ty)
    }

    pub fn bool(&mut self, value: bool) -> Expr {
        self.literal(Literal::Bool(value))
    }

    pub fn int(&mut self, value: i32) -> Expr {
        self.literal(Literal::Int(value))
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.literal(Literal::String(value.to_string()))
    }

    pub fn null(&mut self) -> Expr {
        self.literal(Literal::Null)
    }

    pub fn var(&mut self, id: VarId, ty: Type) -> Expr {
        self.expr(ExprKind::Ident(Sym::Var(id)), ty)
    }

    /// Reference to a pattern binding, before lowering.
    pub fn binding(&mut self, id: BindingId, ty: Type) -> Expr {
        self.expr(ExprKind::Ident(Sym::Binding(id)), ty)
    }

    /// Identifier typed from the symbol table.
    pub fn ident(&mut self, symbols: &SymbolTable, sym: Sym) -> Expr {
        let ty = match sym {
            Sym::Var(id) => symbols.var(id).map(|v| v.ty.clone()),
            Sym::Binding(id) => symbols.binding(id).map(|b| b.ty.clone()),
        };
        self.expr(ExprKind::Ident(sym), ty.unwrap_or(Type::Void))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        let ty = operand.ty.clone();
        self.expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    pub fn not(&mut self, operand: Expr) -> Expr {
        self.unary(UnaryOp::Not, operand)
    }

    pub fn binary(&mut self, op: BinOp, left: Expr, right: Expr) -> Expr {
        let ty = match op {
            BinOp::And
            | BinOp::Or
            | BinOp::Eq
            | BinOp::Ne
            | BinOp::Lt
            | BinOp::Gt
            | BinOp::Le
            | BinOp::Ge => Type::boolean(),
            BinOp::Add if left.ty == Type::string() || right.ty == Type::string() => Type::string(),
            _ => left.ty.clone(),
        };
        self.expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    pub fn and(&mut self, left: Expr, right: Expr) -> Expr {
        self.binary(BinOp::And, left, right)
    }

    pub fn or(&mut self, left: Expr, right: Expr) -> Expr {
        self.binary(BinOp::Or, left, right)
    }

    pub fn conditional(&mut self, cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        let ty = then_expr.ty.clone();
        self.expr(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            ty,
        )
    }

    pub fn assign(&mut self, target: Expr, value: Expr) -> Expr {
        let ty = target.ty.clone();
        self.expr(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            ty,
        )
    }

    pub fn cast(&mut self, target: Type, expr: Expr) -> Expr {
        self.expr(
            ExprKind::Cast {
                target: target.clone(),
                expr: Box::new(expr),
            },
            target,
        )
    }

    pub fn instance_of(&mut self, expr: Expr, target: Type) -> Expr {
        self.expr(
            ExprKind::InstanceOf {
                expr: Box::new(expr),
                target,
            },
            Type::boolean(),
        )
    }

    /// `expr instanceof T binding`; `declared` is `None` for a total pattern.
    pub fn type_test(&mut self, expr: Expr, binding: BindingId, declared: Option<Type>) -> Expr {
        self.expr(
            ExprKind::TypeTest {
                expr: Box::new(expr),
                pattern: BindingPattern { binding, declared },
            },
            Type::boolean(),
        )
    }

    pub fn call(&mut self, name: &str, args: Vec<Expr>, ret: Type) -> Expr {
        self.expr(
            ExprKind::Call {
                name: name.to_string(),
                args,
            },
            ret,
        )
    }

    pub fn method_call(&mut self, receiver: Expr, method: &str, args: Vec<Expr>, ret: Type) -> Expr {
        self.expr(
            ExprKind::MethodCall {
                receiver: Box::new(receiver),
                method: method.to_string(),
                args,
            },
            ret,
        )
    }

    pub fn let_expr(&mut self, defs: Vec<LocalDef>, body: Expr) -> Expr {
        let ty = body.ty.clone();
        self.expr(
            ExprKind::LetExpr {
                defs,
                body: Box::new(body),
            },
            ty,
        )
    }

    // === Statements ===

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn local(&mut self, var: VarId, init: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Local { var, init })
    }

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Stmt {
        self.stmt(StmtKind::Block(stmts))
    }

    pub fn if_(&mut self, cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_(&mut self, cond: Expr, body: Stmt) -> Stmt {
        self.stmt(StmtKind::While {
            cond,
            body: Box::new(body),
        })
    }

    pub fn do_while(&mut self, body: Stmt, cond: Expr) -> Stmt {
        self.stmt(StmtKind::DoWhile {
            body: Box::new(body),
            cond,
        })
    }

    pub fn for_(&mut self, init: Vec<Stmt>, cond: Option<Expr>, step: Vec<Expr>, body: Stmt) -> Stmt {
        self.stmt(StmtKind::For {
            init,
            cond,
            step,
            body: Box::new(body),
        })
    }

    pub fn labeled(&mut self, label: &str, body: Stmt) -> Stmt {
        self.stmt(StmtKind::Labeled {
            label: label.to_string(),
            body: Box::new(body),
        })
    }

    pub fn return_(&mut self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn break_(&mut self, label: Option<&str>) -> Stmt {
        self.stmt(StmtKind::Break(label.map(str::to_string)))
    }

    pub fn continue_(&mut self, label: Option<&str>) -> Stmt {
        self.stmt(StmtKind::Continue(label.map(str::to_string)))
    }

    // === Declarations ===

    pub fn method(&mut self, name: &str, params: Vec<VarId>, ret: Type, body: Vec<Stmt>) -> MethodDecl {
        let body = self.block(body);
        MethodDecl {
            id: self.fresh_id(),
            name: name.to_string(),
            params,
            ret,
            body: Some(body),
            span: self.span,
        }
    }

    pub fn class(&mut self, name: &str, methods: Vec<MethodDecl>) -> ClassDecl {
        ClassDecl {
            id: self.fresh_id(),
            name: name.to_string(),
            superclass: None,
            interfaces: Vec::new(),
            methods,
            span: self.span,
        }
    }
}

impl Default for TreeMaker {
    fn default() -> Self {
        Self::new()
    }
}
