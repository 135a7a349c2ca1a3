// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression tree nodes.

use crate::symbol::{BindingId, Sym, VarId};
use crate::types::Type;
use crate::{NodeId, Span};

/// An attributed expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    /// Static type computed by attribution.
    pub ty: Type,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Constant literal
    Literal(Literal),
    /// Variable or pattern-binding reference
    Ident(Sym),
    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Binary operation, including short-circuit `&&` / `||`
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Conditional expression (c ? a : b)
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// Assignment; evaluates to the assigned value
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Type cast ((T) e)
    Cast {
        target: Type,
        expr: Box<Expr>,
    },
    /// Plain runtime type test (e instanceof T)
    InstanceOf {
        expr: Box<Expr>,
        target: Type,
    },
    /// Type-test pattern (e instanceof T x)
    TypeTest {
        expr: Box<Expr>,
        pattern: BindingPattern,
    },
    /// Call of a static method or native function
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// Method call on a receiver
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// Scoped local definitions visible only inside `body`
    LetExpr {
        defs: Vec<LocalDef>,
        body: Box<Expr>,
    },
}

/// The binding half of a type-test pattern.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingPattern {
    pub binding: BindingId,
    /// Explicit pattern type. `None` for an untyped (total) pattern whose
    /// type is inferred from the tested expression.
    pub declared: Option<Type>,
}

/// A definition inside a let-expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalDef {
    pub var: VarId,
    pub init: Expr,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinOp {
    // Logical (short-circuit)
    And,
    Or,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Logical not (!)
    Not,
    /// Negation (-)
    Neg,
}

impl Expr {
    /// Visit every sub-expression in evaluation order, `self` first.
    pub fn walk(&self, f: &mut dyn FnMut(&Expr)) {
        f(self);
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Ident(_) => {}
            ExprKind::Unary { operand, .. } => operand.walk(f),
            ExprKind::Binary { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                cond.walk(f);
                then_expr.walk(f);
                else_expr.walk(f);
            }
            ExprKind::Assign { target, value } => {
                target.walk(f);
                value.walk(f);
            }
            ExprKind::Cast { expr, .. }
            | ExprKind::InstanceOf { expr, .. }
            | ExprKind::TypeTest { expr, .. } => expr.walk(f),
            ExprKind::Call { args, .. } => {
                for arg in args {
                    arg.walk(f);
                }
            }
            ExprKind::MethodCall { receiver, args, .. } => {
                receiver.walk(f);
                for arg in args {
                    arg.walk(f);
                }
            }
            ExprKind::LetExpr { defs, body } => {
                for def in defs {
                    def.init.walk(f);
                }
                body.walk(f);
            }
        }
    }
}
