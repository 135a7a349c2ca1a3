// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression evaluation.

use kettle_ast::expr::{BinOp, Expr, ExprKind, Literal};
use kettle_ast::symbol::Sym;

use crate::value::Value;

use super::operators::coerce;
use super::{Interpreter, RuntimeError};

impl<'p> Interpreter<'p> {
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal_value(lit)),

            ExprKind::Ident(sym) => self.lookup(*sym),

            ExprKind::Unary { op, operand } => {
                let v = self.eval_expr(operand)?;
                self.eval_unop(*op, v)
            }

            ExprKind::Binary {
                op: op @ (BinOp::And | BinOp::Or),
                left,
                right,
            } => {
                let l = self.eval_bool(left)?;
                if l == (*op == BinOp::Or) {
                    return Ok(Value::Bool(l));
                }
                Ok(Value::Bool(self.eval_bool(right)?))
            }

            ExprKind::Binary { op, left, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                let by_reference = left.ty.is_reference() && right.ty.is_reference();
                self.eval_binop(*op, l, r, by_reference, &expr.ty)
            }

            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval_bool(cond)? {
                    self.eval_expr(then_expr)
                } else {
                    self.eval_expr(else_expr)
                }
            }

            ExprKind::Assign { target, value } => {
                let ExprKind::Ident(sym) = &target.kind else {
                    return Err(RuntimeError::TypeError("assignment target is not a variable".to_string()));
                };
                let v = coerce(&target.ty, self.eval_expr(value)?)?;
                self.env.set(*sym, v.clone());
                Ok(v)
            }

            ExprKind::Cast { target, expr } => {
                let v = self.eval_expr(expr)?;
                self.cast(target, v)
            }

            ExprKind::InstanceOf { expr, target } => {
                let v = self.eval_expr(expr)?;
                Ok(Value::Bool(self.instance_of(&v, target)))
            }

            ExprKind::TypeTest { expr, pattern } => {
                let v = self.eval_expr(expr)?;
                let program = self.program;
                let binding = program.symbols.binding(pattern.binding).ok_or_else(|| {
                    RuntimeError::UndefinedVariable(format!("binding #{}", pattern.binding.0))
                })?;
                let matched = match pattern.declared {
                    None => true,
                    Some(_) => self.instance_of(&v, &binding.ty),
                };
                if matched {
                    let v = coerce(&binding.ty, v)?;
                    self.env.set(Sym::Binding(pattern.binding), v);
                }
                Ok(Value::Bool(matched))
            }

            ExprKind::Call { name, args } => {
                let args = self.eval_args(args)?;
                self.call_function(name, args)
            }

            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                let recv = self.eval_expr(receiver)?;
                let args = self.eval_args(args)?;
                self.call_value_method(recv, method, args)
            }

            ExprKind::LetExpr { defs, body } => {
                for def in defs {
                    let v = self.eval_expr(&def.init)?;
                    let v = match self.program.symbols.var(def.var) {
                        Some(var) => coerce(&var.ty, v)?,
                        None => v,
                    };
                    self.env.set(Sym::Var(def.var), v);
                }
                self.eval_expr(body)
            }
        }
    }

    pub(super) fn eval_bool(&mut self, expr: &Expr) -> Result<bool, RuntimeError> {
        match self.eval_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::TypeError(format!(
                "expected boolean, found {}",
                other.type_name()
            ))),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|a| self.eval_expr(a)).collect()
    }

    fn lookup(&self, sym: Sym) -> Result<Value, RuntimeError> {
        let symbols = &self.program.symbols;
        let found = match sym {
            Sym::Var(_) => self.env.get(sym),
            Sym::Binding(b) => self.env.get_binding(symbols, b),
        };
        found.cloned().ok_or_else(|| {
            let name = symbols.name_of(sym).unwrap_or("<unknown>");
            RuntimeError::UndefinedVariable(name.to_string())
        })
    }

    /// Program methods first, then builtins, then registered natives.
    fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let program = self.program;
        if let Some(method) = program.method(name) {
            return self.call_method(method, args);
        }
        if let Some(result) = self.call_builtin(name, &args) {
            return result;
        }
        match self.natives.get_mut(name) {
            Some(native) => native(&args),
            None => Err(RuntimeError::UndefinedFunction(name.to_string())),
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Long(n) => Value::Long(*n),
        Literal::Float(x) => Value::Float(*x),
        Literal::Double(x) => Value::Double(*x),
        Literal::Char(c) => Value::Char(*c),
        Literal::String(s) => Value::string(s),
        Literal::Null => Value::Null,
    }
}
