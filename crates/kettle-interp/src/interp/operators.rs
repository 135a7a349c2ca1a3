// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Operators, numeric promotion and conversions.

use kettle_ast::expr::{BinOp, UnaryOp};
use kettle_ast::types::{PrimitiveKind, Type};

use crate::value::Value;

use super::{Interpreter, RuntimeError};

/// Operand after binary numeric promotion.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Num {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Char(c) => Some(Num::Int(*c as i32)),
            Value::Long(n) => Some(Num::Long(*n)),
            Value::Float(x) => Some(Num::Float(*x)),
            Value::Double(x) => Some(Num::Double(*x)),
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Num::Int(_) => 0,
            Num::Long(_) => 1,
            Num::Float(_) => 2,
            Num::Double(_) => 3,
        }
    }

    fn widen(self, rank: u8) -> Num {
        match (self, rank) {
            (n, r) if n.rank() == r => n,
            (Num::Int(n), 1) => Num::Long(n as i64),
            (Num::Int(n), 2) => Num::Float(n as f32),
            (Num::Int(n), _) => Num::Double(n as f64),
            (Num::Long(n), 2) => Num::Float(n as f32),
            (Num::Long(n), _) => Num::Double(n as f64),
            (Num::Float(x), _) => Num::Double(x as f64),
            (n, _) => n,
        }
    }
}

fn promote(l: &Value, r: &Value, op: BinOp) -> Result<(Num, Num), RuntimeError> {
    match (Num::of(l), Num::of(r)) {
        (Some(a), Some(b)) => {
            let rank = a.rank().max(b.rank());
            Ok((a.widen(rank), b.widen(rank)))
        }
        _ => Err(RuntimeError::TypeError(format!(
            "operator `{}` not defined for {} and {}",
            op.symbol(),
            l.type_name(),
            r.type_name()
        ))),
    }
}

fn arith(op: BinOp, a: Num, b: Num) -> Result<Value, RuntimeError> {
    let v = match (a, b) {
        (Num::Int(x), Num::Int(y)) => Value::Int(match op {
            BinOp::Add => x.wrapping_add(y),
            BinOp::Sub => x.wrapping_sub(y),
            BinOp::Mul => x.wrapping_mul(y),
            BinOp::Div if y == 0 => return Err(RuntimeError::DivisionByZero),
            BinOp::Div => x.wrapping_div(y),
            BinOp::Rem if y == 0 => return Err(RuntimeError::DivisionByZero),
            _ => x.wrapping_rem(y),
        }),
        (Num::Long(x), Num::Long(y)) => Value::Long(match op {
            BinOp::Add => x.wrapping_add(y),
            BinOp::Sub => x.wrapping_sub(y),
            BinOp::Mul => x.wrapping_mul(y),
            BinOp::Div if y == 0 => return Err(RuntimeError::DivisionByZero),
            BinOp::Div => x.wrapping_div(y),
            BinOp::Rem if y == 0 => return Err(RuntimeError::DivisionByZero),
            _ => x.wrapping_rem(y),
        }),
        (Num::Float(x), Num::Float(y)) => Value::Float(match op {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Mul => x * y,
            BinOp::Div => x / y,
            _ => x % y,
        }),
        (Num::Double(x), Num::Double(y)) => Value::Double(match op {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Mul => x * y,
            BinOp::Div => x / y,
            _ => x % y,
        }),
        _ => return Err(RuntimeError::TypeError("mismatched numeric operands".to_string())),
    };
    Ok(v)
}

impl<'p> Interpreter<'p> {
    /// Evaluate a strict binary operation. `&&` and `||` are handled by the
    /// caller, which must short-circuit.
    ///
    /// `by_reference` selects reference comparison for `==` and `!=`.
    pub(super) fn eval_binop(
        &self,
        op: BinOp,
        l: Value,
        r: Value,
        by_reference: bool,
        result: &Type,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add if *result == Type::string() || matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) => {
                Ok(Value::string(&format!("{}{}", l, r)))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                let (a, b) = promote(&l, &r, op)?;
                arith(op, a, b)
            }
            BinOp::Eq | BinOp::Ne => {
                let same = if by_reference {
                    l.same_ref(&r)
                } else {
                    match (&l, &r) {
                        (Value::Bool(a), Value::Bool(b)) => a == b,
                        _ => match promote(&l, &r, op) {
                            Ok((a, b)) => a == b,
                            Err(_) => l.same_ref(&r),
                        },
                    }
                };
                Ok(Value::Bool(same == (op == BinOp::Eq)))
            }
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                let (a, b) = promote(&l, &r, op)?;
                Ok(Value::Bool(match op {
                    BinOp::Lt => a < b,
                    BinOp::Gt => a > b,
                    BinOp::Le => a <= b,
                    _ => a >= b,
                }))
            }
            BinOp::And | BinOp::Or => match (l, r) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinOp::And { a && b } else { a || b })),
                (l, r) => Err(RuntimeError::TypeError(format!(
                    "operator `{}` not defined for {} and {}",
                    op.symbol(),
                    l.type_name(),
                    r.type_name()
                ))),
            },
        }
    }

    pub(super) fn eval_unop(&self, op: UnaryOp, v: Value) -> Result<Value, RuntimeError> {
        match (op, v) {
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
            (UnaryOp::Neg, Value::Char(c)) => Ok(Value::Int(-(c as i32))),
            (UnaryOp::Neg, Value::Long(n)) => Ok(Value::Long(n.wrapping_neg())),
            (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
            (UnaryOp::Neg, Value::Double(x)) => Ok(Value::Double(-x)),
            (op, v) => Err(RuntimeError::TypeError(format!(
                "unary {:?} not defined for {}",
                op,
                v.type_name()
            ))),
        }
    }

    /// Whether `value` is an instance of `target` (after erasure and boxing).
    pub(super) fn instance_of(&self, value: &Value, target: &Type) -> bool {
        let target = target.erasure().boxed_type_or_type();
        match value.runtime_type() {
            Some(rt) => self.hierarchy.is_subtype(&rt, &target),
            None => false,
        }
    }

    /// Checked reference cast, or primitive conversion.
    pub(super) fn cast(&self, target: &Type, value: Value) -> Result<Value, RuntimeError> {
        if target.is_primitive() {
            return coerce(target, value);
        }
        if value.is_null() || self.instance_of(&value, target) {
            return Ok(value);
        }
        Err(RuntimeError::ClassCast {
            from: value.type_name(),
            to: target.to_string(),
        })
    }
}

/// Assignment conversion: widen or narrow numbers into a primitive target;
/// reference targets take the value as is.
pub(super) fn coerce(target: &Type, value: Value) -> Result<Value, RuntimeError> {
    let Type::Primitive(kind) = target else {
        return Ok(value);
    };
    if let (PrimitiveKind::Boolean, Value::Bool(_)) = (kind, &value) {
        return Ok(value);
    }
    let Some(num) = Num::of(&value) else {
        return Err(RuntimeError::ClassCast {
            from: value.type_name(),
            to: target.to_string(),
        });
    };
    let as_i64 = match num {
        Num::Int(n) => n as i64,
        Num::Long(n) => n,
        Num::Float(x) => x as i64,
        Num::Double(x) => x as i64,
    };
    let as_f64 = match num {
        Num::Int(n) => n as f64,
        Num::Long(n) => n as f64,
        Num::Float(x) => x as f64,
        Num::Double(x) => x,
    };
    Ok(match kind {
        PrimitiveKind::Boolean => {
            return Err(RuntimeError::ClassCast {
                from: value.type_name(),
                to: target.to_string(),
            })
        }
        PrimitiveKind::Byte => Value::Int(as_i64 as i8 as i32),
        PrimitiveKind::Short => Value::Int(as_i64 as i16 as i32),
        PrimitiveKind::Int => Value::Int(as_i64 as i32),
        PrimitiveKind::Char => Value::Char(char::from_u32(as_i64 as u16 as u32).unwrap_or('\u{fffd}')),
        PrimitiveKind::Long => Value::Long(as_i64),
        PrimitiveKind::Float => Value::Float(as_f64 as f32),
        PrimitiveKind::Double => Value::Double(as_f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_narrows_and_widens() {
        assert!(matches!(coerce(&Type::Primitive(PrimitiveKind::Long), Value::Int(3)), Ok(Value::Long(3))));
        assert!(matches!(coerce(&Type::Primitive(PrimitiveKind::Byte), Value::Int(300)), Ok(Value::Int(44))));
        assert!(matches!(coerce(&Type::int(), Value::Char('A')), Ok(Value::Int(65))));
        assert!(matches!(coerce(&Type::string(), Value::Null), Ok(Value::Null)));
        assert!(coerce(&Type::int(), Value::string("x")).is_err());
    }

    #[test]
    fn promotion_picks_wider_operand() {
        let (a, b) = promote(&Value::Int(1), &Value::Double(0.5), BinOp::Add).unwrap();
        assert_eq!(a, Num::Double(1.0));
        assert_eq!(b, Num::Double(0.5));
        assert!(matches!(arith(BinOp::Add, a, b), Ok(Value::Double(x)) if x == 1.5));
        assert!(matches!(arith(BinOp::Div, Num::Int(1), Num::Int(0)), Err(RuntimeError::DivisionByZero)));
    }
}
