// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runtime values.

use std::fmt;
use std::rc::Rc;

use kettle_ast::types::{PrimitiveKind, Type};

/// A runtime value in the interpreter.
///
/// Primitives and their boxes share a representation; `instanceof` treats
/// a primitive value as an instance of its wrapper class.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(Rc<str>),
    /// Instance of a program or builtin class
    Object(Rc<Object>),
}

/// Heap object identity plus its runtime class.
#[derive(Debug)]
pub struct Object {
    pub class: String,
    pub id: u64,
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn object(class: impl Into<String>, id: u64) -> Value {
        Value::Object(Rc::new(Object {
            class: class.into(),
            id,
        }))
    }

    /// Runtime class used for `instanceof` and casts; `None` for `null`.
    pub fn runtime_type(&self) -> Option<Type> {
        let kind = match self {
            Value::Null => return None,
            Value::Str(_) => return Some(Type::string()),
            Value::Object(obj) => return Some(Type::class(obj.class.clone())),
            Value::Bool(_) => PrimitiveKind::Boolean,
            Value::Int(_) => PrimitiveKind::Int,
            Value::Long(_) => PrimitiveKind::Long,
            Value::Float(_) => PrimitiveKind::Float,
            Value::Double(_) => PrimitiveKind::Double,
            Value::Char(_) => PrimitiveKind::Char,
        };
        Some(Type::class(kind.boxed_name()))
    }

    pub fn type_name(&self) -> String {
        self.runtime_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Reference comparison (`==` on reference-typed operands).
    ///
    /// Boxed primitives compare by bits, so a boxed NaN is the same as
    /// itself.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Double(x) => write!(f, "{:?}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(obj) => write!(f, "{}@{:x}", obj.class, obj.id),
        }
    }
}
