// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Builtin functions and methods on builtin values.

use crate::interp::{Interpreter, RuntimeError};
use crate::value::Value;

/// A host function registered with [`Interpreter::register_native`].
pub type NativeFn = Box<dyn FnMut(&[Value]) -> Result<Value, RuntimeError>>;

impl<'p> Interpreter<'p> {
    /// Functions every program can call. `None` if `name` is not one.
    pub(crate) fn call_builtin(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, RuntimeError>> {
        match name {
            "print" | "println" => {
                let mut text = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
                if name == "println" {
                    text.push('\n');
                }
                self.write_output(&text);
                Some(Ok(Value::Null))
            }
            _ => None,
        }
    }

    /// Methods on strings, boxes and objects.
    pub(crate) fn call_value_method(
        &mut self,
        recv: Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if recv.is_null() {
            return Err(RuntimeError::NullPointer(method.to_string()));
        }
        match (&recv, method, args.as_slice()) {
            (_, "toString", []) => Ok(Value::string(&recv.to_string())),
            (Value::Str(s), "equals", [other]) => Ok(Value::Bool(matches!(other, Value::Str(o) if o == s))),
            (_, "equals", [other]) => Ok(Value::Bool(recv.same_ref(other))),
            (Value::Str(s), "length", []) => Ok(Value::Int(s.chars().count() as i32)),
            (Value::Str(s), "isEmpty", []) => Ok(Value::Bool(s.is_empty())),
            (Value::Str(s), "charAt", [Value::Int(i)]) => s
                .chars()
                .nth(*i as usize)
                .map(Value::Char)
                .ok_or_else(|| RuntimeError::Native(format!("index {} out of range for length {}", i, s.chars().count()))),
            (Value::Int(n), "intValue", []) => Ok(Value::Int(*n)),
            (Value::Int(n), "longValue", []) => Ok(Value::Long(*n as i64)),
            (Value::Long(n), "longValue", []) => Ok(Value::Long(*n)),
            (Value::Int(n), "doubleValue", []) => Ok(Value::Double(*n as f64)),
            (Value::Double(x), "doubleValue", []) => Ok(Value::Double(*x)),
            (Value::Bool(b), "booleanValue", []) => Ok(Value::Bool(*b)),
            _ => Err(RuntimeError::NoSuchMethod {
                ty: recv.type_name(),
                method: method.to_string(),
            }),
        }
    }
}
