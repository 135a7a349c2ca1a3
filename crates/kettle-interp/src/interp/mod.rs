// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The interpreter implementation.
//!
//! A tree-walk interpreter over attributed trees. Pattern tests are
//! evaluated natively, so a program can be run before and after lowering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mod eval_expr;
mod exec_stmt;
mod operators;

use kettle_ast::decl::{MethodDecl, Program};
use kettle_ast::symbol::Sym;
use kettle_ast::types::ClassHierarchy;

use crate::builtins::NativeFn;
use crate::env::Environment;
use crate::value::Value;

/// Nested calls deeper than this fail with `StackOverflow`.
const MAX_CALL_DEPTH: usize = 512;

/// The tree-walk interpreter.
pub struct Interpreter<'p> {
    program: &'p Program,
    hierarchy: ClassHierarchy,
    /// Variable and binding values, one frame per call.
    pub(crate) env: Environment,
    /// Host functions callable by name.
    pub(crate) natives: HashMap<String, NativeFn>,
    /// Optional output buffer for capturing stdout (used in tests).
    output_buffer: Option<Arc<Mutex<String>>>,
    next_object_id: u64,
    depth: usize,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            hierarchy: program.hierarchy(),
            env: Environment::new(),
            natives: HashMap::new(),
            output_buffer: None,
            next_object_id: 1,
            depth: 0,
        }
    }

    /// Returns interpreter and output buffer reference.
    pub fn with_captured_output(program: &'p Program) -> (Self, Arc<Mutex<String>>) {
        let buffer = Arc::new(Mutex::new(String::new()));
        let mut interp = Self::new(program);
        interp.output_buffer = Some(buffer.clone());
        (interp, buffer)
    }

    /// Make `f` callable from the program as `name(...)`.
    ///
    /// Program methods shadow natives of the same name.
    pub fn register_native<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: FnMut(&[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        self.natives.insert(name.into(), Box::new(f));
    }

    /// Allocate a fresh instance of `class`.
    pub fn new_object(&mut self, class: &str) -> Value {
        let id = self.next_object_id;
        self.next_object_id += 1;
        Value::object(class, id)
    }

    /// Call the method named `name`. Void methods return `null`.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let program = self.program;
        let method = program
            .method(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;
        self.call_method(method, args)
    }

    pub(crate) fn call_method(&mut self, method: &'p MethodDecl, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if args.len() != method.params.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: method.params.len(),
                got: args.len(),
            });
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow(method.name.clone()));
        }
        let Some(body) = &method.body else {
            return Err(RuntimeError::AbstractMethod(method.name.clone()));
        };

        log::trace!("call {}", method.name);
        self.depth += 1;
        self.env.push_frame();
        for (&param, arg) in method.params.iter().zip(args) {
            let ty = self.program.symbols.var(param).map(|v| v.ty.clone());
            let arg = match ty {
                Some(ty) => operators::coerce(&ty, arg)?,
                None => arg,
            };
            self.env.set(Sym::Var(param), arg);
        }
        let result = self.exec_stmt(body);
        self.env.pop_frame();
        self.depth -= 1;

        match result {
            Ok(()) => Ok(Value::Null),
            Err(RuntimeError::Return(value)) => Ok(value),
            Err(RuntimeError::Break(label)) | Err(RuntimeError::Continue(label)) => Err(RuntimeError::TypeError(
                format!("jump to {:?} escaped method {}", label, method.name),
            )),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn write_output(&self, text: &str) {
        match &self.output_buffer {
            Some(buf) => {
                if let Ok(mut out) = buf.lock() {
                    out.push_str(text);
                }
            }
            None => print!("{}", text),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("undefined function `{0}`")]
    UndefinedFunction(String),

    #[error("{0}")]
    TypeError(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("expected {expected} argument{}, got {got}", if *.expected == 1 { "" } else { "s" })]
    ArityMismatch { expected: usize, got: usize },

    #[error("no method `{method}` on type `{ty}`")]
    NoSuchMethod { ty: String, method: String },

    #[error("cannot cast `{from}` to `{to}`")]
    ClassCast { from: String, to: String },

    #[error("null receiver for `{0}`")]
    NullPointer(String),

    #[error("method `{0}` has no body")]
    AbstractMethod(String),

    #[error("call stack too deep in `{0}`")]
    StackOverflow(String),

    #[error("{0}")]
    Native(String),

    // Control flow (not actual errors)
    #[error("return")]
    Return(Value),

    #[error("break")]
    Break(Option<String>),

    #[error("continue")]
    Continue(Option<String>),
}
