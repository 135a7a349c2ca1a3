// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tree-walk interpreter for attributed Kettle programs.
//!
//! Runs methods directly from the tree, before or after pattern lowering,
//! so the two forms of a program can be checked against each other.

mod value;
mod env;
mod interp;
mod builtins;

pub use builtins::NativeFn;
pub use interp::{Interpreter, RuntimeError};
pub use value::Value;
