// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern-binding flow facts.
//!
//! Answers which pattern bindings are definitely assigned when a boolean
//! expression evaluates to `true` or `false`, and marks the bindings that
//! stay in scope after the statement introducing them.

mod bindings;
mod preserve;

pub use bindings::{MatchBindings, MatchBindingsComputer};
pub use preserve::{can_complete_normally, preserve_bindings, preserve_in};
