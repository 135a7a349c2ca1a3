// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lowering error types.
//!
//! Every variant is an internal consistency failure: upstream attribution
//! has already validated the program, so callers abort on any of these.

use kettle_ast::symbol::{BindingId, VarId};
use kettle_ast::types::Type;
use kettle_ast::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerError {
    #[error("pattern binding `{name}` has no storage in scope")]
    UnresolvedBinding { name: String, span: Span },

    #[error("no default value for type `{ty}`")]
    NoDefaultValue { ty: Type },

    #[error("unknown binding symbol {0:?}")]
    UnknownBinding(BindingId),

    #[error("unknown variable symbol {0:?}")]
    UnknownVar(VarId),
}
