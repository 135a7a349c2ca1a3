// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Attributed syntax tree for the Kettle pattern-lowering pipeline.
//!
//! This crate defines the tree nodes, symbols and types shared between
//! attribution, flow analysis, the lowering passes and the interpreter.

pub mod span;
pub mod types;
pub mod symbol;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod make;

pub use span::Span;

/// Unique identifier for tree nodes.
///
/// Used by analysis passes to key side tables by node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}
