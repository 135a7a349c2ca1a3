// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Variable and pattern-binding symbols.

use crate::types::Type;

/// Unique identifier for an ordinary or synthetic variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub u32);

/// Unique identifier for a pattern binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingId(pub u32);

/// What an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sym {
    Var(VarId),
    Binding(BindingId),
}

/// A local variable, parameter, or pass-introduced slot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarSymbol {
    pub id: VarId,
    pub name: String,
    pub ty: Type,
    /// Enclosing method, if known.
    pub owner: Option<String>,
    /// Introduced by a compiler pass rather than written in source.
    pub synthetic: bool,
}

/// A variable declared by a type-test pattern.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BindingSymbol {
    pub id: BindingId,
    pub name: String,
    pub ty: Type,
    pub owner: Option<String>,
    /// The binding is in scope after its introducing statement, so its
    /// storage may be declared in the enclosing block.
    pub preserved: bool,
    /// Non-empty for a binding that unifies duplicate occurrences
    /// (e.g. the same name bound on both sides of `||`).
    pub components: Vec<BindingId>,
}

impl BindingSymbol {
    pub fn is_merged(&self) -> bool {
        !self.components.is_empty()
    }
}

/// Table of all variable and binding symbols in a program.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolTable {
    vars: Vec<VarSymbol>,
    bindings: Vec<BindingSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a source variable and return its ID.
    pub fn new_var(&mut self, name: impl Into<String>, ty: Type, owner: Option<String>) -> VarId {
        self.push_var(name.into(), ty, owner, false)
    }

    /// Insert a compiler-introduced variable and return its ID.
    pub fn new_synthetic(&mut self, name: impl Into<String>, ty: Type, owner: Option<String>) -> VarId {
        self.push_var(name.into(), ty, owner, true)
    }

    fn push_var(&mut self, name: String, ty: Type, owner: Option<String>, synthetic: bool) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(VarSymbol {
            id,
            name,
            ty,
            owner,
            synthetic,
        });
        id
    }

    /// Insert a pattern binding and return its ID.
    pub fn new_binding(&mut self, name: impl Into<String>, ty: Type, owner: Option<String>) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(BindingSymbol {
            id,
            name: name.into(),
            ty,
            owner,
            preserved: false,
            components: Vec::new(),
        });
        id
    }

    pub fn var(&self, id: VarId) -> Option<&VarSymbol> {
        self.vars.get(id.0 as usize)
    }

    pub fn binding(&self, id: BindingId) -> Option<&BindingSymbol> {
        self.bindings.get(id.0 as usize)
    }

    pub fn vars(&self) -> impl Iterator<Item = &VarSymbol> {
        self.vars.iter()
    }

    pub fn bindings(&self) -> impl Iterator<Item = &BindingSymbol> {
        self.bindings.iter()
    }

    /// Display name of whatever `sym` refers to.
    pub fn name_of(&self, sym: Sym) -> Option<&str> {
        match sym {
            Sym::Var(id) => self.var(id).map(|v| v.name.as_str()),
            Sym::Binding(id) => self.binding(id).map(|b| b.name.as_str()),
        }
    }

    /// Mark a binding (and everything it unifies) as preserved.
    pub fn preserve(&mut self, id: BindingId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(b) = self.bindings.get_mut(id.0 as usize) {
                if b.preserved && b.components.is_empty() {
                    continue;
                }
                b.preserved = true;
                pending.extend(b.components.iter().copied());
            }
        }
    }

    /// The original pattern occurrences a binding stands for.
    pub fn leaves(&self, id: BindingId) -> Vec<BindingId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            match self.binding(id) {
                Some(b) if b.is_merged() => pending.extend(b.components.iter().copied()),
                Some(_) => out.push(id),
                None => {}
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Whether `a` and `b` denote the same logical binding.
    pub fn is_alias_for(&self, a: BindingId, b: BindingId) -> bool {
        if a == b {
            return true;
        }
        let left = self.leaves(a);
        self.leaves(b).iter().any(|leaf| left.binary_search(leaf).is_ok())
    }

    /// Unify two occurrences of the same logical binding.
    ///
    /// Merged symbols are interned by the occurrences they cover, so merging
    /// the same pair again returns the existing symbol.
    pub fn merge(&mut self, a: BindingId, b: BindingId) -> Option<BindingId> {
        let first = self.binding(a)?.clone();
        let second = self.binding(b)?;
        let preserved = first.preserved || second.preserved;

        let mut leaves = self.leaves(a);
        leaves.extend(self.leaves(b));
        leaves.sort();
        leaves.dedup();
        if leaves == self.leaves(a) {
            return Some(a);
        }
        if leaves == self.leaves(b) {
            return Some(b);
        }
        if let Some(existing) = self
            .bindings
            .iter()
            .find(|s| s.is_merged() && self.leaves(s.id) == leaves)
        {
            return Some(existing.id);
        }

        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(BindingSymbol {
            id,
            name: first.name,
            ty: first.ty,
            owner: first.owner,
            preserved,
            components: vec![a, b],
        });
        Some(id)
    }
}
