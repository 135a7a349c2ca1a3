// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration tree nodes.

use crate::stmt::Stmt;
use crate::symbol::{SymbolTable, VarId};
use crate::types::{ClassHierarchy, Type};
use crate::{NodeId, Span};

/// An attributed program: its classes plus the symbols they reference.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub symbols: SymbolTable,
}

/// A top-level class declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: String,
    pub superclass: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: String,
    pub params: Vec<VarId>,
    pub ret: Type,
    /// Method body (a block statement); `None` for abstract methods.
    pub body: Option<Stmt>,
    pub span: Span,
}

impl Program {
    /// Builtin classes plus every class this program declares.
    pub fn hierarchy(&self) -> ClassHierarchy {
        let mut h = ClassHierarchy::with_builtins();
        for class in &self.classes {
            let interfaces: Vec<&str> = class.interfaces.iter().map(String::as_str).collect();
            h.declare(&class.name, class.superclass.as_deref(), &interfaces);
        }
        h
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Find a method by name across all classes.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.classes
            .iter()
            .flat_map(|c| c.methods.iter())
            .find(|m| m.name == name)
    }
}

impl ClassDecl {
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}
