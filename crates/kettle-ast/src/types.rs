// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Static types and the class hierarchy used to relate them.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Primitive (non-reference) type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Name of the wrapper class a value of this kind boxes into.
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Char => "Character",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
        }
    }
}

/// A static type attached to expressions and symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    /// Primitive value type
    Primitive(PrimitiveKind),
    /// Class or interface type, possibly parameterized
    Class { name: String, args: Vec<Type> },
    /// Array type
    Array(Box<Type>),
    /// Type of the `null` literal
    Null,
    /// Result type of methods that return nothing
    Void,
}

impl Type {
    pub fn class(name: impl Into<String>) -> Type {
        Type::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn object() -> Type {
        Type::class("Object")
    }

    pub fn string() -> Type {
        Type::class("String")
    }

    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveKind::Boolean)
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveKind::Int)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class { .. } | Type::Array(_) | Type::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Boolean))
    }

    /// Drop type arguments, recursively through array element types.
    pub fn erasure(&self) -> Type {
        match self {
            Type::Class { name, .. } => Type::class(name.clone()),
            Type::Array(elem) => Type::Array(Box::new(elem.erasure())),
            other => other.clone(),
        }
    }

    /// The wrapper class for primitives, the type itself otherwise.
    pub fn boxed_type_or_type(&self) -> Type {
        match self {
            Type::Primitive(kind) => Type::class(kind.boxed_name()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{}", kind.name()),
            Type::Class { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Null => write!(f, "null"),
            Type::Void => write!(f, "void"),
        }
    }
}

/// Supertypes recorded for one class.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
}

/// Nominal class hierarchy for subtype queries.
///
/// Classes that were never declared are treated as direct subclasses of
/// `Object`.
#[derive(Debug, Clone)]
pub struct ClassHierarchy {
    classes: HashMap<String, ClassInfo>,
}

impl ClassHierarchy {
    /// A hierarchy containing only `Object`.
    pub fn new() -> Self {
        let mut classes = HashMap::new();
        classes.insert("Object".to_string(), ClassInfo::default());
        Self { classes }
    }

    /// A hierarchy seeded with the core library classes.
    pub fn with_builtins() -> Self {
        let mut h = Self::new();
        h.declare("CharSequence", None, &[]);
        h.declare("Comparable", None, &[]);
        h.declare("String", Some("Object"), &["CharSequence", "Comparable"]);
        h.declare("Number", Some("Object"), &[]);
        for boxed in ["Byte", "Short", "Integer", "Long", "Float", "Double"] {
            h.declare(boxed, Some("Number"), &["Comparable"]);
        }
        h.declare("Boolean", Some("Object"), &["Comparable"]);
        h.declare("Character", Some("Object"), &["Comparable"]);
        h
    }

    /// Record a class (or interface) with its direct supertypes.
    pub fn declare(&mut self, name: &str, superclass: Option<&str>, interfaces: &[&str]) {
        let superclass = match superclass {
            Some(s) => Some(s.to_string()),
            None if name == "Object" => None,
            None => Some("Object".to_string()),
        };
        self.classes.insert(
            name.to_string(),
            ClassInfo {
                superclass,
                interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// Whether class `sub` is `sup` or inherits from it.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == "Object" {
            return true;
        }
        let mut seen = HashSet::new();
        let mut pending = vec![sub.to_string()];
        while let Some(name) = pending.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if name == sup {
                return true;
            }
            if let Some(info) = self.classes.get(&name) {
                pending.extend(info.superclass.iter().cloned());
                pending.extend(info.interfaces.iter().cloned());
            }
        }
        false
    }

    /// Static subtyping: `t <: s`.
    pub fn is_subtype(&self, t: &Type, s: &Type) -> bool {
        match (t, s) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Null, other) => other.is_reference(),
            (Type::Class { name: a, args: a_args }, Type::Class { name: b, args: b_args }) => {
                if !self.is_subclass(a, b) {
                    return false;
                }
                b_args.is_empty() || (a == b && a_args == b_args)
            }
            (Type::Array(_), Type::Class { name, .. }) => name == "Object",
            (Type::Array(a), Type::Array(b)) => {
                if a.is_primitive() || b.is_primitive() {
                    a == b
                } else {
                    self.is_subtype(a, b)
                }
            }
            _ => false,
        }
    }
}

impl Default for ClassHierarchy {
    fn default() -> Self {
        Self::with_builtins()
    }
}
