// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Zero values for pre-declared binding storage.

use kettle_ast::expr::{Expr, ExprKind, Literal};
use kettle_ast::make::TreeMaker;
use kettle_ast::types::{PrimitiveKind, Type};

use crate::error::LowerError;

/// The value a hoisted binding variable holds before its pattern matches.
pub fn default_value(make: &mut TreeMaker, ty: &Type) -> Result<Expr, LowerError> {
    let lit = match ty {
        Type::Class { .. } | Type::Array(_) | Type::Null => return Ok(make.null()),
        Type::Primitive(kind) => match kind {
            PrimitiveKind::Boolean => Literal::Bool(false),
            PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int => Literal::Int(0),
            PrimitiveKind::Char => Literal::Char('\0'),
            PrimitiveKind::Long => Literal::Long(0),
            PrimitiveKind::Float => Literal::Float(0.0),
            PrimitiveKind::Double => Literal::Double(0.0),
        },
        Type::Void => return Err(LowerError::NoDefaultValue { ty: ty.clone() }),
    };
    Ok(make.expr(ExprKind::Literal(lit), ty.clone()))
}
