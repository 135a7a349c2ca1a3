// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern-matching lowering pass.
//!
//! Rewrites type-test patterns (`e instanceof T x`) into plain runtime type
//! tests plus explicit storage for the bindings they introduce:
//! - the tested expression is evaluated exactly once, into a synthetic
//!   temporary scoped to the test
//! - binding storage is declared by the construct that guarantees the
//!   binding (`&&`, `||`, `?:`, `if`, loops), initialized to a default value
//! - preserved bindings have their storage declared in the enclosing block
//!
//! Which bindings a condition guarantees is supplied by a
//! [`MatchBindings`] oracle; the pass never recomputes flow facts.
//!
//! This pass runs after attribution and before any other lowering.

mod config;
mod context;
mod defaults;
mod error;
mod lower;

pub use config::{LowerConfig, DEBUG_PATTERNS_ENV};
pub use context::{BindingStack, FrameGuard, FrameId, FrameKind, Hoist, Slot};
pub use defaults::default_value;
pub use error::LowerError;
pub use lower::PatternLowering;

use kettle_ast::decl::{ClassDecl, Program};
use kettle_ast::symbol::SymbolTable;
use kettle_ast::types::ClassHierarchy;
use kettle_flow::MatchBindings;

/// Lower every class of `program` in place.
///
/// Errors are internal consistency failures and abort the pass; the
/// program must not be used afterwards.
pub fn lower_program<M: MatchBindings + ?Sized>(
    program: &mut Program,
    flow: &M,
    config: &LowerConfig,
) -> Result<(), LowerError> {
    let hierarchy = program.hierarchy();
    let classes = std::mem::take(&mut program.classes);
    let mut lowered = Vec::with_capacity(classes.len());
    for class in classes {
        let class = lower_class(class, &mut program.symbols, &hierarchy, flow)?;
        if config.debug_dump {
            eprintln!("{}", kettle_fmt::print_class(&class, &program.symbols));
        }
        lowered.push(class);
    }
    program.classes = lowered;
    Ok(())
}

/// Lower a single top-level class.
pub fn lower_class<M: MatchBindings + ?Sized>(
    class: ClassDecl,
    symbols: &mut SymbolTable,
    hierarchy: &ClassHierarchy,
    flow: &M,
) -> Result<ClassDecl, LowerError> {
    let vars_before = symbols.vars().count();
    let lowered = PatternLowering::new(symbols, hierarchy, flow).lower_class(class)?;
    log::debug!(
        "lowered class {}: {} variable(s) introduced",
        lowered.name,
        symbols.vars().count() - vars_before
    );
    Ok(lowered)
}
