// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI command implementations.

pub mod lower;
pub mod run;

use std::fmt::Display;
use std::fs;
use std::process;

use kettle_ast::decl::Program;
use kettle_flow::{preserve_bindings, MatchBindingsComputer};
use kettle_patterns::{LowerConfig, LowerError};

use crate::output;

/// Report a fatal error for `phase` and exit with status 1.
pub fn fail(phase: &str, message: impl Display) -> ! {
    eprintln!("{}: {}", output::error_label(), message);
    eprintln!("\n{}", output::banner_fail(phase));
    process::exit(1);
}

/// Read an attributed program from a JSON file.
pub fn load_program(path: &str) -> Program {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => fail("Load", format!("cannot read {}: {}", output::file_path(path), e)),
    };
    match serde_json::from_str::<Program>(&source) {
        Ok(program) => {
            log::debug!(
                "loaded {} class(es), {} binding(s) from {}",
                program.classes.len(),
                program.symbols.bindings().count(),
                path
            );
            program
        }
        Err(e) => fail("Load", format!("{} is not an attributed program: {}", output::file_path(path), e)),
    }
}

/// Mark preserved bindings, then lower every class.
pub fn lower(program: &mut Program, config: &LowerConfig) -> Result<(), LowerError> {
    preserve_bindings(program);
    kettle_patterns::lower_program(program, &MatchBindingsComputer, config)
}

pub fn report_lower_error(error: &LowerError) -> ! {
    if let LowerError::UnresolvedBinding { .. } = error {
        eprintln!(
            "{}: the input references a pattern binding outside the region where it is definitely matched",
            output::hint_label()
        );
    }
    fail("Lower", error)
}
