// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The `run` command: lower, then interpret one method.

use kettle_ast::types::Type;
use kettle_interp::Interpreter;
use kettle_patterns::LowerConfig;

use super::{fail, load_program, lower, report_lower_error};

pub fn cmd_run(path: &str, method: &str) {
    let mut program = load_program(path);
    if let Err(e) = lower(&mut program, &LowerConfig::from_env()) {
        report_lower_error(&e);
    }

    let returns_value = match program.method(method) {
        Some(m) => m.ret != Type::Void,
        None => fail("Runtime", format!("no method named `{}`", method)),
    };

    let mut interp = Interpreter::new(&program);
    match interp.call(method, Vec::new()) {
        Ok(value) if returns_value => println!("{}", value),
        Ok(_) => {}
        Err(e) => fail("Runtime", e),
    }
}
