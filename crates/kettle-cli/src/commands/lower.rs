// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The `lower` command.

use kettle_ast::decl::Program;
use kettle_ast::expr::ExprKind;
use kettle_patterns::LowerConfig;

use super::{fail, load_program, lower, report_lower_error};
use crate::output;

#[derive(Debug, Default)]
pub struct LowerOptions {
    pub debug_patterns: bool,
    pub json: bool,
}

pub fn cmd_lower(path: &str, opts: &LowerOptions) {
    let mut program = load_program(path);
    let patterns = count_type_tests(&program);

    let mut config = LowerConfig::from_env();
    if opts.debug_patterns {
        config = config.with_debug_dump(true);
    }
    if let Err(e) = lower(&mut program, &config) {
        report_lower_error(&e);
    }
    log::info!("lowered {} type test pattern(s) in {}", patterns, path);

    if opts.json {
        match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{}", json),
            Err(e) => fail("Output", e),
        }
    } else {
        print!("{}", kettle_fmt::print_program(&program));
        println!();
        println!("{}", output::banner_ok("Lower"));
    }
}

fn count_type_tests(program: &Program) -> usize {
    let mut count = 0;
    for class in &program.classes {
        for method in &class.methods {
            if let Some(body) = &method.body {
                body.walk_exprs(&mut |e| {
                    if let ExprKind::TypeTest { .. } = e.kind {
                        count += 1;
                    }
                });
            }
        }
    }
    count
}
