// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Java-like pretty printer for attributed trees.
//!
//! Used for debug dumps of lowered code and by the CLI. Let-expressions,
//! which have no source syntax, print as `(let T x = e; in body)`.

mod config;
mod printer;

use kettle_ast::decl::{ClassDecl, Program};
use kettle_ast::expr::Expr;
use kettle_ast::stmt::Stmt;
use kettle_ast::symbol::SymbolTable;

pub use config::FormatConfig;
pub use printer::Printer;

/// Print every class of a program with default configuration.
pub fn print_program(program: &Program) -> String {
    print_program_with_config(program, &FormatConfig::default())
}

pub fn print_program_with_config(program: &Program, config: &FormatConfig) -> String {
    let mut p = Printer::new(&program.symbols, config);
    p.format_program(program);
    p.finish()
}

pub fn print_class(class: &ClassDecl, symbols: &SymbolTable) -> String {
    let config = FormatConfig::default();
    let mut p = Printer::new(symbols, &config);
    p.format_class(class);
    p.finish()
}

pub fn print_stmt(stmt: &Stmt, symbols: &SymbolTable) -> String {
    let config = FormatConfig::default();
    let mut p = Printer::new(symbols, &config);
    p.format_stmt(stmt);
    p.finish()
}

/// Render a single expression on one line.
pub fn print_expr(expr: &Expr, symbols: &SymbolTable) -> String {
    let config = FormatConfig::default();
    Printer::new(symbols, &config).expr_str(expr)
}
