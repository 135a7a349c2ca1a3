// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use crate::output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_usage() {
    println!(
        "{} {} - pattern matching lowering",
        output::title("Kettle"),
        output::version(VERSION)
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("kettle"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {} {}   Lower pattern matching and print the result", output::command("lower"), output::arg("<file.json>"));
    println!("  {} {}     Lower, then run a method with the interpreter", output::command("run"), output::arg("<file.json>"));
    println!("  {}                  Show this help", output::command("help"));
    println!("  {}               Show version", output::command("version"));

    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {}     Print each class to stderr after lowering", output::arg("--debug-patterns"));
    println!("  {}               Emit the lowered program as JSON ({})", output::arg("--json"), output::command("lower"));
    println!("  {}      Method to run, default {} ({})", output::arg("--method <name>"), output::arg("main"), output::command("run"));

    println!();
    println!("{}", output::section_header("Environment:"));
    println!("  {}  Same as {}", output::arg("KETTLE_DEBUG_PATTERNS"), output::arg("--debug-patterns"));
    println!("  {}               Log filter, e.g. {}", output::arg("RUST_LOG"), output::arg("kettle_patterns=trace"));
}

pub fn print_lower_help() {
    println!(
        "{}: {} {} {} {}",
        output::section_header("Usage"),
        output::command("kettle lower"),
        output::arg("<file.json>"),
        output::arg("[--debug-patterns]"),
        output::arg("[--json]")
    );
}

pub fn print_run_help() {
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("kettle run"),
        output::arg("<file.json>"),
        output::arg("[--method <name>]")
    );
}
