// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Kettle CLI - lowers and runs attributed programs stored as JSON.

mod commands;
mod help;
mod output;

use std::env;
use std::process;

use commands::lower::LowerOptions;

fn main() {
    env_logger::init();
    output::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        help::print_usage();
        return;
    }

    match args[1].as_str() {
        "lower" => {
            let mut opts = LowerOptions::default();
            let mut path = None;
            for arg in &args[2..] {
                match arg.as_str() {
                    "--debug-patterns" => opts.debug_patterns = true,
                    "--json" => opts.json = true,
                    "-h" | "--help" => {
                        help::print_lower_help();
                        return;
                    }
                    flag if flag.starts_with('-') => usage_error(&format!("unknown option `{}`", flag), help::print_lower_help),
                    file => path = Some(file.to_string()),
                }
            }
            let Some(path) = path else {
                usage_error("missing input file", help::print_lower_help);
            };
            commands::lower::cmd_lower(&path, &opts);
        }
        "run" => {
            let mut method = "main".to_string();
            let mut path = None;
            let mut rest = args[2..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--method" | "-m" => match rest.next() {
                        Some(name) => method = name.clone(),
                        None => usage_error("`--method` needs a method name", help::print_run_help),
                    },
                    "-h" | "--help" => {
                        help::print_run_help();
                        return;
                    }
                    flag if flag.starts_with('-') => usage_error(&format!("unknown option `{}`", flag), help::print_run_help),
                    file => path = Some(file.to_string()),
                }
            }
            let Some(path) = path else {
                usage_error("missing input file", help::print_run_help);
            };
            commands::run::cmd_run(&path, &method);
        }
        "help" | "--help" | "-h" => {
            help::print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("kettle {}", help::VERSION);
        }
        other => {
            eprintln!("{}: unknown command `{}`", output::error_label(), other);
            help::print_usage();
            process::exit(1);
        }
    }
}

fn usage_error(message: &str, usage: fn()) -> ! {
    eprintln!("{}: {}", output::error_label(), message);
    usage();
    process::exit(1);
}
