//! CLI tool to dump the token stream or AST of zoidberg source files.

use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: zoidberg <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  tokens  Print the token stream of each file");
        eprintln!("  parse   Print the parsed program of each file");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  zoidberg tokens num.berg");
        eprintln!("  zoidberg parse num.berg");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let files = &args[2..];

    if !matches!(command, "tokens" | "parse") {
        eprintln!("Unknown command: {command}");
        return ExitCode::from(2);
    }

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        if command == "tokens" {
            let mut lexer = zoidberg::tokenize(path, &content);
            println!("{path}:");
            for token in lexer.by_ref() {
                println!("- {:?} {:?} @{}", token.kind, token.text, token.span);
            }
            if let Some(e) = lexer.error() {
                eprintln!("{path}: {e}");
                had_error = true;
            }
        } else {
            match zoidberg::parse_str(path, &content) {
                Ok(program) => println!("{program:#?}"),
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
