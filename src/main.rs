use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};

use wsj::{Interpreter, RuntimeError};

fn print_error(prefix: &str, err: &RuntimeError) {
    eprintln!("{}: {}", prefix, err.message);
    let mut meta = Vec::new();
    if err.is_syntax() {
        meta.push("kind=syntax".to_string());
    }
    match (err.line, err.column) {
        (Some(line), Some(column)) => meta.push(format!("line={}, column={}", line, column)),
        (Some(line), None) => meta.push(format!("line={}", line)),
        _ => {}
    }
    if !meta.is_empty() {
        eprintln!("{} metadata: {}", prefix, meta.join(", "));
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut dump_ast = false;
    let mut repl_flag = false;
    let mut filtered_args: Vec<String> = Vec::new();
    for arg in &args[1..] {
        if arg == "--version" {
            println!("wsj {}", env!("CARGO_PKG_VERSION"));
            return;
        } else if arg == "--dump-ast" {
            dump_ast = true;
        } else if arg == "--repl" {
            repl_flag = true;
        } else {
            filtered_args.push(arg.clone());
        }
    }

    if repl_flag || (filtered_args.is_empty() && io::stdin().is_terminal()) {
        wsj::repl::run_repl();
        return;
    }

    let input = if !filtered_args.is_empty() && filtered_args[0] == "-e" {
        if filtered_args.len() < 2 {
            eprintln!("Usage: {} -e <code>", args[0]);
            std::process::exit(1);
        }
        filtered_args[1].clone()
    } else if !filtered_args.is_empty() {
        fs::read_to_string(&filtered_args[0]).unwrap_or_else(|err| {
            eprintln!("Failed to read {}: {}", filtered_args[0], err);
            std::process::exit(1);
        })
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).unwrap_or_else(|err| {
            eprintln!("Failed to read stdin: {}", err);
            std::process::exit(1);
        });
        buf
    };

    if dump_ast {
        match wsj::dump_ast(&input) {
            Ok(ast) => println!("{}", ast),
            Err(err) => {
                print_error("Parse error", &err);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut interpreter = Interpreter::new();
    match interpreter.run(&input) {
        Ok(output) => print!("{}", output),
        Err(err) => {
            print_error("Error", &err);
            let output = interpreter.output();
            if !output.is_empty() {
                print!("{}", output);
            }
            std::process::exit(1);
        }
    }
}
