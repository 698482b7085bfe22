use crate::Interpreter;
use crate::value::Value;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Check if the input has unbalanced brackets or an open string, suggesting
/// more input is needed. A crude heuristic, but the parser is never handed
/// a statement this still considers incomplete.
fn is_incomplete(input: &str) -> bool {
    let mut depth_brace = 0i32;
    let mut depth_paren = 0i32;
    let mut depth_bracket = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for ch in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth_brace += 1,
            '}' => depth_brace -= 1,
            '(' => depth_paren += 1,
            ')' => depth_paren -= 1,
            '[' => depth_bracket += 1,
            ']' => depth_bracket -= 1,
            _ => {}
        }
    }

    depth_brace > 0 || depth_paren > 0 || depth_bracket > 0 || in_string
}

/// Result of processing a single REPL line.
enum LineResult {
    /// Need more input (incomplete statement).
    Continue,
    /// Line was processed (output may have been produced).
    Done,
}

/// Process a single line of REPL input. Returns the display string (if any)
/// and whether more input is needed.
///
/// This function is the testable core of the REPL loop — it has no I/O
/// dependencies beyond the `Interpreter`.
fn process_line(
    interpreter: &mut Interpreter,
    accumulated: &mut String,
    line: &str,
) -> (LineResult, Option<String>) {
    if accumulated.is_empty() {
        *accumulated = line.to_string();
    } else {
        accumulated.push('\n');
        accumulated.push_str(line);
    }

    if is_incomplete(accumulated) {
        return (LineResult::Continue, None);
    }

    if accumulated.trim().is_empty() {
        accumulated.clear();
        return (LineResult::Done, None);
    }

    interpreter.clear_output();
    let display = match interpreter.run(accumulated) {
        Ok(_) => {
            let output = interpreter.output().to_string();
            let display = if !output.is_empty() {
                Some(output)
            } else {
                match interpreter.last_value.take() {
                    Some(Value::Nil) | None => None,
                    Some(value) => Some(format!("{}\n", value.to_string_value())),
                }
            };
            interpreter.clear_output();
            display
        }
        Err(err) => {
            // A syntax failure on bracket-balanced input may still mean the
            // user is mid-statement; keep accumulating in that case.
            if err.is_syntax() && is_incomplete(accumulated) {
                return (LineResult::Continue, None);
            }
            Some(format!("Error: {}\n", err.message))
        }
    };

    accumulated.clear();
    (LineResult::Done, display)
}

pub fn run_repl() {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize line editor: {}", err);
            std::process::exit(1);
        }
    };

    let history_path = history_path();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let mut interpreter = Interpreter::new();
    let mut accumulated = String::new();

    loop {
        let prompt = if accumulated.is_empty() { "> " } else { "* " };

        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let (result, display) = process_line(&mut interpreter, &mut accumulated, &line);
                if let Some(text) = display {
                    print!("{}", text);
                }
                if matches!(result, LineResult::Continue) {
                    continue;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: cancel current input
                accumulated.clear();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D: exit
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
}

fn history_path() -> Option<std::path::PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let dir = std::path::PathBuf::from(home).join(".wsj");
    let _ = std::fs::create_dir_all(&dir);
    Some(dir.join("history"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: feed lines into the REPL core and collect all display output.
    fn repl_session(lines: &[&str]) -> Vec<String> {
        let mut interpreter = Interpreter::new();
        let mut accumulated = String::new();
        let mut outputs = Vec::new();

        for line in lines {
            let (_result, display) = process_line(&mut interpreter, &mut accumulated, line);
            if let Some(text) = display {
                outputs.push(text);
            }
        }
        outputs
    }

    #[test]
    fn say_prints_once() {
        let out = repl_session(&["say(\"hello\");"]);
        assert_eq!(out, vec!["hello\n"]);
    }

    #[test]
    fn output_does_not_repeat_on_next_input() {
        let out = repl_session(&["say(\"hello\");", "3"]);
        assert_eq!(out, vec!["hello\n", "3\n"]);
    }

    #[test]
    fn expression_shows_value() {
        let out = repl_session(&["1 + 2"]);
        assert_eq!(out, vec!["3\n"]);
    }

    #[test]
    fn bindings_persist_across_lines() {
        let out = repl_session(&["let x = 41;", "say(x + 1);"]);
        assert_eq!(out, vec!["42\n"]);
    }

    #[test]
    fn multiline_block_accumulates_until_balanced() {
        let out = repl_session(&["{", "  let y = 2;", "  say(y);", "}"]);
        assert_eq!(out, vec!["2\n"]);
    }

    #[test]
    fn whitespace_only_lines_are_ignored() {
        let out = repl_session(&["   ", "  \t  "]);
        assert!(out.is_empty());
    }

    #[test]
    fn open_string_counts_as_incomplete() {
        assert!(is_incomplete("say(\"unclosed"));
        assert!(!is_incomplete("say(\"closed\");"));
    }

    #[test]
    fn mixed_form_error_is_reported() {
        let out = repl_session(&["let x, y = 5, 4;"]);
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("Error: "));
        assert!(out[0].contains("mixed declaration form"));
    }
}
