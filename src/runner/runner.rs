use crate::environment::Environment;
use crate::eval::{evaluate_program, EvalOptions};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::runner::error::{Result, RunnerError};
use std::fs;
use std::io::{self, Write};

/*
A minimal CLI surface sits on top of a single public entry point,
`evaluate_source`, so an embedder wanting a different host surface (a file
server, an FFI bridge) only needs that one function, nothing below it is
REPL-specific.
*/

/// The `{result}` / `{error}` shape returned by evaluating one complete
/// unit of source against a persistent environment.
#[derive(Debug, Clone)]
pub enum EvalOutcome {
    Result(String),
    Error(String),
}

/// Lexes, parses, and evaluates `source` against `env`. Lexer errors and
/// parser errors are combined and reported before any evaluation is
/// attempted, mirroring the Go original's `evaluateSupBud` bridge function.
pub fn evaluate_source(source: &str, env: &Environment, options: EvalOptions) -> EvalOutcome {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        log::debug!("evaluate_source: {} parse error(s)", parser.errors().len());
        return EvalOutcome::Error(parser.format_errors());
    }

    let value = evaluate_program(&program, env, options);
    if let crate::object::Value::Error(msg) = &value {
        return EvalOutcome::Error(msg.clone());
    }

    EvalOutcome::Result(value.inspect())
}

/// Reads and evaluates one script file against a fresh global environment.
/// A read failure is a host concern (`RunnerError`), not a language-level
/// `Value::Error` (the script's own lexer/parser/runtime errors still go
/// through `evaluate_source` and exit 65, matching `sysexits.h`'s `EX_DATAERR`).
pub fn run_file(path: &str) -> Result<()> {
    let source = fs::read_to_string(path).map_err(|source| RunnerError::ReadScript {
        path: path.to_string(),
        source,
    })?;
    let env = Environment::new_global();

    match evaluate_source(&source, &env, EvalOptions::default()) {
        EvalOutcome::Result(text) => println!("{text}"),
        EvalOutcome::Error(text) => {
            eprintln!("{text}");
            std::process::exit(65);
        }
    }

    Ok(())
}

const PROMPT: &str = ">> ";
const CONTINUATION: &str = "... ";

/// A line-oriented REPL: meta-commands (`:h`, `:z`, `:c`, `:q`), trailing-
/// backslash multi-line continuation, and a persistent environment shared
/// across every evaluated line, matching `repl.go`'s `REPL` struct.
pub struct Repl {
    env: Environment,
    history: Vec<String>,
    multiline_buffer: Vec<String>,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            env: Environment::new_global(),
            history: Vec::new(),
            multiline_buffer: Vec::new(),
        }
    }

    /// Returns `true` if `line` was a recognized meta-command (and has
    /// already been handled), `false` if it should fall through to
    /// evaluation.
    fn handle_meta_command(&mut self, line: &str) -> bool {
        match line.trim() {
            ":h" => {
                println!("Available commands:");
                println!(":h    - Show this help message");
                println!(":z    - Show command history");
                println!(":c    - Clear the screen");
                println!(":q    - Exit the REPL");
                println!("Use \\ at the end of a line for multi-line input");
                true
            }
            ":z" => {
                for (i, cmd) in self.history.iter().enumerate() {
                    println!("{}: {cmd}", i + 1);
                }
                true
            }
            ":c" => {
                print!("\x1B[2J\x1B[H");
                io::stdout().flush().ok();
                true
            }
            ":q" => true,
            _ => false,
        }
    }

    /// Runs the read-eval-print loop against stdin/stdout until EOF or `:q`.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            let prompt = if self.multiline_buffer.is_empty() {
                PROMPT
            } else {
                CONTINUATION
            };
            print!("{prompt}");
            stdout.flush().ok();

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    eprintln!("Error reading input: {err}");
                    continue;
                }
            }

            let trimmed_end = line.trim_end_matches(['\n', '\r']);

            if trimmed_end.starts_with(':') && self.multiline_buffer.is_empty() {
                if trimmed_end.trim() == ":q" {
                    self.handle_meta_command(trimmed_end);
                    break;
                }
                if self.handle_meta_command(trimmed_end) {
                    continue;
                }
            }

            if let Some(continued) = trimmed_end.trim_end().strip_suffix('\\') {
                self.multiline_buffer.push(continued.trim_end().to_string());
                continue;
            }

            let input = if self.multiline_buffer.is_empty() {
                trimmed_end.to_string()
            } else {
                self.multiline_buffer.push(trimmed_end.to_string());
                self.multiline_buffer.drain(..).collect::<Vec<_>>().join("\n")
            };

            if input.trim().is_empty() {
                continue;
            }

            self.history.push(input.clone());

            match evaluate_source(&input, &self.env, EvalOptions::default()) {
                EvalOutcome::Result(text) => println!("{text}"),
                EvalOutcome::Error(text) => println!("{text}"),
            }
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_prompt() {
    Repl::new().run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_a_simple_expression_to_a_result() {
        let env = Environment::new_global();
        match evaluate_source("1 + 2;", &env, EvalOptions::default()) {
            EvalOutcome::Result(text) => assert_eq!(text, "3"),
            EvalOutcome::Error(text) => panic!("unexpected error: {text}"),
        }
    }

    #[test]
    fn persists_bindings_across_calls_against_the_same_environment() {
        let env = Environment::new_global();
        evaluate_source("let x = 10;", &env, EvalOptions::default());
        match evaluate_source("x * 2;", &env, EvalOptions::default()) {
            EvalOutcome::Result(text) => assert_eq!(text, "20"),
            EvalOutcome::Error(text) => panic!("unexpected error: {text}"),
        }
    }

    #[test]
    fn parse_errors_surface_as_an_eval_outcome_error() {
        let env = Environment::new_global();
        match evaluate_source("let = 5;", &env, EvalOptions::default()) {
            EvalOutcome::Error(text) => assert!(text.contains("Parser errors")),
            EvalOutcome::Result(text) => panic!("expected error, got result: {text}"),
        }
    }

    #[test]
    fn runtime_errors_surface_as_an_eval_outcome_error() {
        let env = Environment::new_global();
        match evaluate_source("foo;", &env, EvalOptions::default()) {
            EvalOutcome::Error(text) => assert_eq!(text, "identifier not found: foo"),
            EvalOutcome::Result(text) => panic!("expected error, got result: {text}"),
        }
    }
}
