pub mod error;
pub mod runner;

pub use error::{Result, RunnerError};
pub use runner::{evaluate_source, run_file, run_prompt, EvalOutcome, Repl};
