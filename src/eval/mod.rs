pub mod eval;

pub use eval::{evaluate_program, EvalOptions};
