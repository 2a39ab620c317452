pub mod value;

pub use value::{FunctionValue, Value};
