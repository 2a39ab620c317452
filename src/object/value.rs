use crate::environment::Environment;
use crate::parser::{BlockStatement, Identifier};
use std::fmt;
use std::rc::Rc;

/*
A closed sum type of runtime objects. `Boolean` and `Null` are conceptually
singletons with reference-identity equality; in Rust a `bool` has exactly
two possible values and no useful notion of "a second instance of `true`",
so plain value equality on `Value::Boolean(bool)` already *is* the
singleton discipline (there is nothing to allocate or deduplicate).
`Function` is the one variant where identity genuinely differs from
structural equality (two textually identical `fn` literals evaluated twice
must not compare equal), so it is the only variant compared by
`Rc::ptr_eq` rather than by field equality (see `reference_eq` below).
*/
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Null,
    /// Internal marker for a value unwinding out of a block/function.
    /// Never returned to a caller outside the evaluator.
    ReturnValue(Box<Value>),
    Error(String),
    Function(Rc<FunctionValue>),
}

pub struct FunctionValue {
    pub params: Vec<Identifier>,
    pub body: BlockStatement,
    pub closed_env: Environment,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
            Value::Function(_) => "FUNCTION",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_return_value(&self) -> bool {
        matches!(self, Value::ReturnValue(_))
    }

    /// Truthiness: everything except `FALSE` and `NULL` is truthy, notably
    /// `Integer(0)` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    /// Reference equality for the `==`/`!=` infix operators once both
    /// operands share a (non-`Integer`) type.
    pub fn reference_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The "inspected" textual form used at the evaluation boundary.
    /// `ReturnValue` is never inspected (it must be unwound before this
    /// point), which the `debug_assert` documents as a caller invariant.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Error(msg) => format!("ERROR: {msg}"),
            Value::Function(func) => {
                let params: Vec<String> = func.params.iter().map(|p| p.name.clone()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), func.body)
            }
            Value::ReturnValue(inner) => {
                debug_assert!(false, "ReturnValue must be unwrapped before inspection");
                inner.inspect()
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Null => write!(f, "Null"),
            Value::ReturnValue(inner) => write!(f, "ReturnValue({inner:?})"),
            Value::Error(msg) => write!(f, "Error({msg:?})"),
            Value::Function(_) => write!(f, "Function(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_table() {
        assert!(Value::Boolean(true).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
    }

    #[test]
    fn booleans_and_null_compare_by_value() {
        assert!(Value::Boolean(true).reference_eq(&Value::Boolean(true)));
        assert!(!Value::Boolean(true).reference_eq(&Value::Boolean(false)));
        assert!(Value::Null.reference_eq(&Value::Null));
    }
}
