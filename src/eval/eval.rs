use crate::environment::Environment;
use crate::object::{FunctionValue, Value};
use crate::parser::{BlockStatement, Expression, Program, Statement};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::{Duration, Instant};

/*
The tree-walking evaluator. `evaluate_program` is the single public entry
point; everything else is a private recursive descent over the AST,
threading a shared recursion `Budget` through every call the way the Go
original threads `maxDepth` through `evalWithDepthTracking`.

Bounded execution combines two independent guards: a recursion-depth
counter, decremented on every statement/expression evaluated, so a
self-recursive program fails with a value-level `Error` instead of blowing
the host stack, and a wall-clock deadline, checked at the same points, so a
non-recursive but unbounded loop (e.g. `if (true) { ... }` chains built by a
pathological parse) still terminates.

The Go original races a worker goroutine against a timer and a panic
channel. This evaluator's environments and values are `Rc`-based (cheap,
single-threaded, and what makes closures simple to express) and therefore
not `Send`, so there is no goroutine-equivalent worker thread to race here;
checking the deadline cooperatively at every recursive descent is the
chosen alternative. A host-level fault (a panic anywhere in the walk) is
still caught at the single evaluation boundary with `catch_unwind`, matching
the Go original's `recover()` in the worker goroutine, and turned into the
same `Error("Evaluation error: ...")` value.
*/

#[derive(Debug, Clone, Copy)]
pub struct EvalOptions {
    pub max_depth: usize,
    pub timeout: Duration,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: 200,
            timeout: Duration::from_secs(5),
        }
    }
}

struct Budget {
    depth_remaining: usize,
    deadline: Instant,
    timeout: Duration,
}

impl Budget {
    fn enter(&mut self) -> Result<(), Value> {
        if self.depth_remaining == 0 {
            log::debug!("eval: max recursion depth reached");
            return Err(Value::Error(
                "Max recursion depth reached, Slow down brotherrrr—".to_string(),
            ));
        }
        if Instant::now() >= self.deadline {
            log::debug!("eval: deadline exceeded after {:?}", self.timeout);
            return Err(Value::Error(format!(
                "Evaluation timed out after {:?}",
                self.timeout
            )));
        }
        self.depth_remaining -= 1;
        Ok(())
    }
}

/// Walks `program` under `env`, bounded by `options`. This is the only
/// public entry point into the evaluator; node-level dispatch is private.
pub fn evaluate_program(program: &Program, env: &Environment, options: EvalOptions) -> Value {
    let mut budget = Budget {
        depth_remaining: options.max_depth,
        deadline: Instant::now() + options.timeout,
        timeout: options.timeout,
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| eval_program(program, env, &mut budget)));

    match outcome {
        Ok(value) => value,
        Err(payload) => Value::Error(format!("Evaluation error: {}", panic_message(&payload))),
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn eval_program(program: &Program, env: &Environment, budget: &mut Budget) -> Value {
    let mut result = Value::Null;
    for statement in &program.statements {
        result = eval_statement(statement, env, budget);
        match result {
            Value::ReturnValue(inner) => return *inner,
            Value::Error(_) => return result,
            _ => {}
        }
    }
    result
}

fn eval_block_statement(block: &BlockStatement, env: &Environment, budget: &mut Budget) -> Value {
    let mut result = Value::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env, budget);
        if result.is_error() || result.is_return_value() {
            return result;
        }
    }
    result
}

fn eval_statement(stmt: &Statement, env: &Environment, budget: &mut Budget) -> Value {
    if let Err(e) = budget.enter() {
        return e;
    }

    match stmt {
        Statement::Expression { expr, .. } => eval_expression(expr, env, budget),
        Statement::Return { value, .. } => {
            let val = eval_expression(value, env, budget);
            if val.is_error() {
                return val;
            }
            Value::ReturnValue(Box::new(val))
        }
        Statement::Let { name, value, .. } => {
            let val = eval_expression(value, env, budget);
            if val.is_error() {
                return val;
            }
            env.set(name.name.clone(), val);
            Value::Null
        }
    }
}

fn eval_expression(expr: &Expression, env: &Environment, budget: &mut Budget) -> Value {
    if let Err(e) = budget.enter() {
        return e;
    }

    match expr {
        Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
        Expression::BooleanLiteral { value, .. } => Value::Boolean(*value),
        Expression::Identifier(ident) => match env.get(&ident.name) {
            Some(value) => value,
            None => Value::Error(format!("identifier not found: {}", ident.name)),
        },
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(right, env, budget);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
            ..
        } => {
            let left = eval_expression(left, env, budget);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env, budget);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let cond = eval_expression(condition, env, budget);
            if cond.is_error() {
                return cond;
            }
            if cond.is_truthy() {
                eval_block_statement(consequence, env, budget)
            } else if let Some(alt) = alternative {
                eval_block_statement(alt, env, budget)
            } else {
                Value::Null
            }
        }
        Expression::FunctionLiteral { params, body, .. } => Value::Function(Rc::new(FunctionValue {
            params: params.clone(),
            body: body.clone(),
            closed_env: env.clone(),
        })),
        Expression::Call { callee, args, .. } => {
            let function = eval_expression(callee, env, budget);
            if function.is_error() {
                return function;
            }

            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                let value = eval_expression(arg, env, budget);
                if value.is_error() {
                    return value;
                }
                evaluated_args.push(value);
            }

            apply_function(function, evaluated_args, budget)
        }
    }
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => eval_bang_operator(right),
        "-" => eval_minus_prefix_operator(right),
        _ => Value::Error(format!("unknown operator: {operator}{}", right.type_name())),
    }
}

fn eval_bang_operator(right: Value) -> Value {
    Value::Boolean(!right.is_truthy())
}

fn eval_minus_prefix_operator(right: Value) -> Value {
    match right {
        Value::Integer(n) => Value::Integer(n.wrapping_neg()),
        other => Value::Error(format!("unknown operator: -{}", other.type_name())),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    if left.type_name() != right.type_name() {
        return Value::Error(format!(
            "type mismatch: {} {operator} {}",
            left.type_name(),
            right.type_name()
        ));
    }

    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        _ => match operator {
            "==" => Value::Boolean(left.reference_eq(&right)),
            "!=" => Value::Boolean(!left.reference_eq(&right)),
            _ => Value::Error(format!(
                "unknown operator: {} {operator} {}",
                left.type_name(),
                right.type_name()
            )),
        },
    }
}

/// Integer overflow wraps silently (two's complement), for behavior that
/// doesn't depend on the host's build profile. Division by zero is a
/// value-level `Error`.
fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Value::Error("division by zero".to_string())
            } else {
                Value::Integer(left.wrapping_div(right))
            }
        }
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        _ => Value::Error(format!("unknown operator: INTEGER {operator} INTEGER")),
    }
}

/// Arity is checked, diverging from the original source (which does not
/// check and would either under-bind parameters or panic on out-of-bounds
/// indexing).
fn apply_function(function: Value, args: Vec<Value>, budget: &mut Budget) -> Value {
    let function = match function {
        Value::Function(func) => func,
        other => return Value::Error(format!("not a function: {}", other.type_name())),
    };

    if args.len() != function.params.len() {
        return Value::Error(format!(
            "wrong number of arguments: expected {}, got {}",
            function.params.len(),
            args.len()
        ));
    }

    log::trace!("eval: calling function with {} argument(s)", args.len());

    let call_env = Environment::new_enclosed(&function.closed_env);
    for (param, arg) in function.params.iter().zip(args.into_iter()) {
        call_env.set(param.name.clone(), arg);
    }

    let evaluated = eval_block_statement(&function.body, &call_env, budget);
    match evaluated {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval(src: &str) -> Value {
        let lexer = Lexer::new(src);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parse errors: {:?}", parser.errors());
        let env = Environment::new_global();
        evaluate_program(&program, &env, EvalOptions::default())
    }

    #[test]
    fn integer_arithmetic() {
        assert!(matches!(eval("5 + 5 * 2;"), Value::Integer(15)));
    }

    #[test]
    fn let_and_identifier_lookup() {
        assert!(matches!(eval("let x = 5; let y = x + 10; y;"), Value::Integer(15)));
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let value = eval("let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3);");
        assert!(matches!(value, Value::Integer(5)));
    }

    #[test]
    fn currying_chains_calls() {
        let value = eval("let f = fn(x) { fn(y) { x + y } }; f(3)(4);");
        assert!(matches!(value, Value::Integer(7)));
    }

    #[test]
    fn recursive_factorial() {
        let value =
            eval("let fact = fn(n) { if (n < 2) { 1 } else { n * fact(n - 1) } }; fact(5);");
        assert!(matches!(value, Value::Integer(120)));
    }

    #[test]
    fn identifier_not_found_is_an_error_value() {
        match eval("foo;") {
            Value::Error(msg) => assert_eq!(msg, "identifier not found: foo"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn type_mismatch_is_an_error_value() {
        match eval("5 + true;") {
            Value::Error(msg) => assert_eq!(msg, "type mismatch: INTEGER + BOOLEAN"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn error_short_circuits_enclosing_expression() {
        match eval("5 + (foo + 1);") {
            Value::Error(msg) => assert_eq!(msg, "identifier not found: foo"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_an_error() {
        match eval("1 / 0;") {
            Value::Error(msg) => assert_eq!(msg, "division by zero"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_is_an_error() {
        match eval("let f = fn(a, b) { a + b }; f(1);") {
            Value::Error(msg) => assert_eq!(msg, "wrong number of arguments: expected 2, got 1"),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn reference_equality_for_booleans() {
        assert!(matches!(eval("true == false;"), Value::Boolean(false)));
        assert!(matches!(eval("true == true;"), Value::Boolean(true)));
    }

    #[test]
    fn zero_is_truthy() {
        assert!(matches!(eval("if (0) { 1 } else { 2 };"), Value::Integer(1)));
    }

    #[test]
    fn return_unwinds_through_nested_blocks() {
        let src = "let f = fn(x) { if (x > 0) { return 1; } return 0; }; f(5);";
        assert!(matches!(eval(src), Value::Integer(1)));
    }

    #[test]
    fn recursion_past_max_depth_is_bounded() {
        let lexer = Lexer::new("let loop = fn(n) { loop(n + 1) }; loop(0);");
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        let env = Environment::new_global();
        let options = EvalOptions {
            max_depth: 50,
            timeout: Duration::from_secs(5),
        };
        match evaluate_program(&program, &env, options) {
            Value::Error(msg) => assert!(msg.starts_with("Max recursion depth reached")),
            other => panic!("expected recursion-depth error, got {other:?}"),
        }
    }

    #[test]
    fn timeout_bounds_a_non_terminating_recursive_program() {
        let lexer = Lexer::new("let loop = fn(n) { loop(n + 1) }; loop(0);");
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        let env = Environment::new_global();
        let options = EvalOptions {
            max_depth: usize::MAX,
            timeout: Duration::from_millis(20),
        };
        match evaluate_program(&program, &env, options) {
            Value::Error(msg) => assert!(msg.starts_with("Evaluation timed out")),
            other => panic!("expected timeout error, got {other:?}"),
        }
    }
}
