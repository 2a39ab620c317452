use crate::lexer::Lexer;
use crate::parser::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::token::{Token, TokenType};
use crate::util::format_errors;

/*
Top-down operator precedence (Pratt) parsing: every expression is parsed by
first invoking a "prefix" handler for the current token (a null denotation,
it doesn't care what came before it), then repeatedly looking for an "infix"
handler for the next token as long as that token binds tighter than the
precedence we were called with (a left denotation, it extends what came
before it).

Rather than the classic pair of `HashMap<TokenType, fn(..)>` dispatch tables,
both call sites below are a single `match` on the token kind. The contract is
identical, a precedence-driven loop that repeatedly invokes a handler bound
to the current token, but a match is the more idiomatic way to express a
closed, exhaustively-checked dispatch in Rust than a runtime table of
function pointers.
*/

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // > <
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // fn(x)
}

fn precedence_of(kind: TokenType) -> Precedence {
    match kind {
        TokenType::Eq | TokenType::NotEq => Precedence::Equals,
        TokenType::Lt | TokenType::Gt => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Slash | TokenType::Asterisk => Precedence::Product,
        TokenType::Lparen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let mut errors = Vec::new();
        if lexer.has_errors() {
            errors.extend_from_slice(lexer.errors());
        }

        let current = lexer.next_token();
        let peek = lexer.next_token();

        Self {
            lexer,
            current,
            peek,
            errors,
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn format_errors(&self) -> String {
        format_errors("Parser errors", &self.errors)
    }

    /// If the lexer already reported errors, parsing never starts and the
    /// caller gets back an empty program.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        if !self.errors.is_empty() {
            log::debug!("parser: lexer reported errors, skipping parse");
            return program;
        }

        while self.current.kind != TokenType::Eof {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.advance();
        }

        program
    }

    fn advance(&mut self) {
        std::mem::swap(&mut self.current, &mut self.peek);
        self.peek = self.lexer.next_token();
    }

    fn current_is(&self, kind: TokenType) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenType) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenType) -> bool {
        if self.peek_is(kind) {
            self.advance();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenType) {
        let line = self.lexer.line_of(self.peek.position);
        let message = format!(
            "Line {line}: expected next token to be {expected}, got {got} instead",
            got = self.peek.kind
        );
        log::debug!("parser: {message}");
        self.errors.push(message);
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current.kind)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        let name = Identifier {
            token: self.current.clone(),
            name: self.current.literal.clone(),
        };

        if !self.expect_peek(TokenType::Assign) {
            return None;
        }

        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenType::Semicolon) {
            self.advance();
        }

        Some(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        self.advance();

        if self.current_is(TokenType::Semicolon) {
            self.errors
                .push("return statement requires an expression".to_string());
            return None;
        }

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenType::Semicolon) {
            self.advance();
        }

        Some(Statement::Return { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenType::Semicolon) {
            self.advance();
        }

        Some(Statement::Expression { token, expr })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            if !is_infix_token(self.peek.kind) {
                return Some(left);
            }
            self.advance();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenType::Ident => Some(Expression::Identifier(Identifier {
                token: self.current.clone(),
                name: self.current.literal.clone(),
            })),
            TokenType::Int => self.parse_integer_literal(),
            TokenType::Bang | TokenType::Minus => self.parse_prefix_expression(),
            TokenType::True | TokenType::False => Some(Expression::BooleanLiteral {
                token: self.current.clone(),
                value: self.current_is(TokenType::True),
            }),
            TokenType::Lparen => self.parse_grouped_expression(),
            TokenType::If => self.parse_if_expression(),
            TokenType::Function => self.parse_function_literal(),
            other => {
                let line = self.lexer.line_of(self.current.position);
                self.errors
                    .push(format!("Line {line}: no prefix parse function for {other} found"));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current.kind {
            TokenType::Plus
            | TokenType::Minus
            | TokenType::Slash
            | TokenType::Asterisk
            | TokenType::Eq
            | TokenType::NotEq
            | TokenType::Lt
            | TokenType::Gt => self.parse_infix_expression(left),
            TokenType::Lparen => self.parse_call_expression(left),
            _ => Some(left),
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match parse_int_literal(&token.literal) {
            Some(value) => Some(Expression::IntegerLiteral { token, value }),
            None => {
                let line = self.lexer.line_of(token.position);
                self.errors.push(format!(
                    "Line {line}: could not parse '{}' as integer",
                    token.literal
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let operator = token.literal.clone();
        self.advance();

        let right = self.parse_expression(Precedence::Prefix);
        match right {
            Some(right) => Some(Expression::Prefix {
                token,
                operator,
                right: Box::new(right),
            }),
            None => {
                let line = self.lexer.line_of(self.current.position);
                self.errors.push(format!(
                    "Line {line}: invalid expression after {operator} operator"
                ));
                None
            }
        }
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let operator = token.literal.clone();
        let precedence = self.current_precedence();
        self.advance();

        let right = self.parse_expression(precedence);
        match right {
            Some(right) => Some(Expression::Infix {
                token,
                left: Box::new(left),
                operator,
                right: Box::new(right),
            }),
            None => {
                let line = self.lexer.line_of(self.current.position);
                self.errors.push(format!(
                    "Line {line}: invalid right expression in operator '{operator}'"
                ));
                None
            }
        }
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.advance();
        let expr = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }

        Some(expr)
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.advance();

        while !self.current_is(TokenType::Rbrace) && !self.current_is(TokenType::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.advance();
        }

        if self.current_is(TokenType::Eof) {
            let line = self.lexer.line_of(self.current.position);
            self.errors
                .push(format!("Line {line}: unclosed block statement, expected '}}'"));
        }

        BlockStatement { token, statements }
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        if !self.expect_peek(TokenType::Lparen) {
            return None;
        }

        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }
        if !self.expect_peek(TokenType::Lbrace) {
            return None;
        }

        let consequence = self.parse_block_statement();
        let mut alternative = None;

        if self.peek_is(TokenType::Else) {
            self.advance();
            if !self.expect_peek(TokenType::Lbrace) {
                return None;
            }
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        if !self.expect_peek(TokenType::Lparen) {
            return None;
        }

        let params = self.parse_function_parameters()?;

        if !self.expect_peek(TokenType::Lbrace) {
            return None;
        }

        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral {
            token,
            params,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut identifiers = Vec::new();

        if self.peek_is(TokenType::Rparen) {
            self.advance();
            return Some(identifiers);
        }

        self.advance();
        identifiers.push(Identifier {
            token: self.current.clone(),
            name: self.current.literal.clone(),
        });

        while self.peek_is(TokenType::Comma) {
            self.advance();
            self.advance();
            identifiers.push(Identifier {
                token: self.current.clone(),
                name: self.current.literal.clone(),
            });
        }

        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }

        Some(identifiers)
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let args = self.parse_call_arguments()?;
        Some(Expression::Call {
            token,
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut args = Vec::new();

        if self.peek_is(TokenType::Rparen) {
            self.advance();
            return Some(args);
        }

        self.advance();
        args.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenType::Comma) {
            self.advance();
            self.advance();
            args.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }

        Some(args)
    }
}

fn is_infix_token(kind: TokenType) -> bool {
    matches!(
        kind,
        TokenType::Plus
            | TokenType::Minus
            | TokenType::Slash
            | TokenType::Asterisk
            | TokenType::Eq
            | TokenType::NotEq
            | TokenType::Lt
            | TokenType::Gt
            | TokenType::Lparen
    )
}

/// Base-0 parsing: decimal unless a recognized prefix (`0x`, `0o`, `0b`) is
/// present, matching Go's `strconv.ParseInt(literal, 0, 64)`.
fn parse_int_literal(literal: &str) -> Option<i64> {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };

    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Program, Vec<String>) {
        let lexer = Lexer::new(src);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        (program, parser.errors().to_vec())
    }

    #[test]
    fn parses_let_statement() {
        let (program, errors) = parse("let x = 5;");
        assert!(errors.is_empty());
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Let { name, value, .. } => {
                assert_eq!(name.name, "x");
                assert_eq!(value.to_string(), "5");
            }
            other => panic!("expected let statement, got {other:?}"),
        }
    }

    #[test]
    fn precedence_is_left_associative_and_standard() {
        let (program, errors) = parse("a + b * c == d - e / f;");
        assert!(errors.is_empty());
        assert_eq!(
            program.statements[0].to_string(),
            "((a + (b * c)) == (d - (e / f)))"
        );
    }

    #[test]
    fn call_binds_tighter_than_every_infix_operator() {
        let (program, errors) = parse("a + add(b, c) * d;");
        assert!(errors.is_empty());
        assert_eq!(
            program.statements[0].to_string(),
            "(a + (add(b, c) * d))"
        );
    }

    #[test]
    fn missing_prefix_handler_records_line_annotated_error() {
        let (_, errors) = parse(";");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("no prefix parse function for Semicolon found"));
    }

    #[test]
    fn unclosed_block_is_reported() {
        let (_, errors) = parse("if (true) { 1;");
        assert!(errors.iter().any(|e| e.contains("unclosed block statement")));
    }

    #[test]
    fn bare_return_is_a_parse_error() {
        let (_, errors) = parse("return;");
        assert!(errors
            .iter()
            .any(|e| e == "return statement requires an expression"));
    }

    #[test]
    fn lexer_errors_short_circuit_parsing_into_an_empty_program() {
        let (program, errors) = parse("let x = 5 @ 1;");
        assert!(!errors.is_empty());
        assert!(program.statements.is_empty());
    }
}
