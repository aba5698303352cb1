//! Calculator tool: evaluates arithmetic expressions.
//!
//! Supports `+ - * / ^`, parentheses, unary minus and `sqrt(x)` /
//! `Math.sqrt(x)`. `^` is right-associative and binds tighter than unary minus,
//! so `-2^2 == -4`.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{argument_or_raw, Tool};
use super::context::ToolContext;

/// Evaluate arithmetic expressions.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluates mathematical expressions (e.g., '2 + 2', '10 * (5 - 3)', 'sqrt(16)', '2 ^ 10')"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The arithmetic expression to evaluate"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, input: &str, _ctx: &mut ToolContext<'_>) -> anyhow::Result<String> {
        let expression = argument_or_raw(input, "expression");
        let value = evaluate(&expression)?;
        Ok(format!("Result: {}", format_number(value)))
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> anyhow::Result<f64> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        anyhow::bail!("empty expression");
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(tok) = parser.peek() {
        anyhow::bail!("unexpected token '{tok}'");
    }
    if !value.is_finite() {
        anyhow::bail!("result is not a finite number");
    }
    Ok(value)
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ─────────────────────────────────────────────
// Tokenizer
// ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Op(c) => write!(f, "{c}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> anyhow::Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| anyhow::anyhow!("invalid number '{text}'"))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => anyhow::bail!("unexpected character '{other}'"),
        }
    }

    Ok(tokens)
}

// ─────────────────────────────────────────────
// Recursive-descent parser
// ─────────────────────────────────────────────

/// Deepest nesting of unary signs, parentheses and exponents accepted.
pub const MAX_NESTING_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(c)) if ops.contains(c) => {
                let c = *c;
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> anyhow::Result<f64> {
        let mut value = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> anyhow::Result<f64> {
        let mut value = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            let rhs = self.unary()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    anyhow::bail!("division by zero");
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    // Every recursive path passes through here.
    fn unary(&mut self) -> anyhow::Result<f64> {
        if self.depth >= MAX_NESTING_DEPTH {
            anyhow::bail!("expression nested too deeply (limit {MAX_NESTING_DEPTH})");
        }
        self.depth += 1;
        let value = self.unary_inner();
        self.depth -= 1;
        value
    }

    // unary := ('-' | '+') unary | power
    fn unary_inner(&mut self) -> anyhow::Result<f64> {
        match self.eat_op(&['-', '+']) {
            Some('-') => Ok(-self.unary()?),
            Some(_) => self.unary(),
            None => self.power(),
        }
    }

    // power := primary ('^' unary)?
    fn power(&mut self) -> anyhow::Result<f64> {
        let base = self.primary()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    // primary := number | '(' expr ')' | function '(' expr ')'
    fn primary(&mut self) -> anyhow::Result<f64> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect_rparen()?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if !matches!(self.next(), Some(Token::LParen)) {
                    anyhow::bail!("expected '(' after '{name}'");
                }
                let arg = self.expr()?;
                self.expect_rparen()?;
                apply_function(&name, arg)
            }
            Some(tok) => anyhow::bail!("unexpected token '{tok}'"),
            None => anyhow::bail!("unexpected end of expression"),
        }
    }

    fn expect_rparen(&mut self) -> anyhow::Result<()> {
        match self.next() {
            Some(Token::RParen) => Ok(()),
            _ => anyhow::bail!("missing closing parenthesis"),
        }
    }
}

fn apply_function(name: &str, arg: f64) -> anyhow::Result<f64> {
    match name {
        "sqrt" | "Math.sqrt" => {
            if arg < 0.0 {
                anyhow::bail!("square root of negative number");
            }
            Ok(arg.sqrt())
        }
        other => anyhow::bail!("unknown function '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(evaluate("2 + 2").unwrap(), 4.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("7 / 2").unwrap(), 3.5);
    }

    #[test]
    fn test_power_and_unary_minus() {
        assert_eq!(evaluate("2 ^ 10").unwrap(), 1024.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("-2 ^ 2").unwrap(), -4.0);
        assert_eq!(evaluate("-(3 - 5)").unwrap(), 2.0);
        assert_eq!(evaluate("4 * -2").unwrap(), -8.0);
    }

    #[test]
    fn test_sqrt_forms() {
        assert_eq!(evaluate("sqrt(16)").unwrap(), 4.0);
        assert_eq!(evaluate("Math.sqrt(81) + 1").unwrap(), 10.0);
        assert!(evaluate("sqrt(-1)").is_err());
    }

    #[test]
    fn test_errors() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("abc(2)").is_err());
        assert!(evaluate("2 $ 3").is_err());
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let minus_run = format!("{}1", "-".repeat(200_000));
        let err = evaluate(&minus_run).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));

        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert!(evaluate(&parens).is_err());

        let tower = vec!["2"; 100_000].join("^");
        assert!(evaluate(&tower).is_err());

        // Ordinary nesting still works
        let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(evaluate(&shallow).unwrap(), 1.0);
        assert_eq!(evaluate("--1").unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_deep_nesting_through_registry_is_text() {
        let mut registry = crate::tools::ToolRegistry::new();
        registry.register(std::sync::Arc::new(CalculatorTool));
        let mut ctx = ToolContext::detached();
        let out = registry
            .invoke("calculator", &format!("{}1", "(".repeat(10_000)), &mut ctx)
            .await
            .into_text();
        assert!(out.starts_with("Error executing tool 'calculator':"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-8.0), "-8");
        assert_eq!(format_number(3.5), "3.5");
    }

    #[tokio::test]
    async fn test_tool_accepts_raw_and_json() {
        let mut ctx = ToolContext::detached();
        assert_eq!(
            CalculatorTool.execute("2 + 2", &mut ctx).await.unwrap(),
            "Result: 4"
        );
        assert_eq!(
            CalculatorTool
                .execute(r#"{"expression": "sqrt(2) * sqrt(2) + 0.5"}"#, &mut ctx)
                .await
                .unwrap(),
            format!("Result: {}", 2f64.sqrt() * 2f64.sqrt() + 0.5)
        );
        assert!(CalculatorTool.execute("1/0", &mut ctx).await.is_err());
    }
}
