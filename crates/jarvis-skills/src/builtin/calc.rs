//! Arithmetic calculator.
//!
//! Expressions are parsed by a small recursive-descent evaluator, never
//! executed as code. Integers stay integers until a true division, matching
//! the usual calculator expectation that `2+2` prints `4` and `7/2` prints
//! `3.5`.

use async_trait::async_trait;

use crate::error::SkillError;
use crate::skill::{Skill, SkillContext};

pub const CALC_USAGE: &str = "Usage: /calc 2+2 or /calc (25*4)/3";

const ALLOWED: &str = "0123456789+-*/().% ";

pub struct CalcSkill;

#[async_trait]
impl Skill for CalcSkill {
    fn command(&self) -> &str {
        "/calc"
    }

    fn aliases(&self) -> &[&str] {
        &["/calculate"]
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression"
    }

    async fn run(&self, arg: &str, _ctx: &SkillContext) -> Result<String, SkillError> {
        let expr = arg.trim();
        if expr.is_empty() {
            return Ok(CALC_USAGE.to_string());
        }
        if expr.chars().any(|c| !ALLOWED.contains(c)) {
            return Ok("❌ Only numbers and + - * / ( ) % . are allowed.".to_string());
        }
        Ok(match evaluate(expr) {
            Ok(value) => format!("✅ {} = {}", expr, value),
            Err(e) => format!("❌ Invalid expression: {}", e),
        })
    }
}

// =============================================================================
// Evaluator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&literal)?));
                continue;
            }
            '+' => tokens.push(Token::Plus),
            '-' => tokens.push(Token::Minus),
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::DoubleStar);
                i += 1;
            }
            '*' => tokens.push(Token::Star),
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 1;
            }
            '/' => tokens.push(Token::Slash),
            '%' => tokens.push(Token::Percent),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            other => return Err(format!("unexpected character '{}'", other)),
        }
        i += 1;
    }
    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, String> {
    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(format!("invalid number '{}'", literal));
        }
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| format!("invalid number '{}'", literal))
    } else {
        literal
            .parse::<i64>()
            .map(Number::Int)
            .map_err(|_| format!("number too large '{}'", literal))
    }
}

/// Evaluate an arithmetic expression over `+ - * / // % **` and parentheses.
pub fn evaluate(expr: &str) -> Result<Number, String> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err("unexpected trailing input".to_string());
    }
    Ok(value)
}

/// Deepest nesting of parentheses, signs and exponents accepted.
const MAX_DEPTH: usize = 200;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<F>(&mut self, f: F) -> Result<Number, String>
    where
        F: FnOnce(&mut Self) -> Result<Number, String>,
    {
        if self.depth >= MAX_DEPTH {
            return Err("expression too deeply nested".to_string());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Number, String> {
        let mut left = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let right = self.term()?;
            left = if op == Token::Plus {
                add(left, right)?
            } else {
                sub(left, right)?
            };
        }
        Ok(left)
    }

    // term := unary (('*' | '/' | '//' | '%') unary)*
    fn term(&mut self) -> Result<Number, String> {
        let mut left = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) =
            self.peek()
        {
            self.pos += 1;
            let right = self.unary()?;
            left = match op {
                Token::Star => mul(left, right)?,
                Token::Slash => div(left, right)?,
                Token::DoubleSlash => floor_div(left, right)?,
                _ => modulo(left, right)?,
            };
        }
        Ok(left)
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> Result<Number, String> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                sub(Number::Int(0), self.nested(Self::unary)?)
            }
            _ => self.power(),
        }
    }

    // power := atom ('**' unary)?
    fn power(&mut self) -> Result<Number, String> {
        let base = self.atom()?;
        if self.peek() == Some(Token::DoubleStar) {
            self.pos += 1;
            let exponent = self.nested(Self::unary)?;
            return pow(base, exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Number, String> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(_) => Err("unexpected operator".to_string()),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

const OVERFLOW: &str = "result too large";

fn add(a: Number, b: Number) -> Result<Number, String> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_add(y).map(Number::Int).ok_or_else(|| OVERFLOW.to_string()),
        _ => Ok(Number::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Number, b: Number) -> Result<Number, String> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_sub(y).map(Number::Int).ok_or_else(|| OVERFLOW.to_string()),
        _ => Ok(Number::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Number, b: Number) -> Result<Number, String> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_mul(y).map(Number::Int).ok_or_else(|| OVERFLOW.to_string()),
        _ => Ok(Number::Float(a.as_f64() * b.as_f64())),
    }
}

fn div(a: Number, b: Number) -> Result<Number, String> {
    if b.as_f64() == 0.0 {
        return Err("division by zero".to_string());
    }
    Ok(Number::Float(a.as_f64() / b.as_f64()))
}

/// Floor division; the result rounds toward negative infinity.
fn floor_div(a: Number, b: Number) -> Result<Number, String> {
    match (a, b) {
        (_, Number::Int(0)) => Err("integer division or modulo by zero".to_string()),
        (Number::Int(x), Number::Int(y)) => {
            let r = modulo(a, b)?;
            let Number::Int(r) = r else {
                return Err("unexpected float remainder".to_string());
            };
            x.checked_sub(r)
                .and_then(|v| v.checked_div(y))
                .map(Number::Int)
                .ok_or_else(|| OVERFLOW.to_string())
        }
        _ => {
            if b.as_f64() == 0.0 {
                return Err("float floor division by zero".to_string());
            }
            Ok(Number::Float((a.as_f64() / b.as_f64()).floor()))
        }
    }
}

/// Modulo where the result takes the sign of the divisor.
fn modulo(a: Number, b: Number) -> Result<Number, String> {
    match (a, b) {
        (_, Number::Int(0)) => Err("integer division or modulo by zero".to_string()),
        (Number::Int(x), Number::Int(y)) => {
            let mut r = x.checked_rem(y).ok_or_else(|| OVERFLOW.to_string())?;
            if r != 0 && ((r < 0) != (y < 0)) {
                r += y;
            }
            Ok(Number::Int(r))
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            if y == 0.0 {
                return Err("float modulo".to_string());
            }
            let mut r = x % y;
            if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
                r += y;
            }
            Ok(Number::Float(r))
        }
    }
}

fn pow(base: Number, exponent: Number) -> Result<Number, String> {
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| OVERFLOW.to_string())?;
            b.checked_pow(e).map(Number::Int).ok_or_else(|| OVERFLOW.to_string())
        }
        _ => {
            if base.as_f64() == 0.0 && exponent.as_f64() < 0.0 {
                return Err("zero cannot be raised to a negative power".to_string());
            }
            let v = base.as_f64().powf(exponent.as_f64());
            if v.is_nan() {
                return Err("math domain error".to_string());
            }
            Ok(Number::Float(v))
        }
    }
}
