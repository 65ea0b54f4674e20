//! Restricted expression evaluator for computed markers and `eval:` defaults.
//!
//! Expressions can read names bound in the [`EvalContext`] and combine them
//! with a fixed set of operators and functions. Nothing else is reachable:
//! there is no assignment, attribute access, or import.
//!
//! # Syntax
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "//" | "%") unary)*
//! unary   := ("-" | "+") unary | power
//! power   := atom ("**" unary)?
//! atom    := INT | FLOAT | STRING | NAME | NAME "(" args ")" | "(" expr ")"
//! ```
//!
//! Functions: `int`, `float`, `str`, `abs`, `min`, `max`, `round`, `len`,
//! `basename`, `dirname`.

use super::context::EvalContext;
use super::value::{Value, ValueType};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::Path;
use std::str::CharIndices;
use thiserror::Error;

/// Error raised while parsing or evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("name '{0}' is not defined")]
    UnknownName(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{0}")]
    Type(String),

    #[error("{function}() takes {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: &'static str,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("{0}")]
    Value(String),
}

type Result<T> = std::result::Result<T, ExprError>;

/// Longest string an expression may build.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// Deepest nesting of parentheses, unary operators and calls.
pub const MAX_DEPTH: usize = 256;

/// Most tokens a single expression may hold; bounds the tree's size.
pub const MAX_TOKENS: usize = 4096;

/// Parse and evaluate `source` against `context`.
pub fn evaluate(source: &str, context: &EvalContext) -> Result<Value> {
    let expr = parse(source)?;
    eval(&expr, context)
}

/// Parse `source` into an expression tree without evaluating it.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    if tokens.len() > MAX_TOKENS {
        return Err(ExprError::Syntax(format!(
            "expression longer than {} tokens",
            MAX_TOKENS
        )));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ExprError::Syntax(format!("unexpected {}", tok.describe()))),
    }
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Int(i) => format!("number {}", i),
            Token::Float(x) => format!("number {:?}", x),
            Token::Str(s) => format!("string '{}'", s),
            Token::Name(n) => format!("name '{}'", n),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::StarStar => "'**'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::SlashSlash => "'//'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => tokens.push(lex_number(source, &mut chars)?),
            '\'' | '"' => tokens.push(lex_string(&mut chars, pos)?),
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(name));
            }
            _ => {
                chars.next();
                let token = match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => {
                        if let Some((_, '*')) = chars.peek() {
                            chars.next();
                            Token::StarStar
                        } else {
                            Token::Star
                        }
                    }
                    '/' => {
                        if let Some((_, '/')) = chars.peek() {
                            chars.next();
                            Token::SlashSlash
                        } else {
                            Token::Slash
                        }
                    }
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    other => {
                        return Err(ExprError::Syntax(format!(
                            "unexpected character '{}' at position {}",
                            other, pos
                        )));
                    }
                };
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

fn lex_number(source: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<Token> {
    let start = chars.peek().map(|&(p, _)| p).unwrap_or(source.len());
    let mut end = start;
    let mut is_float = false;
    let mut seen_exponent = false;
    let mut prev = '\0';

    while let Some(&(p, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' => true,
            '.' if !is_float && !seen_exponent => {
                is_float = true;
                true
            }
            'e' | 'E' if !seen_exponent => {
                seen_exponent = true;
                is_float = true;
                true
            }
            '+' | '-' if prev == 'e' || prev == 'E' => true,
            _ => false,
        };
        if !accept {
            break;
        }
        prev = c;
        end = p + c.len_utf8();
        chars.next();
    }

    let text = &source[start..end];
    if is_float {
        text.parse::<f64>()
            .map(Token::Float)
            .map_err(|_| ExprError::Syntax(format!("invalid number '{}'", text)))
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| ExprError::Syntax(format!("invalid integer '{}'", text)))
    }
}

fn lex_string(chars: &mut Peekable<CharIndices<'_>>, start: usize) -> Result<Token> {
    let Some((_, quote)) = chars.next() else {
        return Err(ExprError::Syntax("expected string".to_string()));
    };
    let mut value = String::new();

    loop {
        match chars.next() {
            Some((_, c)) if c == quote => return Ok(Token::Str(value)),
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, c)) => value.push(c),
                None => break,
            },
            Some((_, c)) => value.push(c),
            None => break,
        }
    }

    Err(ExprError::Syntax(format!(
        "unterminated string starting at position {}",
        start
    )))
}

// ============================================================================
// Parser
// ============================================================================

/// Binary operators, from lowest to highest precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(ExprError::Syntax(match self.peek() {
            Some(tok) => format!("expected {}, found {}", expected.describe(), tok.describe()),
            None => format!("expected {}, found end of expression", expected.describe()),
        }))
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::SlashSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // Every nested construct passes through here, so this bounds recursion.
    fn unary(&mut self) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::Syntax("expression nested too deeply".to_string()));
        }
        self.depth += 1;
        let result = self.unary_inner();
        self.depth -= 1;
        result
    }

    fn unary_inner(&mut self) -> Result<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.atom()?;
        if self.eat(&Token::StarStar) {
            // Right associative, and binds tighter than a unary minus on its left.
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(x)) => Ok(Expr::Literal(Value::Float(x))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::Name(name)) => {
                if !self.eat(&Token::LParen) {
                    return Ok(Expr::Name(name));
                }
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.expr()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(&Token::RParen)?;
                        break;
                    }
                }
                Ok(Expr::Call(name, args))
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(tok) => Err(ExprError::Syntax(format!("unexpected {}", tok.describe()))),
            None => Err(ExprError::Syntax("unexpected end of expression".to_string())),
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate a parsed expression against `context`.
pub fn eval(expr: &Expr, context: &EvalContext) -> Result<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Name(name) => context
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::UnknownName(name.clone())),
        Expr::Neg(inner) => match eval(inner, context)? {
            Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(ExprError::Overflow),
            Value::Float(x) => Ok(Value::Float(-x)),
            Value::Str(_) => Err(ExprError::Type(
                "bad operand type for unary -: 'str'".to_string(),
            )),
        },
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, context)?;
            let rhs = eval(rhs, context)?;
            binary(*op, lhs, rhs)
        }
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|a| eval(a, context))
                .collect::<Result<Vec<_>>>()?;
            call(name, args)
        }
    }
}

fn operand_error(symbol: &str, lhs: &Value, rhs: &Value) -> ExprError {
    ExprError::Type(format!(
        "unsupported operand types for {}: '{}' and '{}'",
        symbol,
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        Value::Str(_) => None,
    }
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Float, Int, Str};

    match (op, &lhs, &rhs) {
        (BinOp::Add, Str(a), Str(b)) => {
            check_string_len(a.len().saturating_add(b.len()))?;
            Ok(Str(format!("{}{}", a, b)))
        }
        (BinOp::Mul, Str(s), Int(n)) | (BinOp::Mul, Int(n), Str(s)) => repeat(s, *n),
        (_, Int(a), Int(b)) => int_binary(op, *a, *b),
        _ => {
            let symbol = match op {
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
                BinOp::FloorDiv => "//",
                BinOp::Mod => "%",
                BinOp::Pow => "**",
            };
            match (as_float(&lhs), as_float(&rhs)) {
                (Some(a), Some(b)) => float_binary(op, a, b).map(Float),
                _ => Err(operand_error(symbol, &lhs, &rhs)),
            }
        }
    }
}

/// `s * n`; a non-positive count gives the empty string.
fn repeat(s: &str, n: i64) -> Result<Value> {
    let count = usize::try_from(n).unwrap_or(0);
    check_string_len(s.len().saturating_mul(count))?;
    Ok(Value::Str(s.repeat(count)))
}

fn check_string_len(len: usize) -> Result<()> {
    if len > MAX_STRING_LEN {
        return Err(ExprError::Value(format!(
            "string result longer than {} bytes",
            MAX_STRING_LEN
        )));
    }
    Ok(())
}

fn int_binary(op: BinOp, a: i64, b: i64) -> Result<Value> {
    let checked = |r: Option<i64>| r.map(Value::Int).ok_or(ExprError::Overflow);
    match op {
        BinOp::Add => checked(a.checked_add(b)),
        BinOp::Sub => checked(a.checked_sub(b)),
        BinOp::Mul => checked(a.checked_mul(b)),
        BinOp::Div => {
            if b == 0 {
                return Err(ExprError::DivisionByZero);
            }
            Ok(Value::Float(a as f64 / b as f64))
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(ExprError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or(ExprError::Overflow)?;
            // Round toward negative infinity when the signs differ.
            if a % b != 0 && ((a < 0) != (b < 0)) {
                checked(q.checked_sub(1))
            } else {
                Ok(Value::Int(q))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(ExprError::DivisionByZero);
            }
            let r = a.checked_rem(b).ok_or(ExprError::Overflow)?;
            // Result takes the sign of the divisor.
            if r != 0 && ((r < 0) != (b < 0)) {
                checked(r.checked_add(b))
            } else {
                Ok(Value::Int(r))
            }
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            let exp = u32::try_from(b).map_err(|_| ExprError::Overflow)?;
            checked(a.checked_pow(exp))
        }
    }
}

fn float_binary(op: BinOp, a: f64, b: f64) -> Result<f64> {
    match op {
        BinOp::Add => Ok(a + b),
        BinOp::Sub => Ok(a - b),
        BinOp::Mul => Ok(a * b),
        BinOp::Div | BinOp::FloorDiv | BinOp::Mod if b == 0.0 => Err(ExprError::DivisionByZero),
        BinOp::Div => Ok(a / b),
        BinOp::FloorDiv => Ok((a / b).floor()),
        BinOp::Mod => {
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                Ok(r + b)
            } else {
                Ok(r)
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            Ok(a.powf(b))
        }
    }
}

fn arity(function: &str, expected: &'static str, args: &[Value], ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ExprError::Arity {
            function: function.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn call(name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "int" | "float" | "str" => {
            arity(name, "1", &args, args.len() == 1)?;
            let target = match name {
                "int" => ValueType::Int,
                "float" => ValueType::Float,
                _ => ValueType::Str,
            };
            target
                .convert(&args[0])
                .map_err(|e| ExprError::Value(e.to_string()))
        }
        "abs" => {
            arity(name, "1", &args, args.len() == 1)?;
            match &args[0] {
                Value::Int(i) => i.checked_abs().map(Value::Int).ok_or(ExprError::Overflow),
                Value::Float(x) => Ok(Value::Float(x.abs())),
                Value::Str(_) => Err(ExprError::Type(
                    "bad operand type for abs(): 'str'".to_string(),
                )),
            }
        }
        "min" | "max" => {
            arity(name, "at least 1", &args, !args.is_empty())?;
            let wanted = if name == "min" {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut iter = args.into_iter();
            let mut best = iter.next().ok_or(ExprError::Overflow)?;
            for candidate in iter {
                if compare(&candidate, &best)? == wanted {
                    best = candidate;
                }
            }
            Ok(best)
        }
        "round" => {
            arity(name, "1 or 2", &args, matches!(args.len(), 1 | 2))?;
            round(&args)
        }
        "len" => {
            arity(name, "1", &args, args.len() == 1)?;
            match &args[0] {
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                other => Err(ExprError::Type(format!(
                    "object of type '{}' has no len()",
                    other.type_name()
                ))),
            }
        }
        "basename" | "dirname" => {
            arity(name, "1", &args, args.len() == 1)?;
            let Value::Str(s) = &args[0] else {
                return Err(ExprError::Type(format!(
                    "{}() expects a str, got '{}'",
                    name,
                    args[0].type_name()
                )));
            };
            let path = Path::new(s);
            let part = if name == "basename" {
                path.file_name().map(|p| p.to_string_lossy().to_string())
            } else {
                path.parent().map(|p| p.display().to_string())
            };
            Ok(Value::Str(part.unwrap_or_default()))
        }
        other => Err(ExprError::UnknownFunction(other.to_string())),
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => match (as_float(a), as_float(b)) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
            _ => Err(ExprError::Type(format!(
                "cannot compare '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

fn round(args: &[Value]) -> Result<Value> {
    let digits = match args.get(1) {
        None => None,
        Some(Value::Int(d)) => Some(*d),
        Some(other) => {
            return Err(ExprError::Type(format!(
                "round() digits must be an int, not '{}'",
                other.type_name()
            )));
        }
    };

    match (&args[0], digits) {
        (Value::Int(i), _) => Ok(Value::Int(*i)),
        (Value::Float(x), None) => {
            let rounded = x.round_ties_even();
            if rounded.is_finite() && rounded.abs() < i64::MAX as f64 {
                Ok(Value::Int(rounded as i64))
            } else {
                Err(ExprError::Overflow)
            }
        }
        (Value::Float(x), Some(d)) => {
            let d = i32::try_from(d).map_err(|_| ExprError::Overflow)?;
            let scale = 10f64.powi(d);
            Ok(Value::Float((x * scale).round_ties_even() / scale))
        }
        (Value::Str(_), _) => Err(ExprError::Type(
            "type 'str' doesn't define round()".to_string(),
        )),
    }
}
