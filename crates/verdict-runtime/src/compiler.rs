//! The compiler: postfix tokens to executable values
//!
//! Each token maps to one value. `[ … ]` builds a literal array and
//! `{ … }` an executable array, both parsed recursively; other symbols
//! resolve through the operator catalog and fall back to executable
//! names. `compile` returns an executable array of the top-level values.

use thiserror::Error;

use crate::lexer::Lexer;
use crate::ops::resolve_operator;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Scanner, parser, and loader failures
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{msg} at offset {offset}")]
    Scan { offset: usize, msg: String },

    #[error("unterminated array")]
    UnterminatedArray,

    #[error("invalid number {lit:?}")]
    InvalidNumber { lit: String },

    #[error("unknown condition mark {mark:?}")]
    UnknownConditionMark { mark: String },

    #[error("unknown action mark {mark:?}")]
    UnknownActionMark { mark: String },

    #[error("case {index} has both always (*) and condition marks")]
    AlwaysWithConditions { index: usize },

    #[error("invalid case column {column}; columns are 1-based")]
    InvalidColumn { column: usize },

    #[error("unknown field type {name:?}")]
    UnknownFieldType { name: String },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Wrap with a `condition 3`-style context prefix
    pub fn context(self, context: impl Into<String>) -> Self {
        CompileError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Compile postfix source into an executable array of its top-level values
pub fn compile(src: &str) -> Result<Value, CompileError> {
    let values = Compiler::new(src, true)?.run()?;
    Ok(Value::exec_array(values))
}

/// Parse zero or more literal values (EDD default strings). Literal-array
/// syntax is not recognized here; `[` resolves as the `mark` operator.
/// Zero values yield Null, one value yields itself, several a literal
/// array.
pub fn parse_value(src: &str) -> Result<Value, CompileError> {
    let mut values = Compiler::new(src, false)?.run()?;
    match values.len() {
        0 => Ok(Value::Null),
        1 => Ok(values.remove(0)),
        _ => Ok(Value::array(values)),
    }
}

struct Compiler {
    tokens: Vec<Token>,
    pos: usize,
    evaluate_literal_arrays: bool,
}

impl Compiler {
    fn new(src: &str, evaluate_literal_arrays: bool) -> Result<Self, CompileError> {
        Ok(Compiler {
            tokens: Lexer::new(src).tokenize()?,
            pos: 0,
            evaluate_literal_arrays,
        })
    }

    fn run(&mut self) -> Result<Vec<Value>, CompileError> {
        let mut values = Vec::new();
        loop {
            let token = self.next();
            if token.kind == TokenKind::Eof {
                return Ok(values);
            }
            values.push(self.parse_token(token)?);
        }
    }

    fn next(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn parse_token(&mut self, token: Token) -> Result<Value, CompileError> {
        match token.kind {
            TokenKind::Symbol if token.text.starts_with('/') => {
                Ok(Value::literal_name(&token.text[1..]))
            }
            TokenKind::Integer => parse_int(&token.text),
            TokenKind::Real => {
                let v: f64 = token
                    .text
                    .parse()
                    .map_err(|_| CompileError::InvalidNumber { lit: token.text })?;
                Ok(Value::float(v))
            }
            TokenKind::Str | TokenKind::RawStr => Ok(Value::string(&token.text)),
            TokenKind::LeftBracket if self.evaluate_literal_arrays => {
                let values = self.parse_until(TokenKind::RightBracket)?;
                Ok(Value::array(values))
            }
            TokenKind::LeftBrace => {
                let values = self.parse_until(TokenKind::RightBrace)?;
                Ok(Value::exec_array(values))
            }
            _ => Ok(lookup(&token.text)),
        }
    }

    fn parse_until(&mut self, end: TokenKind) -> Result<Vec<Value>, CompileError> {
        let mut values = Vec::new();
        loop {
            let token = self.next();
            if token.kind == end {
                return Ok(values);
            }
            if token.kind == TokenKind::Eof {
                return Err(CompileError::UnterminatedArray);
            }
            values.push(self.parse_token(token)?);
        }
    }
}

/// Operator-catalog lookup with the executable-name fallback
fn lookup(text: &str) -> Value {
    if let Some(op) = resolve_operator(text) {
        return op;
    }
    Value::exec_name(text)
}

fn parse_int(lit: &str) -> Result<Value, CompileError> {
    let invalid = || CompileError::InvalidNumber {
        lit: lit.to_string(),
    };
    let (negative, digits) = match lit.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lit),
    };

    let v = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|_| invalid())?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(digits, 8).map_err(|_| invalid())?
    } else {
        digits.parse().map_err(|_| invalid())?
    };

    Ok(Value::int(if negative { -v } else { v }))
}
