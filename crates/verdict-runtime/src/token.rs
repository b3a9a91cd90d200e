//! Token types for the postfix language

use std::fmt;

/// Kind of a postfix token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Integer literal (decimal, hex `0x…`, or legacy octal `0…`)
    Integer,
    /// Real literal (fraction and/or exponent)
    Real,
    /// Quoted string literal (escapes already decoded)
    Str,
    /// Back-tick raw string literal (double back-ticks already collapsed)
    RawStr,
    /// Symbol: a run of non-whitespace starting with a letter or `/letter`
    Symbol,

    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Comma,
    Dot,

    /// Operator token (`+ - * / % ^ ! < > == != <= >= && || ¬ ∧ ∨`)
    Operator,

    Eof,
}

/// A single token with its decoded text and byte-ish source offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// For strings this is the decoded content; for everything else the
    /// (normalized) source text.
    pub text: String,
    /// Offset of the first character of the token, in chars
    pub offset: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
