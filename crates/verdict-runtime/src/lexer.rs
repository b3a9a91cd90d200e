//! Lexical analysis for the postfix language
//!
//! The lexer converts postfix source into a stream of tokens. Symbols are
//! runs of non-whitespace starting with a letter (or `/` + letter for
//! literal names); everything else is numbers, strings, and one- or
//! two-character operator tokens.

use crate::compiler::CompileError;
use crate::token::{Token, TokenKind};

/// Lexer state for tokenizing postfix source
pub struct Lexer {
    chars: Vec<char>,
    current: usize,
    start: usize,
}

impl Lexer {
    /// Create a new lexer for the given source
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            start: 0,
        }
    }

    /// Tokenize the whole source, stopping at the first error
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return Ok(self.make_token(TokenKind::Eof, ""));
        }

        let c = self.advance();
        match c {
            c if is_letter(c) => Ok(self.symbol(c)),
            c if c.is_ascii_digit() => self.number(c, false),
            '\'' | '"' => self.quoted_string(c),
            '`' => self.raw_string(),

            '[' => Ok(self.make_token(TokenKind::LeftBracket, "[")),
            ']' => Ok(self.make_token(TokenKind::RightBracket, "]")),
            '{' => Ok(self.make_token(TokenKind::LeftBrace, "{")),
            '}' => Ok(self.make_token(TokenKind::RightBrace, "}")),
            '(' => Ok(self.make_token(TokenKind::LeftParen, "(")),
            ')' => Ok(self.make_token(TokenKind::RightParen, ")")),
            ',' => Ok(self.make_token(TokenKind::Comma, ",")),

            '+' => Ok(self.make_token(TokenKind::Operator, "+")),
            '*' => Ok(self.make_token(TokenKind::Operator, "*")),
            '%' => Ok(self.make_token(TokenKind::Operator, "%")),
            '^' => Ok(self.make_token(TokenKind::Operator, "^")),
            '¬' => Ok(self.make_token(TokenKind::Operator, "¬")),
            '∧' => Ok(self.make_token(TokenKind::Operator, "∧")),
            '∨' => Ok(self.make_token(TokenKind::Operator, "∨")),

            '.' => {
                if self.peek().is_ascii_digit() {
                    self.number('.', true)
                } else {
                    Ok(self.make_token(TokenKind::Dot, "."))
                }
            }
            '/' => {
                if is_letter(self.peek()) {
                    let first = self.advance();
                    let mut token = self.symbol(first);
                    token.text.insert(0, '/');
                    Ok(token)
                } else {
                    Ok(self.make_token(TokenKind::Operator, "/"))
                }
            }
            '-' => {
                if self.peek().is_ascii_digit() {
                    let first = self.advance();
                    let mut token = self.number(first, false)?;
                    token.text.insert(0, '-');
                    Ok(token)
                } else if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
                    self.advance();
                    let mut token = self.number('.', true)?;
                    token.text.insert(0, '-');
                    Ok(token)
                } else {
                    Ok(self.make_token(TokenKind::Operator, "-"))
                }
            }
            '!' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::Operator, "!="))
                } else {
                    Ok(self.make_token(TokenKind::Operator, "!"))
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::Operator, "<="))
                } else {
                    Ok(self.make_token(TokenKind::Operator, "<"))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::Operator, ">="))
                } else {
                    Ok(self.make_token(TokenKind::Operator, ">"))
                }
            }
            '=' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::Operator, "=="))
                } else if self.match_char('<') {
                    Ok(self.make_token(TokenKind::Operator, "<="))
                } else if self.match_char('>') {
                    Ok(self.make_token(TokenKind::Operator, ">="))
                } else {
                    Err(self.error("illegal token \"=\""))
                }
            }
            '&' => {
                if self.match_char('&') {
                    Ok(self.make_token(TokenKind::Operator, "&&"))
                } else {
                    Err(self.error("illegal token \"&\""))
                }
            }
            '|' => {
                if self.match_char('|') {
                    Ok(self.make_token(TokenKind::Operator, "||"))
                } else {
                    Err(self.error("illegal token \"|\""))
                }
            }

            c => Err(self.error(&format!("illegal token {:?}", c))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\r' | '\n') {
            self.advance();
        }
    }

    /// Scan a symbol: everything up to the next whitespace
    fn symbol(&mut self, first: char) -> Token {
        let mut text = String::new();
        text.push(first);
        while !self.is_at_end() && !is_whitespace(self.peek()) {
            text.push(self.advance());
        }
        self.make_token(TokenKind::Symbol, &text)
    }

    /// Scan a number literal. `has_point` means the leading `.` of a
    /// point-led real (`.5`) was already consumed.
    fn number(&mut self, first: char, has_point: bool) -> Result<Token, CompileError> {
        let mut text = String::new();
        let mut kind = TokenKind::Integer;

        if has_point {
            text.push_str("0.");
            self.scan_digits(&mut text);
            return self.exponent(text);
        }

        text.push(first);

        // Hexadecimal
        if first == '0' && matches!(self.peek(), 'x' | 'X') {
            text.push(self.advance());
            let before = text.len();
            while self.peek().is_ascii_hexdigit() {
                text.push(self.advance());
            }
            if text.len() == before {
                return Err(self.error("illegal hexadecimal number"));
            }
            return Ok(self.make_token(TokenKind::Integer, &text));
        }

        self.scan_digits(&mut text);

        if self.peek() == '.' && self.peek_at(1).is_ascii_digit() {
            kind = TokenKind::Real;
            text.push(self.advance());
            self.scan_digits(&mut text);
        }

        if matches!(self.peek(), 'e' | 'E') {
            return self.exponent(text);
        }

        // Legacy octal: a multi-digit integer with a leading zero
        if kind == TokenKind::Integer
            && text.starts_with('0')
            && text.len() > 1
            && text[1..].contains(|c| c == '8' || c == '9')
        {
            return Err(self.error("illegal octal number"));
        }

        Ok(self.make_token(kind, &text))
    }

    fn exponent(&mut self, mut text: String) -> Result<Token, CompileError> {
        if matches!(self.peek(), 'e' | 'E') {
            text.push(self.advance());
            if matches!(self.peek(), '+' | '-') {
                text.push(self.advance());
            }
            if !self.peek().is_ascii_digit() {
                return Err(self.error("illegal floating-point exponent"));
            }
            self.scan_digits(&mut text);
        }
        Ok(self.make_token(TokenKind::Real, &text))
    }

    fn scan_digits(&mut self, text: &mut String) {
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }
    }

    /// Scan a quoted string, decoding C-style escapes
    fn quoted_string(&mut self, quote: char) -> Result<Token, CompileError> {
        let mut text = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error("unterminated string"));
            }
            let c = self.advance();
            if c == quote {
                return Ok(self.make_token(TokenKind::Str, &text));
            }
            if c != '\\' {
                text.push(c);
                continue;
            }

            // Escape sequence
            if self.is_at_end() {
                return Err(self.error("unterminated escape sequence"));
            }
            let e = self.advance();
            match e {
                'a' => text.push('\x07'),
                'b' => text.push('\x08'),
                'f' => text.push('\x0C'),
                'n' => text.push('\n'),
                'r' => text.push('\r'),
                't' => text.push('\t'),
                'v' => text.push('\x0B'),
                '[' | ']' | '"' | '\'' | '\\' => text.push(e),
                // Line continuation
                '\n' => {}
                '\r' => {
                    self.match_char('\n');
                }
                '0'..='7' => {
                    let mut v = e as u32 - '0' as u32;
                    for _ in 0..2 {
                        match self.peek().to_digit(8) {
                            Some(d) => {
                                v = v * 8 + d;
                                self.advance();
                            }
                            None => break,
                        }
                    }
                    if v > 255 {
                        return Err(self.error("escape sequence is invalid byte"));
                    }
                    text.push(v as u8 as char);
                }
                'x' => text.push(self.hex_escape(2)?),
                'u' => text.push(self.hex_escape(4)?),
                'U' => text.push(self.hex_escape(8)?),
                _ => return Err(self.error(&format!("unknown escape sequence \\{}", e))),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, CompileError> {
        let mut v: u32 = 0;
        for _ in 0..digits {
            if self.is_at_end() {
                return Err(self.error("unterminated escape sequence"));
            }
            let c = self.advance();
            match c.to_digit(16) {
                Some(d) => v = v * 16 + d,
                None => {
                    return Err(
                        self.error(&format!("illegal character {:?} in escape sequence", c))
                    )
                }
            }
        }
        char::from_u32(v).ok_or_else(|| self.error("escape sequence is invalid Unicode code point"))
    }

    /// Scan a back-tick raw string; `` `` `` collapses to one back-tick
    fn raw_string(&mut self) -> Result<Token, CompileError> {
        let mut text = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error("unterminated raw string"));
            }
            let c = self.advance();
            if c == '`' {
                if self.peek() == '`' {
                    self.advance();
                    text.push('`');
                } else {
                    return Ok(self.make_token(TokenKind::RawStr, &text));
                }
            } else {
                text.push(c);
            }
        }
    }

    // === Character navigation ===

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> char {
        self.chars.get(self.current + n).copied().unwrap_or('\0')
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn make_token(&self, kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            offset: self.start,
        }
    }

    fn error(&self, msg: &str) -> CompileError {
        CompileError::Scan {
            offset: self.start,
            msg: msg.to_string(),
        }
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (!c.is_ascii() && c.is_alphabetic())
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
