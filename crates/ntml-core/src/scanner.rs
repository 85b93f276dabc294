//! Single-pass scanner turning markup source into tokens.
//!
//! The scanner walks the source once, left to right. Punctuation maps to
//! fixed token kinds (peeking one or two characters for the doubled forms);
//! `"`, `§` and `$` switch into literal regions that run to their closing
//! delimiter.
//!
//! # Performance
//!
//! - Literal regions and line comments are skipped with `memchr`
//!   (SIMD on supported platforms) instead of char-by-char loops
//! - Newlines inside a literal are counted in one pass over its body
//!
//! Scanning never fails: malformed input yields a [`Diagnostic`] and the
//! scanner carries on with the next character.

use memchr::{memchr, memchr2, memchr_iter, memmem};

use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Opening and closing delimiter of code literals.
pub const CODE_DELIMITER: char = '§';
/// Opening and closing delimiter of math literals.
pub const MATH_DELIMITER: char = '$';

/// Scanning profile that determines how literal text is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// `<` and `>` become `&lt` and `&gt`.
    ///
    /// The entities lack their trailing semicolon. Browsers accept the
    /// form, and existing documents rely on the exact bytes.
    #[default]
    Ntml,
    /// `<` and `>` become `&lt;` and `&gt;`.
    Strict,
}

impl Profile {
    /// Replace `<` and `>` in `text` with this profile's entities.
    pub fn escape_angles(self, text: &str) -> String {
        if memchr2(b'<', b'>', text.as_bytes()).is_none() {
            return text.to_string();
        }
        let (lt, gt) = match self {
            Profile::Ntml => ("&lt", "&gt"),
            Profile::Strict => ("&lt;", "&gt;"),
        };
        let mut out = String::with_capacity(text.len() + 8);
        for c in text.chars() {
            match c {
                '<' => out.push_str(lt),
                '>' => out.push_str(gt),
                _ => out.push(c),
            }
        }
        out
    }
}

/// Tokens and diagnostics from one scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Tokens in source order, always terminated by `Eof`.
    pub tokens: Vec<Token>,
    /// Lexical diagnostics.
    pub diagnostics: Diagnostics,
}

impl ScanResult {
    /// Check if scanning completed without diagnostics.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Markup scanner.
pub struct Scanner<'a> {
    /// The complete source text.
    source: &'a str,
    /// Source as bytes for `memchr` scanning.
    bytes: &'a [u8],
    profile: Profile,
    tokens: Vec<Token>,
    diagnostics: Diagnostics,
    /// Byte offset where the current token began.
    start: usize,
    /// Byte offset of the next unread character.
    current: usize,
    /// Line of the next unread character.
    line: u32,
    /// Line where the current token began.
    start_line: u32,
}

impl<'a> Scanner<'a> {
    /// Create a scanner with the default profile.
    pub fn new(source: &'a str) -> Self {
        Self::with_profile(source, Profile::default())
    }

    /// Create a scanner with an explicit profile.
    pub fn with_profile(source: &'a str, profile: Profile) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            profile,
            tokens: Vec::with_capacity(source.len() / 4 + 1),
            diagnostics: Diagnostics::new(),
            start: 0,
            current: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Scan the whole source.
    pub fn scan(mut self) -> ScanResult {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.scan_token();
        }

        let eof = Token::eof(self.line, self.bytes.len() as u32);
        self.tokens.push(eof);
        ScanResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '+' => self.add_token(TokenKind::Plus),
            ';' => self.add_token(TokenKind::Semicolon),
            '*' => self.add_token(TokenKind::Star),
            '!' => self.add_token(TokenKind::Bang),
            '>' => self.add_token(TokenKind::AngleRight),
            '<' => self.add_token(TokenKind::AngleLeft),
            ':' => self.add_token(TokenKind::Colon),
            '_' => self.add_token(TokenKind::Underscore),
            '{' => self.add_token(TokenKind::BraceLeft),
            '}' => self.add_token(TokenKind::BraceRight),

            '-' => {
                let kind = if self.matches(b'-') {
                    TokenKind::DoubleHyphen
                } else {
                    TokenKind::Hyphen
                };
                self.add_token(kind);
            }
            '\\' => {
                let kind = if self.matches(b'\\') {
                    TokenKind::DoubleBackslash
                } else {
                    TokenKind::Backslash
                };
                self.add_token(kind);
            }
            '|' => {
                let kind = if self.matches(b'|') {
                    TokenKind::DoublePipe
                } else if self.matches(b'-') {
                    TokenKind::PipeHyphen
                } else {
                    TokenKind::Pipe
                };
                self.add_token(kind);
            }
            '(' => {
                let kind = if self.opens_double(b'(') {
                    TokenKind::DoubleParenLeft
                } else {
                    TokenKind::ParenLeft
                };
                self.add_token(kind);
            }
            ')' => {
                let kind = if self.matches(b')') {
                    TokenKind::DoubleParenRight
                } else {
                    TokenKind::ParenRight
                };
                self.add_token(kind);
            }
            '[' => {
                let kind = if self.opens_double(b'[') {
                    TokenKind::DoubleBracketLeft
                } else {
                    TokenKind::BracketLeft
                };
                self.add_token(kind);
            }
            ']' => {
                let kind = if self.matches(b']') {
                    TokenKind::DoubleBracketRight
                } else {
                    TokenKind::BracketRight
                };
                self.add_token(kind);
            }
            '#' => {
                let kind = if self.matches(b'#') {
                    if self.matches(b'#') {
                        TokenKind::TripleHash
                    } else {
                        TokenKind::DoubleHash
                    }
                } else {
                    TokenKind::Hash
                };
                self.add_token(kind);
            }
            '/' => {
                if self.matches(b'/') {
                    self.line_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            MATH_DELIMITER => self.math(),
            CODE_DELIMITER => self.code(),
            '"' => self.string(),

            _ => self.report(DiagnosticKind::UnexpectedCharacter, "Unexpected character."),
        }
    }

    /// Consume the second opener of a doubled form, unless a third one
    /// follows: `(((` scans as `(` then `((`, so an outer grouping or
    /// listing can wrap a link or image.
    #[inline]
    fn opens_double(&mut self, opener: u8) -> bool {
        if self.peek() == Some(opener) && self.peek_next() != Some(opener) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Skip to the end of the line; the newline itself is left for the
    /// main loop so the line counter stays in one place.
    fn line_comment(&mut self) {
        let rest = &self.bytes[self.current..];
        self.current = match memchr(b'\n', rest) {
            Some(pos) => self.current + pos,
            None => self.bytes.len(),
        };
    }

    fn math(&mut self) {
        let source = self.source;
        let body_start = self.current;
        match memchr(b'$', &self.bytes[body_start..]) {
            Some(pos) => {
                let body = &source[body_start..body_start + pos];
                self.line += count_newlines(body);
                self.current = body_start + pos + 1;
                self.add_literal(TokenKind::Math, body.to_string());
            }
            None => {
                self.line += count_newlines(&source[body_start..]);
                self.current = self.bytes.len();
                self.report(DiagnosticKind::UnterminatedMath, "Unterminated math.");
            }
        }
    }

    fn code(&mut self) {
        let source = self.source;
        let body_start = self.current;
        let mut buf = [0u8; 4];
        let delimiter = CODE_DELIMITER.encode_utf8(&mut buf).as_bytes();
        match memmem::find(&self.bytes[body_start..], delimiter) {
            Some(pos) => {
                let body = &source[body_start..body_start + pos];
                self.line += count_newlines(body);
                self.current = body_start + pos + delimiter.len();
                let value = self.profile.escape_angles(body);
                self.add_literal(TokenKind::Code, value);
            }
            None => {
                self.line += count_newlines(&source[body_start..]);
                self.current = self.bytes.len();
                self.report(DiagnosticKind::UnterminatedCode, "Unterminated code.");
            }
        }
    }

    fn string(&mut self) {
        let source = self.source;
        let bytes = self.bytes;
        let body_start = self.current;
        let mut cursor = body_start;

        loop {
            let Some(pos) = memchr2(b'"', b'\\', &bytes[cursor..]) else {
                self.line += count_newlines(&source[body_start..]);
                self.current = self.bytes.len();
                self.report(DiagnosticKind::UnterminatedString, "Unterminated string.");
                return;
            };

            let at = cursor + pos;
            if bytes[at] == b'\\' {
                // The escaped character never closes the literal.
                let escaped = source[at + 1..]
                    .chars()
                    .next()
                    .map_or(0, char::len_utf8);
                cursor = at + 1 + escaped;
                continue;
            }

            let body = &source[body_start..at];
            self.line += count_newlines(body);
            self.current = at + 1;
            let value = unescape(&self.profile.escape_angles(body));
            self.add_literal(TokenKind::String, value);
            return;
        }
    }

    #[inline]
    fn matches(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.current).copied()
    }

    #[inline(always)]
    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.current + 1).copied()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.current >= self.bytes.len()
    }

    /// Consume the next character. `current` always sits on a char boundary.
    #[inline]
    fn advance(&mut self) -> char {
        match self.source[self.current..].chars().next() {
            Some(c) => {
                self.current += c.len_utf8();
                c
            }
            None => '\0',
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.push(kind, None);
    }

    fn add_literal(&mut self, kind: TokenKind, literal: String) {
        self.push(kind, Some(literal));
    }

    fn push(&mut self, kind: TokenKind, literal: Option<String>) {
        let source = self.source;
        let lexeme = &source[self.start..self.current];
        let span = Span::new(self.start as u32, self.current as u32);
        self.tokens
            .push(Token::new(kind, lexeme, literal, self.start_line, span));
    }

    fn report(&mut self, kind: DiagnosticKind, message: &str) {
        self.diagnostics
            .push(Diagnostic::at_line(self.start_line, kind, message));
    }
}

/// Decode the escaped quote inside a string literal.
#[inline]
fn unescape(value: &str) -> String {
    if value.contains("\\\"") {
        value.replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}

#[inline]
fn count_newlines(text: &str) -> u32 {
    memchr_iter(b'\n', text.as_bytes()).count() as u32
}
