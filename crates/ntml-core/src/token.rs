//! Token types produced by the scanner.

use std::fmt;

use crate::span::Span;

/// The kind of a scanned token.
///
/// Punctuation kinds carry no payload; `String`, `Code` and `Math` carry
/// their decoded text in [`Token::literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character markers.
    Plus,
    Semicolon,
    Star,
    Bang,
    AngleRight,
    AngleLeft,
    Colon,
    Underscore,
    Hyphen,
    Backslash,
    Pipe,
    Slash,
    ParenLeft,
    ParenRight,
    BracketLeft,
    BracketRight,
    BraceLeft,
    BraceRight,
    Hash,

    // Doubled and alternate forms.
    DoubleHyphen,
    DoubleBackslash,
    DoublePipe,
    PipeHyphen,
    DoubleParenLeft,
    DoubleParenRight,
    DoubleBracketLeft,
    DoubleBracketRight,
    DoubleHash,
    TripleHash,
    DoubleNewline,

    // Literals.
    String,
    Code,
    Math,

    Eof,
}

impl TokenKind {
    /// Upper snake case name, used in token dumps.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Star => "STAR",
            TokenKind::Bang => "BANG",
            TokenKind::AngleRight => "ANGLE_RIGHT",
            TokenKind::AngleLeft => "ANGLE_LEFT",
            TokenKind::Colon => "COLON",
            TokenKind::Underscore => "UNDERSCORE",
            TokenKind::Hyphen => "HYPHEN",
            TokenKind::Backslash => "BACKSLASH",
            TokenKind::Pipe => "PIPE",
            TokenKind::Slash => "SLASH",
            TokenKind::ParenLeft => "PAREN_LEFT",
            TokenKind::ParenRight => "PAREN_RIGHT",
            TokenKind::BracketLeft => "BRACKET_LEFT",
            TokenKind::BracketRight => "BRACKET_RIGHT",
            TokenKind::BraceLeft => "BRACE_LEFT",
            TokenKind::BraceRight => "BRACE_RIGHT",
            TokenKind::Hash => "HASH",
            TokenKind::DoubleHyphen => "DOUBLE_HYPHEN",
            TokenKind::DoubleBackslash => "DOUBLE_BACKSLASH",
            TokenKind::DoublePipe => "DOUBLE_PIPE",
            TokenKind::PipeHyphen => "PIPE_HYPHEN",
            TokenKind::DoubleParenLeft => "DOUBLE_PAREN_LEFT",
            TokenKind::DoubleParenRight => "DOUBLE_PAREN_RIGHT",
            TokenKind::DoubleBracketLeft => "DOUBLE_BRACKET_LEFT",
            TokenKind::DoubleBracketRight => "DOUBLE_BRACKET_RIGHT",
            TokenKind::DoubleHash => "DOUBLE_HASH",
            TokenKind::TripleHash => "TRIPLE_HASH",
            TokenKind::DoubleNewline => "DOUBLE_NEWLINE",
            TokenKind::String => "STRING",
            TokenKind::Code => "CODE",
            TokenKind::Math => "MATH",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single scanned token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Raw source text of the token, delimiters included.
    pub lexeme: String,
    /// Decoded payload for `String`, `Code` and `Math` tokens.
    pub literal: Option<String>,
    /// Line the token started on (1-based).
    pub line: u32,
    /// Byte range of the lexeme in the source.
    pub span: Span,
}

impl Token {
    /// Create a token.
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Option<String>,
        line: u32,
        span: Span,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
            span,
        }
    }

    /// The end-of-input sentinel.
    pub fn eof(line: u32, offset: u32) -> Self {
        Self::new(TokenKind::Eof, "", None, line, Span::empty_at(offset))
    }

    /// Check if this is the end-of-input sentinel.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// The decoded literal, or an empty string for punctuation.
    #[inline]
    pub fn literal_str(&self) -> &str {
        self.literal.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{} {} {}", self.kind, self.lexeme, literal),
            None => write!(f, "{} {}", self.kind, self.lexeme),
        }
    }
}
