use crate::token::Token;
use std::fmt;

/// Diagnostic kinds for categorizing scan and parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A character that starts no token
    UnexpectedCharacter,
    /// String literal without a closing `"`
    UnterminatedString,
    /// Code literal without a closing `§`
    UnterminatedCode,
    /// Math literal without a closing `$`
    UnterminatedMath,
    /// A required token is missing at the cursor
    MissingToken,
    /// A non-listable node used as a list item or cell payload
    NotListable,
    /// A token that begins no expression
    UnexpectedToken,
    /// Expressions nested beyond the parser's depth limit
    TooDeep,
}

impl DiagnosticKind {
    /// Whether this diagnostic came from the scanner.
    pub const fn is_lexical(self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnexpectedCharacter
                | DiagnosticKind::UnterminatedString
                | DiagnosticKind::UnterminatedCode
                | DiagnosticKind::UnterminatedMath
        )
    }

    /// Snake case name, used in JSON reports.
    pub const fn name(self) -> &'static str {
        match self {
            DiagnosticKind::UnexpectedCharacter => "unexpected_character",
            DiagnosticKind::UnterminatedString => "unterminated_string",
            DiagnosticKind::UnterminatedCode => "unterminated_code",
            DiagnosticKind::UnterminatedMath => "unterminated_math",
            DiagnosticKind::MissingToken => "missing_token",
            DiagnosticKind::NotListable => "not_listable",
            DiagnosticKind::UnexpectedToken => "unexpected_token",
            DiagnosticKind::TooDeep => "too_deep",
        }
    }
}

/// Where on its line a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Reported by line only (scanner diagnostics).
    Line,
    /// Reported at the end-of-input token.
    End,
    /// Reported at a token with this lexeme.
    Lexeme(String),
}

impl Location {
    /// Locate a diagnostic at `token`.
    pub fn at(token: &Token) -> Self {
        if token.is_eof() {
            Location::End
        } else {
            Location::Lexeme(token.lexeme.clone())
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line => Ok(()),
            Location::End => f.write_str(" at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A reported scan or parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source line (1-based)
    pub line: u32,
    /// Position on the line
    pub location: Location,
    /// Human-readable message
    pub message: String,
    /// Diagnostic categorization
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Report by line, as the scanner does.
    pub fn at_line(line: u32, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line,
            location: Location::Line,
            message: message.into(),
            kind,
        }
    }

    /// Report at a token, as the parser does.
    pub fn at_token(token: &Token, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line: token.line,
            location: Location::at(token),
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error{}: {}",
            self.line, self.location, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Diagnostics collected over one compilation.
///
/// A non-empty collection is the document-level error flag: translation is
/// skipped and nothing is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Add a diagnostic to the collection.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic of `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Check if any diagnostics were collected.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Check if any diagnostic came from the scanner.
    pub fn has_lexical(&self) -> bool {
        self.diagnostics.iter().any(|d| d.kind.is_lexical())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

/// A structural failure raised inside the parser.
///
/// Carries the offending token; unwinds with `?` to the nearest
/// `expression()` call, which records it and yields no node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Token at the cursor when the failure was raised
    pub token: Token,
    /// Human-readable message
    pub message: String,
    /// Error categorization
    pub kind: DiagnosticKind,
}

impl ParseError {
    /// A required token was not found.
    pub fn missing(token: &Token, message: impl Into<String>) -> Self {
        Self {
            token: token.clone(),
            message: message.into(),
            kind: DiagnosticKind::MissingToken,
        }
    }

    /// Set the error kind.
    pub fn with_kind(mut self, kind: DiagnosticKind) -> Self {
        self.kind = kind;
        self
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        Diagnostic::at_token(&error.token, error.kind, error.message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error{}: {}",
            self.token.line,
            Location::at(&self.token),
            self.message
        )
    }
}

impl std::error::Error for ParseError {}
