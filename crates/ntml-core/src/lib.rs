//! # NTML Core
//!
//! A compiler front end for NTML, a terse punctuation-driven markup, into
//! HTML fragments.
//!
//! The pipeline has three stages, each a plain function over owned data:
//!
//! - [`scan`]: source text into [`Token`]s (never fails; diagnostics are collected)
//! - [`parse`]: tokens into top-level [`Expr`] nodes, recovering per expression
//! - [`translate`]: nodes into HTML fragments, one tag or text run per element
//!
//! ## Quick Start
//!
//! ```rust
//! use ntml_core::compile;
//!
//! let result = compile("#\"Hello\"");
//! assert!(result.is_ok());
//! assert_eq!(result.fragments, vec!["<h1>", "Hello", "</h1>"]);
//! ```
//!
//! ## Error Recovery
//!
//! A failure inside one expression drops only that expression; parsing
//! resumes after it and every diagnostic is collected. Any diagnostic skips
//! translation, so partial output is never produced:
//!
//! ```rust
//! use ntml_core::compile;
//!
//! let result = compile("#\"Kept\" {\"unclosed\" >\"Also kept\"");
//! assert!(!result.is_ok());
//! assert!(result.fragments.is_empty());
//! for diagnostic in result.diagnostics.iter() {
//!     eprintln!("{}", diagnostic);
//! }
//! ```
//!
//! ## Profiles
//!
//! - `Profile::Ntml` - `<`/`>` in literals become `&lt`/`&gt` (default)
//! - `Profile::Strict` - `<`/`>` in literals become `&lt;`/`&gt;`

pub mod ast;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod span;
pub mod token;
pub mod translate;

pub use ast::{Expr, Listable};
pub use error::{Diagnostic, DiagnosticKind, Diagnostics, Location, ParseError};
pub use parser::{ParseResult, Parser};
pub use scanner::{Profile, ScanResult, Scanner};
pub use token::{Token, TokenKind};
pub use translate::{translate, Translator};

/// Scan `source` with the default profile.
pub fn scan(source: &str) -> ScanResult {
    Scanner::new(source).scan()
}

/// Parse a token sequence into top-level expressions.
pub fn parse(tokens: Vec<Token>) -> ParseResult {
    Parser::new(tokens).parse()
}

/// Output of a whole-document compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileResult {
    /// HTML fragments; empty whenever a diagnostic was recorded.
    pub fragments: Vec<String>,
    /// Scanner diagnostics followed by parser diagnostics.
    pub diagnostics: Diagnostics,
}

impl CompileResult {
    /// Check if compilation completed without diagnostics.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The fragments, or every diagnostic if any was recorded.
    pub fn into_result(self) -> Result<Vec<String>, Diagnostics> {
        if self.diagnostics.is_empty() {
            Ok(self.fragments)
        } else {
            Err(self.diagnostics)
        }
    }
}

/// Compile `source` with the default profile.
pub fn compile(source: &str) -> CompileResult {
    compile_with_profile(source, Profile::default())
}

/// Compile `source`: scan, parse, and translate unless anything was reported.
pub fn compile_with_profile(source: &str, profile: Profile) -> CompileResult {
    let ScanResult {
        tokens,
        mut diagnostics,
    } = Scanner::with_profile(source, profile).scan();

    let parsed = parse(tokens);
    diagnostics.extend(parsed.diagnostics);

    let fragments = if diagnostics.is_empty() {
        translate(&parsed.exprs)
    } else {
        Vec::new()
    };

    CompileResult {
        fragments,
        diagnostics,
    }
}
