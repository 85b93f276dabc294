//! Predictive recursive-descent parser for markup tokens.
//!
//! One token of lookahead decides every production; nothing is re-read.
//! Features local error recovery: a failed required consumption unwinds to
//! the nearest [`Parser::expression`] call, is recorded as a diagnostic, and
//! that expression yields no node while its siblings carry on.
//!
//! Nesting is bounded by [`MAX_DEPTH`]. An expression past the limit is
//! reported once and parsing stops there.

use crate::ast::{Cell, Definition, Expr, Image, Link, ListItem, Listable, Listing, Table};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics, ParseError};
use crate::token::{Token, TokenKind};

type ParseOutcome<T> = Result<T, ParseError>;

/// Maximum number of expressions open at once.
pub const MAX_DEPTH: usize = 128;

/// Result of parsing, including recovered errors.
#[derive(Debug)]
pub struct ParseResult {
    /// Top-level expressions that parsed cleanly, in source order.
    pub exprs: Vec<Expr>,
    /// Errors encountered during parsing.
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    /// Check if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Markup parser over a token buffer.
///
/// Tokens are only rewritten when a doubled closer is split between two
/// nested constructs.
pub struct Parser {
    tokens: Vec<Token>,
    /// Index of the next unconsumed token.
    current: usize,
    /// Errors collected during parsing.
    diagnostics: Diagnostics,
    /// Closers of the open blocks, groupings and listings, innermost last.
    closers: Vec<TokenKind>,
    /// Expressions currently being parsed.
    depth: usize,
    /// Set once the nesting limit is hit.
    halted: bool,
}

impl Parser {
    /// Create a parser. An end-of-input token is appended if `tokens` does
    /// not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let (line, offset) = tokens.last().map_or((1, 0), |t| (t.line, t.span.end));
            tokens.push(Token::eof(line, offset));
        }
        Self {
            tokens,
            current: 0,
            diagnostics: Diagnostics::new(),
            closers: Vec::new(),
            depth: 0,
            halted: false,
        }
    }

    /// Parse top-level expressions until end of input.
    pub fn parse(mut self) -> ParseResult {
        let exprs = self.sequence(TokenKind::Eof);
        ParseResult {
            exprs,
            diagnostics: self.diagnostics,
        }
    }

    /// Parse one expression, recording any failure inside it.
    ///
    /// Returns `None` when the expression failed or when the next token
    /// starts no expression; in the latter case nothing is consumed.
    pub fn expression(&mut self) -> Option<Expr> {
        if self.halted {
            return None;
        }
        if self.depth >= MAX_DEPTH {
            self.halt();
            return None;
        }

        self.depth += 1;
        let expr = match self.try_expression() {
            Ok(expr) => expr,
            Err(error) => {
                self.record(error.into());
                None
            }
        };
        self.depth -= 1;
        expr
    }

    /// Report the nesting limit and jump to end of input. The enclosing
    /// constructs then unwind without further reports.
    fn halt(&mut self) {
        let diagnostic = Diagnostic::at_token(
            self.peek(),
            DiagnosticKind::TooDeep,
            format!("Nesting exceeds {} levels.", MAX_DEPTH),
        );
        self.record(diagnostic);
        self.halted = true;
        self.current = self.tokens.len() - 1;
    }

    fn try_expression(&mut self) -> ParseOutcome<Option<Expr>> {
        while self.matches(TokenKind::DoubleNewline) {}

        let expr = match self.peek().kind {
            TokenKind::String => Expr::Text(self.advance_literal()),
            TokenKind::Code => Expr::Code(self.advance_literal()),
            TokenKind::Math => Expr::Math(self.advance_literal()),
            TokenKind::Hash => {
                self.advance();
                Expr::Title(self.text("Expect text after '#'.")?)
            }
            TokenKind::DoubleHash => {
                self.advance();
                Expr::Subtitle(self.text("Expect text after '##'.")?)
            }
            TokenKind::TripleHash => {
                self.advance();
                Expr::Caption(self.text("Expect text after '###'.")?)
            }
            TokenKind::AngleRight => {
                self.advance();
                Expr::Paragraph(self.text("Expect text after '>'.")?)
            }
            TokenKind::BraceLeft => {
                self.advance();
                Expr::Block(self.enclosed(TokenKind::BraceRight, Self::block)?)
            }
            TokenKind::ParenLeft => {
                self.advance();
                Expr::Grouping(self.enclosed(TokenKind::ParenRight, Self::grouping)?)
            }
            TokenKind::BracketLeft => {
                self.advance();
                Expr::Listing(self.enclosed(TokenKind::BracketRight, Self::listing)?)
            }
            TokenKind::DoubleHyphen => {
                self.advance();
                Expr::HorizontalLine
            }
            TokenKind::Semicolon => {
                self.advance();
                Expr::Definition(self.definition()?)
            }
            TokenKind::DoubleParenLeft => {
                self.advance();
                Expr::Link(self.link()?)
            }
            TokenKind::DoubleBracketLeft => {
                self.advance();
                Expr::Image(self.image()?)
            }
            TokenKind::DoublePipe => {
                self.advance();
                Expr::Table(self.table()?)
            }
            _ => return Ok(None),
        };
        Ok(Some(expr))
    }

    /// Parse expressions until `closer` (left unconsumed) or end of input.
    ///
    /// A token that starts no expression is reported and skipped, so the
    /// loop always makes progress.
    fn sequence(&mut self, closer: TokenKind) -> Vec<Expr> {
        let mut exprs = Vec::with_capacity(8);

        while !self.at_closer(closer) && !self.is_at_end() {
            let before = self.current;
            match self.expression() {
                Some(expr) => exprs.push(expr),
                None if self.current == before => {
                    let token = self.advance().clone();
                    self.record(Diagnostic::at_token(
                        &token,
                        DiagnosticKind::UnexpectedToken,
                        "Expect expression.",
                    ));
                }
                None => {}
            }
        }

        exprs
    }

    fn block(&mut self) -> ParseOutcome<Vec<Expr>> {
        let children = self.sequence(TokenKind::BraceRight);
        self.close(TokenKind::BraceRight, "Expect '}' after block.")?;
        Ok(children)
    }

    fn grouping(&mut self) -> ParseOutcome<Vec<Expr>> {
        let children = self.sequence(TokenKind::ParenRight);
        self.close(TokenKind::ParenRight, "Expect ')' after group.")?;
        Ok(children)
    }

    fn listing(&mut self) -> ParseOutcome<Listing> {
        let ordered = self.check(TokenKind::Star);
        let (marker, other) = if ordered {
            (TokenKind::Star, TokenKind::Plus)
        } else {
            (TokenKind::Plus, TokenKind::Star)
        };

        let mut items = Vec::with_capacity(8);
        while !self.at_closer(TokenKind::BracketRight) && !self.is_at_end() {
            if self.matches(marker) {
                if let Some(item) = self.list_item() {
                    items.push(item);
                }
            } else if self.check(other) {
                let token = self.advance().clone();
                self.record(Diagnostic::at_token(
                    &token,
                    DiagnosticKind::UnexpectedToken,
                    "Cannot mix + and * in one list.",
                ));
                // The mismatched item is parsed and dropped.
                let _ = self.expression();
            } else {
                return Err(ParseError::missing(self.peek(), "Expect either + or *."));
            }
        }

        self.close(TokenKind::BracketRight, "Expect ']' after list.")?;
        Ok(Listing { ordered, items })
    }

    fn list_item(&mut self) -> Option<ListItem> {
        let reported = self.diagnostics.len();
        match self.expression().map(Listable::try_from) {
            Some(Ok(listable)) => Some(ListItem::new(listable)),
            Some(Err(_)) => {
                self.report_not_listable();
                None
            }
            // Already reported by the nested expression.
            None if self.diagnostics.len() > reported => None,
            None => {
                self.report_not_listable();
                None
            }
        }
    }

    fn report_not_listable(&mut self) {
        let error = ParseError::missing(self.previous(), "Expect listable expression.")
            .with_kind(DiagnosticKind::NotListable);
        self.record(error.into());
    }

    fn definition(&mut self) -> ParseOutcome<Definition> {
        let word = self.text("Expect string after ;.")?;
        let mut definitions = Vec::new();

        while self.matches(TokenKind::Plus) {
            definitions.push(self.text("Expect string after +.")?);
        }

        Ok(Definition { word, definitions })
    }

    fn link(&mut self) -> ParseOutcome<Link> {
        let href = self.text("Expect link after ((.")?;
        let link = if self.matches(TokenKind::Pipe) {
            Link::new(href, self.text("Expect text after |.")?)
        } else {
            Link::bare(href)
        };

        self.consume(TokenKind::DoubleParenRight, "Expect )).")?;
        Ok(link)
    }

    fn image(&mut self) -> ParseOutcome<Image> {
        let src = self.text("Expect source path after [[.")?;
        let image = if self.matches(TokenKind::Pipe) {
            let width = self.text("Expect width after |.")?;
            self.consume(TokenKind::Semicolon, "Expect ; after width.")?;
            let height = self.text("Expect height after ;.")?;
            Image::new(src, width, height)
        } else {
            Image::with_default_size(src)
        };

        self.consume(TokenKind::DoubleBracketRight, "Expect ]].")?;
        Ok(image)
    }

    /// `|| (|- cell*)* ||`. The row and cell loops stop at end of input;
    /// the missing `||` is then reported like any other unclosed construct.
    fn table(&mut self) -> ParseOutcome<Table> {
        let mut rows = Vec::with_capacity(4);

        while !self.check(TokenKind::DoublePipe) && !self.is_at_end() {
            self.consume(TokenKind::PipeHyphen, "Expect |-.")?;

            let mut row = Vec::with_capacity(4);
            while !self.check(TokenKind::DoublePipe)
                && !self.check(TokenKind::PipeHyphen)
                && !self.is_at_end()
            {
                row.push(self.cell()?);
            }
            rows.push(row);
        }

        self.consume(TokenKind::DoublePipe, "Expect ||.")?;
        Ok(Table { rows })
    }

    fn cell(&mut self) -> ParseOutcome<Cell> {
        let header = if self.matches(TokenKind::Bang) {
            true
        } else if self.matches(TokenKind::Pipe) {
            false
        } else {
            return Err(ParseError::missing(self.peek(), "Expect either !, | or |-."));
        };

        let mut row_span = 1;
        let mut col_span = 1;
        while !self.check(TokenKind::String) && !self.is_at_end() {
            if !self.span_marker(&mut row_span, &mut col_span) {
                return Err(ParseError::missing(self.peek(), "Expect either _ or >."));
            }
        }

        let content = self.text("Expect string.")?;
        // Span markers may also trail the text.
        while self.span_marker(&mut row_span, &mut col_span) {}

        Ok(Cell::spanning(
            header,
            row_span,
            col_span,
            Listable::Text(content),
        ))
    }

    #[inline]
    fn span_marker(&mut self, row_span: &mut u32, col_span: &mut u32) -> bool {
        if self.matches(TokenKind::Underscore) {
            *row_span += 1;
            true
        } else if self.matches(TokenKind::AngleRight) {
            *col_span += 1;
            true
        } else {
            false
        }
    }

    /// Consume a required string and return its literal.
    fn text(&mut self, message: &str) -> ParseOutcome<String> {
        let token = self.consume(TokenKind::String, message)?;
        Ok(token.literal_str().to_string())
    }

    /// Run `parse` with `closer` pushed as the innermost pending closer.
    fn enclosed<T>(
        &mut self,
        closer: TokenKind,
        parse: impl FnOnce(&mut Self) -> ParseOutcome<T>,
    ) -> ParseOutcome<T> {
        self.closers.push(closer);
        let outcome = parse(self);
        self.closers.pop();
        outcome
    }

    /// Whether the cursor closes the innermost construct.
    fn at_closer(&self, closer: TokenKind) -> bool {
        self.check(closer) || self.at_doubled_closer(closer)
    }

    /// A doubled closer (`]]`, `))`) ends two constructs when the two
    /// innermost ones both close with `closer`.
    fn at_doubled_closer(&self, closer: TokenKind) -> bool {
        let doubled = match closer {
            TokenKind::BracketRight => TokenKind::DoubleBracketRight,
            TokenKind::ParenRight => TokenKind::DoubleParenRight,
            _ => return false,
        };
        self.closers.ends_with(&[closer, closer]) && self.check(doubled)
    }

    /// Consume the innermost construct's closer. A doubled closer is split:
    /// its first half is taken and the second is left for the enclosing
    /// construct.
    fn close(&mut self, closer: TokenKind, message: &str) -> ParseOutcome<()> {
        if self.matches(closer) {
            return Ok(());
        }
        if self.at_doubled_closer(closer) {
            let token = &mut self.tokens[self.current];
            token.kind = closer;
            token.lexeme.remove(0);
            token.span.start += 1;
            return Ok(());
        }
        Err(ParseError::missing(self.peek(), message))
    }

    fn advance_literal(&mut self) -> String {
        self.advance().literal_str().to_string()
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseOutcome<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(ParseError::missing(self.peek(), message))
    }

    #[inline]
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    #[inline]
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    #[inline(always)]
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    #[inline]
    fn record(&mut self, diagnostic: Diagnostic) {
        if !self.halted {
            self.diagnostics.push(diagnostic);
        }
    }
}
