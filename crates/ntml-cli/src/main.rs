//! NTML CLI - Compile NTML documents into HTML pages
//!
//! Usage:
//!   ntml [OPTIONS] <SOURCE> [STYLESHEET] [OUTPUT]
//!
//! Emit modes:
//!   html       Write the formatted page to OUTPUT (default)
//!   fragments  Print translated fragments as JSON
//!   tokens     Print scanned tokens as JSON
//!   ast        Print parsed expressions as JSON

mod formatter;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use ntml_core::ast::{Cell, Definition, Image, Link, ListItem, Listing};
use ntml_core::{
    compile_with_profile, parse, Diagnostic, Diagnostics, Expr, Listable, Location, Profile,
    Scanner, Token,
};
use serde::Serialize;

use formatter::{Formatter, DEFAULT_TITLE};

/// Command line usage error.
const EX_USAGE: i32 = 64;
/// Input data was incorrect.
const EX_DATAERR: i32 = 65;
/// Internal software error.
const EX_SOFTWARE: i32 = 70;
/// Input/output error.
const EX_IOERR: i32 = 74;

#[derive(Parser, Debug)]
#[command(name = "ntml", version)]
#[command(about = "Compile an NTML document into an HTML page")]
struct Args {
    /// Path to the NTML source document
    source: PathBuf,

    /// Stylesheet spliced into the page head
    #[arg(default_value = "./style.css")]
    stylesheet: PathBuf,

    /// Destination of the formatted page
    #[arg(default_value = "./output.html")]
    output: PathBuf,

    /// Escape `<` and `>` as `&lt;` and `&gt;`
    #[arg(long)]
    strict: bool,

    /// Pipeline stage to emit
    #[arg(long, value_enum, default_value_t = Emit::Html)]
    emit: Emit,

    /// Report diagnostics as JSON on stdout
    #[arg(short, long)]
    json: bool,

    /// Page title
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Html,
    Fragments,
    Tokens,
    Ast,
}

impl Args {
    fn profile(&self) -> Profile {
        if self.strict {
            Profile::Strict
        } else {
            Profile::Ntml
        }
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EX_USAGE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(e) = run(&args) {
        if !matches!(e, CliError::Compile(_)) {
            eprintln!("error: {}", e);
        }
        process::exit(e.exit_code());
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
enum CliError {
    /// Diagnostics were reported; the count is kept for the summary.
    Compile(usize),
    Io(String),
    Internal(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Compile(_) => EX_DATAERR,
            CliError::Io(_) => EX_IOERR,
            CliError::Internal(_) => EX_SOFTWARE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Compile(count) => write!(f, "{} error(s) found", count),
            CliError::Io(message) | CliError::Internal(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for CliError {}

fn read(path: &Path, what: &str) -> Result<String, CliError> {
    fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("failed to read {} '{}': {}", what, path.display(), e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Internal(format!("failed to serialize output: {}", e)))
}

// =============================================================================
// Pipeline
// =============================================================================

fn run(args: &Args) -> Result<(), CliError> {
    let source = read(&args.source, "source")?;
    let profile = args.profile();

    match args.emit {
        Emit::Html => emit_html(args, &source, profile),
        Emit::Fragments => {
            let result = compile_with_profile(&source, profile);
            let stage = JsonStage::Fragments(&result.fragments);
            finish(args, &result.diagnostics, stage)
        }
        Emit::Tokens => {
            let scanned = Scanner::with_profile(&source, profile).scan();
            let tokens = scanned.tokens.iter().map(JsonToken::from).collect();
            finish(args, &scanned.diagnostics, JsonStage::Tokens(tokens))
        }
        Emit::Ast => {
            let scanned = Scanner::with_profile(&source, profile).scan();
            let mut diagnostics = scanned.diagnostics;
            let parsed = parse(scanned.tokens);
            diagnostics.extend(parsed.diagnostics);
            let ast = parsed.exprs.iter().map(convert_expr).collect();
            finish(args, &diagnostics, JsonStage::Ast(ast))
        }
    }
}

fn emit_html(args: &Args, source: &str, profile: Profile) -> Result<(), CliError> {
    let result = compile_with_profile(source, profile);
    if !result.is_ok() {
        report(args, &result.diagnostics, None)?;
        return Err(CliError::Compile(result.diagnostics.len()));
    }

    let stylesheet = read(&args.stylesheet, "stylesheet")?;
    let page = Formatter::new(stylesheet)
        .with_title(args.title.as_str())
        .render(&result.fragments);

    fs::write(&args.output, page).map_err(|e| {
        CliError::Io(format!(
            "failed to write '{}': {}",
            args.output.display(),
            e
        ))
    })?;

    if args.json {
        report(args, &result.diagnostics, None)?;
    } else {
        println!("Wrote {}", args.output.display());
    }
    Ok(())
}

/// Print an intermediate stage, then the diagnostics.
///
/// The stage is printed even when diagnostics were recorded; it then shows
/// what survived recovery.
fn finish(args: &Args, diagnostics: &Diagnostics, stage: JsonStage<'_>) -> Result<(), CliError> {
    if args.json {
        report(args, diagnostics, Some(stage))?;
    } else {
        println!("{}", to_json(&stage)?);
        report(args, diagnostics, None)?;
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(CliError::Compile(diagnostics.len()))
    }
}

// =============================================================================
// Diagnostic Output
// =============================================================================

fn report(
    args: &Args,
    diagnostics: &Diagnostics,
    stage: Option<JsonStage<'_>>,
) -> Result<(), CliError> {
    if args.json {
        let report = JsonReport {
            valid: diagnostics.is_empty(),
            errors: diagnostics.iter().map(JsonDiagnostic::from).collect(),
            stage,
        };
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    if diagnostics.is_empty() {
        return Ok(());
    }
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
    eprintln!("{}", CliError::Compile(diagnostics.len()));
    Ok(())
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    errors: Vec<JsonDiagnostic<'a>>,
    #[serde(flatten)]
    stage: Option<JsonStage<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum JsonStage<'a> {
    Fragments(&'a [String]),
    Tokens(Vec<JsonToken<'a>>),
    Ast(Vec<JsonExpr<'a>>),
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    line: u32,
    #[serde(rename = "where")]
    location: Option<&'a str>,
    kind: &'static str,
    message: &'a str,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(diagnostic: &'a Diagnostic) -> Self {
        let location = match &diagnostic.location {
            Location::Line => None,
            Location::End => Some("end"),
            Location::Lexeme(lexeme) => Some(lexeme.as_str()),
        };
        Self {
            line: diagnostic.line,
            location,
            kind: diagnostic.kind.name(),
            message: &diagnostic.message,
        }
    }
}

#[derive(Serialize)]
struct JsonToken<'a> {
    kind: &'static str,
    lexeme: &'a str,
    literal: Option<&'a str>,
    line: u32,
    start: u32,
    end: u32,
}

impl<'a> From<&'a Token> for JsonToken<'a> {
    fn from(token: &'a Token) -> Self {
        Self {
            kind: token.kind.name(),
            lexeme: &token.lexeme,
            literal: token.literal.as_deref(),
            line: token.line,
            start: token.span.start,
            end: token.span.end,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonExpr<'a> {
    Title {
        text: &'a str,
    },
    Subtitle {
        text: &'a str,
    },
    Caption {
        text: &'a str,
    },
    Paragraph {
        text: &'a str,
    },
    Text {
        text: &'a str,
    },
    Math {
        formula: &'a str,
    },
    Code {
        code: &'a str,
    },
    Block {
        children: Vec<JsonExpr<'a>>,
    },
    Grouping {
        children: Vec<JsonExpr<'a>>,
    },
    Listing {
        ordered: bool,
        items: Vec<JsonExpr<'a>>,
    },
    ListItem {
        item: Box<JsonExpr<'a>>,
    },
    Link {
        href: &'a str,
        text: &'a str,
    },
    Image {
        src: &'a str,
        width: &'a str,
        height: &'a str,
    },
    Definition {
        word: &'a str,
        definitions: &'a [String],
    },
    Table {
        rows: Vec<Vec<JsonExpr<'a>>>,
    },
    Cell {
        header: bool,
        row_span: u32,
        col_span: u32,
        content: Box<JsonExpr<'a>>,
    },
    HorizontalLine,
}

fn convert_expr(expr: &Expr) -> JsonExpr<'_> {
    match expr {
        Expr::Title(text) => JsonExpr::Title { text },
        Expr::Subtitle(text) => JsonExpr::Subtitle { text },
        Expr::Caption(text) => JsonExpr::Caption { text },
        Expr::Paragraph(text) => JsonExpr::Paragraph { text },
        Expr::Text(text) => JsonExpr::Text { text },
        Expr::Math(formula) => JsonExpr::Math { formula },
        Expr::Code(code) => JsonExpr::Code { code },
        Expr::Block(children) => JsonExpr::Block {
            children: children.iter().map(convert_expr).collect(),
        },
        Expr::Grouping(children) => JsonExpr::Grouping {
            children: children.iter().map(convert_expr).collect(),
        },
        Expr::Listing(listing) => convert_listing(listing),
        Expr::ListItem(item) => convert_list_item(item),
        Expr::Link(link) => convert_link(link),
        Expr::Image(image) => convert_image(image),
        Expr::Definition(definition) => convert_definition(definition),
        Expr::Table(table) => JsonExpr::Table {
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(convert_cell).collect())
                .collect(),
        },
        Expr::Cell(cell) => convert_cell(cell),
        Expr::HorizontalLine => JsonExpr::HorizontalLine,
    }
}

fn convert_listable(listable: &Listable) -> JsonExpr<'_> {
    match listable {
        Listable::Title(text) => JsonExpr::Title { text },
        Listable::Subtitle(text) => JsonExpr::Subtitle { text },
        Listable::Caption(text) => JsonExpr::Caption { text },
        Listable::Paragraph(text) => JsonExpr::Paragraph { text },
        Listable::Text(text) => JsonExpr::Text { text },
        Listable::Math(formula) => JsonExpr::Math { formula },
        Listable::Grouping(children) => JsonExpr::Grouping {
            children: children.iter().map(convert_expr).collect(),
        },
        Listable::Listing(listing) => convert_listing(listing),
        Listable::Link(link) => convert_link(link),
        Listable::Image(image) => convert_image(image),
        Listable::Definition(definition) => convert_definition(definition),
    }
}

fn convert_listing(listing: &Listing) -> JsonExpr<'_> {
    JsonExpr::Listing {
        ordered: listing.ordered,
        items: listing.items.iter().map(convert_list_item).collect(),
    }
}

fn convert_list_item(item: &ListItem) -> JsonExpr<'_> {
    JsonExpr::ListItem {
        item: Box::new(convert_listable(&item.item)),
    }
}

fn convert_link(link: &Link) -> JsonExpr<'_> {
    JsonExpr::Link {
        href: &link.href,
        text: &link.text,
    }
}

fn convert_image(image: &Image) -> JsonExpr<'_> {
    JsonExpr::Image {
        src: &image.src,
        width: &image.width,
        height: &image.height,
    }
}

fn convert_definition(definition: &Definition) -> JsonExpr<'_> {
    JsonExpr::Definition {
        word: &definition.word,
        definitions: &definition.definitions,
    }
}

fn convert_cell(cell: &Cell) -> JsonExpr<'_> {
    JsonExpr::Cell {
        header: cell.header,
        row_span: cell.row_span,
        col_span: cell.col_span,
        content: Box::new(convert_listable(&cell.content)),
    }
}
