//! Abstract Syntax Tree types for markup documents.
//!
//! The AST is designed to be:
//!
//! - **Closed**: [`Expr`] is one enum, so every consumer matches exhaustively
//! - **Tree-shaped**: parents own their children by value, with no back references
//! - **Capability-typed**: list items and table cells hold a [`Listable`],
//!   a narrower enum that only admits the kinds legal in those positions

use std::fmt;

/// Default image width and height.
pub const DEFAULT_IMAGE_SIZE: &str = "100%";

/// A document construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// First-level heading.
    Title(String),
    /// Second-level heading.
    Subtitle(String),
    /// Third-level heading.
    Caption(String),
    /// Paragraph of text.
    Paragraph(String),
    /// Bare text run.
    Text(String),
    /// Display-mode formula.
    Math(String),
    /// Preformatted code, already entity-escaped.
    Code(String),
    /// Generic container rendered inside a `<div>`.
    Block(Vec<Expr>),
    /// Transparent container; children render in sequence with no wrapper.
    Grouping(Vec<Expr>),
    /// Ordered or unordered list.
    Listing(Listing),
    /// One entry of a listing.
    ListItem(ListItem),
    /// Hyperlink opening in a new tab.
    Link(Link),
    /// Inline image.
    Image(Image),
    /// A word followed by its definitions.
    Definition(Definition),
    /// Table of header and data cells.
    Table(Table),
    /// One table cell.
    Cell(Cell),
    /// Horizontal rule.
    HorizontalLine,
}

impl Expr {
    /// Short kind name, used in diagnostics and dumps.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Expr::Title(_) => "Title",
            Expr::Subtitle(_) => "Subtitle",
            Expr::Caption(_) => "Caption",
            Expr::Paragraph(_) => "Paragraph",
            Expr::Text(_) => "Text",
            Expr::Math(_) => "Math",
            Expr::Code(_) => "Code",
            Expr::Block(_) => "Block",
            Expr::Grouping(_) => "Grouping",
            Expr::Listing(_) => "Listing",
            Expr::ListItem(_) => "ListItem",
            Expr::Link(_) => "Link",
            Expr::Image(_) => "Image",
            Expr::Definition(_) => "Definition",
            Expr::Table(_) => "Table",
            Expr::Cell(_) => "Cell",
            Expr::HorizontalLine => "HorizontalLine",
        }
    }
}

/// The subset of [`Expr`] legal inside list items and table cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listable {
    Text(String),
    Math(String),
    Image(Image),
    Link(Link),
    Title(String),
    Subtitle(String),
    Caption(String),
    Paragraph(String),
    Listing(Listing),
    Definition(Definition),
    Grouping(Vec<Expr>),
}

/// Returned when a node is not [`Listable`]; hands the node back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotListable(pub Expr);

impl fmt::Display for NotListable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not listable", self.0.kind_name())
    }
}

impl std::error::Error for NotListable {}

impl TryFrom<Expr> for Listable {
    type Error = NotListable;

    fn try_from(expr: Expr) -> Result<Self, Self::Error> {
        Ok(match expr {
            Expr::Text(text) => Listable::Text(text),
            Expr::Math(math) => Listable::Math(math),
            Expr::Image(image) => Listable::Image(image),
            Expr::Link(link) => Listable::Link(link),
            Expr::Title(text) => Listable::Title(text),
            Expr::Subtitle(text) => Listable::Subtitle(text),
            Expr::Caption(text) => Listable::Caption(text),
            Expr::Paragraph(text) => Listable::Paragraph(text),
            Expr::Listing(listing) => Listable::Listing(listing),
            Expr::Definition(definition) => Listable::Definition(definition),
            Expr::Grouping(children) => Listable::Grouping(children),
            other => return Err(NotListable(other)),
        })
    }
}

impl From<Listable> for Expr {
    fn from(listable: Listable) -> Self {
        match listable {
            Listable::Text(text) => Expr::Text(text),
            Listable::Math(math) => Expr::Math(math),
            Listable::Image(image) => Expr::Image(image),
            Listable::Link(link) => Expr::Link(link),
            Listable::Title(text) => Expr::Title(text),
            Listable::Subtitle(text) => Expr::Subtitle(text),
            Listable::Caption(text) => Expr::Caption(text),
            Listable::Paragraph(text) => Expr::Paragraph(text),
            Listable::Listing(listing) => Expr::Listing(listing),
            Listable::Definition(definition) => Expr::Definition(definition),
            Listable::Grouping(children) => Expr::Grouping(children),
        }
    }
}

/// A listing; all items share one orderedness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// `*` opened the listing (`<ol>`) rather than `+` (`<ul>`).
    pub ordered: bool,
    /// Items in source order.
    pub items: Vec<ListItem>,
}

/// A listing entry wrapping exactly one listable node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub item: Box<Listable>,
}

impl ListItem {
    pub fn new(item: Listable) -> Self {
        Self {
            item: Box::new(item),
        }
    }
}

/// Hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link destination.
    pub href: String,
    /// Displayed text; the href itself when none was given.
    pub text: String,
}

impl Link {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }

    /// A link displaying its own destination.
    pub fn bare(href: impl Into<String>) -> Self {
        let href = href.into();
        Self {
            text: href.clone(),
            href,
        }
    }
}

/// Image with literal width and height attributes.
///
/// Width and height are either both given or both [`DEFAULT_IMAGE_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: String,
    pub width: String,
    pub height: String,
}

impl Image {
    pub fn new(src: impl Into<String>, width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: width.into(),
            height: height.into(),
        }
    }

    /// An image at the default size.
    pub fn with_default_size(src: impl Into<String>) -> Self {
        Self::new(src, DEFAULT_IMAGE_SIZE, DEFAULT_IMAGE_SIZE)
    }
}

/// Definition list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub word: String,
    pub definitions: Vec<String>,
}

/// Table rows, each a flat sequence of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

/// Table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Rendered as `<th>` rather than `<td>`.
    pub header: bool,
    /// Rows spanned, at least 1.
    pub row_span: u32,
    /// Columns spanned, at least 1.
    pub col_span: u32,
    pub content: Box<Listable>,
}

impl Cell {
    /// A cell spanning one row and one column.
    pub fn new(header: bool, content: Listable) -> Self {
        Self::spanning(header, 1, 1, content)
    }

    /// A cell with explicit spans; spans below 1 are raised to 1.
    pub fn spanning(header: bool, row_span: u32, col_span: u32, content: Listable) -> Self {
        Self {
            header,
            row_span: row_span.max(1),
            col_span: col_span.max(1),
            content: Box::new(content),
        }
    }
}
