//! Translation of the AST into HTML fragments.
//!
//! Each node maps to a fixed template. Opening tags, text runs and closing
//! tags are separate fragments so a formatter can re-indent them; nothing
//! here indents or joins.

use crate::ast::{Cell, Definition, Expr, Image, Link, ListItem, Listable, Listing, Table};

/// Translate a sequence of top-level expressions.
pub fn translate(exprs: &[Expr]) -> Vec<String> {
    let mut translator = Translator::new();
    for expr in exprs {
        translator.visit(expr);
    }
    translator.finish()
}

/// Structural visitor accumulating fragments.
#[derive(Debug, Default)]
pub struct Translator {
    fragments: Vec<String>,
}

impl Translator {
    pub fn new() -> Self {
        Self {
            fragments: Vec::with_capacity(64),
        }
    }

    /// Fragments emitted so far.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Consume the translator, returning its fragments.
    pub fn finish(self) -> Vec<String> {
        self.fragments
    }

    /// Translate one node, appending its fragments.
    pub fn visit(&mut self, expr: &Expr) {
        match expr {
            Expr::Title(text) => self.heading(1, text),
            Expr::Subtitle(text) => self.heading(2, text),
            Expr::Caption(text) => self.heading(3, text),
            Expr::Paragraph(text) => self.paragraph(text),
            Expr::Text(text) => self.text(text),
            Expr::Math(math) => self.math(math),
            Expr::Code(code) => self.code(code),
            Expr::Block(children) => {
                self.push("<div>");
                self.children(children);
                self.push("</div>");
            }
            Expr::Grouping(children) => self.children(children),
            Expr::Listing(listing) => self.listing(listing),
            Expr::ListItem(item) => self.list_item(item),
            Expr::Link(link) => self.link(link),
            Expr::Image(image) => self.image(image),
            Expr::Definition(definition) => self.definition(definition),
            Expr::Table(table) => self.table(table),
            Expr::Cell(cell) => self.cell(cell),
            Expr::HorizontalLine => self.push("<hr>"),
        }
    }

    /// Translate the payload of a list item or cell.
    pub fn visit_listable(&mut self, listable: &Listable) {
        match listable {
            Listable::Title(text) => self.heading(1, text),
            Listable::Subtitle(text) => self.heading(2, text),
            Listable::Caption(text) => self.heading(3, text),
            Listable::Paragraph(text) => self.paragraph(text),
            Listable::Text(text) => self.text(text),
            Listable::Math(math) => self.math(math),
            Listable::Grouping(children) => self.children(children),
            Listable::Listing(listing) => self.listing(listing),
            Listable::Link(link) => self.link(link),
            Listable::Image(image) => self.image(image),
            Listable::Definition(definition) => self.definition(definition),
        }
    }

    fn children(&mut self, children: &[Expr]) {
        for child in children {
            self.visit(child);
        }
    }

    fn heading(&mut self, level: u8, text: &str) {
        self.push(format!("<h{}>", level));
        self.text(text);
        self.push(format!("</h{}>", level));
    }

    fn paragraph(&mut self, text: &str) {
        self.push("<p>");
        self.text(text);
        self.push("</p>");
    }

    fn math(&mut self, math: &str) {
        self.push("<div class=\"math\">");
        self.push(format!("$${}$$", math));
        self.push("</div>");
    }

    fn code(&mut self, code: &str) {
        self.push("<div class=\"code\">");
        self.push(format!("<pre>{}</pre>", code));
        self.push("</div>");
    }

    fn listing(&mut self, listing: &Listing) {
        let (open, close) = if listing.ordered {
            ("<ol>", "</ol>")
        } else {
            ("<ul>", "</ul>")
        };
        self.push(open);
        for item in &listing.items {
            self.list_item(item);
        }
        self.push(close);
    }

    fn list_item(&mut self, item: &ListItem) {
        self.push("<li>");
        self.visit_listable(&item.item);
        self.push("</li>");
    }

    fn link(&mut self, link: &Link) {
        self.push(format!(
            "<p><a href=\"{}\" target=\"_blank\">",
            link.href
        ));
        self.text(&link.text);
        self.push("</a></p>");
    }

    fn image(&mut self, image: &Image) {
        self.push(format!(
            "<img src=\"{}\" width=\"{}\" height=\"{}\">",
            image.src, image.width, image.height
        ));
        self.push("<br>");
    }

    fn definition(&mut self, definition: &Definition) {
        self.push("<dl>");
        self.push("<dt>");
        self.text(&definition.word);
        self.push("</dt>");
        for meaning in &definition.definitions {
            self.push("<dd>");
            self.text(meaning);
            self.push("</dd>");
        }
        self.push("</dl>");
    }

    fn table(&mut self, table: &Table) {
        self.push("<table>");
        for row in &table.rows {
            self.push("<tr>");
            for cell in row {
                self.cell(cell);
            }
            self.push("</tr>");
        }
        self.push("</table>");
    }

    /// Span attributes appear only above 1. The tag keeps its historical
    /// layout: `<td >`, `<th rowspan="2">`, `<td  colspan="3">`.
    fn cell(&mut self, cell: &Cell) {
        let (mut open, close) = if cell.header {
            (String::from("<th "), "</th>")
        } else {
            (String::from("<td "), "</td>")
        };
        if cell.row_span > 1 {
            open.push_str(&format!("rowspan=\"{}\"", cell.row_span));
        }
        if cell.col_span > 1 {
            open.push_str(&format!(" colspan=\"{}\"", cell.col_span));
        }
        open.push('>');

        self.push(open);
        self.visit_listable(&cell.content);
        self.push(close);
    }

    /// Text runs; empty literals emit no fragment.
    fn text(&mut self, text: &str) {
        if !text.is_empty() {
            self.push(text);
        }
    }

    #[inline]
    fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }
}
