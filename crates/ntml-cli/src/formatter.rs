//! HTML document assembly.
//!
//! Wraps translated fragments in a page skeleton and indents the result by
//! a tag-shape heuristic: one element per line, one tab per level.

use once_cell::sync::Lazy;
use regex::Regex;

const POLYFILL_SCRIPT: &str =
    "<script src=\"https://polyfill.io/v3/polyfill.min.js?features=es6\"></script>";
const MATHJAX_SCRIPT: &str = "<script id=\"MathJax-script\" async src=\"https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js\"></script>";

pub const DEFAULT_TITLE: &str = "Output";

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<[^/][^>]*>$").unwrap());
static CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^</[^>]*>$").unwrap());
static NO_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:<link.*>|<img.*>|<script.*|<br>|<hr>)$").unwrap());

/// Page writer holding the stylesheet and title.
#[derive(Debug, Clone)]
pub struct Formatter {
    stylesheet: String,
    title: String,
}

impl Formatter {
    pub fn new(stylesheet: impl Into<String>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// The full element sequence: skeleton around `fragments`.
    pub fn elements<'a>(&'a self, fragments: &'a [String]) -> Vec<&'a str> {
        let mut elements = Vec::with_capacity(fragments.len() + 24);
        elements.extend(["<html>", "<head>", "<style>"]);
        elements.extend(self.stylesheet.lines());
        elements.extend(["</style>", "<title>", self.title.as_str(), "</title>", "</head>"]);
        elements.extend(["<body>", "<div class=\"main\">", POLYFILL_SCRIPT, MATHJAX_SCRIPT]);
        elements.extend(fragments.iter().map(String::as_str));
        elements.extend(["</div>", "</body>", "</html>"]);
        elements
    }

    /// Render the indented page.
    pub fn render(&self, fragments: &[String]) -> String {
        let elements = self.elements(fragments);
        let mut out = String::with_capacity(elements.iter().map(|e| e.len() + 4).sum());
        let mut depth = 0usize;

        for (i, element) in elements.iter().enumerate() {
            for _ in 0..depth {
                out.push('\t');
            }
            out.push_str(element);

            let Some(next) = elements.get(i + 1) else {
                break;
            };
            out.push('\n');

            if NO_INDENT.is_match(element) {
                continue;
            }
            let opens = OPEN_TAG.is_match(element);
            let next_closes = CLOSE_TAG.is_match(next);
            if opens && !next_closes {
                depth += 1;
            } else if next_closes && !opens {
                depth = depth.saturating_sub(1);
            }
        }

        out
    }
}
