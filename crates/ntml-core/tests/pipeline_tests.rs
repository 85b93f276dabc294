//! End-to-end tests for scan, parse and translate

use ntml_core::{compile, compile_with_profile, scan, DiagnosticKind, Profile, TokenKind};

fn fragments(source: &str) -> Vec<String> {
    let result = compile(source);
    assert!(result.is_ok(), "compile failed: {:?}", result.diagnostics);
    result.fragments
}

/// Opening and closing tags of each construct balance.
fn assert_balanced(fragments: &[String]) {
    let mut open: Vec<String> = Vec::new();
    for fragment in fragments {
        for tag in fragment.split('<').skip(1) {
            let name: String = tag
                .trim_start_matches('/')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if matches!(name.as_str(), "img" | "br" | "hr") {
                continue;
            }
            if tag.starts_with('/') {
                assert_eq!(open.pop().as_deref(), Some(name.as_str()), "in {:?}", fragments);
            } else {
                open.push(name);
            }
        }
    }
    assert!(open.is_empty(), "unclosed {:?} in {:?}", open, fragments);
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_title() {
    assert_eq!(fragments("#\"Hello\""), vec!["<h1>", "Hello", "</h1>"]);
}

#[test]
fn test_definition() {
    assert_eq!(
        fragments(";\"Cat\"+\"Animal\"+\"Pet\""),
        vec![
            "<dl>", "<dt>", "Cat", "</dt>", "<dd>", "Animal", "</dd>", "<dd>", "Pet", "</dd>",
            "</dl>"
        ]
    );
}

#[test]
fn test_link_in_grouping() {
    assert_eq!(
        fragments("(((\"https://x.com\"|\"X\")))"),
        vec![
            "<p><a href=\"https://x.com\" target=\"_blank\">",
            "X",
            "</a></p>"
        ]
    );
}

#[test]
fn test_unordered_listing() {
    assert_eq!(
        fragments("[+\"a\"+\"b\"]"),
        vec!["<ul>", "<li>", "a", "</li>", "<li>", "b", "</li>", "</ul>"]
    );
}

#[test]
fn test_table_header_row_span() {
    let out = fragments("||\n|-!\"H\"_|\"A\"\n||");
    let th = out.iter().position(|f| f == "<th rowspan=\"2\">").unwrap();
    assert_eq!(out[th + 1], "H");
    assert_eq!(out[th + 2], "</th>");
    assert_eq!(out[th + 3], "<td >");
    assert_eq!(out[th + 4], "A");
}

#[test]
fn test_unterminated_math() {
    let source = "{ $x^2 }";
    let scanned = scan(source);
    assert!(!scanned
        .tokens
        .iter()
        .any(|token| token.kind == TokenKind::Math));

    let result = compile(source);
    assert!(!result.is_ok());
    assert!(result.fragments.is_empty());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnterminatedMath));
    // The block loses its closing brace to the literal.
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message == "Expect '}' after block."));
}

// ============================================================================
// Property Tests
// ============================================================================

const DOCUMENT: &str = r#"
// A document using every construct.
#"Title" ##"Subtitle" ###"Caption"
>"A paragraph."
{ >"Inside a block." (("https://a.org"|"A")) }
("grouped" "text")
[* "one" * [+ >"nested"] * ;"Word"+"Meaning"]
--
[["img.png"|"50%";"20%"]] [["plain.png"]]
§fn main() {}§
$e^{i\pi} + 1 = 0$
||
|-!"Name"!>"Value"
|-|"a"|"1"|"2"
||
"#;

#[test]
fn test_well_formed_document_is_balanced() {
    let out = fragments(DOCUMENT);
    assert!(out.iter().all(|fragment| !fragment.is_empty()));
    assert_balanced(&out);
}

#[test]
fn test_every_construct_balances_alone() {
    for source in [
        "#\"a\"",
        ">\"a\"",
        "{\"a\"}",
        "[*\"a\"]",
        ";\"a\"+\"b\"",
        "((\"u\"))",
        "[[\"s\"]]",
        "§c§",
        "$m$",
        "|| |-!\"h\"|>\"d\" ||",
    ] {
        assert_balanced(&fragments(source));
    }
}

#[test]
fn test_angles_are_escaped() {
    assert_eq!(fragments(">\"a<b>c\"")[1], "a&ltb&gtc");
    assert_eq!(fragments("§<div>§")[1], "<pre>&ltdiv&gt</pre>");
}

#[test]
fn test_strict_profile_escaping() {
    let result = compile_with_profile(">\"<x>\"", Profile::Strict);
    assert_eq!(result.fragments[1], "&lt;x&gt;");
}

#[test]
fn test_escaped_quote_decodes() {
    assert_eq!(fragments(r#""say \"hi\"""#), vec!["say \"hi\""]);
}

#[test]
fn test_compilation_is_idempotent() {
    let first = compile(DOCUMENT);
    let second = compile(DOCUMENT);
    assert_eq!(first.fragments, second.fragments);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_default_sizes_and_spans() {
    let out = fragments("[[\"a.png\"]] || |-|\"x\" ||");
    assert!(out.contains(&"<img src=\"a.png\" width=\"100%\" height=\"100%\">".to_string()));
    assert!(out.iter().all(|f| !f.contains("rowspan") && !f.contains("colspan")));
}

#[test]
fn test_listing_orderedness() {
    let ordered = fragments("[*\"a\"]");
    assert_eq!(ordered.first().map(String::as_str), Some("<ol>"));
    assert_eq!(ordered.last().map(String::as_str), Some("</ol>"));

    let unordered = fragments("[+\"a\"]");
    assert_eq!(unordered.first().map(String::as_str), Some("<ul>"));
    assert_eq!(unordered.last().map(String::as_str), Some("</ul>"));

    let mixed = compile("[*\"a\" +\"b\"]");
    assert!(!mixed.is_ok());
}

// ============================================================================
// Error Flag Tests
// ============================================================================

#[test]
fn test_any_diagnostic_suppresses_translation() {
    let result = compile("#\"fine\" @");
    assert!(result.fragments.is_empty());
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.into_result().is_err());
}

#[test]
fn test_scan_and_parse_diagnostics_are_both_kept() {
    let result = compile("@\n#");
    let kinds: Vec<DiagnosticKind> = result.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnexpectedCharacter, DiagnosticKind::MissingToken]
    );
    let lines: Vec<u32> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2]);
}

#[test]
fn test_clean_compile_into_result() {
    let fragments = compile("--").into_result().unwrap();
    assert_eq!(fragments, vec!["<hr>"]);
}

#[test]
fn test_empty_document() {
    let result = compile("");
    assert!(result.is_ok());
    assert!(result.fragments.is_empty());
}
