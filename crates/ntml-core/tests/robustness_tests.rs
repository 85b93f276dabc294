use ntml_core::parser::MAX_DEPTH;
use ntml_core::{compile, parse, scan, DiagnosticKind, Expr, Listable};
use pulldown_cmark::{Event, Options, Parser as MdParser, Tag, TagEnd};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counts {
    headings: u32,
    paragraphs: u32,
    lists: u32,
    list_items: u32,
    tables: u32,
    code_blocks: u32,
}

impl Counts {
    fn total(self) -> u32 {
        self.headings
            + self.paragraphs
            + self.lists
            + self.list_items
            + self.tables
            + self.code_blocks
    }

    fn diff(self, other: Counts) -> u32 {
        self.headings.abs_diff(other.headings)
            + self.paragraphs.abs_diff(other.paragraphs)
            + self.lists.abs_diff(other.lists)
            + self.list_items.abs_diff(other.list_items)
            + self.tables.abs_diff(other.tables)
            + self.code_blocks.abs_diff(other.code_blocks)
    }
}

fn count_exprs(exprs: &[Expr], counts: &mut Counts) {
    for expr in exprs {
        match expr {
            Expr::Title(_) | Expr::Subtitle(_) | Expr::Caption(_) => counts.headings += 1,
            Expr::Paragraph(_) => counts.paragraphs += 1,
            Expr::Code(_) => counts.code_blocks += 1,
            Expr::Table(_) => counts.tables += 1,
            Expr::Listing(listing) => {
                counts.lists += 1;
                counts.list_items += listing.items.len() as u32;
                for item in &listing.items {
                    if let Listable::Listing(_) | Listable::Grouping(_) = item.item.as_ref() {
                        count_exprs(&[Expr::from(item.item.as_ref().clone())], counts);
                    }
                }
            }
            Expr::Block(children) | Expr::Grouping(children) => count_exprs(children, counts),
            _ => {}
        }
    }
}

/// Count constructs that survive recovery, scanner diagnostics included.
fn count_ntml(input: &str) -> Counts {
    let result = parse(scan(input).tokens);
    let mut counts = Counts::default();
    count_exprs(&result.exprs, &mut counts);
    counts
}

fn count_markdown(input: &str) -> Counts {
    let mut counts = Counts::default();
    let parser = MdParser::new_ext(input, Options::all());
    let mut list_depth = 0u32;
    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { .. } => counts.headings += 1,
                Tag::Paragraph => {
                    if list_depth == 0 {
                        counts.paragraphs += 1;
                    }
                }
                Tag::List(_) => {
                    counts.lists += 1;
                    list_depth += 1;
                }
                Tag::Item => counts.list_items += 1,
                Tag::Table(_) => counts.tables += 1,
                Tag::CodeBlock(_) => counts.code_blocks += 1,
                _ => {}
            },
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
            }
            _ => {}
        }
    }
    counts
}

fn accuracy(counts: Counts, expected: Counts) -> f64 {
    let total = expected.total();
    if total == 0 {
        return 1.0;
    }
    let diff = counts.diff(expected);
    let score = (total as f64 - diff as f64) / total as f64;
    score.max(0.0)
}

type MutationList = &'static [&'static str];

const SEED: u64 = 0x5eed;
const MAX_MUTATION_STEPS: usize = 3;
const VARIANT_COUNT: usize = 16;

const NTML_MUTATIONS: MutationList = &[
    "drop_block_close",
    "drop_list_close",
    "drop_table_close",
    "drop_link_close",
    "drop_quote",
    "drop_code_fence_end",
    "stray_character",
    "truncate_tail_small",
    "whitespace_noise",
];

const MARKDOWN_MUTATIONS: MutationList = &[
    "drop_code_fence_end",
    "drop_table_bar",
    "strip_list_dash",
    "truncate_tail_small",
];

const NTML_BASE: &str = r#"
#"Title"
>"Paragraph text."
[+"One" +"Two"]
§fn main() {}§
{ ##"Section" >"Body" ((("https://example.com"|"Example"))) }
||
|-!"A"!"B"
|-|"1"|"2"
||
"#;

const MARKDOWN_BASE: &str = r#"
# Title

Paragraph text.

- One
- Two

```rust
fn main() {}
```

## Section

Body [Example](https://example.com)

| A | B |
|---|---|
| 1 | 2 |
"#;

const EXPECTED: Counts = Counts {
    headings: 2,
    paragraphs: 2,
    lists: 1,
    list_items: 2,
    tables: 1,
    code_blocks: 1,
};

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn choose(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }
}

/// Truncate to at most `len` bytes without splitting a character.
fn truncate_on_boundary(input: &mut String, mut len: usize) {
    while len > 0 && !input.is_char_boundary(len) {
        len -= 1;
    }
    input.truncate(len);
}

fn apply_mutations(mut input: String, mutations: MutationList, rng: &mut Lcg) -> String {
    let steps = std::cmp::min(MAX_MUTATION_STEPS, mutations.len());
    for _ in 0..steps {
        let pick = rng.choose(mutations.len());
        match mutations[pick] {
            "drop_block_close" => {
                if let Some(pos) = input.rfind('}') {
                    input.remove(pos);
                }
            }
            "drop_list_close" => {
                if let Some(pos) = input.find("\"]") {
                    input.remove(pos + 1);
                }
            }
            "drop_table_close" => {
                if let Some(pos) = input.rfind("||") {
                    input.replace_range(pos..pos + 2, "");
                }
            }
            "drop_link_close" => {
                if let Some(pos) = input.find("))") {
                    input.replace_range(pos..pos + 2, "");
                }
            }
            "drop_quote" => {
                let quotes: Vec<usize> = input.match_indices('"').map(|(i, _)| i).collect();
                if !quotes.is_empty() {
                    input.remove(quotes[rng.choose(quotes.len())]);
                }
            }
            "drop_code_fence_end" => {
                if let Some(pos) = input.rfind("§\n") {
                    input.replace_range(pos..pos + '§'.len_utf8(), "");
                } else if let Some(pos) = input.rfind("```\n") {
                    input.replace_range(pos..pos + 4, "");
                }
            }
            "stray_character" => {
                let mut pos = rng.choose(input.len());
                while !input.is_char_boundary(pos) {
                    pos -= 1;
                }
                input.insert(pos, '@');
            }
            "drop_table_bar" => {
                if let Some(pos) = input.find("|---|---|") {
                    input.replace_range(pos..pos + 9, "---");
                }
            }
            "strip_list_dash" => {
                if let Some(pos) = input.find("- ") {
                    input.replace_range(pos..pos + 2, "");
                }
            }
            "truncate_tail_small" => {
                let len = input.len();
                if len > 16 {
                    let cut = rng.choose(len / 20).max(1);
                    truncate_on_boundary(&mut input, len - cut);
                }
            }
            "whitespace_noise" => {
                input = input.replace(" ", "  ");
                input = input.replace('\n', "\n\n");
            }
            _ => {}
        }
    }
    input
}

fn generate_variants(input: &str, mutations: MutationList) -> Vec<String> {
    let mut rng = Lcg::new(SEED);
    (0..VARIANT_COUNT)
        .map(|_| apply_mutations(input.to_string(), mutations, &mut rng))
        .collect()
}

// ============================================================================
// Recovery Invariants
// ============================================================================

#[test]
fn test_clean_document_counts() {
    assert_eq!(count_ntml(NTML_BASE), EXPECTED);
    assert!(compile(NTML_BASE).is_ok());
}

#[test]
fn test_mutated_documents_never_emit_partial_output() {
    for variant in generate_variants(NTML_BASE, NTML_MUTATIONS) {
        let result = compile(&variant);
        if !result.is_ok() {
            assert!(result.fragments.is_empty(), "partial output for {:?}", variant);
        }
        let again = compile(&variant);
        assert_eq!(result.fragments, again.fragments);
        assert_eq!(result.diagnostics, again.diagnostics);
    }
}

#[test]
fn test_single_broken_construct_keeps_siblings() {
    let broken = NTML_BASE.replacen("[+\"One\" +\"Two\"]", "[+\"One\" +\"Two\"", 1);
    let counts = count_ntml(&broken);
    assert_eq!(counts.headings, EXPECTED.headings);
    assert_eq!(counts.tables, EXPECTED.tables);
    assert_eq!(counts.code_blocks, EXPECTED.code_blocks);
    assert!(!compile(&broken).is_ok());
}

#[test]
fn test_arbitrary_bytes_terminate() {
    let mut rng = Lcg::new(SEED);
    let alphabet: Vec<char> = "+;*!<>:_-\\|()[]{}#/ \n\t\"$§abc@".chars().collect();
    for _ in 0..64 {
        let len = rng.choose(64);
        let source: String = (0..len)
            .map(|_| alphabet[rng.choose(alphabet.len())])
            .collect();
        let result = compile(&source);
        assert!(result.is_ok() || result.fragments.is_empty());
    }
}

#[test]
fn test_deep_nesting_reports_instead_of_overflowing() {
    let depth = 200_000;
    for (open, close) in [("{", "}"), ("[+", "]")] {
        let source = format!("{}\"x\"{}", open.repeat(depth), close.repeat(depth));
        let result = compile(&source);
        assert!(result.fragments.is_empty());
        assert_eq!(result.diagnostics.len(), 1, "for {:?}", open);
        assert_eq!(
            result.diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::TooDeep
        );
    }
}

#[test]
fn test_nesting_below_limit_translates() {
    let depth = MAX_DEPTH - 1;
    let source = format!("{}\"x\"{}", "{".repeat(depth), "}".repeat(depth));
    let result = compile(&source);
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    assert_eq!(result.fragments.len(), 2 * depth + 1);
    assert_eq!(result.fragments[depth], "x");
}

// ============================================================================
// Robustness Report
// ============================================================================

#[test]
fn robustness_report() {
    let ntml_variants = generate_variants(NTML_BASE, NTML_MUTATIONS);
    let markdown_variants = generate_variants(MARKDOWN_BASE, MARKDOWN_MUTATIONS);

    println!("\nRobustness Report");
    println!("Seed\t0x{:x}", SEED);
    println!("format\tavg\tmin\tmax\tclean");

    let mut sum = 0.0;
    let mut min: f64 = 1.0;
    let mut max: f64 = 0.0;
    let mut clean = 0u32;
    for variant in &ntml_variants {
        let acc = accuracy(count_ntml(variant), EXPECTED);
        sum += acc;
        min = min.min(acc);
        max = max.max(acc);
        if compile(variant).is_ok() {
            clean += 1;
        }
    }
    println!(
        "ntml\t{:.2}\t{:.2}\t{:.2}\t{}/{}",
        sum / ntml_variants.len() as f64,
        min,
        max,
        clean,
        ntml_variants.len()
    );

    let markdown: Vec<f64> = markdown_variants
        .iter()
        .map(|variant| accuracy(count_markdown(variant), EXPECTED))
        .collect();
    println!(
        "markdown\t{:.2}\t{:.2}\t{:.2}\t-",
        markdown.iter().sum::<f64>() / markdown.len() as f64,
        markdown.iter().cloned().fold(1.0, f64::min),
        markdown.iter().cloned().fold(0.0, f64::max)
    );
    let _ = io::stdout().flush();

    assert_eq!(accuracy(count_markdown(MARKDOWN_BASE), EXPECTED), 1.0);
}
