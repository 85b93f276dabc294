//! Python bindings for the NTML compiler.

use ntml_core::{
    compile_with_profile, span::Span as CoreSpan, CompileResult as CoreCompileResult,
    Diagnostic as CoreDiagnostic, Location, Profile as CoreProfile, Scanner,
    Token as CoreToken,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

// ============================================================================
// Span
// ============================================================================

/// Source location in the input text (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

fn profile(strict: bool) -> CoreProfile {
    if strict {
        CoreProfile::Strict
    } else {
        CoreProfile::Ntml
    }
}

// ============================================================================
// Token
// ============================================================================

/// A scanned token.
#[pyclass(frozen, get_all, name = "Token")]
#[derive(Clone)]
pub struct PyToken {
    /// Upper snake case kind name, e.g. `STRING` or `DOUBLE_PIPE`.
    pub kind: String,
    pub lexeme: String,
    pub literal: Option<String>,
    pub line: u32,
    pub span: PySpan,
}

#[pymethods]
impl PyToken {
    fn __repr__(&self) -> String {
        match &self.literal {
            Some(literal) => format!("Token({}, {:?}, {:?})", self.kind, self.lexeme, literal),
            None => format!("Token({}, {:?})", self.kind, self.lexeme),
        }
    }
}

impl From<CoreToken> for PyToken {
    fn from(t: CoreToken) -> Self {
        PyToken {
            kind: t.kind.name().to_string(),
            lexeme: t.lexeme,
            literal: t.literal,
            line: t.line,
            span: t.span.into(),
        }
    }
}

// ============================================================================
// Diagnostic
// ============================================================================

/// A scan or parse diagnostic.
#[pyclass(frozen, name = "Diagnostic")]
#[derive(Clone)]
pub struct PyDiagnostic {
    #[pyo3(get)]
    pub line: u32,
    /// `"at end"`, `"at 'x'"`, or None for line-only reports.
    #[pyo3(get)]
    pub where_: Option<String>,
    /// Snake case kind name, e.g. `missing_token`.
    #[pyo3(get)]
    pub kind: String,
    #[pyo3(get)]
    pub message: String,
    /// Rendered `[line N] Error ...` form.
    rendered: String,
}

#[pymethods]
impl PyDiagnostic {
    fn __repr__(&self) -> String {
        format!("Diagnostic(line={}, {:?})", self.line, self.message)
    }

    fn __str__(&self) -> String {
        self.rendered.clone()
    }
}

impl From<CoreDiagnostic> for PyDiagnostic {
    fn from(d: CoreDiagnostic) -> Self {
        let rendered = d.to_string();
        let where_ = match &d.location {
            Location::Line => None,
            location => Some(location.to_string().trim_start().to_string()),
        };
        PyDiagnostic {
            line: d.line,
            where_,
            kind: d.kind.name().to_string(),
            message: d.message,
            rendered,
        }
    }
}

// ============================================================================
// CompileResult
// ============================================================================

/// Fragments and diagnostics of one compilation.
#[pyclass(frozen, get_all, name = "CompileResult")]
pub struct PyCompileResult {
    pub fragments: Vec<String>,
    pub diagnostics: Vec<PyDiagnostic>,
}

#[pymethods]
impl PyCompileResult {
    #[getter]
    fn ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "CompileResult(ok={}, fragments={}, diagnostics={})",
            self.diagnostics.is_empty(),
            self.fragments.len(),
            self.diagnostics.len()
        )
    }
}

impl From<CoreCompileResult> for PyCompileResult {
    fn from(r: CoreCompileResult) -> Self {
        PyCompileResult {
            fragments: r.fragments,
            diagnostics: r.diagnostics.into_iter().map(PyDiagnostic::from).collect(),
        }
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Compile an NTML string into HTML fragments.
///
/// Args:
///     source: Document string to compile
///     strict: Escape `<`/`>` as `&lt;`/`&gt;` (default: False)
///
/// Returns:
///     list[str]: Fragments in document order
///
/// Raises:
///     ValueError: If any diagnostic was reported, one per line
#[pyfunction]
#[pyo3(signature = (source, strict=false), text_signature = "(source, strict=False)")]
fn compile(source: &str, strict: bool) -> PyResult<Vec<String>> {
    compile_with_profile(source, profile(strict))
        .into_result()
        .map_err(|diagnostics| {
            let lines: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
            PyValueError::new_err(lines.join("\n"))
        })
}

/// Compile and return fragments together with diagnostics. Never raises.
///
/// Args:
///     source: Document string
///     strict: Escape `<`/`>` as `&lt;`/`&gt;` (default: False)
///
/// Returns:
///     CompileResult: Fragments (empty on error) and diagnostics
#[pyfunction]
#[pyo3(signature = (source, strict=false), text_signature = "(source, strict=False)")]
fn compile_with_diagnostics(source: &str, strict: bool) -> PyCompileResult {
    compile_with_profile(source, profile(strict)).into()
}

/// Scan an NTML string into tokens, ending with an `EOF` token.
///
/// Lexical diagnostics are not reported here; use `compile_with_diagnostics`.
#[pyfunction]
#[pyo3(signature = (source, strict=false), text_signature = "(source, strict=False)")]
fn scan(source: &str, strict: bool) -> Vec<PyToken> {
    Scanner::with_profile(source, profile(strict))
        .scan()
        .tokens
        .into_iter()
        .map(PyToken::from)
        .collect()
}

// ============================================================================
// Module
// ============================================================================

/// NTML - Punctuation markup to HTML compiler.
#[pymodule]
fn pyntml(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyToken>()?;
    m.add_class::<PyDiagnostic>()?;
    m.add_class::<PyCompileResult>()?;
    m.add_function(wrap_pyfunction!(compile, m)?)?;
    m.add_function(wrap_pyfunction!(compile_with_diagnostics, m)?)?;
    m.add_function(wrap_pyfunction!(scan, m)?)?;
    Ok(())
}
