//! diagnostics.rs — Diagnostic structuré à la frontière outillage.
//!
//! Une compilation échouée produit **exactement un** diagnostic : catégorie
//! stable (`kind`), message lisible, position 1-based. La feature `serde`
//! le rend sérialisable (sortie `--json` côté CLI).

use std::fmt;

use crate::pipeline::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity { Error, Warning, Info }

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    pub severity: Severity,
    /// Étiquette stable : `lex-error`, `parse-error`, `unknown-function`, …
    pub kind: &'static str,
    /// Message sans position (la position est portée par `line`/`col`).
    pub message: String,
    pub line: u32,
    pub col: u32,
}

impl Diagnostic {
    pub fn error(kind: &'static str, message: impl Into<String>, line: u32, col: u32) -> Self {
        Self { severity: Severity::Error, kind, message: message.into(), line, col }
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(e: &CompileError) -> Self {
        let pos = e.span().start;
        let message = match e {
            CompileError::Lex(le) => le.msg.clone(),
            CompileError::Parse(pe) => format!("attendu {}, trouvé {}", pe.expected, pe.found),
            CompileError::Sema(se) => se.kind.to_string(),
        };
        Diagnostic::error(e.kind_str(), message, pos.line, pos.col)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(
            f, "{sev}[{}]: {} (line {}, col {})",
            self.kind, self.message, self.line, self.col
        )
    }
}

/* ───────────────────────── Tests ───────────────────────── */
