//! pipeline.rs — Orchestrateur de compilation JibJab → C.
//!
//! Enchaîne les étages : lex → parse → sema → codegen → emit. Chaque étage
//! consomme entièrement son entrée avant le suivant ; la première faute
//! détectée remonte telle quelle et aucune sortie partielle n'est produite.
//! Un `Compiler` ne possède que des données inertes : des compilations
//! indépendantes peuvent tourner en parallèle sans verrou.

use log::debug;
use thiserror::Error;

use jibjab_ast::{Program, Span};

use crate::codegen;
use crate::emit::{self, EmitOptions};
use crate::lexer::{self, LexError};
use crate::parser::{self, ParseError};
use crate::sema::{self, SemanticError};

/* ───────────────────────── Erreur de compilation ───────────────────────── */

/// Taxonomie d'erreurs du pipeline ; toutes terminales.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("lex: {0}")]
    Lex(#[from] LexError),
    #[error("parse: {0}")]
    Parse(#[from] ParseError),
    #[error("sema: {0}")]
    Sema(#[from] SemanticError),
}

impl CompileError {
    /// Étiquette stable de la catégorie (diagnostics machine).
    pub fn kind_str(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "lex-error",
            CompileError::Parse(_) => "parse-error",
            CompileError::Sema(e) => e.kind_str(),
        }
    }

    /// Span source de la faute.
    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(e) => e.span,
            CompileError::Parse(e) => e.span,
            CompileError::Sema(e) => e.span,
        }
    }
}

/* ───────────────────────── Orchestrateur ───────────────────────── */

/// Orchestrateur principal.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    opts: EmitOptions,
}

impl Compiler {
    pub fn new(opts: EmitOptions) -> Self {
        Self { opts }
    }

    /// Compile une source complète en texte C.
    pub fn compile_str(&self, src: &str) -> Result<String, CompileError> {
        let prog = self.parse_str(src)?;
        sema::check(&prog)?;
        let unit = codegen::lower(&prog);
        debug!(
            "codegen: {} fonction(s), main: {}",
            unit.funcs.len(),
            unit.main_body.is_some()
        );
        Ok(emit::emit(&unit, &self.opts))
    }

    /// Lexe et parse seulement (outillage : dump d'AST).
    pub fn parse_str(&self, src: &str) -> Result<Program, CompileError> {
        let toks = lexer::tokenize(src)?;
        debug!("lex: {} token(s)", toks.len());
        let prog = parser::parse(toks)?;
        debug!("parse: {} item(s)", prog.items.len());
        Ok(prog)
    }

    /// Valide sans émettre (sous-commande `check`).
    pub fn check_str(&self, src: &str) -> Result<(), CompileError> {
        let prog = self.parse_str(src)?;
        sema::check(&prog)?;
        Ok(())
    }
}

/// Compile une chaîne avec les options par défaut.
pub fn compile_str(src: &str) -> Result<String, CompileError> {
    Compiler::default().compile_str(src)
}

/* ───────────────────────── Tests ───────────────────────── */
