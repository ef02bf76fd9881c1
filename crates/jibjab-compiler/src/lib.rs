//! jibjab-compiler — pipeline de compilation JibJab → C.
//! - Étages : `lexer` → `parser` → `sema` → `codegen` → `emit`.
//! - Orchestrateur : `pipeline::Compiler` (entrée texte, sortie texte).
//! - Frontière outillage : `diagnostics::Diagnostic` (un par échec).
//!
//! Même source, même sortie : le pipeline est déterministe au octet près.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

pub mod codegen;
pub mod diagnostics;
pub mod emit;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod sema;

pub use diagnostics::{Diagnostic, Severity};
pub use emit::EmitOptions;
pub use pipeline::{compile_str, CompileError, Compiler};
