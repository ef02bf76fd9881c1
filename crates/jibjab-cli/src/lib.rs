//! jibjab-cli/src/lib.rs — CLI du transpileur JibJab
//!
//! Sous-commandes :
//!   - build : compile un .jj vers un fichier C
//!   - check : parse + vérifications sémantiques, sans émission
//!   - ast   : affiche l'AST parsé (JSON avec --json)
//!
//! Codes de sortie : 0 succès, 1 diagnostic de compilation, 2 usage/E-S.
//! Le cœur de compilation vit dans `jibjab-compiler` ; cette crate ne fait
//! que l'E-S fichier, le rendu du diagnostic et le mapping des codes.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use log::{debug, info};

use jibjab_compiler::{CompileError, Compiler, Diagnostic};

/// Point d'entrée du binaire (à appeler depuis src/main.rs).
/// Renvoie le code de sortie : 0 ok, 1 diagnostic de compilation.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build { input, output } => cmd_build(&input, output.as_deref(), cli.json),
        Cmd::Check { input } => cmd_check(&input, cli.json),
        Cmd::Ast { input } => cmd_ast(&input, cli.json),
    }
}

#[derive(Parser, Debug)]
#[command(name = "jibjab", version, about = "JibJab → C transpiler")]
struct Cli {
    /// Sorties machine (diagnostics et AST) en JSON sur stdout
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compile une source .jj vers un fichier C
    Build {
        /// Fichier source .jj
        input: Utf8PathBuf,
        /// Chemin de sortie (défaut : la source avec l'extension .c)
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
    /// Valide une source sans rien émettre
    Check {
        input: Utf8PathBuf,
    },
    /// Affiche l'AST parsé
    Ast {
        input: Utf8PathBuf,
    },
}

/* ───────────────────────── Sous-commandes ───────────────────────── */

pub fn cmd_build(input: &Utf8Path, output: Option<&Utf8Path>, json: bool) -> Result<i32> {
    let src = read_source(input)?;
    match Compiler::default().compile_str(&src) {
        Ok(text) => {
            let out_path: Utf8PathBuf =
                output.map(|p| p.to_owned()).unwrap_or_else(|| input.with_extension("c"));
            fs::write(&out_path, text).with_context(|| format!("écriture {out_path}"))?;
            info!("généré: {out_path}");
            Ok(0)
        }
        Err(e) => {
            report(&e, json);
            Ok(1)
        }
    }
}

pub fn cmd_check(input: &Utf8Path, json: bool) -> Result<i32> {
    let src = read_source(input)?;
    match Compiler::default().check_str(&src) {
        Ok(()) => {
            info!("ok: {input}");
            Ok(0)
        }
        Err(e) => {
            report(&e, json);
            Ok(1)
        }
    }
}

pub fn cmd_ast(input: &Utf8Path, json: bool) -> Result<i32> {
    let src = read_source(input)?;
    match Compiler::default().parse_str(&src) {
        Ok(prog) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&prog).context("sérialisation AST")?);
            } else {
                println!("{prog:#?}");
            }
            Ok(0)
        }
        Err(e) => {
            report(&e, json);
            Ok(1)
        }
    }
}

/* ───────────────────────── Helpers ───────────────────────── */

fn read_source(input: &Utf8Path) -> Result<String> {
    debug!("lecture: {input}");
    fs::read_to_string(input).with_context(|| format!("lecture {input}"))
}

fn report(e: &CompileError, json: bool) {
    let d = Diagnostic::from(e);
    if json {
        match serde_json::to_string(&d) {
            Ok(s) => println!("{s}"),
            Err(_) => eprintln!("{d}"),
        }
    } else {
        eprintln!("{d}");
    }
}
