//! emit.rs — Sérialisation de l'arbre C en texte.
//!
//! Passe purement de mise en forme : ne réordonne jamais rien.
//! - indentation fixe de 4 espaces par niveau ;
//! - une instruction par ligne ;
//! - exactement un saut de ligne final ;
//! - commentaire de provenance en première ligne ;
//! - une ligne vide après les includes, après le groupe de forward
//!   declarations, et après chaque définition de fonction.

use std::fmt::Write as _;

use crate::codegen::{CExpr, CForInit, CFuncSig, CStmt, CUnit};

/* ───────────────────────── Options ───────────────────────── */

/// Options de mise en forme.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Unité d'indentation (une par niveau d'imbrication).
    pub indent: &'static str,
    /// Nom de langage inscrit dans le commentaire de provenance.
    pub source_language: &'static str,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { indent: "    ", source_language: "JibJab" }
    }
}

/* ───────────────────────── API ───────────────────────── */

/// Sérialise l'unité complète. Déterministe : même arbre, même texte.
pub fn emit(unit: &CUnit, opts: &EmitOptions) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("// Transpiled from {}", opts.source_language));
    for inc in &unit.includes {
        lines.push(format!("#include {inc}"));
    }
    lines.push(String::new());

    for sig in &unit.forwards {
        lines.push(format!("{};", signature(sig)));
    }
    if !unit.forwards.is_empty() {
        lines.push(String::new());
    }

    for f in &unit.funcs {
        lines.push(format!("{} {{", signature(&f.sig)));
        for s in &f.body {
            emit_stmt(&mut lines, s, 1, opts);
        }
        lines.push("}".into());
        lines.push(String::new());
    }

    if let Some(body) = &unit.main_body {
        lines.push("int main() {".into());
        for s in body {
            emit_stmt(&mut lines, s, 1, opts);
        }
        lines.push("}".into());
    }

    while matches!(lines.last(), Some(l) if l.is_empty()) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn signature(sig: &CFuncSig) -> String {
    let params: Vec<String> = sig.params.iter().map(|p| format!("int {p}")).collect();
    format!("int {}({})", sig.name, params.join(", "))
}

/* ───────────────────────── Instructions ───────────────────────── */

fn emit_stmt(lines: &mut Vec<String>, stmt: &CStmt, level: usize, opts: &EmitOptions) {
    let ind = opts.indent.repeat(level);
    match stmt {
        CStmt::Expr(e) => lines.push(format!("{ind}{};", emit_expr(e))),
        CStmt::Printf(e) => lines.push(format!("{ind}printf(\"%d\\n\", {});", emit_expr(e))),
        CStmt::VarDecl { name, init } => {
            lines.push(format!("{ind}int {name} = {};", emit_expr(init)));
        }
        CStmt::Return(e) => lines.push(format!("{ind}return {};", emit_expr(e))),
        CStmt::If { cond, then_body, else_body } => {
            lines.push(format!("{ind}if ({}) {{", emit_expr(cond)));
            for s in then_body {
                emit_stmt(lines, s, level + 1, opts);
            }
            match else_body {
                None => lines.push(format!("{ind}}}")),
                Some(body) => {
                    lines.push(format!("{ind}}} else {{"));
                    for s in body {
                        emit_stmt(lines, s, level + 1, opts);
                    }
                    lines.push(format!("{ind}}}"));
                }
            }
        }
        CStmt::For { init, cond, step, body } => {
            lines.push(format!(
                "{ind}for ({}; {}; {}) {{",
                emit_for_init(init),
                emit_expr(cond),
                emit_expr(step),
            ));
            for s in body {
                emit_stmt(lines, s, level + 1, opts);
            }
            lines.push(format!("{ind}}}"));
        }
        CStmt::CountedFor { var, start, end, body } => {
            lines.push(format!(
                "{ind}for (int {var} = {}; {var} < {}; {var}++) {{",
                emit_expr(start),
                emit_expr(end),
            ));
            for s in body {
                emit_stmt(lines, s, level + 1, opts);
            }
            lines.push(format!("{ind}}}"));
        }
        CStmt::While { cond, body } => {
            lines.push(format!("{ind}while ({}) {{", emit_expr(cond)));
            for s in body {
                emit_stmt(lines, s, level + 1, opts);
            }
            lines.push(format!("{ind}}}"));
        }
    }
}

fn emit_for_init(init: &CForInit) -> String {
    match init {
        CForInit::VarDecl { name, init } => format!("int {name} = {}", emit_expr(init)),
        CForInit::Expr(e) => emit_expr(e),
    }
}

/* ───────────────────────── Expressions ───────────────────────── */

fn emit_expr(e: &CExpr) -> String {
    let mut s = String::new();
    write_expr(&mut s, e);
    s
}

fn write_expr(out: &mut String, e: &CExpr) {
    match e {
        CExpr::Int(v) => { let _ = write!(out, "{v}"); }
        CExpr::Ident(name) => out.push_str(name),
        CExpr::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
        CExpr::Unary { op, operand } => {
            out.push_str(op);
            write_expr(out, operand);
        }
        CExpr::Binary { op, lhs, rhs } => {
            write_expr(out, lhs);
            let _ = write!(out, " {op} ");
            write_expr(out, rhs);
        }
        CExpr::Call { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, a) in args.iter().enumerate() {
                if i > 0 { out.push_str(", "); }
                write_expr(out, a);
            }
            out.push(')');
        }
        CExpr::Assign { name, value } => {
            let _ = write!(out, "{name} = ");
            write_expr(out, value);
        }
        CExpr::PostIncr(name) => { let _ = write!(out, "{name}++"); }
    }
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::lower;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn emitted(src: &str) -> String {
        let prog = parse(tokenize(src).unwrap()).unwrap();
        crate::sema::check(&prog).unwrap();
        emit(&lower(&prog), &EmitOptions::default())
    }

    #[test]
    fn soustraction_parenthesee() {
        let out = emitted("int f(int a, int b) { return a - b; }");
        assert!(out.contains("return (a - b);"), "sortie: {out}");
    }

    #[test]
    fn fidelite_parenthesage_fib() {
        let out = emitted("int fib(int n) { return fib(n - 1) + fib(n - 2); }");
        assert!(
            out.contains("return (fib((n - 1)) + fib((n - 2)));"),
            "sortie: {out}"
        );
    }

    #[test]
    fn provenance_en_premiere_ligne() {
        let out = emitted("print(1);");
        assert!(out.starts_with("// Transpiled from JibJab\n"));
    }

    #[test]
    fn un_seul_saut_de_ligne_final() {
        for src in ["print(1);", "int f(int a) { return a; }"] {
            let out = emitted(src);
            assert!(out.ends_with('}') || out.ends_with("}\n"));
            assert!(out.ends_with('\n'));
            assert!(!out.ends_with("\n\n"), "sortie: {out:?}");
        }
    }

    #[test]
    fn else_sur_la_ligne_de_fermeture() {
        let out = emitted("int f(int a) { if (a > 0) { return 1; } else { return 0; } }");
        assert!(out.contains("    } else {"), "sortie: {out}");
    }

    #[test]
    fn while_et_modulo() {
        let out = emitted("int f(int a) { while (a > 0) { a = a % 2; } return a; }");
        assert!(out.contains("    while ((a > 0)) {"), "sortie: {out}");
        assert!(out.contains("        a = (a % 2);"), "sortie: {out}");
    }

    #[test]
    fn var_decl_et_unaire() {
        let out = emitted("int f(int a) { int b = !a; return -b; }");
        assert!(out.contains("    int b = (!a);"), "sortie: {out}");
        assert!(out.contains("    return (-b);"), "sortie: {out}");
    }

    #[test]
    fn printf_forme_exacte() {
        let out = emitted("print(7);");
        assert!(out.contains("    printf(\"%d\\n\", 7);"), "sortie: {out}");
    }

    #[test]
    fn indentation_imbriquee() {
        let out = emitted(
            "int f(int a) { if (a > 0) { if (a > 1) { return 2; } } return 0; }",
        );
        assert!(out.contains("            return 2;"), "sortie: {out}");
    }

    #[test]
    fn forward_puis_definition() {
        let out = emitted("int f(int a) { return a; }");
        let fwd = out.matches("int f(int a);").count();
        assert_eq!(fwd, 1);
        assert!(out.contains("int f(int a) {"));
    }
}
