//! codegen.rs — Abaissement de l'AST validé vers un arbre d'instructions C.
//!
//! Produit un `CUnit` : prologue d'includes, une forward declaration par
//! fonction dans l'ordre source, les définitions dans l'ordre source, puis
//! un `main` synthétisé depuis les instructions top-level (avec `return 0;`
//! final) quand la source est un script.
//!
//! Règles d'abaissement :
//! - toute expression binaire ou unaire est enveloppée d'un marqueur
//!   `CExpr::Paren` — la sortie ne dépend jamais de la table de précédence
//!   du C ;
//! - les parenthèses explicites de la source ne sont ré-insérées que si
//!   l'abaissement n'en a pas déjà produit (pas de doublons) ;
//! - `print(e);` devient `printf("%d\n", e);` ;
//! - un pas de boucle `v = v + 1` est canonisé en `v++`.
//!
//! Déterministe par construction : uniquement des séquences ordonnées à
//! l'insertion, aucune itération de table non ordonnée.

use jibjab_ast::{BinOp, Block, Expr, FuncDecl, Program, Stmt};

use crate::sema::PRINT;

/* ───────────────────────── Arbre C ───────────────────────── */

#[derive(Debug, Clone, PartialEq)]
pub enum CExpr {
    Int(i64),
    Ident(String),
    /// Marqueur de parenthésage explicite.
    Paren(Box<CExpr>),
    Unary { op: &'static str, operand: Box<CExpr> },
    Binary { op: &'static str, lhs: Box<CExpr>, rhs: Box<CExpr> },
    Call { name: String, args: Vec<CExpr> },
    Assign { name: String, value: Box<CExpr> },
    PostIncr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CForInit {
    VarDecl { name: String, init: CExpr },
    Expr(CExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CStmt {
    Expr(CExpr),
    /// `printf("%d\n", e);`
    Printf(CExpr),
    VarDecl { name: String, init: CExpr },
    Return(CExpr),
    If { cond: CExpr, then_body: Vec<CStmt>, else_body: Option<Vec<CStmt>> },
    For { init: CForInit, cond: CExpr, step: CExpr, body: Vec<CStmt> },
    /// Boucle comptée canonique : `for (int v = start; v < end; v++)`.
    /// L'en-tête est un échafaudage synthétisé, pas une expression traduite :
    /// la comparaison s'émet nue.
    CountedFor { var: String, start: CExpr, end: CExpr, body: Vec<CStmt> },
    While { cond: CExpr, body: Vec<CStmt> },
}

/// Signature C : tout est `int`, seuls les noms varient.
#[derive(Debug, Clone, PartialEq)]
pub struct CFuncSig {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CFunc {
    pub sig: CFuncSig,
    pub body: Vec<CStmt>,
}

/// Unité de traduction complète, prête pour l'émetteur.
#[derive(Debug, Clone, PartialEq)]
pub struct CUnit {
    pub includes: Vec<&'static str>,
    pub forwards: Vec<CFuncSig>,
    pub funcs: Vec<CFunc>,
    /// `None` quand la source ne comporte aucune instruction top-level.
    pub main_body: Option<Vec<CStmt>>,
}

/* ───────────────────────── Abaissement ───────────────────────── */

/// Abaisse un programme **validé** (voir `sema::check`).
pub fn lower(program: &Program) -> CUnit {
    let forwards: Vec<CFuncSig> = program.funcs().map(sig_of).collect();
    let funcs: Vec<CFunc> = program
        .funcs()
        .map(|f| CFunc { sig: sig_of(f), body: lower_block(&f.body) })
        .collect();

    let mut script: Vec<CStmt> = program.script().map(lower_stmt).collect();
    let main_body = if script.is_empty() {
        None
    } else {
        script.push(CStmt::Return(CExpr::Int(0)));
        Some(script)
    };

    CUnit {
        includes: vec!["<stdio.h>", "<stdlib.h>"],
        forwards,
        funcs,
        main_body,
    }
}

fn sig_of(f: &FuncDecl) -> CFuncSig {
    CFuncSig {
        name: f.name.clone(),
        params: f.params.iter().map(|p| p.name.clone()).collect(),
    }
}

fn lower_block(b: &Block) -> Vec<CStmt> {
    b.stmts.iter().map(lower_stmt).collect()
}

fn lower_stmt(s: &Stmt) -> CStmt {
    match s {
        Stmt::If { cond, then_block, else_block, .. } => CStmt::If {
            cond: lower_expr(cond),
            then_body: lower_block(then_block),
            else_body: else_block.as_ref().map(lower_block),
        },
        Stmt::Return { value, .. } => CStmt::Return(lower_expr(value)),
        Stmt::For { init, cond, step, body, .. } => lower_for(init, cond, step, body),
        Stmt::While { cond, body, .. } => CStmt::While {
            cond: lower_expr(cond),
            body: lower_block(body),
        },
        Stmt::VarDecl { name, init, .. } => CStmt::VarDecl {
            name: name.clone(),
            init: lower_expr(init),
        },
        Stmt::Expr { expr, .. } => {
            if let Expr::Call { name, args, .. } = expr {
                if name == PRINT {
                    return CStmt::Printf(lower_expr(&args[0]));
                }
            }
            CStmt::Expr(lower_expr(expr))
        }
    }
}

fn lower_for(init: &Stmt, cond: &Expr, step: &Expr, body: &Block) -> CStmt {
    // forme comptée `for (int v = start; v < end; v = v + 1)` : en-tête canonisé
    if let Stmt::VarDecl { name: var, init: start, .. } = init {
        let step_is_incr = matches!(lower_for_step(step), CExpr::PostIncr(ref v) if v == var);
        if step_is_incr {
            if let Expr::Binary { op: BinOp::Lt, lhs, rhs, .. } = strip_parens(cond) {
                if matches!(strip_parens(lhs), Expr::Ident { name: n, .. } if n == var) {
                    return CStmt::CountedFor {
                        var: var.clone(),
                        start: lower_expr(start),
                        end: lower_expr(rhs),
                        body: lower_block(body),
                    };
                }
            }
        }
    }
    CStmt::For {
        init: lower_for_init(init),
        cond: lower_expr(cond),
        step: lower_for_step(step),
        body: lower_block(body),
    }
}

fn lower_for_init(init: &Stmt) -> CForInit {
    match init {
        Stmt::VarDecl { name, init, .. } => CForInit::VarDecl {
            name: name.clone(),
            init: lower_expr(init),
        },
        Stmt::Expr { expr, .. } => CForInit::Expr(lower_expr(expr)),
        other => unreachable!("init de for restreint par le parseur: {other:?}"),
    }
}

/// Canonise `v = v + 1` en `v++` ; tout autre pas est abaissé tel quel.
fn lower_for_step(step: &Expr) -> CExpr {
    if let Expr::Assign { name, value, .. } = step {
        if let Expr::Binary { op: BinOp::Add, lhs, rhs, .. } = strip_parens(value) {
            let incr_of_self = matches!(strip_parens(lhs), Expr::Ident { name: n, .. } if n == name)
                && matches!(strip_parens(rhs), Expr::Int { value: 1, .. });
            if incr_of_self {
                return CExpr::PostIncr(name.clone());
            }
        }
    }
    lower_expr(step)
}

fn strip_parens(e: &Expr) -> &Expr {
    match e {
        Expr::Paren { inner, .. } => strip_parens(inner),
        other => other,
    }
}

fn lower_expr(e: &Expr) -> CExpr {
    match e {
        Expr::Int { value, .. } => CExpr::Int(*value),
        Expr::Ident { name, .. } => CExpr::Ident(name.clone()),
        Expr::Unary { op, operand, .. } => CExpr::Paren(Box::new(CExpr::Unary {
            op: op.as_str(),
            operand: Box::new(lower_expr(operand)),
        })),
        Expr::Binary { op, lhs, rhs, .. } => CExpr::Paren(Box::new(CExpr::Binary {
            op: op.as_str(),
            lhs: Box::new(lower_expr(lhs)),
            rhs: Box::new(lower_expr(rhs)),
        })),
        Expr::Assign { name, value, .. } => CExpr::Assign {
            name: name.clone(),
            value: Box::new(lower_expr(value)),
        },
        Expr::Call { name, args, .. } => CExpr::Call {
            name: name.clone(),
            args: args.iter().map(lower_expr).collect(),
        },
        Expr::Paren { inner, .. } => {
            // ré-insertion décidée ici : pas de double parenthèse
            let low = lower_expr(inner);
            if matches!(low, CExpr::Paren(_)) {
                low
            } else {
                CExpr::Paren(Box::new(low))
            }
        }
    }
}

/* ───────────────────────── Tests ───────────────────────── */
