//! sema.rs — Vérifications sémantiques sur l'AST JibJab.
//!
//! Deux passes :
//!   1. collecte des signatures de fonctions sur tout le programme
//!      (les références avant déclaration sont licites : le générateur
//!      émet systématiquement les forward declarations) ;
//!   2. parcours des corps avec une pile de portées — paramètres,
//!      variables de boucle `for` et `varDecl` entrent en portée, la
//!      sortie de bloc dépile.
//!
//! Le builtin `print` (arité 1) est pré-enregistré ; il n'est valide
//! qu'en position d'instruction. Aucune inférence de type : tout est int.

use std::collections::HashMap;
use std::fmt;

use jibjab_ast::{Block, Expr, FuncDecl, Item, Program, Span, Stmt};

/// Nom du builtin d'affichage du langage.
pub const PRINT: &str = "print";

/* ───────────────────────── Erreurs sémantiques ───────────────────────── */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    UnknownFunction { name: String },
    UnknownIdent { name: String },
    ArityMismatch { name: String, expected: usize, found: usize },
    DuplicateFunction { name: String },
    BuiltinMisuse { name: String },
}

#[derive(Debug, Clone)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub span: Span,
}

impl SemanticError {
    fn new(kind: SemanticErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Étiquette stable de la catégorie (diagnostics machine).
    pub fn kind_str(&self) -> &'static str {
        use SemanticErrorKind::*;
        match self.kind {
            UnknownFunction { .. } => "unknown-function",
            UnknownIdent { .. } => "unknown-identifier",
            ArityMismatch { .. } => "arity-mismatch",
            DuplicateFunction { .. } => "duplicate-function",
            BuiltinMisuse { .. } => "builtin-misuse",
        }
    }
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SemanticErrorKind::*;
        match self {
            UnknownFunction { name } => write!(f, "fonction inconnue: `{name}`"),
            UnknownIdent { name } => write!(f, "identifiant inconnu: `{name}`"),
            ArityMismatch { name, expected, found } => {
                write!(f, "mauvaise arité pour `{name}`: attendu {expected} argument(s), trouvé {found}")
            }
            DuplicateFunction { name } => write!(f, "fonction déclarée deux fois: `{name}`"),
            BuiltinMisuse { name } => write!(f, "`{name}` ne s'emploie qu'en instruction"),
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f, "{} (line {}, col {})",
            self.kind, self.span.start.line, self.span.start.col
        )
    }
}
impl std::error::Error for SemanticError {}

/* ───────────────────────── API ───────────────────────── */

/// Valide le programme complet ; s'arrête à la première faute.
pub fn check(program: &Program) -> Result<(), SemanticError> {
    let mut ck = Checker::collect(program)?;
    // portée du script (les instructions top-level partagent le futur corps de main)
    ck.scopes.push(Vec::new());
    for item in &program.items {
        match item {
            Item::Func(f) => ck.check_func(f)?,
            Item::Stmt(s) => ck.check_stmt(s)?,
        }
    }
    Ok(())
}

/* ───────────────────────── Impl ───────────────────────── */

struct Checker<'a> {
    /// nom → arité déclarée (table consultée, jamais itérée)
    funcs: HashMap<&'a str, usize>,
    /// pile de portées ; chaque entrée liste les variables visibles
    scopes: Vec<Vec<&'a str>>,
}

impl<'a> Checker<'a> {
    /// Passe 1 : signatures de toutes les fonctions, builtin compris.
    fn collect(program: &'a Program) -> Result<Self, SemanticError> {
        let mut funcs = HashMap::new();
        funcs.insert(PRINT, 1usize);
        for f in program.funcs() {
            if funcs.insert(f.name.as_str(), f.params.len()).is_some() {
                return Err(SemanticError::new(
                    SemanticErrorKind::DuplicateFunction { name: f.name.clone() },
                    f.span,
                ));
            }
        }
        Ok(Self { funcs, scopes: Vec::new() })
    }

    fn check_func(&mut self, f: &'a FuncDecl) -> Result<(), SemanticError> {
        // un corps de fonction ne voit pas les variables du script
        let saved = std::mem::take(&mut self.scopes);
        self.scopes.push(f.params.iter().map(|p| p.name.as_str()).collect());
        let r = self.check_block(&f.body);
        self.scopes = saved;
        r
    }

    fn check_block(&mut self, block: &'a Block) -> Result<(), SemanticError> {
        self.scopes.push(Vec::new());
        for s in &block.stmts {
            self.check_stmt(s)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &'a Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::If { cond, then_block, else_block, .. } => {
                self.check_expr(cond)?;
                self.check_block(then_block)?;
                if let Some(b) = else_block {
                    self.check_block(b)?;
                }
                Ok(())
            }
            Stmt::Return { value, .. } => self.check_expr(value),
            Stmt::For { init, cond, step, body, .. } => {
                // la variable d'init reste visible dans cond/step/body
                self.scopes.push(Vec::new());
                self.check_stmt(init)?;
                self.check_expr(cond)?;
                self.check_expr(step)?;
                self.check_block(body)?;
                self.scopes.pop();
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                self.check_expr(cond)?;
                self.check_block(body)
            }
            Stmt::VarDecl { name, init, .. } => {
                self.check_expr(init)?;
                self.declare(name);
                Ok(())
            }
            Stmt::Expr { expr, .. } => {
                // position d'instruction : seul endroit où `print` est licite
                if let Expr::Call { name, args, span } = expr {
                    if name == PRINT {
                        if args.len() != 1 {
                            return Err(SemanticError::new(
                                SemanticErrorKind::ArityMismatch {
                                    name: name.clone(),
                                    expected: 1,
                                    found: args.len(),
                                },
                                *span,
                            ));
                        }
                        return args.iter().try_for_each(|a| self.check_expr(a));
                    }
                }
                self.check_expr(expr)
            }
        }
    }

    fn check_expr(&self, expr: &'a Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::Int { .. } => Ok(()),
            Expr::Ident { name, span } => {
                if self.resolved(name) {
                    Ok(())
                } else {
                    Err(SemanticError::new(
                        SemanticErrorKind::UnknownIdent { name: name.clone() },
                        *span,
                    ))
                }
            }
            Expr::Unary { operand, .. } => self.check_expr(operand),
            Expr::Binary { lhs, rhs, .. } => {
                self.check_expr(lhs)?;
                self.check_expr(rhs)
            }
            Expr::Assign { name, value, span } => {
                if !self.resolved(name) {
                    return Err(SemanticError::new(
                        SemanticErrorKind::UnknownIdent { name: name.clone() },
                        *span,
                    ));
                }
                self.check_expr(value)
            }
            Expr::Paren { inner, .. } => self.check_expr(inner),
            Expr::Call { name, args, span } => {
                if name == PRINT {
                    return Err(SemanticError::new(
                        SemanticErrorKind::BuiltinMisuse { name: name.clone() },
                        *span,
                    ));
                }
                let expected = match self.funcs.get(name.as_str()) {
                    Some(&n) => n,
                    None => {
                        return Err(SemanticError::new(
                            SemanticErrorKind::UnknownFunction { name: name.clone() },
                            *span,
                        ))
                    }
                };
                if expected != args.len() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::ArityMismatch {
                            name: name.clone(),
                            expected,
                            found: args.len(),
                        },
                        *span,
                    ));
                }
                args.iter().try_for_each(|a| self.check_expr(a))
            }
        }
    }

    fn declare(&mut self, name: &'a str) {
        if let Some(top) = self.scopes.last_mut() {
            top.push(name);
        }
    }

    fn resolved(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|sc| sc.iter().any(|v| *v == name))
    }
}

/* ───────────────────────── Tests ───────────────────────── */
