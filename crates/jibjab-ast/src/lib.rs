//! jibjab-ast — Arbre de syntaxe abstraite du langage JibJab.
//!
//! Propriété structurelle : l'arbre est acyclique, chaque nœud possède ses
//! enfants en exclusivité (`Box`/`Vec`, pas de partage), et chaque nœud
//! transporte le span source qui l'a produit (diagnostics 1-based).
//!
//! La feature `serde` dérive `Serialize` sur tous les types (dump JSON côté
//! outillage).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

/* ───────────────────────── Positions & spans ───────────────────────── */

/// Position 1-based (ligne/colonne).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn start() -> Self { Self { line: 1, col: 1 } }
}

/// Tranche source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn merge(a: Span, b: Span) -> Span { Span { start: a.start, end: b.end } }
}

/* ───────────────────────── Programme & déclarations ───────────────────────── */

/// Un fichier source complet : suite de déclarations de fonctions et
/// d'instructions top-level (le « script »).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    /// Itère les déclarations de fonctions, dans l'ordre source.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.items.iter().filter_map(|it| match it {
            Item::Func(f) => Some(f),
            Item::Stmt(_) => None,
        })
    }

    /// Itère les instructions top-level (corps du script), dans l'ordre source.
    pub fn script(&self) -> impl Iterator<Item = &Stmt> {
        self.items.iter().filter_map(|it| match it {
            Item::Stmt(s) => Some(s),
            Item::Func(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Item {
    Func(FuncDecl),
    Stmt(Stmt),
}

/// `identifier identifier '(' params ')' block` — le premier identifiant est
/// le nom de type de retour (conservé tel quel ; sémantiquement tout est int).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FuncDecl {
    pub ret_ty: String,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Param {
    pub ty: String,
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/* ───────────────────────── Instructions ───────────────────────── */

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Stmt {
    If { cond: Expr, then_block: Block, else_block: Option<Block>, span: Span },
    Return { value: Expr, span: Span },
    /// `init` est restreint par le parseur à `VarDecl` ou `Expr`.
    For { init: Box<Stmt>, cond: Expr, step: Expr, body: Block, span: Span },
    While { cond: Expr, body: Block, span: Span },
    VarDecl { ty: String, name: String, init: Expr, span: Span },
    Expr { expr: Expr, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::If { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::For { span, .. }
            | Stmt::While { span, .. }
            | Stmt::VarDecl { span, .. }
            | Stmt::Expr { span, .. } => *span,
        }
    }
}

/* ───────────────────────── Expressions ───────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnOp { Neg, Not }

impl UnOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinOp { Add, Sub, Mul, Div, Mod, Lt, Gt, Eq, Ne, And, Or }

impl BinOp {
    pub fn as_str(self) -> &'static str {
        use BinOp::*;
        match self {
            Add => "+", Sub => "-", Mul => "*", Div => "/", Mod => "%",
            Lt => "<", Gt => ">", Eq => "==", Ne => "!=",
            And => "&&", Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expr {
    Int { value: i64, span: Span },
    Ident { name: String, span: Span },
    Unary { op: UnOp, operand: Box<Expr>, span: Span },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    /// Affectation `name = value` ; la cible est toujours un identifiant nu.
    Assign { name: String, value: Box<Expr>, span: Span },
    Call { name: String, args: Vec<Expr>, span: Span },
    /// Parenthèses explicites de la source, conservées structurellement :
    /// le générateur décide de leur ré-insertion.
    Paren { inner: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Int { span, .. }
            | Expr::Ident { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Call { span, .. }
            | Expr::Paren { span, .. } => *span,
        }
    }
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span { start: Pos::start(), end: Pos { line: 1, col: 2 } }
    }

    #[test]
    fn span_merge_keeps_extremes() {
        let a = Span { start: Pos { line: 1, col: 1 }, end: Pos { line: 1, col: 4 } };
        let b = Span { start: Pos { line: 2, col: 1 }, end: Pos { line: 2, col: 9 } };
        let m = Span::merge(a, b);
        assert_eq!(m.start, a.start);
        assert_eq!(m.end, b.end);
    }

    #[test]
    fn program_partitions_funcs_and_script() {
        let f = FuncDecl {
            ret_ty: "int".into(),
            name: "fib".into(),
            params: vec![],
            body: Block { stmts: vec![], span: sp() },
            span: sp(),
        };
        let s = Stmt::Expr { expr: Expr::Int { value: 1, span: sp() }, span: sp() };
        let p = Program { items: vec![Item::Func(f), Item::Stmt(s)] };
        assert_eq!(p.funcs().count(), 1);
        assert_eq!(p.script().count(), 1);
    }

    #[test]
    fn op_spellings() {
        assert_eq!(BinOp::Ne.as_str(), "!=");
        assert_eq!(BinOp::Mod.as_str(), "%");
        assert_eq!(UnOp::Not.as_str(), "!");
    }
}
