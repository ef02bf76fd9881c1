//! parser.rs — Analyse syntaxique descente-récursive du langage JibJab.
//!
//! Grammaire (informelle) :
//!   program      := (functionDecl | statement)*
//!   functionDecl := ident ident '(' params? ')' block
//!   statement    := if | return | for | while | varDecl | exprStmt
//!   expr         := assign ; précédences: = , ||, &&, (== !=), (< >),
//!                   (+ -), (* / %), unaire (! -), primaire
//!
//! Tous les opérateurs binaires sont associatifs à gauche ; l'affectation à
//! droite. Les parenthèses explicites survivent dans l'arbre (`Expr::Paren`).
//! Premier écart à la grammaire = `ParseError` (pas de récupération).

use std::fmt;

use jibjab_ast::{BinOp, Block, Expr, FuncDecl, Item, Param, Program, Span, Stmt, UnOp};

use crate::lexer::{Token, TokenKind};

/* ───────────────────────── Erreur de parsing ───────────────────────── */

#[derive(Debug, Clone)]
pub struct ParseError {
    /// Ce que la grammaire attendait (description lisible).
    pub expected: String,
    /// Le token effectivement trouvé (description lisible).
    pub found: String,
    pub span: Span,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f, "attendu {}, trouvé {} (line {}, col {})",
            self.expected, self.found, self.span.start.line, self.span.start.col
        )
    }
}
impl std::error::Error for ParseError {}

/* ───────────────────────── Parseur ───────────────────────── */

pub struct Parser {
    toks: Vec<Token>,
    pos: usize,
}

/// Parse une suite complète de tokens (terminée par `Eof`) en `Program`.
pub fn parse(toks: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(toks).parse_program()
}

impl Parser {
    pub fn new(toks: Vec<Token>) -> Self {
        Self { toks, pos: 0 }
    }

    /* ----- curseur ----- */

    fn peek(&self) -> &Token {
        // le flux se termine toujours par Eof ; ne dépasse jamais
        &self.toks[self.pos.min(self.toks.len() - 1)]
    }

    fn peek_at(&self, n: usize) -> &Token {
        &self.toks[(self.pos + n).min(self.toks.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let t = self.peek().clone();
        if self.pos < self.toks.len() - 1 { self.pos += 1; }
        t
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.err_here(kind.describe()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.peek().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.err_here(what)),
        }
    }

    fn err_here(&self, expected: impl Into<String>) -> ParseError {
        let t = self.peek();
        ParseError {
            expected: expected.into(),
            found: t.kind.describe(),
            span: t.span,
        }
    }

    /* ----- programme & déclarations ----- */

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while !self.check(&TokenKind::Eof) {
            items.push(self.parse_item()?);
        }
        Ok(Program { items })
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        // `ident ident (` ouvre une fonction ; tout le reste est du script
        let starts_func = matches!(self.peek().kind, TokenKind::Ident(_))
            && matches!(self.peek_at(1).kind, TokenKind::Ident(_))
            && matches!(self.peek_at(2).kind, TokenKind::LParen);
        if starts_func {
            Ok(Item::Func(self.parse_function()?))
        } else {
            Ok(Item::Stmt(self.parse_statement()?))
        }
    }

    fn parse_function(&mut self) -> Result<FuncDecl, ParseError> {
        let (ret_ty, start_span) = self.expect_ident("un nom de type")?;
        let (name, _) = self.expect_ident("un nom de fonction")?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (ty, ty_span) = self.expect_ident("un nom de type")?;
                let (pname, pspan) = self.expect_ident("un nom de paramètre")?;
                params.push(Param { ty, name: pname, span: Span::merge(ty_span, pspan) });
                if self.eat(&TokenKind::Comma) { continue; }
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = Span::merge(start_span, body.span);
        Ok(FuncDecl { ret_ty, name, params, body, span })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(self.err_here(TokenKind::RBrace.describe()));
            }
            stmts.push(self.parse_statement()?);
        }
        let close = self.expect(&TokenKind::RBrace)?;
        Ok(Block { stmts, span: Span::merge(open.span, close.span) })
    }

    /* ----- instructions ----- */

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::Ident(_) if matches!(self.peek_at(1).kind, TokenKind::Ident(_)) => {
                self.parse_var_decl()
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(&TokenKind::KwIf)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let mut end = then_block.span;
        let else_block = if self.eat(&TokenKind::KwElse) {
            let b = self.parse_block()?;
            end = b.span;
            Some(b)
        } else {
            None
        };
        Ok(Stmt::If { cond, then_block, else_block, span: Span::merge(kw.span, end) })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(&TokenKind::KwReturn)?;
        let value = self.parse_expr()?;
        let semi = self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Return { value, span: Span::merge(kw.span, semi.span) })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(&TokenKind::KwFor)?;
        self.expect(&TokenKind::LParen)?;
        // forInit := varDecl | exprStmt (les deux consomment leur ';')
        let init = if matches!(self.peek().kind, TokenKind::Ident(_))
            && matches!(self.peek_at(1).kind, TokenKind::Ident(_))
        {
            Box::new(self.parse_var_decl()?)
        } else {
            Box::new(self.parse_expr_stmt()?)
        };
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon)?;
        let step = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = Span::merge(kw.span, body.span);
        Ok(Stmt::For { init, cond, step, body, span })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect(&TokenKind::KwWhile)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = Span::merge(kw.span, body.span);
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let (ty, ty_span) = self.expect_ident("un nom de type")?;
        let (name, _) = self.expect_ident("un nom de variable")?;
        self.expect(&TokenKind::Assign)?;
        let init = self.parse_expr()?;
        let semi = self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::VarDecl { ty, name, init, span: Span::merge(ty_span, semi.span) })
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        let semi = self.expect(&TokenKind::Semicolon)?;
        let span = Span::merge(expr.span(), semi.span);
        Ok(Stmt::Expr { expr, span })
    }

    /* ----- expressions ----- */

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Expr, ParseError> {
        // `ident = ...` : affectation (associative à droite)
        if let TokenKind::Ident(name) = &self.peek().kind {
            if matches!(self.peek_at(1).kind, TokenKind::Assign) {
                let name = name.clone();
                let name_span = self.peek().span;
                self.advance(); // ident
                self.advance(); // '='
                let value = self.parse_assign()?;
                let span = Span::merge(name_span, value.span());
                return Ok(Expr::Assign { name, value: Box::new(value), span });
            }
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_and()?;
            lhs = mk_binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = mk_binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            lhs = mk_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = mk_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = mk_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = mk_binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Not => Some(UnOp::Not),
            TokenKind::Minus => Some(UnOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let tok = self.advance();
            let operand = self.parse_unary()?;
            let span = Span::merge(tok.span, operand.span());
            return Ok(Expr::Unary { op, operand: Box::new(operand), span });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.peek().kind {
            TokenKind::LParen => {
                let open = self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(&TokenKind::RParen)?;
                let span = Span::merge(open.span, close.span);
                Ok(Expr::Paren { inner: Box::new(inner), span })
            }
            TokenKind::Int(value) => {
                let value = *value;
                let span = self.peek().span;
                self.advance();
                Ok(Expr::Int { value, span })
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                let name_span = self.peek().span;
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if self.eat(&TokenKind::Comma) { continue; }
                            break;
                        }
                    }
                    let close = self.expect(&TokenKind::RParen)?;
                    let span = Span::merge(name_span, close.span);
                    return Ok(Expr::Call { name, args, span });
                }
                Ok(Expr::Ident { name, span: name_span })
            }
            _ => Err(self.err_here("une expression")),
        }
    }
}

fn mk_binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = Span::merge(lhs.span(), rhs.span());
    Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span }
}

/* ───────────────────────── Tests ───────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn prog(src: &str) -> Program {
        parse(tokenize(src).unwrap()).unwrap()
    }

    fn expr(src: &str) -> Expr {
        let p = prog(&format!("{src};"));
        match &p.items[0] {
            Item::Stmt(Stmt::Expr { expr, .. }) => expr.clone(),
            other => panic!("pas un exprStmt: {other:?}"),
        }
    }

    #[test]
    fn fonction_complete() {
        let p = prog("int fib(int n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); }");
        assert_eq!(p.funcs().count(), 1);
        let f = p.funcs().next().unwrap();
        assert_eq!(f.name, "fib");
        assert_eq!(f.ret_ty, "int");
        assert_eq!(f.params.len(), 1);
        assert_eq!(f.params[0].name, "n");
        assert_eq!(f.body.stmts.len(), 2);
    }

    #[test]
    fn precedence_mul_avant_add() {
        // a + b * c  →  a + (b * c)
        match expr("a + b * c") {
            Expr::Binary { op: BinOp::Add, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("forme inattendue: {other:?}"),
        }
    }

    #[test]
    fn precedence_add_avant_relationnel() {
        // a < b + c  →  a < (b + c)
        match expr("a < b + c") {
            Expr::Binary { op: BinOp::Lt, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("forme inattendue: {other:?}"),
        }
    }

    #[test]
    fn associativite_gauche() {
        // a - b - c  →  (a - b) - c
        match expr("a - b - c") {
            Expr::Binary { op: BinOp::Sub, lhs, rhs, .. } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinOp::Sub, .. }));
                assert!(matches!(*rhs, Expr::Ident { .. }));
            }
            other => panic!("forme inattendue: {other:?}"),
        }
    }

    #[test]
    fn parentheses_conservees_structurellement() {
        match expr("(a - b) * c") {
            Expr::Binary { op: BinOp::Mul, lhs, .. } => {
                assert!(matches!(*lhs, Expr::Paren { .. }));
            }
            other => panic!("forme inattendue: {other:?}"),
        }
    }

    #[test]
    fn affectation_droite() {
        // a = b = 1  →  a = (b = 1)
        match expr("a = b = 1") {
            Expr::Assign { name, value, .. } => {
                assert_eq!(name, "a");
                assert!(matches!(*value, Expr::Assign { .. }));
            }
            other => panic!("forme inattendue: {other:?}"),
        }
    }

    #[test]
    fn for_avec_var_decl() {
        let p = prog("for (int i = 0; i < 15; i = i + 1) { print(fib(i)); }");
        match &p.items[0] {
            Item::Stmt(Stmt::For { init, .. }) => {
                assert!(matches!(**init, Stmt::VarDecl { .. }));
            }
            other => panic!("pas un for: {other:?}"),
        }
    }

    #[test]
    fn if_else() {
        let p = prog("int f(int a) { if (a > 0) { return 1; } else { return 0; } }");
        let f = p.funcs().next().unwrap();
        assert!(matches!(f.body.stmts[0], Stmt::If { else_block: Some(_), .. }));
    }

    #[test]
    fn while_et_unaire() {
        let p = prog("while (!done) { done = 1; }");
        match &p.items[0] {
            Item::Stmt(Stmt::While { cond, .. }) => {
                assert!(matches!(cond, Expr::Unary { op: UnOp::Not, .. }));
            }
            other => panic!("pas un while: {other:?}"),
        }
    }

    #[test]
    fn parenthese_non_fermee_premier_ecart() {
        let toks = tokenize("int f(int a) { return (a + 1; }").unwrap();
        let e = parse(toks).unwrap_err();
        assert_eq!(e.expected, "`)`");
        assert_eq!(e.span.start.line, 1);
        assert_eq!(e.span.start.col, 29); // le `;` fautif
    }

    #[test]
    fn point_virgule_manquant() {
        let toks = tokenize("int f(int a) { return a }").unwrap();
        let e = parse(toks).unwrap_err();
        assert_eq!(e.expected, "`;`");
    }

    #[test]
    fn var_decl_sans_egal() {
        let toks = tokenize("int x 5;").unwrap();
        let e = parse(toks).unwrap_err();
        assert_eq!(e.expected, "`=`");
        assert_eq!(e.found, "entier `5`");
    }

    #[test]
    fn accolade_jamais_fermee() {
        let toks = tokenize("int f(int a) { return a;").unwrap();
        let e = parse(toks).unwrap_err();
        assert_eq!(e.expected, "`}`");
        assert_eq!(e.found, "fin de fichier");
    }
}
