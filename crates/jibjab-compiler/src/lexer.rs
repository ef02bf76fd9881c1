//! lexer.rs — Analyse lexicale du langage JibJab (.jj)
//!
//! Alphabet reconnu :
//! - identifiants : lettre/underscore puis lettres/chiffres/underscores
//! - littéraux entiers : suites de chiffres décimaux (pas de signe, pas de point)
//! - mots-clés : `if` `else` `return` `for` `while`
//! - opérateurs : `+ - * / % < > == != && || ! =`
//! - ponctuation : `( ) { } ; ,`
//! - commentaires : `// ...` et `/* ... */` **imbriqués**, jamais tokenisés
//!
//! API :
//!   let toks = tokenize(src)?;            // Vec<Token> terminé par Eof
//!   // ou: let mut lx = Lexer::new(src); lx.next_token()?
//!
//! Tout caractère hors alphabet produit une `LexError` positionnée (1-based).

use std::fmt;

use jibjab_ast::{Pos, Span};

/* ───────────────────────── Erreurs lexing ───────────────────────── */

#[derive(Debug, Clone)]
pub struct LexError {
    pub span: Span,
    pub msg: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f, "{} (line {}, col {})",
            self.msg, self.span.start.line, self.span.start.col
        )
    }
}
impl std::error::Error for LexError {}

/* ───────────────────────── Tokens ───────────────────────── */

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Vue texte brute (slice de la source)
    pub lexeme: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Fin
    Eof,

    // Ident & mots-clés
    Ident(String),
    KwIf, KwElse, KwReturn, KwFor, KwWhile,

    // Littéraux
    Int(i64),

    // Ponctuation
    LParen, RParen, LBrace, RBrace, Semicolon, Comma,

    // Opérateurs
    Assign,
    Plus, Minus, Star, Slash, Percent,
    Lt, Gt, EqEq, Ne,
    AndAnd, OrOr, Not,
}

impl TokenKind {
    /// Description lisible pour les diagnostics du parseur.
    pub fn describe(&self) -> String {
        use TokenKind::*;
        match self {
            Eof => "fin de fichier".into(),
            Ident(name) => format!("identifiant `{name}`"),
            Int(v) => format!("entier `{v}`"),
            KwIf => "`if`".into(),
            KwElse => "`else`".into(),
            KwReturn => "`return`".into(),
            KwFor => "`for`".into(),
            KwWhile => "`while`".into(),
            LParen => "`(`".into(),
            RParen => "`)`".into(),
            LBrace => "`{`".into(),
            RBrace => "`}`".into(),
            Semicolon => "`;`".into(),
            Comma => "`,`".into(),
            Assign => "`=`".into(),
            Plus => "`+`".into(),
            Minus => "`-`".into(),
            Star => "`*`".into(),
            Slash => "`/`".into(),
            Percent => "`%`".into(),
            Lt => "`<`".into(),
            Gt => "`>`".into(),
            EqEq => "`==`".into(),
            Ne => "`!=`".into(),
            AndAnd => "`&&`".into(),
            OrOr => "`||`".into(),
            Not => "`!`".into(),
        }
    }
}

/* ───────────────────────── Lexer ───────────────────────── */

#[derive(Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    chars: std::str::CharIndices<'a>,
    /// lookahead courant
    look: Option<(usize, char)>,
    /// position courante (début du *prochain* token)
    pos: Pos,
    /// offset octets du prochain caractère non consommé
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.char_indices();
        let look = chars.next();
        Self { src, chars, look, pos: Pos::start(), offset: 0 }
    }

    /// Tokenise intégralement la source (le dernier token est toujours `Eof`).
    pub fn tokenize_all(mut self) -> Result<Vec<Token>, LexError> {
        let mut v = Vec::<Token>::new();
        loop {
            let t = self.next_token()?;
            let end = matches!(t.kind, TokenKind::Eof);
            v.push(t);
            if end { break; }
        }
        Ok(v)
    }

    /// Lit le prochain token (ignore espaces/commentaires).
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_ws_and_comments()?;

        let start = self.pos;
        let start_off = self.offset;
        let ch = match self.look {
            Some((_, c)) => c,
            None => return Ok(Token { kind: TokenKind::Eof, span: Span { start, end: start }, lexeme: String::new() }),
        };

        if is_ident_start(ch) {
            return Ok(self.lex_ident_or_keyword());
        }
        if ch.is_ascii_digit() {
            return self.lex_int();
        }
        self.lex_punct_or_op(start, start_off)
    }

    /* ────── core ────── */

    fn mk_token(&self, start: Pos, start_off: usize, kind: TokenKind) -> Token {
        let s = &self.src[start_off..self.offset];
        Token { kind, span: Span { start, end: self.pos }, lexeme: s.to_string() }
    }

    fn bump(&mut self) -> Option<char> {
        let (i, ch) = self.look?;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        self.offset = i + ch.len_utf8();
        self.look = self.chars.next();
        Some(ch)
    }

    fn peek(&self) -> Option<char> { self.look.map(|(_, c)| c) }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.offset..].starts_with(s)
    }

    fn eat_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' { break; }
        }
    }

    fn skip_ws_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) { self.bump(); }
            if self.starts_with("//") {
                self.eat_line();
                continue;
            }
            if self.starts_with("/*") {
                self.skip_block_comment()?;
                continue;
            }
            break;
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        // commentaires imbriqués
        let start = self.pos;
        self.bump(); // '/'
        self.bump(); // '*'
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            if c == '/' && self.peek() == Some('*') {
                let _ = self.bump();
                depth += 1;
            } else if c == '*' && self.peek() == Some('/') {
                let _ = self.bump();
                depth -= 1;
                if depth == 0 { return Ok(()); }
            }
        }
        Err(self.err_at(start, "commentaire /* ... */ non terminé"))
    }

    fn err_at(&self, pos: Pos, msg: &str) -> LexError {
        LexError { span: Span { start: pos, end: self.pos }, msg: msg.to_string() }
    }

    /* ────── ident / mots-clés ────── */

    fn lex_ident_or_keyword(&mut self) -> Token {
        let start = self.pos;
        let start_off = self.offset;
        let mut s = String::new();
        if let Some(c) = self.peek() { s.push(c); self.bump(); }
        while let Some(c) = self.peek() {
            if is_ident_continue(c) { s.push(c); self.bump(); } else { break; }
        }

        let kind = match s.as_str() {
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "return" => TokenKind::KwReturn,
            "for" => TokenKind::KwFor,
            "while" => TokenKind::KwWhile,
            _ => TokenKind::Ident(s),
        };
        self.mk_token(start, start_off, kind)
    }

    /* ────── entiers ────── */

    fn lex_int(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let start_off = self.offset;
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() { raw.push(c); self.bump(); } else { break; }
        }
        let value: i64 = raw.parse().map_err(|_| self.err_at(start, "entier invalide"))?;
        Ok(self.mk_token(start, start_off, TokenKind::Int(value)))
    }

    /* ────── opérateurs / ponctuation ────── */

    fn lex_punct_or_op(&mut self, start: Pos, start_off: usize) -> Result<Token, LexError> {
        macro_rules! two {
            ($kind:expr) => {{
                self.bump(); self.bump();
                Ok(self.mk_token(start, start_off, $kind))
            }};
        }

        // multi-caractères d'abord
        if self.starts_with("==") { return two!(TokenKind::EqEq); }
        if self.starts_with("!=") { return two!(TokenKind::Ne); }
        if self.starts_with("&&") { return two!(TokenKind::AndAnd); }
        if self.starts_with("||") { return two!(TokenKind::OrOr); }

        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(Token { kind: TokenKind::Eof, span: Span { start, end: start }, lexeme: String::new() }),
        };
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '!' => TokenKind::Not,
            other => {
                return Err(self.err_at(start, &format!("caractère inattendu: {:?}", other)));
            }
        };
        Ok(self.mk_token(start, start_off, kind))
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/* ───────────────────────── API top-level ───────────────────────── */

pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).tokenize_all()
}

/* ───────────────────────── Tests ───────────────────────── */
