//! Scénario de bout en bout : le script Fibonacci complet.

use jibjab_compiler::{compile_str, Compiler};

const FIB_JJ: &str = "\
// Fibonacci, version JibJab
int fib(int n) {
    if (n < 2) {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}

for (int i = 0; i < 15; i = i + 1) {
    print(fib(i));
}
";

const FIB_C: &str = "\
// Transpiled from JibJab
#include <stdio.h>
#include <stdlib.h>

int fib(int n);

int fib(int n) {
    if ((n < 2)) {
        return n;
    }
    return (fib((n - 1)) + fib((n - 2)));
}

int main() {
    for (int i = 0; i < 15; i++) {
        printf(\"%d\\n\", fib(i));
    }
    return 0;
}
";

#[test]
fn fibonacci_sortie_exacte() {
    let out = compile_str(FIB_JJ).unwrap();
    assert_eq!(out, FIB_C);
}

#[test]
fn compilation_deterministe() {
    let a = compile_str(FIB_JJ).unwrap();
    let b = compile_str(FIB_JJ).unwrap();
    assert_eq!(a, b);
}

#[test]
fn forward_declaration_exactement_une_fois() {
    let src = "\
int a(int x) { return b(x); }
int b(int x) { return a(x); }
print(a(3));
";
    let out = compile_str(src).unwrap();
    for name in ["a", "b"] {
        let fwd = format!("int {name}(int x);");
        assert_eq!(out.matches(fwd.as_str()).count(), 1, "sortie: {out}");
        // la forward declaration précède la définition
        let def = format!("int {name}(int x) {{");
        assert!(out.find(fwd.as_str()).unwrap() < out.find(def.as_str()).unwrap());
    }
}

#[test]
fn recursion_mutuelle_au_sein_du_fichier() {
    let src = "\
int even(int n) { if (n == 0) { return 1; } return odd(n - 1); }
int odd(int n) { if (n == 0) { return 0; } return even(n - 1); }
print(even(10));
";
    let out = compile_str(src).unwrap();
    assert!(out.contains("return odd((n - 1));"));
    assert!(out.contains("return even((n - 1));"));
}

#[test]
fn parenthese_non_fermee_diagnostiquee() {
    let src = "int f(int a) { return (a + 1; }";
    let e = Compiler::default().compile_str(src).unwrap_err();
    assert_eq!(e.kind_str(), "parse-error");
    let span = e.span();
    assert_eq!((span.start.line, span.start.col), (1, 29));
}

#[test]
fn appel_de_fonction_non_declaree_nommee() {
    let e = compile_str("print(mystere(1));").unwrap_err();
    assert_eq!(e.kind_str(), "unknown-function");
    assert!(e.to_string().contains("`mystere`"));
}

#[test]
fn aucune_sortie_partielle_sur_echec() {
    // le même script, amputé de sa dernière accolade
    let mut src = FIB_JJ.trim_end().to_string();
    src.pop();
    assert!(compile_str(&src).is_err());
}

#[test]
fn bibliotheque_sans_script_sans_main() {
    let out = compile_str("int id(int x) { return x; }").unwrap();
    assert!(!out.contains("int main()"));
    assert!(out.ends_with("}\n"));
}
