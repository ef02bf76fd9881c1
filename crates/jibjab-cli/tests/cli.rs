//! Tests d'intégration du CLI : E-S fichier, codes de sortie, diagnostics.

use camino::{Utf8Path, Utf8PathBuf};
use jibjab_cli::{cmd_ast, cmd_build, cmd_check};
use jibjab_compiler::{Compiler, Diagnostic};

const FIB_JJ: &str = "\
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

fn write_source(dir: &Utf8Path, name: &str, contents: &str) -> Utf8PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, contents).unwrap();
    p
}

fn tmp() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

#[test]
fn build_ecrit_le_fichier_de_sortie() {
    let (_g, dir) = tmp();
    let input = write_source(&dir, "fib.jj", FIB_JJ);
    let output = dir.join("fib.c");
    let code = cmd_build(&input, Some(&output), false).unwrap();
    assert_eq!(code, 0);
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("// Transpiled from JibJab\n"));
    assert!(text.contains("int main() {"));
}

#[test]
fn build_sortie_par_defaut_en_extension_c() {
    let (_g, dir) = tmp();
    let input = write_source(&dir, "fib.jj", FIB_JJ);
    let code = cmd_build(&input, None, false).unwrap();
    assert_eq!(code, 0);
    assert!(dir.join("fib.c").exists());
}

#[test]
fn echec_ne_laisse_aucune_sortie() {
    let (_g, dir) = tmp();
    let input = write_source(&dir, "casse.jj", "int f(int a) { return a }");
    let output = dir.join("casse.c");
    let code = cmd_build(&input, Some(&output), false).unwrap();
    assert_eq!(code, 1);
    assert!(!output.exists());
}

#[test]
fn check_valide_et_invalide() {
    let (_g, dir) = tmp();
    let bon = write_source(&dir, "bon.jj", FIB_JJ);
    let mauvais = write_source(&dir, "mauvais.jj", "print(inconnu(1));");
    assert_eq!(cmd_check(&bon, false).unwrap(), 0);
    assert_eq!(cmd_check(&mauvais, false).unwrap(), 1);
}

#[test]
fn ast_dump_ok() {
    let (_g, dir) = tmp();
    let input = write_source(&dir, "fib.jj", FIB_JJ);
    assert_eq!(cmd_ast(&input, false).unwrap(), 0);
    assert_eq!(cmd_ast(&input, true).unwrap(), 0);
}

#[test]
fn fichier_manquant_est_une_erreur_es() {
    let (_g, dir) = tmp();
    let absent = dir.join("absent.jj");
    assert!(cmd_check(&absent, false).is_err());
}

#[test]
fn diagnostic_json_structure() {
    let err = Compiler::default().compile_str("print(inconnu(1));").unwrap_err();
    let v = serde_json::to_value(Diagnostic::from(&err)).unwrap();
    assert_eq!(v["severity"], "error");
    assert_eq!(v["kind"], "unknown-function");
    assert_eq!(v["line"], 1);
    assert_eq!(v["col"], 7);
    assert!(v["message"].as_str().unwrap().contains("inconnu"));
}
