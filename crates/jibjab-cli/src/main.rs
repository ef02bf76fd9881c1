fn main() {
    env_logger::init();
    match jibjab_cli::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("erreur: {e:#}");
            std::process::exit(2);
        }
    }
}
