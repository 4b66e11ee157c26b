fn main() {
    if let Err(err) = hallazgos::cli::run() {
        hallazgos::ui::eprintln_error(&err);
        std::process::exit(hallazgos::exit::exit_code(&err));
    }
}
