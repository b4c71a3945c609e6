fn main() {
    env_logger::init();

    if let Err(error) = cubeviz::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
