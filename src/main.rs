fn main() {
    if let Err(err) = nested_treemap::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
