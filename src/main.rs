fn main() {
    if let Err(err) = netcanvas::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
