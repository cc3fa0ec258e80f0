fn main() {
    if let Err(err) = taskgraph_engine::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
