// isopack/src/main.rs

mod cli;

use clap::Parser;

fn main() {
    pretty_env_logger::init();

    let args = cli::Args::parse();
    if let Err(e) = cli::run(args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
