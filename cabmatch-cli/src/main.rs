//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::{Builder, Env};

fn main() {
    Builder::from_env(Env::new().filter_or("CABMATCH_LOG", "warn")).init();
    if let Err(err) = cabmatch_cli::run() {
        eprintln!("cabmatch: {err}");
        std::process::exit(1);
    }
}
