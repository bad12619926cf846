use std::process;

use balance_core::cli::{self, output, Args};
use balance_core::init;
use clap::Parser;

fn main() {
    init();
    let args = Args::parse();

    if let Err(err) = cli::run(args) {
        output::error(format!("Error: {err}"));
        process::exit(1);
    }
}
