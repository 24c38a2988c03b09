use clap::Parser;
use gm_core::cli::{run, Cli};

fn main() {
    let cli = Cli::parse();
    let code = run(cli);
    std::process::exit(code.as_i32());
}
