use clap::Parser;
use shortsheet::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
