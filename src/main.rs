use clap::Parser;
use folioback::cli::{init_tracing, run, Cli};

fn main() -> std::process::ExitCode {
    init_tracing();
    run(Cli::parse())
}
