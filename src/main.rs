use clap::Parser;
use macross::cli::{Cli, init_tracing, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    run(cli)
}
