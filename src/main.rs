use archistack::cli::{Cli, run_cli};
use archistack::output::OutputFormatter;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        OutputFormatter::error(&format!("Error: {}", e));
        std::process::exit(1);
    }
}
