//! CLI entrypoint for the oversize-allocation scenario runner.
//!
//! Runs exactly one scenario, announces it on stderr, and prints the
//! resulting address as `x: 0` when the allocator returned null. Exits
//! zero only when the result was null; a terminate-mode run never reaches
//! the print.

use clap::Parser;

use wardalloc_harness::Scenario;

/// Drive one oversize allocation through the configured failure mode.
#[derive(Debug, Parser)]
#[command(name = "oversize")]
#[command(about = "Oversize-allocation scenario runner for wardalloc")]
struct Cli {
    /// Scenario to run.
    #[arg(value_enum)]
    scenario: Scenario,
}

fn main() {
    let cli = Cli::parse();

    eprintln!("{}:", cli.scenario.name());
    let x = cli.scenario.run();
    eprintln!("x: {x:x}");

    std::process::exit(i32::from(x != 0));
}
