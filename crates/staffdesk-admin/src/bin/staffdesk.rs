//! CLI entrypoint for staffdesk.

#[path = "staffdesk/cli.rs"]
mod cli;
#[path = "staffdesk/commands.rs"]
mod commands;
#[path = "staffdesk/style.rs"]
mod style;

use clap::Parser;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Err(err) = commands::run(cli) {
        eprintln!("{}", style::error(format!("Error: {err:#}")));
        std::process::exit(1);
    }
    Ok(())
}
