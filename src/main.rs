use clap::Parser;
use miette::Result;
use tracing::Level;

use fleetcare::cli::{Cli, Commands};

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let level = match cli.global.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Init(args) => fleetcare::cli::commands::init::run(args),
        Commands::Asset(cmd) => fleetcare::cli::commands::asset::run(cmd, &global),
        Commands::Case(cmd) => fleetcare::cli::commands::case::run(cmd, &global),
        Commands::Completions(args) => fleetcare::cli::commands::completions::run(args),
    }
}
