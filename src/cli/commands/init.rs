//! `fleetcare init` command - create a project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::Project;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Re-create missing directories in an existing project
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let project = Project::init(&cwd, args.force).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized fleetcare project in {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  fleetcare asset new --name \"Moving head MH-7\"");
    println!("  fleetcare case new AST@1 --type repair");
    Ok(())
}
