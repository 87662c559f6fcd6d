use std::path::Path;

use anyhow::Context;
use deskwork::Config;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Overwrite an existing configuration file
    #[arg(long)]
    force: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, path: &Path) -> anyhow::Result<()> {
        if path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite it)",
                path.display()
            );
        }

        Config::default()
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        println!("Wrote default configuration to {}", path.display());
        println!();
        println!("Next steps:");
        println!("  desk inventory       # open the inventory menu");
        println!("  desk dashboard       # browse the configured units");
        Ok(())
    }
}
