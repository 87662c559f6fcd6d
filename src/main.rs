//! `desk`: a set of small console programs over the `deskwork` library.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
