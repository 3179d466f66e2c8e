//! CLI entry point for the sprite augmentation tool

use clap::Parser;
use spriteaug::io::cli::{Cli, DatasetBuilder};
use spriteaug::io::logging::init_logging;

fn main() -> spriteaug::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    let mut builder = DatasetBuilder::from_cli(&cli)?;
    builder.run()?;
    Ok(())
}
