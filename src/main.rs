//! CLI entry point for Wave Function Collapse image generation

use clap::Parser;
use tilecollapse::io::cli::{Cli, Generator};

fn main() -> tilecollapse::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut generator = Generator::new(cli);
    generator.process()
}
