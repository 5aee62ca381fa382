use clap::Parser;
use demcrop_cli::{init_tracing, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    run(&cli)?;
    Ok(())
}
