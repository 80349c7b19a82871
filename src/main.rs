use clap::Parser;
use fieldkit::cli::{self, Cli};
use fieldkit::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;

    let command = Cli::parse().command;
    tracing::debug!("Running {:?}", command);

    let output = cli::run(command).await?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
