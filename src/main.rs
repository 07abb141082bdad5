use anyhow::Result;
use clap::Parser;
use tensorlake_tool::cli;
use tracing::error;

fn main() -> Result<()> {
    // A missing .env file is not an error; the key may come from the shell.
    let _ = dotenvy::dotenv();
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
