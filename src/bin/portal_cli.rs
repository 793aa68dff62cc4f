use std::process;

use clap::Parser;
use crm_portal::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
