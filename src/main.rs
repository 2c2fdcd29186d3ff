//! gh-sync CLI entry point.

use clap::Parser;

use gh_sync::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = cli::run(cli).await {
        cli::handle_error(&err, json);
    }
}
