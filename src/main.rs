use clap::Parser;
use unrent::cli::{Cli, run};

#[tokio::main]
async fn main() {
    unrent::logging::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
