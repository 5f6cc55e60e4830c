//! AgentaFlow health-check entry point

use agentaflow_healthcheck::cli::{self, Cli};
use agentaflow_healthcheck::logging;
use clap::Parser;

/// 設定エラー時の終了コード
const EXIT_CONFIG_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.run.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    match cli::execute(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    }
}
