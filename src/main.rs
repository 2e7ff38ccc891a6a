mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 初始化日志系统
    pingfile::logger::init_logger();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cli::run(args).await,
        Commands::Install => cli::install(),
    }
}
