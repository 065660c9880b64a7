use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::error;

use cv_tailor::cli::Cli;
use cv_tailor::config::Config;
use cv_tailor::error::AppError;
use cv_tailor::models::format_report;
use cv_tailor::orchestrator::{App, RunOutcome};
use cv_tailor::utils::logging::FILE_ONLY_TARGET;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(RunOutcome::Exported { .. }) => ExitCode::SUCCESS,
        Ok(RunOutcome::Abandoned { section }) => {
            eprintln!(
                "{} {} rejected, nothing exported",
                "Aborted:".red().bold(),
                section
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化并运行应用
    let app = App::initialize(config, cli).await?;
    Ok(app.run().await?)
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Validation(validation)) => {
            eprintln!(
                "{}",
                format_report(validation, std::io::stderr().is_terminal())
            );
        }
        _ => {
            // 终端只打印一次
            error!(target: FILE_ONLY_TARGET, "❌ {:#}", err);
            eprintln!("{} {:#}", "Error:".red().bold(), err);
        }
    }
}
