use anyhow::Result;
use clap::Parser;
use covered_call::config::{AppConfig, Cli};
use covered_call::provider::{fetch_and_run, CsvMarketData};
use covered_call::render;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;

    let provider = CsvMarketData::new(&config.data_dir);
    let outcome = fetch_and_run(
        &provider,
        &config.ticker,
        config.shares,
        config.as_of,
        &config.engine,
        config.deadline,
    )
    .await;

    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            error!(target: "engine", kind = err.kind(), error = %err, "no recommendation");
            eprintln!("{}", err.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_recommendation(&result)?;
    }

    if let Some(path) = &config.export_csv {
        render::export_ladder_csv(&result, path)?;
        info!(target: "export.csv", path = %path.display(), "allocation exported");
    }

    Ok(ExitCode::SUCCESS)
}
