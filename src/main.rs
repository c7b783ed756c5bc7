use clap::{Parser, builder::styling};
use eyre::Result;
use monday_asset_sync::{SyncConfig, sync::sync_board};
use owo_colors::OwoColorize;
use std::process::ExitCode;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Replace the undeclared assets table with the current monday.com board
#[derive(Parser)]
#[command(name = "monday-sync", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("An error occurred: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match dotenvy::from_filename(&cli.env) {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No {} file, using process environment", cli.env),
        Err(e) => return Err(e.into()),
    }

    let config = SyncConfig::from_env()?;
    let report = sync_board(&config).await?;

    log::info!(
        "Data successfully inserted into {}: {} rows ({} of {} items skipped)",
        config.sql.table.bright_white(),
        report.loaded.green(),
        report.skipped,
        report.extracted
    );
    Ok(())
}
