use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;

use crate::cli::utils::{format_report, format_requirements, output_error};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{DatabaseManager, PgCatalog};
use crate::health::SchemaHealthValidator;

#[derive(Subcommand)]
pub enum HealthCommands {
    #[command(about = "Validate tables, row level security and the tenant function against DATABASE_URL")]
    Check,

    #[command(about = "Show the configured health requirements")]
    Requirements,

    #[command(about = "Query /health/status on a running server")]
    Ping {
        #[arg(help = "Server base URL, e.g. http://localhost:8080")]
        url: String,
    },
}

pub async fn handle(cmd: HealthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        HealthCommands::Check => check(output_format).await,
        HealthCommands::Requirements => {
            let config = config().context("failed to load configuration")?;
            config.validate()?;
            println!("{}", format_requirements(output_format, &config.health)?);
            Ok(())
        }
        HealthCommands::Ping { url } => ping(&url, output_format).await,
    }
}

async fn check(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config().context("failed to load configuration")?;
    config.validate().context("invalid health requirements")?;

    let database = DatabaseManager::from_config(&config.database)?;
    let validator = SchemaHealthValidator::new(
        PgCatalog::new(database.pool().clone()),
        config.health.clone(),
    );

    let report = validator.validate().await;
    database.close().await;

    println!("{}", format_report(output_format, &report)?);

    if report.status().is_up() {
        Ok(())
    } else {
        anyhow::bail!("schema health is {}", report.status())
    }
}

async fn ping(base_url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health/status", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            output_error(output_format, &format!("Failed to reach {}: {}", url, e))?;
            anyhow::bail!("server unreachable");
        }
    };

    let code = response.status();
    let body = response.text().await?;
    let status = body.trim();

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "url": url,
                "http_status": code.as_u16(),
                "status": status,
            }))?
        ),
        OutputFormat::Text => println!("{} ({})", status, code),
    }

    if code.is_success() && status == "UP" {
        Ok(())
    } else {
        anyhow::bail!("server reported {}", status)
    }
}
