use serde_json::json;

use crate::cli::OutputFormat;
use crate::health::{HealthReport, HealthRequirements};

/// Render a report as pretty JSON or as a status line plus one line per detail
pub fn format_report(output_format: OutputFormat, report: &HealthReport) -> anyhow::Result<String> {
    match output_format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let marker = if report.status().is_up() { "✓" } else { "✗" };
            let mut out = format!("{} {}", marker, report.status());
            for (key, value) in report.details() {
                let value = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                };
                out.push_str(&format!("\n  {}: {}", key, value));
            }
            Ok(out)
        }
    }
}

pub fn format_requirements(
    output_format: OutputFormat,
    requirements: &HealthRequirements,
) -> anyhow::Result<String> {
    match output_format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(requirements)?),
        OutputFormat::Text => {
            let probe = &requirements.tenant_function;
            Ok(format!(
                "{} (schema {})\n  required tables: {}\n  RLS tables: {}\n  tenant function: {}() -> {:?} (cleared setting: {})",
                requirements.context,
                requirements.schema,
                requirements.required_tables.join(", "),
                requirements.rls_required_tables.join(", "),
                probe.routine,
                probe.sentinel,
                probe.setting.as_deref().unwrap_or("none"),
            ))
        }
    }
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}
