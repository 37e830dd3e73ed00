//! `moku validate`: routing validation of a deployment configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use moku_core::config::load_config_toml;
use moku_core::{MokuConfig, RoutingReport};

/// Validate the routing of a configuration file; fails if any error is found.
pub fn run(config_path: &Path, report_format: &str) -> Result<()> {
    let config = load_config_toml(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let report = config.routing_report();

    println!("{}", render(&config, &report, report_format)?);

    if !report.is_valid() {
        bail!(
            "routing validation failed: {} error(s)",
            report.errors.len()
        );
    }
    Ok(())
}

fn render(config: &MokuConfig, report: &RoutingReport, format: &str) -> Result<String> {
    match format {
        "human" => Ok(format!(
            "{}\n{report}\nfingerprint: {}",
            config.platform(),
            config.fingerprint()
        )),
        "json" => {
            let json = serde_json::json!({
                "platform": config.platform().name,
                "valid": report.is_valid(),
                "connections": report.connections,
                "counts": report
                    .counts()
                    .iter()
                    .map(|(kind, n)| (kind.to_string(), serde_json::json!(n)))
                    .collect::<serde_json::Map<_, _>>(),
                "errors": report.errors,
                "fingerprint": config.fingerprint(),
            });
            Ok(serde_json::to_string_pretty(&json)?)
        }
        other => bail!("unknown report format: '{other}'. Choose: human, json"),
    }
}
