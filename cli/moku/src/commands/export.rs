//! `moku export`: print a configuration in export form.

use std::path::Path;

use anyhow::{bail, Context, Result};
use moku_core::config::{config_to_toml, load_config_toml};
use moku_core::MokuConfig;

/// Export a configuration file. Routing is not validated.
pub fn run(config_path: &Path, format: &str) -> Result<()> {
    let config = load_config_toml(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    print!("{}", render(&config, format)?);
    Ok(())
}

fn render(config: &MokuConfig, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(&config.to_dict())? + "\n"),
        "toml" => Ok(config_to_toml(config)?),
        other => bail!("unknown export format: '{other}'. Choose: json, toml"),
    }
}
