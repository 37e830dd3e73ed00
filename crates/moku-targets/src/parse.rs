//! TOML parsing, serialization, validation, and discovery for platform definitions.
//!
//! Custom platforms are stored as `.platform.toml` files in the `platforms/`
//! directory of a deployment project. The predefined catalog never goes
//! through this module.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, TargetError};
use crate::platform::PlatformSpec;

const PLATFORM_FILE_SUFFIX: &str = ".platform.toml";

/// Severity of a platform validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A validation issue found in a platform definition.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Load a platform from a `.platform.toml` file.
pub fn load_platform_toml(path: &Path) -> Result<PlatformSpec> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let platform = parse_platform_toml(&content)?;
    tracing::debug!(path = %path.display(), platform = %platform.name, "loaded platform file");
    Ok(platform)
}

/// Parse a platform from a TOML string.
pub fn parse_platform_toml(toml_str: &str) -> Result<PlatformSpec> {
    let platform: PlatformSpec = toml::from_str(toml_str)?;
    Ok(platform)
}

/// Serialize a platform to pretty TOML.
pub fn platform_to_toml(platform: &PlatformSpec) -> Result<String> {
    let toml_str = toml::to_string_pretty(platform)?;
    Ok(toml_str)
}

/// Validate a platform definition for structural correctness.
///
/// Returns `Ok(())` if there are no issues, or `Err(issues)` otherwise.
/// Warnings are reported alongside errors; use [`has_errors`] to decide
/// whether a platform is usable.
pub fn validate_platform(platform: &PlatformSpec) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if platform.name.trim().is_empty() {
        issues.push(ValidationIssue::error("platform name is empty"));
    }

    if !(2..=4).contains(&platform.slot_count) {
        issues.push(ValidationIssue::error(format!(
            "slot count {} is outside the supported range 2-4",
            platform.slot_count
        )));
    }

    if platform.analog_input_count == 0 {
        issues.push(ValidationIssue::error("platform has no analog inputs"));
    }
    if platform.analog_output_count == 0 {
        issues.push(ValidationIssue::error("platform has no analog outputs"));
    }

    if platform.clock_rate_hz == 0 {
        issues.push(ValidationIssue::error("clock rate must be positive"));
    }

    if platform.instrument_ports.is_empty() {
        issues.push(ValidationIssue::error("platform supports no instruments"));
    }

    if let Some(front_end) = &platform.analog_front_end {
        for (direction, c) in [("input", &front_end.input), ("output", &front_end.output)] {
            if c.resolution_bits == 0 || c.sample_rate_msa == 0 {
                issues.push(ValidationIssue::error(format!(
                    "analog {direction} resolution and sample rate must be positive"
                )));
            }
            if c.voltage_range_vpp.is_nan() || c.voltage_range_vpp <= 0.0 {
                issues.push(ValidationIssue::error(format!(
                    "analog {direction} voltage range must be positive"
                )));
            }
        }
    }

    if platform.dio_characteristics.is_some() && platform.digital_io_pin_count == 0 {
        issues.push(ValidationIssue::warning(
            "DIO characteristics given for a platform without DIO pins",
        ));
    }

    let mut seen = HashSet::new();
    for entry in &platform.instrument_ports {
        if !seen.insert(entry.instrument) {
            issues.push(ValidationIssue::error(format!(
                "instrument {} is listed more than once",
                entry.instrument
            )));
        }

        for (direction, suffixes) in [("input", &entry.inputs), ("output", &entry.outputs)] {
            let mut letters = HashSet::new();
            for &suffix in suffixes {
                if !suffix.is_ascii_uppercase() {
                    issues.push(ValidationIssue::error(format!(
                        "instrument {} has invalid {direction} suffix '{suffix}' (expected A-Z)",
                        entry.instrument
                    )));
                }
                if !letters.insert(suffix) {
                    issues.push(ValidationIssue::error(format!(
                        "instrument {} repeats {direction} suffix '{suffix}'",
                        entry.instrument
                    )));
                }
            }
        }

        if entry.is_empty() {
            issues.push(ValidationIssue::warning(format!(
                "instrument {} exposes no ports",
                entry.instrument
            )));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Whether any issue in the list is an error rather than a warning.
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Validate, failing if any issue is an error. Warnings are returned.
pub fn ensure_valid(platform: &PlatformSpec) -> Result<Vec<ValidationIssue>> {
    match validate_platform(platform) {
        Ok(()) => Ok(Vec::new()),
        Err(issues) => {
            let errors: Vec<&str> = issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .map(|i| i.message.as_str())
                .collect();
            if errors.is_empty() {
                Ok(issues)
            } else {
                Err(TargetError::Validation {
                    detail: errors.join("; "),
                })
            }
        }
    }
}

/// Generate a template `.platform.toml` for a new platform.
///
/// Seeds from Moku:Go with the given custom name.
pub fn generate_template(name: &str) -> Result<String> {
    let mut platform = PlatformSpec::moku_go();
    platform.name = name.into();
    platform.hardware_id = name.to_ascii_lowercase();
    platform_to_toml(&platform)
}

/// Discover all `.platform.toml` files in a project's `platforms/` directory.
///
/// Returns a list of (platform_name, file_path) pairs sorted by name.
pub fn discover_platforms(project_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let platforms_dir = project_dir.join("platforms");
    if !platforms_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut platforms = Vec::new();
    for entry in std::fs::read_dir(&platforms_dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(PLATFORM_FILE_SUFFIX))
            .map(str::to_string);
        if let Some(name) = name {
            platforms.push((name, path));
        }
    }
    platforms.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(platforms)
}
