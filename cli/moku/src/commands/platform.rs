//! `moku platform`: platform listing, description, templates and checks.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use moku_targets::parse::{
    discover_platforms, generate_template, load_platform_toml, platform_to_toml,
    validate_platform, Severity,
};
use moku_targets::{InstrumentKind, PlatformId, PlatformSpec};

/// List catalog platforms and any custom platforms in `project_dir/platforms`.
pub fn list(project_dir: &Path) -> Result<()> {
    print!("{}", render_list(project_dir)?);
    Ok(())
}

fn render_list(project_dir: &Path) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Catalog platforms:")?;
    for id in PlatformId::ALL {
        writeln!(out, "  {:<8} {}", id.as_str(), id.spec())?;
    }

    let custom = discover_platforms(project_dir)?;
    if !custom.is_empty() {
        writeln!(out)?;
        writeln!(out, "Custom platforms:")?;
        for (name, path) in custom {
            writeln!(out, "  {name:<8} {}", path.display())?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Use 'moku platform describe <name>' for details.")?;
    Ok(out)
}

/// Resolve a catalog platform, falling back to `platforms/<name>.platform.toml`.
pub fn resolve_platform(name: &str, project_dir: &Path) -> Result<PlatformSpec> {
    if let Ok(spec) = PlatformSpec::resolve(name) {
        return Ok(spec.clone());
    }
    let custom = discover_platforms(project_dir)?;
    match custom.into_iter().find(|(stem, _)| stem == name) {
        Some((_, path)) => load_platform_toml(&path)
            .with_context(|| format!("loading {}", path.display())),
        None => bail!(
            "unknown platform: '{name}'. Use 'moku platform list' to see available platforms."
        ),
    }
}

/// Describe a platform in detail.
pub fn describe(name: &str, project_dir: &Path, format: Option<&str>) -> Result<()> {
    let platform = resolve_platform(name, project_dir)?;
    match format {
        Some("toml") => print!("{}", platform_to_toml(&platform)?),
        None | Some("human") => print!("{}", render_description(&platform)?),
        Some(other) => bail!("unknown format: '{other}'. Choose: human, toml"),
    }
    Ok(())
}

fn render_description(platform: &PlatformSpec) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "=== Platform: {} ===", platform.name)?;
    writeln!(out, "Hardware id: {}", platform.hardware_id)?;
    writeln!(out, "Slots:       {}", platform.slot_count)?;
    writeln!(
        out,
        "Clock:       {} Hz ({:.3} ns)",
        platform.clock_rate_hz,
        platform.clock_period_ns()
    )?;
    writeln!(out, "DIO pins:    {}", platform.digital_io_pin_count)?;
    writeln!(out)?;

    writeln!(out, "--- Physical ports ---")?;
    for port in platform.analog_inputs().iter().chain(&platform.analog_outputs()) {
        match &port.characteristics {
            Some(c) => writeln!(
                out,
                "  {:<8} {}-bit {} MSa/s {} Vpp {}",
                port.port_id, c.resolution_bits, c.sample_rate_msa, c.voltage_range_vpp, c.impedance
            )?,
            None => writeln!(out, "  {}", port.port_id)?,
        }
    }
    if let Some(dio) = platform.dio_header() {
        match &dio.characteristics {
            Some(c) => writeln!(
                out,
                "  DIO      {} pins, {} logic ({} tolerant), {} MSa/s",
                dio.num_pins, c.logic_level, c.voltage_tolerant, c.sample_rate_msa
            )?,
            None => writeln!(out, "  DIO      {} pins", dio.num_pins)?,
        }
    }
    writeln!(out)?;

    writeln!(out, "--- Instruments ---")?;
    for kind in InstrumentKind::ALL {
        let Some(ports) = platform.instrument_ports(kind) else {
            continue;
        };
        let letters = |s: &[char]| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.iter().collect()
            }
        };
        writeln!(
            out,
            "  {:<27} in: {:<5} out: {}",
            kind.name(),
            letters(ports.inputs.as_slice()),
            letters(ports.outputs.as_slice())
        )?;
    }
    Ok(out)
}

/// Print a template `.platform.toml`.
pub fn template(name: &str) -> Result<()> {
    print!("{}", generate_template(name)?);
    Ok(())
}

/// Validate a platform file; fails when any issue is an error.
pub fn check(file: &Path) -> Result<()> {
    let (text, errors) = render_check(file)?;
    print!("{text}");
    if errors > 0 {
        bail!("platform check failed: {errors} error(s)");
    }
    Ok(())
}

fn render_check(file: &Path) -> Result<(String, usize)> {
    let platform =
        load_platform_toml(file).with_context(|| format!("loading {}", file.display()))?;
    let mut out = String::new();
    let mut errors = 0;
    match validate_platform(&platform) {
        Ok(()) => writeln!(out, "{}: OK", platform.name)?,
        Err(issues) => {
            for issue in &issues {
                let label = match issue.severity {
                    Severity::Error => {
                        errors += 1;
                        "error"
                    }
                    Severity::Warning => "warning",
                };
                writeln!(out, "{label}: {}", issue.message)?;
            }
        }
    }
    Ok((out, errors))
}
