//! `moku device`: device cache inspection.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use moku_discovery::DeviceCache;

/// The cache file to use: the explicit path, or the default location.
pub fn cache_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path,
        None => DeviceCache::default_path()?,
    };
    tracing::debug!(path = %path.display(), "using device cache");
    Ok(path)
}

fn load(path: &Path) -> Result<DeviceCache> {
    DeviceCache::load(path).with_context(|| format!("loading device cache {}", path.display()))
}

/// List cached devices.
pub fn list(path: &Path) -> Result<()> {
    print!("{}", render_list(&load(path)?)?);
    Ok(())
}

fn render_list(cache: &DeviceCache) -> Result<String> {
    let mut out = String::new();
    if cache.is_empty() {
        writeln!(out, "No cached devices.")?;
        return Ok(out);
    }
    writeln!(out, "Cached devices ({}):", cache.len())?;
    for device in cache.devices() {
        writeln!(out, "  {device}")?;
    }
    Ok(out)
}

/// Print the device matching an IP, name or serial number.
pub fn find(path: &Path, identifier: &str) -> Result<()> {
    let cache = load(path)?;
    match cache.find_by_identifier(identifier) {
        Some(device) => {
            println!("{device}");
            Ok(())
        }
        None => bail!("no cached device matches '{identifier}'"),
    }
}

/// Empty the cache file.
pub fn clear(path: &Path) -> Result<()> {
    let mut cache = load(path)?;
    let removed = cache.len();
    cache.clear();
    cache
        .save(path)
        .with_context(|| format!("saving device cache {}", path.display()))?;
    println!("Removed {removed} cached device(s).");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use moku_discovery::MokuDeviceInfo;

    fn seeded(dir: &Path) -> PathBuf {
        let path = dir.join("device_cache.json");
        let mut cache = DeviceCache::new();
        cache.add_device(
            MokuDeviceInfo::new("192.168.1.100", "2025-10-24T23:30:00")
                .with_name("Lilo")
                .with_serial("MG106B"),
        );
        cache.save(&path).unwrap();
        path
    }

    #[test]
    fn explicit_path_wins() {
        let path = cache_path(Some(PathBuf::from("/tmp/x.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn list_renders_devices() {
        let dir = tempfile::tempdir().unwrap();
        let cache = load(&seeded(dir.path())).unwrap();
        let text = render_list(&cache).unwrap();
        assert!(text.starts_with("Cached devices (1):"));
        assert!(text.contains("192.168.1.100:80 Lilo (MG106B)"));

        assert_eq!(
            render_list(&DeviceCache::new()).unwrap(),
            "No cached devices.\n"
        );
    }

    #[test]
    fn find_by_name_or_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded(dir.path());
        assert!(find(&path, "lilo").is_ok());
        assert!(find(&path, "stitch").is_err());
    }

    #[test]
    fn clear_empties_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded(dir.path());
        clear(&path).unwrap();
        assert!(DeviceCache::load(&path).unwrap().is_empty());
    }
}
