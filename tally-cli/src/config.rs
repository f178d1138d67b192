use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::PipelineConfig;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: PipelineConfig,
}

/// Resolve which config file applies, if any.
/// An explicit path must exist; the default file is optional.
pub fn config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(p) if p.exists() => Ok(Some(p.to_path_buf())),
        Some(p) => bail!("config file not found: {}", p.display()),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            Ok(p.exists().then_some(p))
        }
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let Some(p) = config_path(explicit)? else {
        debug!("No config file, using defaults");
        return Ok(Config::default());
    };
    debug!("Loading config from {}", p.display());
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_ingest::FlowPolicy;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.toml");

        let mut cfg = Config::default();
        cfg.analysis.threshold = 1800.0;
        cfg.analysis.forecast.horizon = 4;
        cfg.analysis.parse.flow_policy = FlowPolicy::Strict;
        save_config(&path, &cfg).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[analysis]\nthreshold = 2500.0\n").unwrap();

        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.analysis.threshold, 2500.0);
        assert_eq!(cfg.analysis.forecast.horizon, 6);
        assert_eq!(cfg.analysis.parse.flow_policy, FlowPolicy::Lenient);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
