use crate::error::{MultitoolError, Result as PoolResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Environment ──────────────────────────────────────────────────────

pub const VOLUME_GROUP_KEY: &str = "MULTITOOL_VOLUME_GROUP";
pub const THINPOOL_KEY:     &str = "MULTITOOL_THINPOOL";

/// Names of the volume group and thin pool every drive is carved from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolNames {
    pub volume_group: String,
    pub thin_pool:    String,
}

impl PoolNames {
    /// Both keys are mandatory; there is no fallback.
    pub fn from_env() -> PoolResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> PoolResult<Self> {
        Ok(Self {
            volume_group: require(VOLUME_GROUP_KEY, &get)?,
            thin_pool:    require(THINPOOL_KEY, &get)?,
        })
    }
}

fn require(key: &str, get: &impl Fn(&str) -> Option<String>) -> PoolResult<String> {
    get(key).ok_or_else(|| MultitoolError::Configuration { key: key.to_string() })
}

// ── Settings file ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub drives: DrivesConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivesConfig {
    /// New drives are named <prefix><n>
    pub name_prefix: String,
    /// Size picker step, percent of the pool
    pub size_step_pct: u32,
    /// Size picker starting point, percent of the pool
    pub default_size_pct: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme: default, nord, mono
    pub theme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive used when RUST_LOG is unset
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            drives:  DrivesConfig::default(),
            ui:      UiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DrivesConfig {
    fn default() -> Self {
        Self { name_prefix: "Drive".into(), size_step_pct: 5, default_size_pct: 50 }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "default".into() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "multitool=info".into() }
    }
}

impl DrivesConfig {
    /// Step clamped to 1..=100 so the picker always moves.
    pub fn step(&self) -> u32 { self.size_step_pct.clamp(1, 100) }

    pub fn initial_pct(&self) -> u32 { self.default_size_pct.clamp(self.step(), 100) }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    /// Load the settings file, writing defaults on first run.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(Self::config_path);
        let Some(path) = path else { return Config::default() };
        match try_load(&path) {
            Ok(c)  => c,
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), error = %e, "bad config, using defaults");
                } else {
                    // best-effort
                    let _ = try_write_defaults(&path);
                }
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("multitool").join("multitool.toml"))
    }
}

fn try_load(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&text)?;
    Ok(cfg)
}

fn try_write_defaults(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# multitool configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_key_is_a_configuration_error() {
        let env: HashMap<&str, &str> = [(VOLUME_GROUP_KEY, "VolGroup00")].into();
        let err = PoolNames::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        match err {
            MultitoolError::Configuration { key } => assert_eq!(key, THINPOOL_KEY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reads_both_keys() {
        let env: HashMap<&str, &str> =
            [(VOLUME_GROUP_KEY, "VolGroup00"), (THINPOOL_KEY, "thinpool")].into();
        let names = PoolNames::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(names.volume_group, "VolGroup00");
        assert_eq!(names.thin_pool, "thinpool");
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("[drives]\nname_prefix = \"Disk\"\n").unwrap();
        assert_eq!(cfg.drives.name_prefix, "Disk");
        assert_eq!(cfg.drives.size_step_pct, 5);
        assert_eq!(cfg.ui.theme, "default");
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg: Config = toml::from_str(&text).unwrap();
        assert_eq!(cfg.drives.default_size_pct, 50);
        assert_eq!(cfg.logging.level, "multitool=info");
    }

    #[test]
    fn picker_bounds_are_clamped() {
        let d = DrivesConfig { name_prefix: "D".into(), size_step_pct: 0, default_size_pct: 400 };
        assert_eq!(d.step(), 1);
        assert_eq!(d.initial_pct(), 100);
    }
}
