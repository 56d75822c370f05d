use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "PCIE215_CONFIG";
pub const LOG_ENV: &str = "PCIE215_LOG";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pcie215.toml";

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub device: Device,
    pub wait: Wait,
    pub log: Log,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Device {
    pub path: PathBuf,
    pub lines: u32,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            path: pcie215::DEVICE_PATH.into(),
            lines: pcie215::LINE_COUNT,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Wait {
    /// Give up waiting after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Wait {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Log {
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    /// `$PCIE215_CONFIG` if set, else `/etc/pcie215.toml` if present, else
    /// the defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_path(path);
        }

        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            return Self::from_path(path);
        }

        Ok(Self::default())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("can't read config [{}]", path.display()))?;
        content
            .parse()
            .with_context(|| format!("bad config [{}]", path.display()))
    }

    /// `$PCIE215_LOG` wins over the configured level.
    pub fn level(&self) -> Result<LevelFilter> {
        let level = env::var(LOG_ENV).unwrap_or_else(|_| self.log.level.clone());
        level
            .parse()
            .with_context(|| format!("unknown log level `{level}`"))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.device.path, Path::new("/dev/pcie215"));
        assert_eq!(config.device.lines, 6);
        assert_eq!(config.wait.timeout(), None);
    }

    #[test]
    fn partial() {
        let config: Config = r#"
            [device]
            path = "/dev/pcie215-1"

            [wait]
            timeout_secs = 3
        "#
        .parse()
        .unwrap();

        assert_eq!(config.device.path, Path::new("/dev/pcie215-1"));
        assert_eq!(config.device.lines, 6);
        assert_eq!(config.wait.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn rejects_bad_types() {
        assert!("[device]\nlines = \"six\"".parse::<Config>().is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = Config::default();
        config.wait.timeout_secs = Some(1);
        let text = config.to_toml().unwrap();
        assert_eq!(text.parse::<Config>().unwrap(), config);
    }

    #[test]
    fn from_missing_file() {
        let err = Config::from_path("/nonexistent/pcie215.toml").unwrap_err();
        assert!(err.to_string().contains("can't read config"));
    }
}
