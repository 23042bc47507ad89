//! TOML configuration file.
//!
//! ```toml
//! [ring]
//! capacity = 4096
//!
//! [drain]
//! tick_ms = 1
//!
//! [line]
//! baud = 115200   # 0 = unpaced
//!
//! [startup]
//! banner = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::event_loop::EventLoopConfig;
use crate::line::Pacing;
use crate::Result;

#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub drain: DrainConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub startup: StartupConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct RingConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct DrainConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct LineConfig {
    #[serde(default = "default_baud")]
    pub baud: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            baud: default_baud(),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct StartupConfig {
    #[serde(default = "default_banner")]
    pub banner: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            banner: default_banner(),
        }
    }
}

fn default_capacity() -> usize {
    dr_core::DEFAULT_CAPACITY
}
fn default_tick_ms() -> u64 {
    1
}
fn default_baud() -> u32 {
    115_200
}
fn default_banner() -> bool {
    true
}

impl Config {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn event_loop(&self) -> EventLoopConfig {
        EventLoopConfig {
            capacity: self.ring.capacity,
            tick: Duration::from_millis(self.drain.tick_ms),
            pacing: Pacing::from_baud(self.line.baud),
            banner: self.startup.banner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());

        let el = config.event_loop();
        assert_eq!(el.capacity, 4096);
        assert_eq!(el.tick, Duration::from_millis(1));
        assert_eq!(el.pacing, Pacing::Baud(115_200));
        assert!(el.banner);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [ring]
            capacity = 256

            [line]
            baud = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.ring.capacity, 256);
        assert_eq!(config.drain.tick_ms, 1);
        assert_eq!(config.event_loop().pacing, Pacing::Unpaced);
        assert!(config.startup.banner);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let err = Config::from_toml("[ring]\ncapacity = \"big\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/dr.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
