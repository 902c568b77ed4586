//! Configuration loading from harpbench.toml
//!
//! HarpBench configuration can be specified in a `harpbench.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up by [`HarpConfig::discover`]
pub const CONFIG_FILE: &str = "harpbench.toml";

/// HarpBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HarpConfig {
    /// Device configuration
    #[serde(default)]
    pub device: DeviceConfig,
    /// Built-in suite parameters
    #[serde(default)]
    pub suites: SuitesConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Device under test
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeviceConfig {
    /// Default endpoint when `--port` is not given
    #[serde(default)]
    pub port: Option<String>,
}

/// Parameters of the built-in suites
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuitesConfig {
    /// Round trip benchmark
    #[serde(default)]
    pub round_trip: RoundTripConfig,
    /// Timestamp register test
    #[serde(default)]
    pub timestamp: TimestampConfig,
}

/// Round trip benchmark parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTripConfig {
    /// Number of WhoAmI probes
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Largest tolerated gap between consecutive replies, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: f64,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_samples() -> usize {
    1000
}
fn default_max_delay_ms() -> f64 {
    4.0
}

/// Timestamp register test parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampConfig {
    /// Value written to the TimestampSeconds register
    #[serde(default = "default_seconds")]
    pub seconds: u32,
    /// Pause between write and read-back (e.g. "1ms")
    #[serde(default = "default_settle")]
    pub settle: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            seconds: default_seconds(),
            settle: default_settle(),
        }
    }
}

impl TimestampConfig {
    /// Parsed settle time
    pub fn settle_duration(&self) -> anyhow::Result<Duration> {
        HarpConfig::parse_duration(&self.settle)
    }
}

fn default_seconds() -> u32 {
    42
}
fn default_settle() -> String {
    "1ms".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Write a JSON report here after every run
    #[serde(default)]
    pub report_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            report_path: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl HarpConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {:#}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# HarpBench Configuration

[device]
# Default serial port (uncomment to enable; --port overrides it)
# port = "COM3"

[suites.round_trip]
# Number of WhoAmI probes sent back to back
samples = 1000
# Fail when two consecutive replies are further apart than this (ms)
max_delay_ms = 4.0

[suites.timestamp]
# Value written to the TimestampSeconds register
seconds = 42
# Pause between write and read-back
settle = "1ms"

[output]
# Default output format: human or json
format = "human"
# Write a JSON report after every run (uncomment to enable)
# report_path = "harpbench-report.json"
"#
        .to_string()
    }

    /// Write [`default_toml`](Self::default_toml) to `dir/harpbench.toml`.
    ///
    /// Fails if the file already exists.
    pub fn init(dir: &Path) -> anyhow::Result<PathBuf> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        std::fs::write(&path, Self::default_toml())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64).round() as u64))
    }
}
