use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::CapacityConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub capacity: CapacityDefaults,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Caps applied when a request leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityDefaults {
    #[serde(default = "default_max_posts_per_day")]
    pub max_posts_per_day: usize,
    #[serde(default = "default_max_posts_per_platform_day")]
    pub max_posts_per_platform_day: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_true")]
    pub approximate_enabled: bool,
    #[serde(default = "default_approximate_slot_limit")]
    pub approximate_slot_limit: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_reps")]
    pub reps: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Program plus arguments for an out-of-process engine. Empty means none.
    #[serde(default)]
    pub external_command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_posts_per_day: Option<usize>,
    pub max_posts_per_platform_day: Option<usize>,
    pub classical_only: bool,
    pub max_iterations: Option<u32>,
    pub seed: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/slot-optimizer/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::from_toml(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.max_posts_per_day {
            self.capacity.max_posts_per_day = v;
        }
        if let Some(v) = overrides.max_posts_per_platform_day {
            self.capacity.max_posts_per_platform_day = v;
        }
        if overrides.classical_only {
            self.solver.approximate_enabled = false;
        }
        if let Some(v) = overrides.max_iterations {
            self.solver.max_iterations = v;
        }
        if let Some(v) = overrides.seed {
            self.solver.seed = v;
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"# Used when a request omits its own caps.
[capacity]
max_posts_per_day = 3
max_posts_per_platform_day = 1

[solver]
approximate_enabled = true
# Catalogs above this size go straight to the greedy solver.
approximate_slot_limit = 30
max_iterations = 100
reps = 2
seed = 7
# e.g. ["python3", "qaoa_bridge.py"]
external_command = []

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

impl CapacityDefaults {
    pub fn as_capacity(&self) -> CapacityConfig {
        CapacityConfig {
            max_per_day: self.max_posts_per_day,
            max_per_platform_day: self.max_posts_per_platform_day,
        }
    }
}

impl Default for CapacityDefaults {
    fn default() -> Self {
        Self {
            max_posts_per_day: default_max_posts_per_day(),
            max_posts_per_platform_day: default_max_posts_per_platform_day(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            approximate_enabled: true,
            approximate_slot_limit: default_approximate_slot_limit(),
            max_iterations: default_max_iterations(),
            reps: default_reps(),
            seed: default_seed(),
            external_command: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_max_posts_per_day() -> usize {
    3
}

fn default_max_posts_per_platform_day() -> usize {
    1
}

fn default_approximate_slot_limit() -> usize {
    30
}

fn default_max_iterations() -> u32 {
    100
}

fn default_reps() -> u32 {
    2
}

fn default_seed() -> u64 {
    7
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}
