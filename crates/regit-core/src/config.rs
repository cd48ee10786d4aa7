use crate::constants;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vcs: VcsConfig,
    #[serde(default)]
    pub update: UpdateConfig,
    #[serde(default)]
    pub init: InitConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Synchronize bases and dependencies before the branch itself.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    #[serde(default = "default_base")]
    pub default_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_ignore_whitespace")]
    pub ignore_whitespace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_git_binary() -> String {
    "git".into()
}
fn default_base() -> String {
    "master".into()
}
fn default_ignore_whitespace() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
        }
    }
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            default_base: default_base(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            ignore_whitespace: default_ignore_whitespace(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration with layered precedence:
    /// 1. Environment variables `REGIT_<SECTION>_<KEY>` (highest priority)
    /// 2. Explicit config file (from `--config`)
    /// 3. Project config: `<repo_root>/.regit/config.toml`
    /// 4. Global config: `~/.regit/config.toml`
    /// 5. Built-in defaults (lowest priority)
    ///
    /// Only fields explicitly set in a higher-priority file override lower layers.
    pub fn load(repo_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_file(repo_root, None)
    }

    /// Load configuration with an explicit config file path.
    pub fn load_with_file(
        repo_root: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let global = dirs::home_dir().map(|home| {
            home.join(constants::DEFAULT_CONFIG_DIR)
                .join("config.toml")
        });
        Self::load_layers(global.as_deref(), repo_root, config_file)
    }

    fn load_layers(
        global_path: Option<&Path>,
        repo_root: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        if let Some(global_path) = global_path
            && global_path.exists()
        {
            let raw = load_toml_value(global_path)?;
            merge_toml_values(&mut merged, &raw);
        }

        if let Some(root) = repo_root {
            let project_path = root.join(constants::PROJECT_CONFIG_FILE);
            if project_path.exists() {
                let raw = load_toml_value(&project_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(cf) = config_file {
            if !cf.exists() {
                return Err(ConfigError::NotFound {
                    path: cf.display().to_string(),
                });
            }
            let raw = load_toml_value(cf)?;
            merge_toml_values(&mut merged, &raw);
        }

        let config_str =
            toml::to_string(&merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let mut config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vcs.git_binary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vcs.git_binary".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.init.default_base.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "init.default_base".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Load a TOML file as a raw `toml::Value` (preserving only explicitly-set fields).
fn load_toml_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    content
        .parse::<toml::Value>()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Deep-merge `overlay` into `base`. Only keys present in `overlay` are written.
fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    if let (toml::Value::Table(base_map), toml::Value::Table(overlay_map)) = (base, overlay) {
        for (key, overlay_val) in overlay_map {
            if let Some(base_val) = base_map.get_mut(key) {
                if base_val.is_table() && overlay_val.is_table() {
                    merge_toml_values(base_val, overlay_val);
                } else {
                    *base_val = overlay_val.clone();
                }
            } else {
                base_map.insert(key.clone(), overlay_val.clone());
            }
        }
    }
}

/// Apply environment variable overrides to config fields.
/// Convention: `REGIT_<SECTION>_<KEY>` in UPPER_SNAKE_CASE.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("REGIT_VCS_GIT_BINARY") {
        config.vcs.git_binary = v;
    }
    if let Ok(v) = std::env::var("REGIT_UPDATE_RECURSIVE") {
        config.update.recursive = parse_flag(&v);
    }
    if let Ok(v) = std::env::var("REGIT_INIT_DEFAULT_BASE") {
        config.init.default_base = v;
    }
    if let Ok(v) = std::env::var("REGIT_EXPORT_IGNORE_WHITESPACE") {
        config.export.ignore_whitespace = parse_flag(&v);
    }
    if let Ok(v) = std::env::var("REGIT_LOGGING_LEVEL") {
        config.logging.level = v;
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
