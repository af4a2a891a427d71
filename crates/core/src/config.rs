use crate::devices::DEFAULT_SAMSUNG_ACE_MAX_NAME_LEN;
use crate::identity::IdentityTable;
use crate::metadata::{default_photo_extensions, SystemMetadataProvider};
use crate::rules::RuleSettings;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub probe_program: String,
    // 0 disables the timeout.
    pub probe_timeout_secs: u64,
    pub photo_extensions: Vec<String>,
    pub samsung_ace_max_name_len: usize,
    pub extra_identities: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            probe_program: "mediainfo".to_string(),
            probe_timeout_secs: 30,
            photo_extensions: default_photo_extensions(),
            samsung_ace_max_name_len: DEFAULT_SAMSUNG_ACE_MAX_NAME_LEN,
            extra_identities: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn metadata_provider(&self) -> SystemMetadataProvider {
        SystemMetadataProvider {
            probe_program: self.probe_program.clone(),
            probe_timeout: (self.probe_timeout_secs > 0)
                .then(|| Duration::from_secs(self.probe_timeout_secs)),
        }
    }

    pub fn identity_table(&self) -> IdentityTable {
        IdentityTable::with_extra(&self.extra_identities)
    }

    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            samsung_ace_max_name_len: self.samsung_ace_max_name_len,
        }
    }

    pub fn normalized_photo_extensions(&self) -> Vec<String> {
        self.photo_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("pt", "cackossoft", "media-renamer")
        .context("could not resolve the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    save_config_to(config, &paths.config_path)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory: {}", dir.display()))?;
    }
    let body = toml::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;
    Ok(())
}
