use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::provider::{ClaudeConfig, GptConfig, ProviderKind};

/// Resolved runtime settings for one orchestration run.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub profile: String,
    pub config_path: String,
    pub project_id: String,
    pub default_provider: ProviderKind,
    pub enable_fallback: bool,
    pub gpt: Option<GptConfig>,
    pub claude: Option<ClaudeConfig>,
    pub max_concurrent_workflows: usize,
    pub retry_attempts: u32,
    pub telemetry_enabled: bool,
    pub telemetry_path: String,
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            config_path: ".crewflow/config.toml".to_string(),
            project_id: "default-project".to_string(),
            default_provider: ProviderKind::Auto,
            enable_fallback: true,
            gpt: Some(GptConfig::default()),
            claude: Some(ClaudeConfig::default()),
            max_concurrent_workflows: 5,
            retry_attempts: 3,
            telemetry_enabled: false,
            telemetry_path: ".crewflow/telemetry.jsonl".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub project_id: Option<String>,
    pub default_provider: Option<ProviderKind>,
    pub enable_fallback: Option<bool>,
    pub gpt: Option<GptConfig>,
    pub claude: Option<ClaudeConfig>,
    pub max_concurrent_workflows: Option<usize>,
    pub retry_attempts: Option<u32>,
    pub telemetry_enabled: Option<bool>,
    pub telemetry_path: Option<String>,
    pub log_filter: Option<String>,
}

pub fn load_profiles(config_path: &str) -> Result<ProfilesFile> {
    let path = Path::new(config_path);
    if !path.exists() {
        return Ok(ProfilesFile::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile config file at '{}'", path.display()))?;
    toml::from_str::<ProfilesFile>(&content).with_context(|| {
        format!(
            "invalid profile configuration in '{}'. Check provider values and field names.",
            path.display()
        )
    })
}

/// Layer a named profile over the built-in defaults.
///
/// Unknown profile names fall back to defaults; the "default" profile is
/// implicit and may be absent from the file.
pub fn resolve_runtime_config(
    profiles: &ProfilesFile,
    profile_name: &str,
    config_path: &str,
) -> Result<RuntimeConfig> {
    let mut cfg = RuntimeConfig {
        profile: profile_name.to_string(),
        config_path: config_path.to_string(),
        ..RuntimeConfig::default()
    };

    let Some(profile) = profiles.profiles.get(profile_name) else {
        if profile_name != "default" && !profiles.profiles.is_empty() {
            anyhow::bail!(
                "profile '{}' not found in '{}'. Available: {}",
                profile_name,
                config_path,
                profile_names(profiles).join(", ")
            );
        }
        return Ok(cfg);
    };

    if let Some(project_id) = &profile.project_id {
        cfg.project_id = project_id.clone();
    }
    if let Some(provider) = profile.default_provider {
        cfg.default_provider = provider;
    }
    if let Some(enable_fallback) = profile.enable_fallback {
        cfg.enable_fallback = enable_fallback;
    }
    if let Some(gpt) = &profile.gpt {
        cfg.gpt = Some(gpt.clone());
    }
    if let Some(claude) = &profile.claude {
        cfg.claude = Some(claude.clone());
    }
    if let Some(max_concurrent) = profile.max_concurrent_workflows {
        if max_concurrent == 0 {
            anyhow::bail!("max_concurrent_workflows must be at least 1");
        }
        cfg.max_concurrent_workflows = max_concurrent;
    }
    if let Some(retry_attempts) = profile.retry_attempts {
        cfg.retry_attempts = retry_attempts;
    }
    if let Some(enabled) = profile.telemetry_enabled {
        cfg.telemetry_enabled = enabled;
    }
    if let Some(path) = &profile.telemetry_path {
        cfg.telemetry_path = path.clone();
    }
    if let Some(filter) = &profile.log_filter {
        cfg.log_filter = filter.clone();
    }

    Ok(cfg)
}

fn profile_names(profiles: &ProfilesFile) -> Vec<String> {
    let mut names: Vec<String> = profiles.profiles.keys().cloned().collect();
    names.sort();
    names
}
