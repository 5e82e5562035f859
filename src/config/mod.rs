pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::conversion::DispatchPolicy;
use crate::settings::{validate_image_dpi, validate_image_quality, ConverterSettings};
use imgconvert_common::ConfigurationError;

/// Environment variables consulted for the API secret, in order.
pub const SECRET_ENV_VARS: &[&str] = &["IMGCONVERT_API_SECRET", "CONVERTAPI_SECRET"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare_config(&mut config);
    validate_config(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./imgconvert.toml",
        "~/.config/imgconvert/config.toml",
        "/etc/imgconvert/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    prepare_config(&mut config);
    Ok(config)
}

/// Apply environment overrides and expand `~` in paths.
fn prepare_config(config: &mut Config) {
    if let Some(secret) = secret_from_env() {
        config.api.secret = Some(secret);
    }

    if let Some(ref dir) = config.conversion.output_dir {
        let expanded = shellexpand::tilde(&dir.to_string_lossy()).into_owned();
        config.conversion.output_dir = Some(expanded.into());
    }
}

fn secret_from_env() -> Option<String> {
    SECRET_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    validate_image_quality(config.conversion.image_quality)?;
    validate_image_dpi(config.conversion.image_dpi)?;
    config.dispatch_policy()?;

    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url cannot be empty");
    }

    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs cannot be 0");
    }

    if config.api.secret.is_none() {
        tracing::warn!(
            "No API secret configured; set api.secret or {}",
            SECRET_ENV_VARS.join(" / ")
        );
    }

    Ok(())
}

impl Config {
    /// Build validated converter settings from the `[api]` and
    /// `[conversion]` sections.
    pub fn converter_settings(&self) -> imgconvert_common::Result<ConverterSettings> {
        let secret = self.api.secret.clone().ok_or_else(|| {
            ConfigurationError::invalid(
                "api_credential",
                format!(
                    "no API secret configured (set api.secret or {})",
                    SECRET_ENV_VARS.join(" / ")
                ),
            )
        })?;

        let mut builder = ConverterSettings::builder(secret)
            .image_quality(self.conversion.image_quality)
            .image_dpi(self.conversion.image_dpi)
            .store_remote_copy(self.conversion.store_files);
        if let Some(ref dir) = self.conversion.output_dir {
            builder = builder.output_directory(dir);
        }
        builder.build()
    }

    /// Build the dispatch policy from the `[batch]` section.
    pub fn dispatch_policy(&self) -> imgconvert_common::Result<DispatchPolicy> {
        DispatchPolicy::new(
            self.batch.group_size,
            Duration::from_secs(self.batch.group_delay_secs),
            self.batch.max_workers,
        )
    }
}
