use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::conversion::{DEFAULT_GROUP_DELAY, DEFAULT_GROUP_SIZE};
use crate::remote::convertapi::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::settings::{DEFAULT_IMAGE_DPI, DEFAULT_IMAGE_QUALITY};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// ConvertAPI secret. Overridden by `IMGCONVERT_API_SECRET` or
    /// `CONVERTAPI_SECRET` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds (default: 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            secret: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Output quality, 10-100 (default: 90)
    #[serde(default = "default_image_quality")]
    pub image_quality: u32,

    /// Output resolution, 10-800 (default: 326)
    #[serde(default = "default_image_dpi")]
    pub image_dpi: u32,

    /// Keep converted files on the remote service (default: true)
    #[serde(default = "default_store_files")]
    pub store_files: bool,

    /// Where converted files are written. Defaults to the source's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

fn default_image_quality() -> u32 {
    DEFAULT_IMAGE_QUALITY
}

fn default_image_dpi() -> u32 {
    DEFAULT_IMAGE_DPI
}

fn default_store_files() -> bool {
    true
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            image_quality: default_image_quality(),
            image_dpi: default_image_dpi(),
            store_files: default_store_files(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Jobs per group (default: 10)
    #[serde(default = "default_group_size")]
    pub group_size: usize,

    /// Pause between groups in seconds (default: 3)
    #[serde(default = "default_group_delay_secs")]
    pub group_delay_secs: u64,

    /// Concurrent conversions within a group (default: 10)
    #[serde(default = "default_group_size")]
    pub max_workers: usize,
}

fn default_group_size() -> usize {
    DEFAULT_GROUP_SIZE
}

fn default_group_delay_secs() -> u64 {
    DEFAULT_GROUP_DELAY.as_secs()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            group_delay_secs: default_group_delay_secs(),
            max_workers: default_group_size(),
        }
    }
}
