//! ConvertAPI client.
//!
//! Implements [`RemoteConverter`] with a single multipart request to
//! `POST /convert/{from}/to/{to}`. The response either embeds the converted
//! file as base64 (`FileData`) or links to it (`Url`) when the service keeps a
//! stored copy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use imgconvert_common::{Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{RemoteConverter, SavedFile};
use crate::config::ApiConfig;
use crate::conversion::ConversionJob;
use crate::settings::ConverterSettings;

/// Public ConvertAPI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://v2.convertapi.com";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConvertResponse {
    #[serde(default)]
    conversion_cost: Option<u64>,
    #[serde(default)]
    files: Vec<ResultFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultFile {
    file_name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    file_data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// HTTP client for the ConvertAPI service.
pub struct ConvertApiClient {
    client: Client,
    base_url: String,
}

impl ConvertApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, source_format: &str, target_format: &str) -> String {
        format!(
            "{}/convert/{}/to/{}",
            self.base_url, source_format, target_format
        )
    }

    async fn request_conversion(
        &self,
        job: &ConversionJob,
        settings: &ConverterSettings,
    ) -> Result<ConvertResponse> {
        let data = tokio::fs::read(&job.source_path).await?;
        let form = Form::new()
            .part("File", Part::bytes(data).file_name(job.file_name.clone()))
            .text("ImageResolution", settings.image_dpi().to_string())
            .text("ImageQuality", settings.image_quality().to_string())
            .text("StoreFile", settings.store_remote_copy().to_string());

        let url = self.url(&job.source_format, job.target_format.extension());
        debug!("POST {} ({})", url, job.file_name);

        let response = self
            .client
            .post(&url)
            .bearer_auth(settings.api_credential())
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::remote(None, format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(api_error) => Error::remote(api_error.code, api_error.message),
                Err(_) => Error::remote(
                    Some(i64::from(status.as_u16())),
                    format!("{status}: {body}"),
                ),
            });
        }

        response
            .json::<ConvertResponse>()
            .await
            .map_err(|e| Error::remote(None, format!("invalid conversion response: {e}")))
    }

    /// Bytes of one result file, decoded inline or downloaded from its URL.
    async fn fetch(&self, file: &ResultFile) -> Result<Vec<u8>> {
        if let Some(ref data) = file.file_data {
            return STANDARD.decode(data).map_err(|e| {
                Error::remote(None, format!("invalid file data for {}: {e}", file.file_name))
            });
        }

        let Some(ref url) = file.url else {
            return Err(Error::remote(
                None,
                format!("result {} has neither data nor url", file.file_name),
            ));
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::remote(None, format!("download of {url} failed: {e}")))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::remote(None, format!("download of {url} failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl RemoteConverter for ConvertApiClient {
    async fn convert(
        &self,
        job: &ConversionJob,
        settings: &ConverterSettings,
        destination: &Path,
    ) -> Result<SavedFile> {
        let response = self.request_conversion(job, settings).await?;
        if let Some(cost) = response.conversion_cost {
            debug!("Conversion of {} cost {} seconds", job.file_name, cost);
        }

        if response.files.is_empty() {
            return Err(Error::remote(
                None,
                format!("no files returned for {}", job.file_name),
            ));
        }

        // Multi-page results (e.g. layered TIFF) come back as several files.
        // Everything is fetched before the first write so a failed download
        // leaves nothing behind.
        let mut outputs = Vec::with_capacity(response.files.len());
        for (index, file) in response.files.iter().enumerate() {
            let path = match index {
                0 => destination.to_path_buf(),
                n => numbered_sibling(destination, n),
            };
            outputs.push((path, self.fetch(file).await?));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        for (index, (path, data)) in outputs.iter().enumerate() {
            if let Err(e) = tokio::fs::write(path, data).await {
                warn!("Failed to write {}: {}", path.display(), e);
                remove_outputs(&outputs[..=index]).await;
                return Err(e.into());
            }
            debug!("Saved {}", path.display());
        }

        let size_bytes = outputs.first().map_or(0, |(_, data)| data.len() as u64);
        Ok(SavedFile {
            path: destination.to_path_buf(),
            size_bytes,
        })
    }
}

/// Best-effort removal of outputs from a conversion that failed midway.
async fn remove_outputs(outputs: &[(PathBuf, Vec<u8>)]) {
    for (path, _) in outputs {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove partial output {}: {}", path.display(), e);
            }
        }
    }
}

/// `out/photo.png` -> `out/photo-1.png`
fn numbered_sibling(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{index}.{ext}"),
        None => format!("{stem}-{index}"),
    };
    path.with_file_name(name)
}
