//! Converter settings.
//!
//! [`ConverterSettings`] is immutable. It is validated once when built, and
//! every `with_*` update validates a modified copy before returning it, so an
//! invalid combination is never observable by a conversion in flight.

use imgconvert_common::{ConfigurationError, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Default output quality.
pub const DEFAULT_IMAGE_QUALITY: u32 = 90;
/// Default output resolution in dots per inch.
pub const DEFAULT_IMAGE_DPI: u32 = 326;
/// Accepted output quality values.
pub const IMAGE_QUALITY_RANGE: RangeInclusive<u32> = 10..=100;
/// Accepted output resolution values.
pub const IMAGE_DPI_RANGE: RangeInclusive<u32> = 10..=800;

/// Settings sent with every conversion request.
#[derive(Clone, PartialEq, Eq)]
pub struct ConverterSettings {
    image_quality: u32,
    image_dpi: u32,
    store_remote_copy: bool,
    output_directory: Option<PathBuf>,
    api_credential: String,
}

impl ConverterSettings {
    /// Start building settings for the given API credential.
    pub fn builder(api_credential: impl Into<String>) -> ConverterSettingsBuilder {
        ConverterSettingsBuilder::new(api_credential)
    }

    /// Settings with every default and the given credential.
    pub fn new(api_credential: impl Into<String>) -> Result<Self> {
        Self::builder(api_credential).build()
    }

    pub fn image_quality(&self) -> u32 {
        self.image_quality
    }

    pub fn image_dpi(&self) -> u32 {
        self.image_dpi
    }

    /// Whether the remote service keeps a copy of converted files.
    pub fn store_remote_copy(&self) -> bool {
        self.store_remote_copy
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory.as_deref()
    }

    pub fn api_credential(&self) -> &str {
        &self.api_credential
    }

    pub fn with_image_quality(&self, image_quality: u32) -> Result<Self> {
        self.updated(|s| s.image_quality = image_quality)
    }

    pub fn with_image_dpi(&self, image_dpi: u32) -> Result<Self> {
        self.updated(|s| s.image_dpi = image_dpi)
    }

    pub fn with_store_remote_copy(&self, store_remote_copy: bool) -> Result<Self> {
        self.updated(|s| s.store_remote_copy = store_remote_copy)
    }

    pub fn with_output_directory(&self, output_directory: Option<PathBuf>) -> Result<Self> {
        self.updated(|s| s.output_directory = output_directory)
    }

    pub fn with_api_credential(&self, api_credential: impl Into<String>) -> Result<Self> {
        let api_credential = api_credential.into();
        self.updated(|s| s.api_credential = api_credential)
    }

    /// Update a field from its textual form, as given on the command line
    /// (`image_quality=80`) or read from an untyped source.
    ///
    /// A value that does not parse as the field's type is a
    /// [`ConfigErrorKind::WrongType`](imgconvert_common::ConfigErrorKind)
    /// error; a parsed value outside its range is `OutOfRange`.
    pub fn with_field(&self, field: &str, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        match field {
            "image_quality" | "quality" => {
                self.with_image_quality(parse_integer("image_quality", raw, &IMAGE_QUALITY_RANGE)?)
            }
            "image_dpi" | "dpi" => {
                self.with_image_dpi(parse_integer("image_dpi", raw, &IMAGE_DPI_RANGE)?)
            }
            "store_remote_copy" | "store_files" => {
                let value = raw.parse::<bool>().map_err(|_| {
                    ConfigurationError::wrong_type(
                        "store_remote_copy",
                        format!("expected true or false, got {raw:?}"),
                    )
                })?;
                self.with_store_remote_copy(value)
            }
            "output_directory" | "output_dir" => {
                let value = (!raw.is_empty()).then(|| PathBuf::from(raw));
                self.with_output_directory(value)
            }
            "api_credential" | "api_secret" | "secret" => self.with_api_credential(raw),
            other => Err(ConfigurationError::invalid(other, "unknown setting").into()),
        }
    }

    fn updated(&self, change: impl FnOnce(&mut Self)) -> Result<Self> {
        let mut next = self.clone();
        change(&mut next);
        next.validate()?;
        Ok(next)
    }

    fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        validate_image_quality(self.image_quality)?;
        validate_image_dpi(self.image_dpi)?;

        if self.api_credential.trim().is_empty() {
            return Err(ConfigurationError::invalid(
                "api_credential",
                "must not be empty",
            ));
        }

        if let Some(ref dir) = self.output_directory {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigurationError::invalid(
                    "output_directory",
                    format!("{} exists and is not a directory", dir.display()),
                ));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for ConverterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterSettings")
            .field("image_quality", &self.image_quality)
            .field("image_dpi", &self.image_dpi)
            .field("store_remote_copy", &self.store_remote_copy)
            .field("output_directory", &self.output_directory)
            .field("api_credential", &"<redacted>")
            .finish()
    }
}

/// Builder for [`ConverterSettings`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ConverterSettingsBuilder {
    settings: ConverterSettings,
}

impl ConverterSettingsBuilder {
    fn new(api_credential: impl Into<String>) -> Self {
        Self {
            settings: ConverterSettings {
                image_quality: DEFAULT_IMAGE_QUALITY,
                image_dpi: DEFAULT_IMAGE_DPI,
                store_remote_copy: true,
                output_directory: None,
                api_credential: api_credential.into(),
            },
        }
    }

    pub fn image_quality(mut self, image_quality: u32) -> Self {
        self.settings.image_quality = image_quality;
        self
    }

    pub fn image_dpi(mut self, image_dpi: u32) -> Self {
        self.settings.image_dpi = image_dpi;
        self
    }

    pub fn store_remote_copy(mut self, store_remote_copy: bool) -> Self {
        self.settings.store_remote_copy = store_remote_copy;
        self
    }

    pub fn output_directory(mut self, output_directory: impl Into<PathBuf>) -> Self {
        self.settings.output_directory = Some(output_directory.into());
        self
    }

    pub fn build(self) -> Result<ConverterSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

/// Check an image quality value against [`IMAGE_QUALITY_RANGE`].
pub fn validate_image_quality(value: u32) -> std::result::Result<(), ConfigurationError> {
    check_range("image_quality", value, &IMAGE_QUALITY_RANGE)
}

/// Check an image resolution value against [`IMAGE_DPI_RANGE`].
pub fn validate_image_dpi(value: u32) -> std::result::Result<(), ConfigurationError> {
    check_range("image_dpi", value, &IMAGE_DPI_RANGE)
}

fn check_range(
    field: &str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> std::result::Result<(), ConfigurationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::out_of_range(
            field,
            format!(
                "must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        ))
    }
}

/// Parse an integer field. Negative or oversized integers are range errors,
/// anything that is not an integer at all is a type error.
fn parse_integer(
    field: &str,
    raw: &str,
    range: &RangeInclusive<u32>,
) -> std::result::Result<u32, ConfigurationError> {
    let value = raw.parse::<i64>().map_err(|_| {
        ConfigurationError::wrong_type(field, format!("expected an integer, got {raw:?}"))
    })?;

    u32::try_from(value).map_err(|_| {
        ConfigurationError::out_of_range(
            field,
            format!(
                "must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        )
    })
}
