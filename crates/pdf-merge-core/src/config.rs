use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// PDF user space units per inch. Rendering at this density maps one point to one pixel.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Density used when none is configured
pub const DEFAULT_DENSITY: Density = Density(POINTS_PER_INCH);

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "pdf-merge.toml";

/// Rendering density in dots per inch.
///
/// Deserializes from either a number (`density = 150`) or a numeric string
/// (`density = "150"`). Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "DensityValue", into = "f32")]
pub struct Density(f32);

impl Density {
    /// Create a density, rejecting non-finite and non-positive values
    pub fn new(dpi: f32) -> Result<Self> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(Error::ConfigInvalid {
                field: "density".to_string(),
                reason: format!("expected a positive DPI value, got {dpi}"),
            });
        }
        Ok(Self(dpi))
    }

    pub const fn dpi(self) -> f32 {
        self.0
    }

    /// Render scale factor relative to PDF points
    pub fn scale(self) -> f32 {
        self.0 / POINTS_PER_INCH
    }
}

impl Default for Density {
    fn default() -> Self {
        DEFAULT_DENSITY
    }
}

impl std::fmt::Display for Density {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Density {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let dpi: f32 = s.trim().parse().map_err(|_| Error::ConfigInvalid {
            field: "density".to_string(),
            reason: format!("'{s}' is not a number"),
        })?;
        Self::new(dpi)
    }
}

impl From<Density> for f32 {
    fn from(density: Density) -> Self {
        density.0
    }
}

/// Raw density as it appears in config files
#[derive(Deserialize)]
#[serde(untagged)]
enum DensityValue {
    Number(f32),
    Text(String),
}

impl TryFrom<DensityValue> for Density {
    type Error = Error;

    fn try_from(value: DensityValue) -> Result<Self> {
        match value {
            DensityValue::Number(dpi) => Self::new(dpi),
            DensityValue::Text(text) => text.parse(),
        }
    }
}

/// Color model of the embedded page images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Rgb,
    Gray,
}

impl ColorMode {
    /// PDF color space name for image XObjects
    pub const fn pdf_name(self) -> &'static [u8] {
        match self {
            Self::Rgb => b"DeviceRGB",
            Self::Gray => b"DeviceGray",
        }
    }
}

/// Passthrough rendering options, applied uniformly to every merged page.
///
/// Only the fields below are recognized; unknown keys in a config file are
/// rejected rather than silently forwarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeOptions {
    /// Output resolution in DPI (default: 72)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<Density>,

    /// JPEG quality 1-100. Pages are embedded losslessly when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,

    /// Color model of the rendered pages
    #[serde(default)]
    pub colorspace: ColorMode,
}

impl MergeOptions {
    #[must_use]
    pub const fn with_density(mut self, density: Density) -> Self {
        self.density = Some(density);
        self
    }

    #[must_use]
    pub const fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    #[must_use]
    pub const fn with_colorspace(mut self, colorspace: ColorMode) -> Self {
        self.colorspace = colorspace;
        self
    }

    /// Density pages are rendered at, falling back to the default
    pub fn effective_density(&self) -> Density {
        self.density.unwrap_or_default()
    }

    /// Check value ranges that the type system does not enforce
    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = self.quality
            && !(1..=100).contains(&quality)
        {
            return Err(Error::ConfigInvalid {
                field: "quality".to_string(),
                reason: format!("expected 1-100, got {quality}"),
            });
        }
        Ok(())
    }

    /// Parse options from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Load from default locations (~/.config/pdf-merge/config.toml, ./pdf-merge.toml)
    pub fn load() -> Self {
        let candidates = crate::util::config_dir()
            .map(|dir| dir.join("pdf-merge").join("config.toml"))
            .into_iter()
            .chain(std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(options) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return options;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}
