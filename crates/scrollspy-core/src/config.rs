#![forbid(unsafe_code)]

//! Catalog configuration.
//!
//! [`SpyConfig`] is the user-facing configuration (colors, heights, and the
//! handoff ratio used by the active-item resolver). [`SpyConfig::catalog`]
//! validates it into a [`Catalog`], the only form the store accepts.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `ConfigError::LengthMismatch` | `colors.len() != heights.len()` | No catalog is built |
//! | `ConfigError::InvalidRatio` | Ratio negative or non-finite | No catalog is built |
//! | `ConfigError::Json` | Malformed JSON document | No config is built |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::item::Color;

/// Colors shown on the default page, top to bottom.
pub const DEFAULT_COLORS: [&str; 5] = ["#3a86ff", "#8338ec", "#ff006e", "#fb5607", "#ffbe0b"];

/// Layout height of every default block.
pub const DEFAULT_HEIGHT: f64 = 900.0;

/// Fraction of the head's height that must scroll past before handing off.
pub const DEFAULT_HANDOFF_RATIO: f64 = 0.5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building a catalog.
#[derive(Debug)]
pub enum ConfigError {
    /// The color and height sequences differ in length.
    LengthMismatch {
        /// Number of colors supplied.
        colors: usize,
        /// Number of heights supplied.
        heights: usize,
    },
    /// The handoff ratio is negative or not finite.
    InvalidRatio(f64),
    /// The configuration document could not be decoded.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { colors, heights } => write!(
                f,
                "catalog length mismatch: {colors} colors but {heights} heights"
            ),
            Self::InvalidRatio(ratio) => write!(f, "invalid handoff ratio: {ratio}"),
            Self::Json(e) => write!(f, "invalid configuration document: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One validated catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Item identity.
    pub color: Color,
    /// Layout height in pixels.
    pub height: f64,
}

/// Validated, ordered list of catalog entries.
///
/// Constructed only through [`Catalog::new`], so holding one proves the color
/// and height sequences had matching lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Pair up `colors` with `heights`.
    pub fn new<C>(colors: impl IntoIterator<Item = C>, heights: &[f64]) -> Result<Self, ConfigError>
    where
        C: Into<Color>,
    {
        let colors: Vec<Color> = colors.into_iter().map(Into::into).collect();
        if colors.len() != heights.len() {
            return Err(ConfigError::LengthMismatch {
                colors: colors.len(),
                heights: heights.len(),
            });
        }
        let entries = colors
            .into_iter()
            .zip(heights.iter().copied())
            .map(|(color, height)| CatalogEntry { color, height })
            .collect();
        Ok(Self { entries })
    }

    /// Entries in page order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries (duplicates included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_COLORS
                .iter()
                .map(|c| CatalogEntry {
                    color: Color::from(*c),
                    height: DEFAULT_HEIGHT,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpyConfig
// ---------------------------------------------------------------------------

/// Page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyConfig {
    /// Color tokens, top to bottom.
    pub colors: Vec<Color>,
    /// Block heights, parallel to `colors`.
    pub heights: Vec<f64>,
    /// Fraction of the head's height that must be scrolled past before the
    /// next visible item takes over.
    /// Default: 0.5
    pub handoff_ratio: f64,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| Color::from(*c)).collect(),
            heights: vec![DEFAULT_HEIGHT; DEFAULT_COLORS.len()],
            handoff_ratio: DEFAULT_HANDOFF_RATIO,
        }
    }
}

impl SpyConfig {
    /// Decode a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ratio and lengths without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.handoff_ratio.is_finite() || self.handoff_ratio < 0.0 {
            return Err(ConfigError::InvalidRatio(self.handoff_ratio));
        }
        if self.colors.len() != self.heights.len() {
            return Err(ConfigError::LengthMismatch {
                colors: self.colors.len(),
                heights: self.heights.len(),
            });
        }
        Ok(())
    }

    /// Build the validated catalog.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        self.validate()?;
        Catalog::new(self.colors.iter().cloned(), &self.heights)
    }
}
