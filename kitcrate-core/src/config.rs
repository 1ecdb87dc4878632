//! User-editable garment configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Rgb};

/// Maximum glyphs kept for the front number
pub const FRONT_NUMBER_MAX_GLYPHS: usize = 2;
/// Maximum glyphs kept for the name printed on the back
pub const BACK_NAME_MAX_GLYPHS: usize = 12;
/// Maximum glyphs kept for the back number
pub const BACK_NUMBER_MAX_GLYPHS: usize = 2;

/// Overlay drawn on top of the body panel base color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternVariant {
    #[default]
    Plain,
    Stripes,
    Diagonal,
    /// Randomized speckle; not reproducible between renders
    Texture,
}

impl PatternVariant {
    pub const ALL: [PatternVariant; 4] = [
        PatternVariant::Plain,
        PatternVariant::Stripes,
        PatternVariant::Diagonal,
        PatternVariant::Texture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PatternVariant::Plain => "Plain",
            PatternVariant::Stripes => "Stripes",
            PatternVariant::Diagonal => "Diagonal",
            PatternVariant::Texture => "Texture",
        }
    }

    /// Next variant in `ALL`, wrapping around
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Whether two renders with identical inputs produce identical pixels
    pub fn is_deterministic(self) -> bool {
        !matches!(self, PatternVariant::Texture)
    }
}

impl fmt::Display for PatternVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PatternVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(PatternVariant::Plain),
            "stripes" => Ok(PatternVariant::Stripes),
            "diagonal" => Ok(PatternVariant::Diagonal),
            "texture" => Ok(PatternVariant::Texture),
            other => Err(Error::InvalidData(format!("Unknown pattern: {}", other))),
        }
    }
}

/// Keep at most `max` Unicode scalar values of `text`
pub fn truncate_glyphs(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Garment attributes edited by the user
///
/// Text fields are truncated to their glyph limits on every assignment,
/// including deserialization, so renderers never see oversized values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GarmentConfigRepr")]
pub struct GarmentConfig {
    pub primary_color: Rgb,
    /// Carried through presets; no renderer reads it yet
    pub secondary_color: Rgb,
    pub logo: Option<String>,
    front_number: String,
    back_name: String,
    back_number: String,
    pub pattern: PatternVariant,
}

#[derive(Deserialize)]
struct GarmentConfigRepr {
    primary_color: Rgb,
    secondary_color: Rgb,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    front_number: String,
    #[serde(default)]
    back_name: String,
    #[serde(default)]
    back_number: String,
    #[serde(default)]
    pattern: PatternVariant,
}

impl From<GarmentConfigRepr> for GarmentConfig {
    fn from(repr: GarmentConfigRepr) -> Self {
        let mut config = GarmentConfig {
            primary_color: repr.primary_color,
            secondary_color: repr.secondary_color,
            logo: repr.logo,
            front_number: String::new(),
            back_name: String::new(),
            back_number: String::new(),
            pattern: repr.pattern,
        };
        config.set_front_number(&repr.front_number);
        config.set_back_name(&repr.back_name);
        config.set_back_number(&repr.back_number);
        config
    }
}

impl GarmentConfig {
    pub fn front_number(&self) -> &str {
        &self.front_number
    }

    pub fn back_name(&self) -> &str {
        &self.back_name
    }

    pub fn back_number(&self) -> &str {
        &self.back_number
    }

    pub fn set_front_number(&mut self, value: &str) {
        self.front_number = truncate_glyphs(value, FRONT_NUMBER_MAX_GLYPHS);
    }

    pub fn set_back_name(&mut self, value: &str) {
        self.back_name = truncate_glyphs(value, BACK_NAME_MAX_GLYPHS);
    }

    pub fn set_back_number(&mut self, value: &str) {
        self.back_number = truncate_glyphs(value, BACK_NUMBER_MAX_GLYPHS);
    }

    /// Merge a partial update, returning whether anything changed
    pub fn apply(&mut self, update: ConfigUpdate) -> bool {
        let before = self.clone();

        if let Some(color) = update.primary_color {
            self.primary_color = color;
        }
        if let Some(color) = update.secondary_color {
            self.secondary_color = color;
        }
        if let Some(logo) = update.logo {
            self.logo = logo;
        }
        if let Some(number) = update.front_number {
            self.set_front_number(&number);
        }
        if let Some(name) = update.back_name {
            self.set_back_name(&name);
        }
        if let Some(number) = update.back_number {
            self.set_back_number(&number);
        }
        if let Some(pattern) = update.pattern {
            self.pattern = pattern;
        }

        *self != before
    }
}

impl Default for GarmentConfig {
    fn default() -> Self {
        Self {
            primary_color: Rgb::from_u32(0x1f2937),
            secondary_color: Rgb::WHITE,
            logo: None,
            front_number: "10".to_string(),
            back_name: "PLAYER".to_string(),
            back_number: "10".to_string(),
            pattern: PatternVariant::Plain,
        }
    }
}

/// Partial configuration change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub primary_color: Option<Rgb>,
    pub secondary_color: Option<Rgb>,
    /// `Some(None)` clears the logo
    pub logo: Option<Option<String>>,
    pub front_number: Option<String>,
    pub back_name: Option<String>,
    pub back_number: Option<String>,
    pub pattern: Option<PatternVariant>,
}

impl ConfigUpdate {
    pub fn primary_color(color: Rgb) -> Self {
        Self {
            primary_color: Some(color),
            ..Default::default()
        }
    }

    pub fn pattern(pattern: PatternVariant) -> Self {
        Self {
            pattern: Some(pattern),
            ..Default::default()
        }
    }
}
