//! Built-in color swatches and garment presets

use crate::{GarmentConfig, PatternVariant, Rgb};

/// A named primary color choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    pub name: &'static str,
    pub value: Rgb,
}

/// A named combination of colors and pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarmentPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub primary_color: Rgb,
    pub secondary_color: Rgb,
    pub pattern: PatternVariant,
}

impl GarmentPreset {
    /// Overwrite colors and pattern; text and logo are kept
    pub fn apply_to(&self, config: &mut GarmentConfig) {
        config.primary_color = self.primary_color;
        config.secondary_color = self.secondary_color;
        config.pattern = self.pattern;
    }
}

pub const COLOR_OPTIONS: [ColorOption; 5] = [
    ColorOption { name: "Red", value: Rgb::from_u32(0xdc2626) },
    ColorOption { name: "Yellow", value: Rgb::from_u32(0xfbbf24) },
    ColorOption { name: "Blue", value: Rgb::from_u32(0x2563eb) },
    ColorOption { name: "White", value: Rgb::from_u32(0xffffff) },
    ColorOption { name: "Black", value: Rgb::from_u32(0x1f2937) },
];

pub const PRESETS: [GarmentPreset; 5] = [
    GarmentPreset {
        id: "black-white",
        name: "Black & White",
        primary_color: Rgb::from_u32(0x1f2937),
        secondary_color: Rgb::from_u32(0xffffff),
        pattern: PatternVariant::Plain,
    },
    GarmentPreset {
        id: "white-black",
        name: "White & Black",
        primary_color: Rgb::from_u32(0xffffff),
        secondary_color: Rgb::from_u32(0x1f2937),
        pattern: PatternVariant::Plain,
    },
    GarmentPreset {
        id: "red-yellow",
        name: "Red & Yellow",
        primary_color: Rgb::from_u32(0xdc2626),
        secondary_color: Rgb::from_u32(0xfbbf24),
        pattern: PatternVariant::Plain,
    },
    GarmentPreset {
        id: "blue-red",
        name: "Blue & Red",
        primary_color: Rgb::from_u32(0x2563eb),
        secondary_color: Rgb::from_u32(0xdc2626),
        pattern: PatternVariant::Plain,
    },
    GarmentPreset {
        id: "red-blue",
        name: "Red & Blue",
        primary_color: Rgb::from_u32(0xdc2626),
        secondary_color: Rgb::from_u32(0x2563eb),
        pattern: PatternVariant::Plain,
    },
];

/// Look up a preset by id
pub fn preset(id: &str) -> Option<&'static GarmentPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// The swatch following `current`, or the first swatch if `current` is not one
pub fn next_color_option(current: Rgb) -> ColorOption {
    match COLOR_OPTIONS.iter().position(|c| c.value == current) {
        Some(index) => COLOR_OPTIONS[(index + 1) % COLOR_OPTIONS.len()],
        None => COLOR_OPTIONS[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_keeps_text_fields() {
        let mut config = GarmentConfig::default();
        config.set_back_name("SMITH");
        config.pattern = PatternVariant::Texture;

        preset("red-blue").unwrap().apply_to(&mut config);

        assert_eq!(config.primary_color, Rgb::from_u32(0xdc2626));
        assert_eq!(config.secondary_color, Rgb::from_u32(0x2563eb));
        assert_eq!(config.pattern, PatternVariant::Plain);
        assert_eq!(config.back_name(), "SMITH");
    }

    #[test]
    fn test_color_cycle_wraps() {
        assert_eq!(next_color_option(Rgb::from_u32(0xdc2626)).name, "Yellow");
        assert_eq!(next_color_option(Rgb::from_u32(0x1f2937)).name, "Red");
        assert_eq!(next_color_option(Rgb::from_u32(0x123456)).name, "Red");
    }

    #[test]
    fn test_unknown_preset() {
        assert!(preset("green-gold").is_none());
        assert_eq!(PRESETS.len(), 5);
    }
}
