//! The shared configuration both previews render, and the logo it points at

use std::sync::Arc;

use image::RgbaImage;
use kitcrate_core::{next_color_option, ConfigUpdate, GarmentConfig, PRESETS};
use kitcrate_texture::{LogoPoll, PendingLogo};
use tracing::{info, warn};

/// Keyboard-driven edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Cycle the primary color through the swatches
    NextColor,
    NextPattern,
    /// Apply the preset at this index in [`PRESETS`]
    Preset(usize),
}

/// Current configuration plus the decoded logo
///
/// A new logo path starts a background load; the previous image stays in
/// use until [`poll_logo`](Customizer::poll_logo) sees the replacement.
#[derive(Debug)]
pub struct Customizer {
    config: GarmentConfig,
    logo: Option<Arc<RgbaImage>>,
    pending: Option<PendingLogo>,
}

impl Customizer {
    pub fn new(config: GarmentConfig) -> Self {
        let mut customizer = Self {
            config,
            logo: None,
            pending: None,
        };
        customizer.request_logo();
        customizer
    }

    pub fn config(&self) -> &GarmentConfig {
        &self.config
    }

    /// The most recently loaded logo
    pub fn logo(&self) -> Option<&RgbaImage> {
        self.logo.as_deref()
    }

    pub fn is_logo_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn request_logo(&mut self) {
        match &self.config.logo {
            Some(source) => self.pending = Some(PendingLogo::spawn(source.clone())),
            None => {
                self.pending = None;
                self.logo = None;
            }
        }
    }

    /// Merge `update`; returns whether the previews need new textures
    pub fn apply(&mut self, update: ConfigUpdate) -> bool {
        let logo_changed = update.logo.as_ref().is_some_and(|logo| *logo != self.config.logo);
        let changed = self.config.apply(update);
        if logo_changed {
            self.request_logo();
        }
        changed
    }

    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::NextColor => {
                let option = next_color_option(self.config.primary_color);
                info!("Primary color: {} ({})", option.name, option.value);
                self.apply(ConfigUpdate::primary_color(option.value))
            }
            Command::NextPattern => {
                let pattern = self.config.pattern.next();
                info!("Pattern: {}", pattern);
                self.apply(ConfigUpdate::pattern(pattern))
            }
            Command::Preset(index) => match PRESETS.get(index) {
                Some(preset) => {
                    let before = self.config.clone();
                    preset.apply_to(&mut self.config);
                    info!("Preset: {}", preset.name);
                    self.config != before
                }
                None => {
                    warn!("No preset at index {}", index);
                    false
                }
            },
        }
    }

    /// Pick up a finished logo load; returns whether the logo changed
    pub fn poll_logo(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        match pending.poll() {
            LogoPoll::Pending => false,
            LogoPoll::Ready(image) => {
                info!("Logo {} loaded", pending.source());
                self.logo = Some(image);
                self.pending = None;
                true
            }
            LogoPoll::Failed => {
                self.pending = None;
                false
            }
        }
    }
}

impl Default for Customizer {
    fn default() -> Self {
        Self::new(GarmentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitcrate_core::{PatternVariant, Rgb};
    use std::time::{Duration, Instant};

    fn settle(customizer: &mut Customizer) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while customizer.is_logo_pending() && Instant::now() < deadline {
            if customizer.poll_logo() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_commands() {
        let mut customizer = Customizer::default();
        assert!(customizer.execute(Command::NextColor));
        // #1f2937 is the last swatch, so cycling wraps to red
        assert_eq!(customizer.config().primary_color, Rgb::from_u32(0xdc2626));

        assert!(customizer.execute(Command::NextPattern));
        assert_eq!(customizer.config().pattern, PatternVariant::Stripes);

        assert!(customizer.execute(Command::Preset(3)));
        assert_eq!(customizer.config().primary_color, Rgb::from_u32(0x2563eb));
        assert_eq!(customizer.config().secondary_color, Rgb::from_u32(0xdc2626));
        assert_eq!(customizer.config().pattern, PatternVariant::Plain);
        assert!(!customizer.execute(Command::Preset(3)));
        assert!(!customizer.execute(Command::Preset(9)));
    }

    #[test]
    fn test_unchanged_update_reports_false() {
        let mut customizer = Customizer::default();
        assert!(!customizer.apply(ConfigUpdate::pattern(PatternVariant::Plain)));
        assert!(!customizer.is_logo_pending());
    }

    #[test]
    fn test_logo_lifecycle() {
        let path = std::env::temp_dir().join(format!("kitcrate-customizer-logo-{}.png", std::process::id()));
        RgbaImage::new(8, 8).save(&path).unwrap();

        let mut customizer = Customizer::default();
        let update = ConfigUpdate {
            logo: Some(Some(path.to_string_lossy().into_owned())),
            ..Default::default()
        };
        assert!(customizer.apply(update));
        assert!(customizer.is_logo_pending());
        assert!(settle(&mut customizer));
        assert_eq!(customizer.logo().unwrap().dimensions(), (8, 8));

        // A broken path keeps the last good logo
        let broken = ConfigUpdate {
            logo: Some(Some("/nonexistent/logo.png".to_string())),
            ..Default::default()
        };
        customizer.apply(broken);
        assert!(!settle(&mut customizer));
        assert!(customizer.logo().is_some());

        let cleared = ConfigUpdate {
            logo: Some(None),
            ..Default::default()
        };
        assert!(customizer.apply(cleared));
        assert!(customizer.logo().is_none());
        let _ = std::fs::remove_file(path);
    }
}
