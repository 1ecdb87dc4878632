//! Shared command-line handling for the demo binaries

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kitcrate_core::{ConfigUpdate, GarmentConfig, PatternVariant, Rgb};

/// Garment options; flags override values read from `--config`
#[derive(Debug, Clone, Default, Args)]
pub struct GarmentArgs {
    /// JSON file holding a full garment configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Primary color, e.g. "#dc2626"
    #[arg(long)]
    pub primary: Option<Rgb>,

    /// Secondary color
    #[arg(long)]
    pub secondary: Option<Rgb>,

    /// plain, stripes, diagonal or texture
    #[arg(long)]
    pub pattern: Option<PatternVariant>,

    /// Front number (at most 2 characters are kept)
    #[arg(long)]
    pub front_number: Option<String>,

    /// Name printed on the back (at most 12 characters are kept)
    #[arg(long)]
    pub back_name: Option<String>,

    /// Back number (at most 2 characters are kept)
    #[arg(long)]
    pub back_number: Option<String>,

    /// Logo image path
    #[arg(long)]
    pub logo: Option<String>,
}

impl GarmentArgs {
    /// Read `--config` if given, then apply the individual flags
    pub fn resolve(&self) -> Result<GarmentConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?
            }
            None => GarmentConfig::default(),
        };

        config.apply(ConfigUpdate {
            primary_color: self.primary,
            secondary_color: self.secondary,
            logo: self.logo.clone().map(Some),
            front_number: self.front_number.clone(),
            back_name: self.back_name.clone(),
            back_number: self.back_number.clone(),
            pattern: self.pattern,
        });
        Ok(config)
    }
}

/// Log to stderr, honoring `RUST_LOG` and defaulting to `info`
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("kitcrate-demo-config-{}.json", std::process::id()));
        let mut stored = GarmentConfig::default();
        stored.set_back_name("SMITH");
        stored.pattern = PatternVariant::Diagonal;
        fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        let args = GarmentArgs {
            config: Some(path.clone()),
            back_number: Some("777".to_string()),
            ..Default::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.back_name(), "SMITH");
        assert_eq!(config.pattern, PatternVariant::Diagonal);
        assert_eq!(config.back_number(), "77");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_defaults_without_flags() {
        assert_eq!(GarmentArgs::default().resolve().unwrap(), GarmentConfig::default());
    }
}
