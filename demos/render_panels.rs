//! Write the three synthesized panel textures to PNG files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use kitcrate_core::{GarmentConfig, PanelTexture};
use kitcrate_demos::{init_logging, GarmentArgs};
use kitcrate_texture::{load_logo, TextureSynthesizer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "render_panels", about = "Render garment panel textures to PNG")]
struct Cli {
    #[command(flatten)]
    garment: GarmentArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Seed for the `texture` pattern's speckle
    #[arg(long)]
    seed: Option<u64>,
}

fn save(panel: &PanelTexture, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(format!("{name}.png"));
    panel
        .image()
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} ({}x{})", path.display(), panel.width(), panel.height());
    Ok(())
}

fn render<R: Rng>(synthesizer: &mut TextureSynthesizer<R>, config: &GarmentConfig, out: &Path) -> Result<()> {
    let logo = config.logo.as_deref().and_then(|path| match load_logo(path) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Ignoring logo {}: {}", path, e);
            None
        }
    });

    let panels = synthesizer.render_panels(config, logo.as_ref());
    save(&panels.front, out, "front")?;
    save(&panels.back, out, "back")?;
    save(&panels.sleeve, out, "sleeve")?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.garment.resolve()?;

    fs::create_dir_all(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;
    match cli.seed {
        Some(seed) => render(&mut TextureSynthesizer::with_rng(StdRng::seed_from_u64(seed)), &config, &cli.out),
        None => render(&mut TextureSynthesizer::new(), &config, &cli.out),
    }
}
