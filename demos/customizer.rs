//! Live garment customizer with two preview windows
//!
//! Drag either window to rotate its model. Keys `1`-`5` apply the presets,
//! `c` cycles the primary color and `p` cycles the pattern.

use anyhow::Result;
use clap::Parser;
use kitcrate_demos::{init_logging, GarmentArgs};
use kitcrate_gpu::SceneRenderConfig;
use kitcrate_visualization::CustomizerApp;

#[derive(Debug, Parser)]
#[command(name = "customizer", about = "Preview a garment design in 3D")]
struct Cli {
    #[command(flatten)]
    garment: GarmentArgs,

    /// Disable the key light's shadow map
    #[arg(long)]
    no_shadows: bool,

    /// Disable 4x multisampling
    #[arg(long)]
    no_msaa: bool,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.garment.resolve()?;
    tracing::info!("Starting customizer with {}", serde_json::to_string(&config)?);

    let render_config = SceneRenderConfig {
        enable_shadows: !cli.no_shadows,
        enable_multisampling: !cli.no_msaa,
        ..Default::default()
    };

    CustomizerApp::new(config).with_render_config(render_config).run()?;
    Ok(())
}
