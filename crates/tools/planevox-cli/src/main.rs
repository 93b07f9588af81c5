use anyhow::{Context, Result};
use clap::Parser;
use planevox::io::{find_texture_directory, load_obj, save_scene_xml, save_vox, vox_file_reference, ImageTextureSource};
use planevox::{TracingReporter, Voxelizer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod settings;

use settings::{CliConfig, Settings};

#[derive(Parser, Debug)]
#[command(name = "planevox")]
#[command(about = "Voxelize a flat textured OBJ into a .vox scene and placement XML", long_about = None)]
pub struct Cli {
    /// Input OBJ file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output .vox file (default: input with .vox extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding the MTL textures
    #[arg(short, long)]
    pub texture_dir: Option<PathBuf>,

    /// World size of one voxel
    #[arg(short = 's', long)]
    pub voxel_size: Option<f32>,

    /// Material mapping `material:tag[:kind]` (can specify multiple)
    #[arg(short = 'm', long = "material-map")]
    pub material_maps: Vec<String>,

    /// Material property `material:property:value` (can specify multiple)
    #[arg(short = 'p', long = "material-property")]
    pub material_properties: Vec<String>,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log progress at info level
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let settings = Settings::resolve(&cli, file);
    let written = convert(&settings)?;
    println!("Wrote {} chunks to {}", written, settings.vox_output.display());
    println!("Wrote scene to {}", settings.xml_output.display());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run one conversion and write both outputs; returns the chunk count
fn convert(settings: &Settings) -> Result<usize> {
    let reporter = TracingReporter;
    let mesh = load_obj(&settings.input, &reporter)
        .with_context(|| format!("Failed to load {}", settings.input.display()))?;

    let texture_dir = find_texture_directory(&settings.input, settings.texture_dir.as_deref());
    tracing::info!("texture directory: {}", texture_dir.display());
    let source = ImageTextureSource::new(texture_dir);

    let scene = Voxelizer::new(settings.voxelize.clone(), &reporter)
        .run_with_source(&mesh, &source)
        .context("Voxelization failed")?;
    tracing::info!(
        "{} plane chunks, {} edge chunks",
        scene.plane_count(),
        scene.edge_count()
    );

    prepare_parent(&settings.vox_output)?;
    prepare_parent(&settings.xml_output)?;
    save_vox(&settings.vox_output, &scene.chunks, &scene.palette)
        .with_context(|| format!("Failed to write {}", settings.vox_output.display()))?;

    let file = vox_file_reference(&settings.vox_mount, &settings.vox_output);
    save_scene_xml(&settings.xml_output, &scene.placements(), &file)
        .with_context(|| format!("Failed to write {}", settings.xml_output.display()))?;
    Ok(scene.chunks.len())
}

fn prepare_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}
