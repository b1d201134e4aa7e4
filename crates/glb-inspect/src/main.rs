//! glb-inspect - print the scene graph of a GLB file
//!
//! Loads a `.glb` through the same pipeline a renderer would use and prints
//! nodes, meshes, materials, textures and load warnings.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glb_loader::{Fetch, FetchError, GlbLoader, LoadOptions, DEFAULT_MAX_NODE_DEPTH};
use glb_scene::LoadedScene;
use tracing::info;

#[derive(Parser)]
#[command(name = "glb-inspect")]
#[command(about = "Print a summary of a GLB file")]
#[command(version)]
struct Cli {
    /// Input .glb file
    input: PathBuf,

    /// Scene to build (defaults to 0)
    #[arg(short, long)]
    scene: Option<usize>,

    /// Maximum node nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_NODE_DEPTH)]
    max_depth: usize,

    /// Honor each material's doubleSided flag
    #[arg(long)]
    single_sided: bool,

    /// Do not generate missing normals
    #[arg(long)]
    no_normals: bool,

    /// Skip texture decoding
    #[arg(long)]
    no_textures: bool,

    /// Print the effective load options as JSON and exit
    #[arg(long)]
    print_options: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::new().with_max_node_depth(self.max_depth);
        if let Some(scene) = self.scene {
            options = options.with_scene(scene);
        }
        if self.single_sided {
            options = options.single_sided();
        }
        if self.no_normals {
            options = options.without_normal_generation();
        }
        options
    }
}

/// Reads files from disk; the URL is a filesystem path.
struct FileFetcher;

impl Fetch for FileFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        let path = PathBuf::from(url);
        async move {
            tokio::fs::read(&path)
                .await
                .map_err(|e| FetchError::Network(format!("{}: {}", path.display(), e)))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let options = cli.load_options();

    if cli.print_options {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let mut loader = GlbLoader::new().with_options(options);
    if cli.no_textures {
        loader = loader.without_decoder();
    }

    let url = cli.input.to_string_lossy();
    let scene = loader
        .load(&FileFetcher, &url)
        .await
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    print_summary(&scene);
    info!(warnings = scene.warnings.len(), "done");
    Ok(())
}

fn print_summary(scene: &LoadedScene) {
    println!("Nodes:");
    for (node, world) in scene.root.traverse() {
        let position = world.transform_point3(glam::Vec3::ZERO);
        match &node.mesh {
            Some(mesh) => println!(
                "  {} [{}] at {:?} ({} primitives)",
                node.name(),
                mesh.name,
                position,
                mesh.primitives.len()
            ),
            None => println!("  {} at {:?}", node.name(), position),
        }
    }

    println!("Meshes: {}/{}", scene.mesh_count(), scene.meshes.len());
    for mesh in scene.meshes.iter().flatten() {
        println!("  {} ({} vertices)", mesh.name, mesh.vertex_count());
    }

    println!("Materials: {}", scene.materials.len());
    for material in &scene.materials {
        println!(
            "  {} color={:?} metalness={} roughness={} textures={}",
            material.name,
            material.color,
            material.metalness,
            material.roughness,
            material.bindings().count()
        );
    }

    println!("Textures: {}/{}", scene.texture_count(), scene.textures.len());
    for texture in scene.textures.iter().flatten() {
        println!(
            "  {} {}x{} ({})",
            texture.name,
            texture.width(),
            texture.height(),
            texture.mime_type
        );
    }

    let bounds = scene.compute_bounds();
    println!("Bounds: {:?} .. {:?}", bounds.min, bounds.max);

    if !scene.warnings.is_empty() {
        println!("Warnings:");
        for warning in &scene.warnings {
            println!("  {}", warning);
        }
    }
}
