//! Loader facade.

use std::sync::Arc;

use glb_scene::LoadedScene;
use tracing::{info, info_span, Instrument};

use crate::container::parse_glb;
use crate::error::{LoadError, Result};
use crate::fetch::Fetch;
use crate::geometry::build_meshes;
use crate::material::build_materials;
use crate::options::LoadOptions;
use crate::scene::{build_scene, select_scene};
use crate::texture::{decode_all, ImageDecoder, RasterDecoder};

/// Loads GLB files into [`LoadedScene`]s.
///
/// Holds no state between loads; one loader can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct GlbLoader {
    options: LoadOptions,
    decoder: Option<Arc<dyn ImageDecoder>>,
}

impl Default for GlbLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GlbLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlbLoader")
            .field("options", &self.options)
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

impl GlbLoader {
    /// Create a loader with default options and the [`RasterDecoder`].
    pub fn new() -> Self {
        Self {
            options: LoadOptions::default(),
            decoder: Some(Arc::new(RasterDecoder)),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a host-provided image decoder.
    pub fn with_decoder(mut self, decoder: impl ImageDecoder) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Skip image decoding. Every texture slot will be empty.
    pub fn without_decoder(mut self) -> Self {
        self.decoder = None;
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Fetch `url` and load it.
    ///
    /// Requires a tokio runtime. Texture decoding runs on
    /// `tokio::task::spawn_blocking`, so calling this outside a runtime
    /// panics. Synchronous callers use [`GlbLoader::load_bytes_blocking`].
    pub async fn load<F: Fetch>(&self, fetcher: &F, url: &str) -> Result<LoadedScene> {
        let span = info_span!("glb_load", url);
        async {
            info!("fetching GLB");
            let bytes = fetcher.fetch(url).await?;
            self.load_bytes(&bytes).await
        }
        .instrument(span)
        .await
    }

    /// Load a GLB file already in memory.
    ///
    /// Same runtime requirement as [`GlbLoader::load`]. The scene choice is
    /// checked before any texture is decoded.
    pub async fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedScene> {
        info!(bytes = bytes.len(), "loading GLB");

        let asset = parse_glb(bytes)?;
        let document = &asset.document;
        select_scene(document, &self.options)?;

        let textures = decode_all(document, asset.binary, self.decoder.clone()).await;
        let (materials, material_warnings) = build_materials(document, &textures, &self.options);
        let (meshes, mesh_warnings) = build_meshes(document, asset.binary, &materials, &self.options);
        let (root, scene_warnings) = build_scene(document, &meshes, &self.options)?;

        let mut warnings = textures.warnings;
        warnings.extend(material_warnings);
        warnings.extend(mesh_warnings);
        warnings.extend(scene_warnings);

        let scene = LoadedScene {
            root,
            meshes,
            materials: materials.into_vec(),
            textures: textures.slots,
            warnings,
        };

        info!(
            nodes = scene.node_count(),
            meshes = scene.mesh_count(),
            materials = scene.materials.len(),
            textures = scene.texture_count(),
            warnings = scene.warnings.len(),
            "GLB loaded"
        );
        Ok(scene)
    }

    /// Load from a synchronous context on a private current-thread runtime.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn load_bytes_blocking(&self, bytes: &[u8]) -> Result<LoadedScene> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LoadError::Runtime(e.to_string()))?;
        runtime.block_on(self.load_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let loader = GlbLoader::new().without_decoder();
        assert!(format!("{:?}", loader).contains("decoder: false"));
        let loader = loader.with_decoder(RasterDecoder);
        assert!(format!("{:?}", loader).contains("decoder: true"));
    }

    #[test]
    fn test_blocking_load_rejects_garbage() {
        let err = GlbLoader::new().load_bytes_blocking(b"not a glb file").unwrap_err();
        assert!(err.is_malformed());
    }
}
