//! glb-loader: Binary glTF 2.0 (GLB) loading.
//!
//! This crate turns the bytes of a `.glb` file into a [`LoadedScene`] of
//! renderer-neutral descriptors: geometry buffers, PBR material parameters,
//! decoded RGBA8 textures and a node hierarchy.
//!
//! # Supported Content
//!
//! | Feature | Status |
//! |---------|--------|
//! | Embedded BIN buffer | Yes |
//! | External buffers / images | No |
//! | PNG / JPEG textures | Yes (via [`RasterDecoder`]) |
//! | PBR metallic-roughness | Yes |
//! | Node matrix / TRS transforms | Yes |
//! | Animation, skins, extensions | Ignored |
//!
//! # Quick Start
//!
//! ```ignore
//! use glb_loader::{GlbLoader, LoadOptions};
//!
//! let loader = GlbLoader::new().with_options(LoadOptions::new().single_sided());
//! let scene = loader.load_bytes(&file_bytes).await?;
//! for warning in &scene.warnings {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! # Pipeline
//!
//! ```text
//! bytes ─> container ─> document ─┬─> textures (blocking tasks) ─> materials ─┐
//!                                 └─> accessors ─> geometry ──────────────────┼─> scene
//! ```
//!
//! Problems confined to one texture, primitive, mesh or node reference are
//! recorded as [`LoadWarning`]s and the rest of the file still loads. Only a
//! broken container, an unreadable document, a failed fetch or a runaway node
//! graph fail the whole load.

pub mod accessor;
pub mod container;
pub mod document;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod options;
pub mod scene;
pub mod texture;

pub use accessor::{buffer_view_bytes, resolve_accessor, AccessorView};
pub use container::{is_glb, parse_glb, Chunk, ChunkKind, GlbAsset, GlbContainer};
pub use document::Document;
pub use error::{AccessorError, DecodeError, FetchError, GeometryError, LoadError, Result};
pub use fetch::Fetch;
pub use geometry::{build_geometry, build_meshes, BuiltGeometry};
pub use loader::GlbLoader;
pub use material::{build_materials, MaterialSet};
pub use options::{LoadOptions, DEFAULT_MAX_NODE_DEPTH};
pub use scene::{build_scene, select_scene};
pub use texture::{decode_all, ImageDecoder, ImageRequest, RasterDecoder, TextureSlots};

pub use glb_scene::{LoadWarning, LoadedScene};
