//! Material descriptors for a standard PBR (metalness/roughness) shader.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::texture::DecodedTexture;

/// Which faces are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// A decoded texture bound to a material slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub texture: Arc<DecodedTexture>,
    /// Texture coordinate set (0 = `uv`, 1 = `uv2`).
    pub tex_coord: u32,
}

impl TextureBinding {
    pub fn new(texture: Arc<DecodedTexture>, tex_coord: u32) -> Self {
        Self { texture, tex_coord }
    }

    /// Index of the bound texture in the source document.
    pub fn texture_index(&self) -> usize {
        self.texture.index
    }
}

/// Material construction request.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    /// Material name.
    pub name: String,
    /// Base color tint (RGB).
    pub color: Vec3,
    /// Base color map.
    pub map: Option<TextureBinding>,
    /// Opacity, meaningful when `transparent` is set.
    pub opacity: f32,
    pub transparent: bool,
    /// Metalness factor (0.0 = dielectric, 1.0 = metallic).
    pub metalness: f32,
    /// Roughness factor (0.0 = smooth, 1.0 = rough).
    pub roughness: f32,
    /// Blue channel of the metallic-roughness texture.
    pub metalness_map: Option<TextureBinding>,
    /// Green channel of the metallic-roughness texture.
    pub roughness_map: Option<TextureBinding>,
    pub normal_map: Option<TextureBinding>,
    pub normal_scale: Vec2,
    /// Emissive color (RGB).
    pub emissive: Vec3,
    pub emissive_map: Option<TextureBinding>,
    /// Ambient occlusion map (red channel).
    pub ao_map: Option<TextureBinding>,
    pub ao_map_intensity: f32,
    pub side: Side,
    /// Alpha test threshold; 0 disables the test.
    pub alpha_test: f32,
    pub depth_write: bool,
    pub flat_shading: bool,
    pub env_map_intensity: f32,
}

impl Default for MaterialDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: Vec3::ONE,
            map: None,
            opacity: 1.0,
            transparent: false,
            metalness: 0.0,
            roughness: 1.0,
            metalness_map: None,
            roughness_map: None,
            normal_map: None,
            normal_scale: Vec2::ONE,
            emissive: Vec3::ZERO,
            emissive_map: None,
            ao_map: None,
            ao_map_intensity: 1.0,
            side: Side::Front,
            alpha_test: 0.0,
            depth_write: true,
            flat_shading: false,
            env_map_intensity: 1.0,
        }
    }
}

impl MaterialDescriptor {
    /// Create a new default material.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Neutral gray, double-sided material used when a document declares none.
    pub fn fallback() -> Self {
        Self {
            name: "Default".to_string(),
            color: Vec3::splat(0.8),
            side: Side::Double,
            ..Default::default()
        }
    }

    pub fn is_double_sided(&self) -> bool {
        self.side == Side::Double
    }

    /// Iterate over every bound texture slot.
    pub fn bindings(&self) -> impl Iterator<Item = &TextureBinding> {
        [
            &self.map,
            &self.metalness_map,
            &self.roughness_map,
            &self.normal_map,
            &self.emissive_map,
            &self.ao_map,
        ]
        .into_iter()
        .flatten()
    }
}
