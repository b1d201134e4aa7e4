//! Material building.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use glb_scene::{LoadWarning, MaterialDescriptor, Side, TextureBinding};
use tracing::warn;

use crate::document::{AlphaMode, Document, Material};
use crate::options::LoadOptions;
use crate::texture::TextureSlots;

/// Material descriptors in document order. Never empty.
#[derive(Debug, Clone)]
pub struct MaterialSet {
    materials: Vec<Arc<MaterialDescriptor>>,
}

impl MaterialSet {
    /// Material for a primitive's `material` index. Missing or out-of-range
    /// indices get the first material.
    pub fn resolve(&self, index: Option<usize>) -> Arc<MaterialDescriptor> {
        let index = index.unwrap_or(0);
        let material = self.materials.get(index).or_else(|| self.materials.first());
        match material {
            Some(material) => Arc::clone(material),
            None => Arc::new(MaterialDescriptor::fallback()),
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn as_slice(&self) -> &[Arc<MaterialDescriptor>] {
        &self.materials
    }

    pub fn into_vec(self) -> Vec<Arc<MaterialDescriptor>> {
        self.materials
    }
}

/// Build one descriptor per document material, or the fallback when the
/// document declares none.
pub fn build_materials(
    document: &Document,
    textures: &TextureSlots,
    options: &LoadOptions,
) -> (MaterialSet, Vec<LoadWarning>) {
    let mut warnings = Vec::new();

    let materials = if document.materials.is_empty() {
        vec![Arc::new(MaterialDescriptor::fallback())]
    } else {
        document
            .materials
            .iter()
            .enumerate()
            .map(|(index, material)| {
                let mut binder = Binder {
                    material: index,
                    textures,
                    warnings: &mut warnings,
                };
                Arc::new(convert_material(index, material, &mut binder, options))
            })
            .collect()
    };

    (MaterialSet { materials }, warnings)
}

/// Looks up texture slots, recording a warning for each missing one.
struct Binder<'a> {
    material: usize,
    textures: &'a TextureSlots,
    warnings: &'a mut Vec<LoadWarning>,
}

impl Binder<'_> {
    fn bind(&mut self, slot: &'static str, texture: usize, tex_coord: u32) -> Option<TextureBinding> {
        match self.textures.get(texture) {
            Some(decoded) => Some(TextureBinding::new(Arc::clone(decoded), tex_coord)),
            None => {
                warn!(material = self.material, slot, texture, "material texture not loaded");
                self.warnings.push(LoadWarning::MaterialTextureMissing {
                    material: self.material,
                    slot,
                    texture,
                });
                None
            }
        }
    }
}

fn convert_material(
    index: usize,
    mat: &Material,
    binder: &mut Binder<'_>,
    options: &LoadOptions,
) -> MaterialDescriptor {
    let name = mat
        .name
        .clone()
        .unwrap_or_else(|| format!("Material_{}", index));
    let mut material = MaterialDescriptor::new(name);

    let pbr = mat.pbr_metallic_roughness.clone().unwrap_or_default();
    let [r, g, b, a] = pbr.base_color_factor;
    material.color = Vec3::new(r, g, b);
    if a < 1.0 {
        material.opacity = a;
        material.transparent = true;
    }
    if let Some(tex) = &pbr.base_color_texture {
        material.map = binder.bind("base color", tex.index, tex.tex_coord);
    }

    if let Some(metalness) = pbr.metallic_factor {
        material.metalness = metalness;
    }
    if let Some(roughness) = pbr.roughness_factor {
        material.roughness = roughness;
    }
    if let Some(tex) = &pbr.metallic_roughness_texture {
        // One texture feeds both channels: G = roughness, B = metalness.
        let binding = binder.bind("metallic-roughness", tex.index, tex.tex_coord);
        material.metalness_map = binding.clone();
        material.roughness_map = binding;
    }

    if let Some(tex) = &mat.normal_texture {
        material.normal_map = binder.bind("normal", tex.index, tex.tex_coord);
        material.normal_scale = Vec2::splat(tex.scale);
    }

    if mat.double_sided || options.force_double_sided {
        material.side = Side::Double;
    }

    match mat.alpha_mode() {
        AlphaMode::Blend => {
            material.transparent = true;
            material.depth_write = false;
        }
        AlphaMode::Mask => material.alpha_test = mat.alpha_cutoff,
        AlphaMode::Opaque => {}
    }

    material.emissive = Vec3::from(mat.emissive_factor);
    if let Some(tex) = &mat.emissive_texture {
        material.emissive_map = binder.bind("emissive", tex.index, tex.tex_coord);
    }

    if let Some(tex) = &mat.occlusion_texture {
        material.ao_map = binder.bind("occlusion", tex.index, tex.tex_coord);
        material.ao_map_intensity = tex.strength;
    }

    material
}
