//! glTF 2.0 document model.
//!
//! Only the parts of the schema the loader consumes are modelled; animation,
//! skin, camera and extension members are ignored during deserialization.
//! Cross-references are plain indices and are only checked when dereferenced.

use std::collections::HashMap;

use serde::Deserialize;

/// Root glTF object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub asset: Asset,
    /// Parsed but never used to pick the scene; see
    /// [`LoadOptions::scene`](crate::LoadOptions::scene).
    pub scene: Option<usize>,
    /// Must be non-empty for a load to succeed.
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// One mesh group per entry, in order.
    #[serde(default)]
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub accessors: Vec<Accessor>,
    #[serde(default)]
    pub buffer_views: Vec<BufferView>,
    #[serde(default)]
    pub buffers: Vec<Buffer>,
    /// When empty, every primitive gets the fallback material.
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Texture slots are indexed by position here, not by image.
    #[serde(default)]
    pub textures: Vec<Texture>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Document {
    /// Parse a document from JSON bytes.
    pub fn from_slice(json: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(json)
    }
}

/// Asset metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Not checked.
    pub version: String,
    pub min_version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            min_version: None,
            generator: None,
            copyright: None,
        }
    }
}

/// A scene containing root nodes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scene {
    pub name: Option<String>,
    /// Become children of the `GLBModel` root. Unknown indices are skipped.
    #[serde(default)]
    pub nodes: Vec<usize>,
}

/// A node in the scene graph.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Overrides the mesh group's name on the built node.
    pub name: Option<String>,
    /// Walked depth-first; no cycle detection beyond the depth limit.
    #[serde(default)]
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    /// Column-major. Wins over TRS when both are present.
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    /// Quaternion in xyzw order.
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

/// A mesh containing primitives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Mesh {
    /// Falls back to `Mesh_<index>`.
    pub name: Option<String>,
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

/// A mesh primitive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Primitive {
    /// Semantic name to accessor index. Only POSITION is required.
    #[serde(default)]
    pub attributes: HashMap<String, usize>,
    pub indices: Option<usize>,
    /// Out-of-range indices resolve to the first material.
    pub material: Option<usize>,
    /// Topology code (0=POINTS, 1=LINES, 4=TRIANGLES, etc.).
    #[serde(default = "default_primitive_mode")]
    pub mode: u32,
}

fn default_primitive_mode() -> u32 {
    4 // TRIANGLES
}

/// Accessor component type codes.
pub const COMPONENT_BYTE: u32 = 5120;
pub const COMPONENT_UNSIGNED_BYTE: u32 = 5121;
pub const COMPONENT_SHORT: u32 = 5122;
pub const COMPONENT_UNSIGNED_SHORT: u32 = 5123;
pub const COMPONENT_UNSIGNED_INT: u32 = 5125;
pub const COMPONENT_FLOAT: u32 = 5126;

/// Numeric encoding of accessor components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Map a glTF component type code.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            COMPONENT_BYTE => Some(ComponentType::I8),
            COMPONENT_UNSIGNED_BYTE => Some(ComponentType::U8),
            COMPONENT_SHORT => Some(ComponentType::I16),
            COMPONENT_UNSIGNED_SHORT => Some(ComponentType::U16),
            COMPONENT_UNSIGNED_INT => Some(ComponentType::U32),
            COMPONENT_FLOAT => Some(ComponentType::F32),
            _ => None,
        }
    }

    /// Byte width of one component.
    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }
}

/// Accessor element shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// Parse a glTF accessor `type` string.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(ElementType::Scalar),
            "VEC2" => Some(ElementType::Vec2),
            "VEC3" => Some(ElementType::Vec3),
            "VEC4" => Some(ElementType::Vec4),
            "MAT2" => Some(ElementType::Mat2),
            "MAT3" => Some(ElementType::Mat3),
            "MAT4" => Some(ElementType::Mat4),
            _ => None,
        }
    }

    /// Number of components per element.
    pub fn component_count(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 | ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }
}

/// An accessor for typed buffer data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    /// Sparse-only accessors have none and fail to resolve.
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    /// Unknown codes read as f32.
    #[serde(default)]
    pub component_type: u32,
    #[serde(default)]
    pub count: usize,
    /// "SCALAR" through "MAT4"; anything else counts as one component.
    #[serde(rename = "type", default = "default_accessor_type")]
    pub accessor_type: String,
    /// Carried onto the vertex attribute; values are copied raw.
    #[serde(default)]
    pub normalized: bool,
    pub name: Option<String>,
}

fn default_accessor_type() -> String {
    "SCALAR".to_string()
}

impl Accessor {
    /// Decoded component type, `None` when the code is unknown.
    pub fn component(&self) -> Option<ComponentType> {
        ComponentType::from_code(self.component_type)
    }

    /// Get the number of components per element. Unknown types count as 1.
    pub fn component_count(&self) -> usize {
        ElementType::parse(&self.accessor_type)
            .map(ElementType::component_count)
            .unwrap_or(1)
    }

    /// Get the byte size of a single component, float-sized when unknown.
    pub fn component_size(&self) -> usize {
        self.component().map(ComponentType::size).unwrap_or(4)
    }

    /// Byte size of one element.
    pub fn element_size(&self) -> usize {
        self.component_count() * self.component_size()
    }

    /// Total number of scalar values.
    pub fn value_count(&self) -> usize {
        self.count * self.component_count()
    }
}

/// A view into a buffer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Anything but 0 is an external buffer and fails to resolve.
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Strides not larger than one element mean tightly packed.
    pub byte_stride: Option<usize>,
    pub name: Option<String>,
}

/// A buffer containing binary data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Declared only; bounds are checked against the real BIN chunk.
    #[serde(default)]
    pub byte_length: usize,
    /// Only buffer 0 without a URI resolves, to the BIN chunk.
    pub uri: Option<String>,
    pub name: Option<String>,
}

/// Alpha rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// A PBR material.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: Option<String>,
    /// Absent means white base color and descriptor defaults for the factors.
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    #[serde(default)]
    pub emissive_factor: [f32; 3],
    /// See [`Material::alpha_mode`].
    #[serde(default = "default_alpha_mode")]
    pub alpha_mode: String,
    /// Only meaningful in MASK mode.
    #[serde(default = "default_alpha_cutoff")]
    pub alpha_cutoff: f32,
    /// Only consulted when the load options stop forcing double-sided.
    #[serde(default)]
    pub double_sided: bool,
}

fn default_alpha_mode() -> String {
    "OPAQUE".to_string()
}

fn default_alpha_cutoff() -> f32 {
    0.5
}

impl Material {
    /// Parsed alpha mode. Unrecognised modes render opaque.
    pub fn alpha_mode(&self) -> AlphaMode {
        match self.alpha_mode.as_str() {
            "MASK" => AlphaMode::Mask,
            "BLEND" => AlphaMode::Blend,
            _ => AlphaMode::Opaque,
        }
    }
}

/// PBR metallic-roughness properties.
///
/// The scalar factors stay `None` when the file omits them, so the
/// material descriptor keeps its own defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    /// Alpha below 1.0 makes the material transparent.
    #[serde(default = "default_base_color_factor")]
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: Option<f32>,
    pub roughness_factor: Option<f32>,
    /// Bound to both the metalness and roughness maps.
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: default_base_color_factor(),
            base_color_texture: None,
            metallic_factor: None,
            roughness_factor: None,
            metallic_roughness_texture: None,
        }
    }
}

fn default_base_color_factor() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_factor() -> f32 {
    1.0
}

/// Texture reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    /// Index into `textures`. A slot that failed to decode leaves the
    /// binding empty.
    pub index: usize,
    /// Copied onto the binding.
    #[serde(default)]
    pub tex_coord: u32,
}

/// Normal texture reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalTextureInfo {
    pub index: usize,
    #[serde(default)]
    pub tex_coord: u32,
    /// Applied to both axes of the descriptor's normal scale.
    #[serde(default = "default_factor")]
    pub scale: f32,
}

/// Occlusion texture reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcclusionTextureInfo {
    pub index: usize,
    #[serde(default)]
    pub tex_coord: u32,
    /// Becomes the descriptor's AO map intensity.
    #[serde(default = "default_factor")]
    pub strength: f32,
}

/// A texture.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Texture {
    /// A texture without a source becomes an empty slot with a warning.
    pub source: Option<usize>,
    /// Preferred over the image name.
    pub name: Option<String>,
}

/// An image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// External images are not fetched; the texture is skipped.
    pub uri: Option<String>,
    /// Defaults to `image/png`.
    pub mime_type: Option<String>,
    /// Only source of image bytes the loader reads.
    pub buffer_view: Option<usize>,
    pub name: Option<String>,
}
