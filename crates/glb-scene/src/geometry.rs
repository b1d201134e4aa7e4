//! Geometry descriptors.

use glam::Vec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Vertex attribute semantics understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeSemantic {
    /// Vertex position (VEC3).
    Position,
    /// Vertex normal (VEC3).
    Normal,
    /// First texture coordinate set (VEC2).
    TexCoord0,
    /// Second texture coordinate set (VEC2), used by occlusion maps.
    TexCoord1,
    /// Vertex color (VEC4, or VEC3 in some exporters).
    Color0,
}

impl AttributeSemantic {
    /// Every semantic, in the order attributes are attached.
    pub const ALL: [AttributeSemantic; 5] = [
        AttributeSemantic::Position,
        AttributeSemantic::Normal,
        AttributeSemantic::TexCoord0,
        AttributeSemantic::TexCoord1,
        AttributeSemantic::Color0,
    ];

    /// Attribute key used in glTF primitives.
    pub fn gltf_name(self) -> &'static str {
        match self {
            AttributeSemantic::Position => "POSITION",
            AttributeSemantic::Normal => "NORMAL",
            AttributeSemantic::TexCoord0 => "TEXCOORD_0",
            AttributeSemantic::TexCoord1 => "TEXCOORD_1",
            AttributeSemantic::Color0 => "COLOR_0",
        }
    }

    /// Attribute name conventionally used by renderers.
    pub fn renderer_name(self) -> &'static str {
        match self {
            AttributeSemantic::Position => "position",
            AttributeSemantic::Normal => "normal",
            AttributeSemantic::TexCoord0 => "uv",
            AttributeSemantic::TexCoord1 => "uv2",
            AttributeSemantic::Color0 => "color",
        }
    }

    /// Components per vertex the renderer expects.
    pub fn item_size(self) -> usize {
        match self {
            AttributeSemantic::Position | AttributeSemantic::Normal => 3,
            AttributeSemantic::TexCoord0 | AttributeSemantic::TexCoord1 => 2,
            AttributeSemantic::Color0 => 4,
        }
    }
}

/// Typed copy of accessor values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl AttributeData {
    /// Number of scalar values.
    pub fn len(&self) -> usize {
        match self {
            AttributeData::I8(v) => v.len(),
            AttributeData::U8(v) => v.len(),
            AttributeData::I16(v) => v.len(),
            AttributeData::U16(v) => v.len(),
            AttributeData::U32(v) => v.len(),
            AttributeData::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, widened to f32 without normalization.
    pub fn get_f32(&self, index: usize) -> Option<f32> {
        match self {
            AttributeData::I8(v) => v.get(index).map(|&x| x as f32),
            AttributeData::U8(v) => v.get(index).map(|&x| x as f32),
            AttributeData::I16(v) => v.get(index).map(|&x| x as f32),
            AttributeData::U16(v) => v.get(index).map(|&x| x as f32),
            AttributeData::U32(v) => v.get(index).map(|&x| x as f32),
            AttributeData::F32(v) => v.get(index).copied(),
        }
    }

    /// All values widened to f32.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        (0..self.len()).filter_map(|i| self.get_f32(i)).collect()
    }

    /// Width in bytes of one value.
    pub fn component_size(&self) -> usize {
        match self {
            AttributeData::I8(_) | AttributeData::U8(_) => 1,
            AttributeData::I16(_) | AttributeData::U16(_) => 2,
            AttributeData::U32(_) | AttributeData::F32(_) => 4,
        }
    }
}

/// One vertex attribute buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAttribute {
    /// Flat component values.
    pub data: AttributeData,
    /// Components per vertex.
    pub item_size: usize,
    /// Whether integer values map to [0, 1] / [-1, 1].
    pub normalized: bool,
}

impl VertexAttribute {
    pub fn new(data: AttributeData, item_size: usize) -> Self {
        Self {
            data,
            item_size: item_size.max(1),
            normalized: false,
        }
    }

    /// Mark the attribute as normalized.
    pub fn normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Number of vertices.
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    /// First three components of vertex `index`.
    pub fn vec3(&self, index: usize) -> Option<Vec3> {
        if self.item_size < 3 {
            return None;
        }
        let base = index * self.item_size;
        Some(Vec3::new(
            self.data.get_f32(base)?,
            self.data.get_f32(base + 1)?,
            self.data.get_f32(base + 2)?,
        ))
    }
}

/// Primitive topology, from the glTF `mode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// Map a glTF primitive mode. Unknown modes draw as triangles.
    pub fn from_mode(mode: u32) -> Self {
        match mode {
            0 => Topology::Points,
            1 => Topology::Lines,
            2 => Topology::LineLoop,
            3 => Topology::LineStrip,
            5 => Topology::TriangleStrip,
            6 => Topology::TriangleFan,
            _ => Topology::Triangles,
        }
    }
}

/// Geometry construction request: attribute buffers plus optional indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Draw topology.
    pub topology: Topology,
    /// Attributes in attachment order.
    pub attributes: IndexMap<AttributeSemantic, VertexAttribute>,
    /// Index list. `None` means a non-indexed draw.
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            ..Default::default()
        }
    }

    /// Attach or replace an attribute.
    pub fn set_attribute(&mut self, semantic: AttributeSemantic, attribute: VertexAttribute) {
        self.attributes.insert(semantic, attribute);
    }

    pub fn attribute(&self, semantic: AttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes.get(&semantic)
    }

    pub fn has_attribute(&self, semantic: AttributeSemantic) -> bool {
        self.attributes.contains_key(&semantic)
    }

    /// Number of vertices, taken from the position attribute.
    pub fn vertex_count(&self) -> usize {
        self.attribute(AttributeSemantic::Position)
            .map(VertexAttribute::count)
            .unwrap_or(0)
    }

    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Positions as vectors.
    pub fn positions(&self) -> Vec<Vec3> {
        match self.attribute(AttributeSemantic::Position) {
            Some(attr) => (0..attr.count()).filter_map(|i| attr.vec3(i)).collect(),
            None => Vec::new(),
        }
    }

    /// Compute the bounding box of the positions.
    pub fn compute_bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions())
    }

    /// Compute per-vertex normals from triangle faces.
    ///
    /// Indexed geometry accumulates area-weighted face normals on shared
    /// vertices; non-indexed geometry gets flat per-face normals. Vertices no
    /// non-degenerate face touches get +Z so every normal is unit length.
    pub fn compute_vertex_normals(&mut self) {
        let positions = self.positions();
        let mut sums = vec![Vec3::ZERO; positions.len()];

        match &self.indices {
            Some(indices) => {
                for tri in indices.chunks_exact(3) {
                    let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
                    let (Some(&pa), Some(&pb), Some(&pc)) =
                        (positions.get(a), positions.get(b), positions.get(c))
                    else {
                        continue;
                    };
                    let normal = (pb - pa).cross(pc - pa);
                    sums[a] += normal;
                    sums[b] += normal;
                    sums[c] += normal;
                }
            }
            None => {
                for (face, tri) in positions.chunks_exact(3).enumerate() {
                    let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
                    for corner in 0..3 {
                        sums[face * 3 + corner] = normal;
                    }
                }
            }
        }

        let normals: Vec<f32> = sums
            .into_iter()
            .flat_map(|n| {
                let n = n.try_normalize().unwrap_or(Vec3::Z);
                [n.x, n.y, n.z]
            })
            .collect();

        self.set_attribute(
            AttributeSemantic::Normal,
            VertexAttribute::new(AttributeData::F32(normals), 3),
        );
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl BoundingBox {
    /// Create from a set of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let mut min = points[0];
        let mut max = points[0];

        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }

        Self { min, max }
    }

    /// Get the center of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    /// Get the size of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Expand to include another bounding box.
    pub fn expand(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(values: Vec<f32>) -> VertexAttribute {
        VertexAttribute::new(AttributeData::F32(values), 3)
    }

    fn assert_unit(normals: &[f32]) {
        for n in normals.chunks_exact(3) {
            let len = Vec3::new(n[0], n[1], n[2]).length();
            assert!((len - 1.0).abs() < 1e-5, "normal length {len}");
        }
    }

    #[test]
    fn test_flat_normals_for_non_indexed_triangle() {
        let mut geometry = Geometry::new(Topology::Triangles);
        geometry.set_attribute(
            AttributeSemantic::Position,
            positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
        );

        geometry.compute_vertex_normals();

        let normals = geometry
            .attribute(AttributeSemantic::Normal)
            .unwrap()
            .data
            .to_f32_vec();
        assert_eq!(normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_shared_vertex_normals_are_averaged() {
        // Two faces folded along the shared edge (0, 1).
        let mut geometry = Geometry::new(Topology::Triangles);
        geometry.set_attribute(
            AttributeSemantic::Position,
            positions(vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0,
            ]),
        );
        geometry.indices = Some(vec![0, 1, 2, 1, 0, 3]);

        geometry.compute_vertex_normals();

        let normal = geometry.attribute(AttributeSemantic::Normal).unwrap();
        assert_eq!(normal.count(), 4);
        assert_unit(&normal.data.to_f32_vec());

        let shared = normal.vec3(0).unwrap();
        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!(shared.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_degenerate_and_orphan_vertices_get_unit_normals() {
        let mut geometry = Geometry::new(Topology::Triangles);
        geometry.set_attribute(
            AttributeSemantic::Position,
            positions(vec![
                0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, //
                5.0, 5.0, 5.0,
            ]),
        );
        // Second triangle references a vertex that does not exist.
        geometry.indices = Some(vec![0, 1, 2, 0, 1, 9]);

        geometry.compute_vertex_normals();

        let normals = geometry
            .attribute(AttributeSemantic::Normal)
            .unwrap()
            .data
            .to_f32_vec();
        assert_eq!(normals.len(), 12);
        assert_unit(&normals);
    }

    #[test]
    fn test_topology_from_mode() {
        assert_eq!(Topology::from_mode(4), Topology::Triangles);
        assert_eq!(Topology::from_mode(1), Topology::Lines);
        assert_eq!(Topology::from_mode(42), Topology::Triangles);
    }

    #[test]
    fn test_bounding_box() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0, -1.0, -1.0),
        ];
        let bounds = BoundingBox::from_points(&points);
        assert_eq!(bounds.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 0.5, 1.0));
    }
}
