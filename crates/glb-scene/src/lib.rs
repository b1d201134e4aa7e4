//! glb-scene: renderer-facing output of the GLB loader.
//!
//! The loader never creates engine objects itself. It hands back a
//! [`LoadedScene`] made of plain descriptors that a host adapter turns into
//! its own geometry, material and texture types:
//!
//! ```text
//! LoadedScene
//! ├── root: SceneNode ("GLBModel")
//! │   └── SceneNode ── Transform
//! │       ├── Arc<MeshGroup> ── MeshPrimitive { Geometry, Arc<MaterialDescriptor> }
//! │       └── children...
//! ├── materials: Vec<Arc<MaterialDescriptor>>
//! ├── textures:  Vec<Option<Arc<DecodedTexture>>>
//! └── warnings:  Vec<LoadWarning>
//! ```
//!
//! Mesh groups, materials and textures are shared through `Arc` handles, so a
//! mesh instanced by several nodes is stored once while each node keeps its
//! own transform.

pub mod geometry;
pub mod material;
pub mod node;
pub mod texture;
pub mod warning;

use std::sync::Arc;

pub use geometry::{
    AttributeData, AttributeSemantic, BoundingBox, Geometry, Topology, VertexAttribute,
};
pub use material::{MaterialDescriptor, Side, TextureBinding};
pub use node::{MeshGroup, MeshPrimitive, SceneNode, Transform};
pub use texture::{ColorSpace, DecodedImage, DecodedTexture, Filter, TextureSampling, Wrap};
pub use warning::LoadWarning;

/// Result of one successful load.
///
/// Partial successes are still successes: dropped primitives, meshes and
/// textures are reported through [`LoadedScene::warnings`].
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// Root container holding the chosen scene's root nodes.
    pub root: SceneNode,
    /// Built mesh groups, indexed by document mesh index. `None` marks a mesh
    /// whose primitives all failed to build.
    pub meshes: Vec<Option<Arc<MeshGroup>>>,
    /// Material descriptors, indexed by document material index.
    pub materials: Vec<Arc<MaterialDescriptor>>,
    /// Decoded textures, indexed by document texture index.
    pub textures: Vec<Option<Arc<DecodedTexture>>>,
    /// Non-fatal problems encountered during the load.
    pub warnings: Vec<LoadWarning>,
}

impl LoadedScene {
    /// Name given to the root container.
    pub const ROOT_NAME: &'static str = "GLBModel";

    /// Total number of nodes below the root container.
    pub fn node_count(&self) -> usize {
        self.root.node_count() - 1
    }

    /// Number of mesh groups that survived building.
    pub fn mesh_count(&self) -> usize {
        self.meshes.iter().flatten().count()
    }

    /// Number of textures that decoded successfully.
    pub fn texture_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    /// Whether the load completed without any warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Bounding box over every mesh instance, in root space.
    pub fn compute_bounds(&self) -> BoundingBox {
        let mut bounds: Option<BoundingBox> = None;
        for (node, world) in self.root.traverse() {
            let Some(mesh) = &node.mesh else { continue };
            for primitive in &mesh.primitives {
                let local = primitive.geometry.compute_bounds();
                let corners = local.corners().map(|c| world.transform_point3(c));
                let transformed = BoundingBox::from_points(&corners);
                match &mut bounds {
                    Some(b) => b.expand(&transformed),
                    None => bounds = Some(transformed),
                }
            }
        }
        bounds.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle_group() -> Arc<MeshGroup> {
        let mut geometry = Geometry::new(Topology::Triangles);
        geometry.set_attribute(
            AttributeSemantic::Position,
            VertexAttribute::new(
                AttributeData::F32(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
                3,
            ),
        );
        Arc::new(MeshGroup {
            name: "Mesh_0".into(),
            primitives: vec![MeshPrimitive::new(
                "Mesh_0_primitive_0",
                geometry,
                Arc::new(MaterialDescriptor::fallback()),
            )],
        })
    }

    #[test]
    fn test_counts() {
        let mut root = SceneNode::new(LoadedScene::ROOT_NAME);
        let mut child = SceneNode::with_mesh(triangle_group());
        child.children.push(SceneNode::new("leaf"));
        root.children.push(child);

        let scene = LoadedScene {
            root,
            meshes: vec![Some(triangle_group()), None],
            materials: vec![],
            textures: vec![None],
            warnings: vec![],
        };

        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.texture_count(), 0);
        assert!(scene.is_clean());
    }

    #[test]
    fn test_bounds_follow_instance_transform() {
        let mut root = SceneNode::new(LoadedScene::ROOT_NAME);
        let mut instance = SceneNode::with_mesh(triangle_group());
        instance.transform.translation = Vec3::new(10.0, 0.0, 0.0);
        root.children.push(instance);

        let scene = LoadedScene {
            root,
            meshes: vec![],
            materials: vec![],
            textures: vec![],
            warnings: vec![],
        };

        let bounds = scene.compute_bounds();
        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 0.0));
    }
}
