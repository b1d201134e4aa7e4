//! Scene graph nodes and mesh groups.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::material::MaterialDescriptor;

/// Local transform, decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Decompose an affine matrix into translation, rotation and scale.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// One drawable surface: geometry plus material.
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    pub name: String,
    pub geometry: Geometry,
    pub material: Arc<MaterialDescriptor>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshPrimitive {
    pub fn new(
        name: impl Into<String>,
        geometry: Geometry,
        material: Arc<MaterialDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            cast_shadow: true,
            receive_shadow: true,
        }
    }
}

/// The prebuilt primitives of one document mesh. Shared by every node that
/// instances the mesh.
#[derive(Debug, Clone)]
pub struct MeshGroup {
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
}

impl MeshGroup {
    pub fn vertex_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|p| p.geometry.vertex_count())
            .sum()
    }
}

/// A node in the scene graph. Owns its children.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Mesh instanced at this node, if any.
    pub mesh: Option<Arc<MeshGroup>>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty transform node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Create a node instancing `mesh`, named after the mesh.
    pub fn with_mesh(mesh: Arc<MeshGroup>) -> Self {
        Self {
            name: Some(mesh.name.clone()),
            mesh: Some(mesh),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Local transform as a matrix.
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Find the first node in the subtree with the given name.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        self.traverse()
            .map(|(node, _)| node)
            .find(|node| node.name.as_deref() == Some(name))
    }

    /// Depth-first, pre-order traversal yielding each node with its world matrix
    /// relative to this node's parent.
    pub fn traverse(&self) -> impl Iterator<Item = (&SceneNode, Mat4)> {
        NodeTraverser {
            stack: vec![(self, Mat4::IDENTITY)],
        }
    }
}

struct NodeTraverser<'a> {
    stack: Vec<(&'a SceneNode, Mat4)>,
}

impl<'a> Iterator for NodeTraverser<'a> {
    type Item = (&'a SceneNode, Mat4);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, parent_transform) = self.stack.pop()?;
        let world_transform = parent_transform * node.local_matrix();

        // Push children in reverse order so they're processed left-to-right
        for child in node.children.iter().rev() {
            self.stack.push((child, world_transform));
        }

        Some((node, world_transform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_order() {
        let mut root = SceneNode::new("root");
        let mut child1 = SceneNode::new("child1");
        child1.children.push(SceneNode::new("grandchild"));
        root.children.push(child1);
        root.children.push(SceneNode::new("child2"));

        let names: Vec<&str> = root.traverse().map(|(n, _)| n.name()).collect();
        assert_eq!(names, vec!["root", "child1", "grandchild", "child2"]);
        assert_eq!(root.node_count(), 4);
        assert!(root.find("grandchild").is_some());
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn test_world_transform_accumulates() {
        let mut parent = SceneNode::new("parent");
        parent.transform.translation = Vec3::new(1.0, 0.0, 0.0);
        let mut child = SceneNode::new("child");
        child.transform.translation = Vec3::new(0.0, 2.0, 0.0);
        parent.children.push(child);

        let (_, world) = parent.traverse().nth(1).unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_matrix_decomposition_round_trip() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 2.0, 2.0),
            rotation,
            Vec3::new(1.0, 2.0, 3.0),
        );
        let transform = Transform::from_matrix(matrix);
        assert!(transform.translation.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
        assert!(transform.scale.abs_diff_eq(Vec3::splat(2.0), 1e-5));
        assert!((transform.rotation * Vec3::X).abs_diff_eq(rotation * Vec3::X, 1e-5));
    }
}
