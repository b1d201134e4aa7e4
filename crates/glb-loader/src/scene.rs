//! Scene graph building.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use glb_scene::{LoadWarning, LoadedScene, MeshGroup, SceneNode, Transform};
use tracing::warn;

use crate::document::{Document, Node, Scene};
use crate::error::{LoadError, Result};
use crate::options::LoadOptions;

/// The scene to build: `options.scene`, or scene 0. The document's own
/// `scene` field is not consulted.
pub fn select_scene<'a>(document: &'a Document, options: &LoadOptions) -> Result<&'a Scene> {
    if document.scenes.is_empty() {
        return Err(LoadError::malformed("document declares no scenes"));
    }
    let scene_index = options.scene.unwrap_or(0);
    document.scenes.get(scene_index).ok_or_else(|| {
        LoadError::malformed(format!(
            "scene {} out of range ({} declared)",
            scene_index,
            document.scenes.len()
        ))
    })
}

/// Build the node tree of the chosen scene under a `GLBModel` root.
pub fn build_scene(
    document: &Document,
    meshes: &[Option<Arc<MeshGroup>>],
    options: &LoadOptions,
) -> Result<(SceneNode, Vec<LoadWarning>)> {
    let scene = select_scene(document, options)?;

    let mut builder = SceneBuilder {
        document,
        meshes,
        max_depth: options.max_node_depth,
        warnings: Vec::new(),
    };

    let mut root = SceneNode::new(LoadedScene::ROOT_NAME);
    for &node in &scene.nodes {
        if let Some(child) = builder.build_node(node, 1)? {
            root.children.push(child);
        }
    }

    Ok((root, builder.warnings))
}

struct SceneBuilder<'a> {
    document: &'a Document,
    meshes: &'a [Option<Arc<MeshGroup>>],
    max_depth: usize,
    warnings: Vec<LoadWarning>,
}

impl SceneBuilder<'_> {
    fn build_node(&mut self, index: usize, depth: usize) -> Result<Option<SceneNode>> {
        if depth > self.max_depth {
            return Err(LoadError::NodeDepthExceeded {
                node: index,
                limit: self.max_depth,
            });
        }

        let Some(gltf_node) = self.document.nodes.get(index) else {
            warn!(node = index, "skipping unknown node reference");
            self.warnings.push(LoadWarning::NodeSkipped { node: index });
            return Ok(None);
        };

        let mut node = match gltf_node.mesh {
            Some(mesh) => match self.meshes.get(mesh).and_then(Option::as_ref) {
                Some(group) => SceneNode::with_mesh(Arc::clone(group)),
                None => {
                    warn!(node = index, mesh, "node references unavailable mesh");
                    self.warnings
                        .push(LoadWarning::NodeMeshMissing { node: index, mesh });
                    SceneNode::default()
                }
            },
            None => SceneNode::default(),
        };
        if gltf_node.name.is_some() {
            node.name = gltf_node.name.clone();
        }
        node.transform = node_transform(gltf_node);

        for &child in &gltf_node.children {
            if let Some(child) = self.build_node(child, depth + 1)? {
                node.children.push(child);
            }
        }

        Ok(Some(node))
    }
}

/// Local transform of a node. A matrix takes precedence over TRS.
pub fn node_transform(node: &Node) -> Transform {
    if let Some(matrix) = &node.matrix {
        return Transform::from_matrix(Mat4::from_cols_array(matrix));
    }
    Transform {
        translation: node.translation.map(Vec3::from).unwrap_or(Vec3::ZERO),
        rotation: node
            .rotation
            .map(|r| Quat::from_xyzw(r[0], r[1], r[2], r[3]))
            .unwrap_or(Quat::IDENTITY),
        scale: node.scale.map(Vec3::from).unwrap_or(Vec3::ONE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glb_scene::{Geometry, MaterialDescriptor, MeshPrimitive, Topology};

    fn document(json: &str) -> Document {
        Document::from_slice(json.as_bytes()).unwrap()
    }

    fn group(name: &str) -> Option<Arc<MeshGroup>> {
        Some(Arc::new(MeshGroup {
            name: name.to_string(),
            primitives: vec![MeshPrimitive::new(
                format!("{}_primitive_0", name),
                Geometry::new(Topology::Triangles),
                Arc::new(MaterialDescriptor::fallback()),
            )],
        }))
    }

    #[test]
    fn test_empty_scene() {
        let doc = document(r#"{"scenes":[{"nodes":[]}]}"#);
        let (root, warnings) = build_scene(&doc, &[], &LoadOptions::default()).unwrap();
        assert_eq!(root.name(), "GLBModel");
        assert!(root.children.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_scene_selection() {
        let doc = document(
            r#"{"scene":1,"scenes":[{"nodes":[0]},{"nodes":[1]}],"nodes":[{"name":"a"},{"name":"b"}]}"#,
        );
        let (root, _) = build_scene(&doc, &[], &LoadOptions::default()).unwrap();
        assert_eq!(root.children[0].name(), "a");

        let (root, _) = build_scene(&doc, &[], &LoadOptions::new().with_scene(1)).unwrap();
        assert_eq!(root.children[0].name(), "b");

        let err = build_scene(&doc, &[], &LoadOptions::new().with_scene(5)).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_document_default_scene_is_ignored() {
        let doc = document(r#"{"scene":1,"scenes":[{"nodes":[]}]}"#);
        let scene = select_scene(&doc, &LoadOptions::default()).unwrap();
        assert!(scene.nodes.is_empty());
        let (root, warnings) = build_scene(&doc, &[], &LoadOptions::default()).unwrap();
        assert!(root.children.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_no_scenes_is_malformed() {
        let err = build_scene(&Document::default(), &[], &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no scenes"));
    }

    #[test]
    fn test_shared_mesh_instances() {
        let doc = document(
            r#"{"scenes":[{"nodes":[0,1]}],
                "nodes":[{"mesh":0},{"mesh":0,"name":"copy","translation":[1,2,3]}]}"#,
        );
        let meshes = vec![group("Mesh_0")];
        let (root, _) = build_scene(&doc, &meshes, &LoadOptions::default()).unwrap();

        let first = &root.children[0];
        let second = &root.children[1];
        assert_eq!(first.name(), "Mesh_0");
        assert_eq!(second.name(), "copy");
        assert_eq!(second.transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(Arc::ptr_eq(
            first.mesh.as_ref().unwrap(),
            second.mesh.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_missing_references_become_warnings() {
        let doc = document(
            r#"{"scenes":[{"nodes":[0,9]}],
                "nodes":[{"mesh":0,"children":[1,5]},{"mesh":3}]}"#,
        );
        let (root, warnings) = build_scene(&doc, &[None], &LoadOptions::default()).unwrap();
        assert_eq!(root.node_count(), 3);
        assert!(root.children[0].mesh.is_none());
        assert_eq!(
            warnings,
            vec![
                LoadWarning::NodeMeshMissing { node: 0, mesh: 0 },
                LoadWarning::NodeMeshMissing { node: 1, mesh: 3 },
                LoadWarning::NodeSkipped { node: 5 },
                LoadWarning::NodeSkipped { node: 9 },
            ]
        );
    }

    #[test]
    fn test_matrix_takes_precedence() {
        let doc = document(
            r#"{"nodes":[{
                "matrix":[2,0,0,0, 0,2,0,0, 0,0,2,0, 5,6,7,1],
                "translation":[100,100,100]
            }]}"#,
        );
        let transform = node_transform(&doc.nodes[0]);
        assert!((transform.translation - Vec3::new(5.0, 6.0, 7.0)).length() < 1e-6);
        assert!((transform.scale - Vec3::splat(2.0)).length() < 1e-6);
    }

    #[test]
    fn test_trs_rotation() {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let doc = document(&format!(r#"{{"nodes":[{{"rotation":[0,0,{s},{s}]}}]}}"#));
        let transform = node_transform(&doc.nodes[0]);
        let rotated = transform.rotation * Vec3::X;
        assert!((rotated - Vec3::Y).length() < 1e-6);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_cycle_fails_with_depth_error() {
        let doc = document(r#"{"scenes":[{"nodes":[0]}],"nodes":[{"children":[1]},{"children":[0]}]}"#);
        let options = LoadOptions::new().with_max_node_depth(16);
        let err = build_scene(&doc, &[], &options).unwrap_err();
        assert!(matches!(err, LoadError::NodeDepthExceeded { limit: 16, .. }));
    }
}
