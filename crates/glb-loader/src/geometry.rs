//! Geometry and mesh building.

use std::sync::Arc;

use glb_scene::{
    AttributeSemantic, Geometry, LoadWarning, MeshGroup, MeshPrimitive, Topology, VertexAttribute,
};
use tracing::{debug, error, warn};

use crate::accessor::resolve_accessor;
use crate::document::{Document, Primitive};
use crate::error::GeometryError;
use crate::material::MaterialSet;
use crate::options::LoadOptions;

/// A built primitive geometry plus the accessors that needed the float32
/// compatibility fallback.
#[derive(Debug, Clone)]
pub struct BuiltGeometry {
    pub geometry: Geometry,
    pub fallbacks: Vec<usize>,
}

/// Build the geometry of one primitive.
pub fn build_geometry(
    document: &Document,
    binary: Option<&[u8]>,
    primitive: &Primitive,
    options: &LoadOptions,
) -> Result<BuiltGeometry, GeometryError> {
    if !primitive.attributes.contains_key(AttributeSemantic::Position.gltf_name()) {
        return Err(GeometryError::MissingRequiredAttribute(
            AttributeSemantic::Position.gltf_name(),
        ));
    }

    let mut geometry = Geometry::new(Topology::from_mode(primitive.mode));
    let mut fallbacks = Vec::new();

    for semantic in AttributeSemantic::ALL {
        let Some(&accessor) = primitive.attributes.get(semantic.gltf_name()) else {
            continue;
        };
        let view = resolve_accessor(document, binary, accessor)?;
        if view.is_fallback() {
            fallbacks.push(accessor);
        }

        // RGB vertex colors keep three components.
        let item_size = match semantic {
            AttributeSemantic::Color0 if view.component_count() == 3 => 3,
            _ => semantic.item_size(),
        };
        let attribute =
            VertexAttribute::new(view.to_attribute_data(), item_size).normalized(view.normalized());
        geometry.set_attribute(semantic, attribute);
    }

    if let Some(accessor) = primitive.indices {
        let view = resolve_accessor(document, binary, accessor)?;
        if view.is_fallback() {
            fallbacks.push(accessor);
        }
        geometry.indices = Some(view.to_indices());
    }

    if options.compute_normals && !geometry.has_attribute(AttributeSemantic::Normal) {
        geometry.compute_vertex_normals();
    }

    Ok(BuiltGeometry {
        geometry,
        fallbacks,
    })
}

/// Build every mesh. Failed primitives are dropped; a mesh with no
/// primitives left is `None`.
pub fn build_meshes(
    document: &Document,
    binary: Option<&[u8]>,
    materials: &MaterialSet,
    options: &LoadOptions,
) -> (Vec<Option<Arc<MeshGroup>>>, Vec<LoadWarning>) {
    let mut warnings = Vec::new();
    let mut meshes = Vec::with_capacity(document.meshes.len());

    for (mesh_index, mesh) in document.meshes.iter().enumerate() {
        let name = mesh
            .name
            .clone()
            .unwrap_or_else(|| format!("Mesh_{}", mesh_index));
        let mut primitives = Vec::with_capacity(mesh.primitives.len());

        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            match build_geometry(document, binary, primitive, options) {
                Ok(built) => {
                    for accessor in built.fallbacks {
                        let component_type = document
                            .accessors
                            .get(accessor)
                            .map(|a| a.component_type)
                            .unwrap_or_default();
                        warnings.push(LoadWarning::ComponentTypeFallback {
                            accessor,
                            component_type,
                        });
                    }
                    primitives.push(MeshPrimitive::new(
                        format!("{}_primitive_{}", name, primitive_index),
                        built.geometry,
                        materials.resolve(primitive.material),
                    ));
                }
                Err(err) => {
                    error!(
                        mesh = mesh_index,
                        primitive = primitive_index,
                        error = %err,
                        "failed to build primitive"
                    );
                    warnings.push(LoadWarning::PrimitiveDropped {
                        mesh: mesh_index,
                        primitive: primitive_index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if primitives.is_empty() {
            warn!(mesh = mesh_index, "mesh has no valid geometry");
            warnings.push(LoadWarning::MeshDropped { mesh: mesh_index });
            meshes.push(None);
        } else {
            debug!(mesh = mesh_index, primitives = primitives.len(), "built mesh");
            meshes.push(Some(Arc::new(MeshGroup { name, primitives })));
        }
    }

    (meshes, warnings)
}
