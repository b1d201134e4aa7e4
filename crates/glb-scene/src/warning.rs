//! Non-fatal load diagnostics.

use thiserror::Error;

/// A problem that removed or degraded part of the scene without failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadWarning {
    /// A texture slot resolved to nothing.
    #[error("texture {texture} skipped: {reason}")]
    TextureSkipped { texture: usize, reason: String },

    /// A material references a texture slot that did not decode.
    #[error("material {material} {slot} texture {texture} not loaded")]
    MaterialTextureMissing {
        material: usize,
        slot: &'static str,
        texture: usize,
    },

    /// A primitive failed to build and was removed from its mesh.
    #[error("mesh {mesh} primitive {primitive} dropped: {reason}")]
    PrimitiveDropped {
        mesh: usize,
        primitive: usize,
        reason: String,
    },

    /// A mesh had no surviving primitives.
    #[error("mesh {mesh} has no valid geometry")]
    MeshDropped { mesh: usize },

    /// An accessor used an unknown component type and was read as float32.
    #[error("accessor {accessor} has unknown component type {component_type}, read as float32")]
    ComponentTypeFallback { accessor: usize, component_type: u32 },

    /// A node references a mesh that was dropped or does not exist.
    #[error("node {node} references unavailable mesh {mesh}")]
    NodeMeshMissing { node: usize, mesh: usize },

    /// A scene or node references a node index that does not exist.
    #[error("node reference {node} does not exist")]
    NodeSkipped { node: usize },
}
