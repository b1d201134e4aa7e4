//! Load configuration.

use serde::{Deserialize, Serialize};

/// Default limit on node nesting.
pub const DEFAULT_MAX_NODE_DEPTH: usize = 128;

/// Options for loading a GLB file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Scene to build. Defaults to scene 0.
    pub scene: Option<usize>,
    /// Maximum node nesting before the load fails. Guards against cyclic
    /// `children` references.
    pub max_node_depth: usize,
    /// Render every material two-sided regardless of its `doubleSided` flag.
    pub force_double_sided: bool,
    /// Compute normals for primitives that have none.
    pub compute_normals: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scene: None,
            max_node_depth: DEFAULT_MAX_NODE_DEPTH,
            force_double_sided: true,
            compute_normals: true,
        }
    }
}

impl LoadOptions {
    /// Create default load options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a specific scene.
    pub fn with_scene(mut self, scene: usize) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Set the node depth limit.
    pub fn with_max_node_depth(mut self, depth: usize) -> Self {
        self.max_node_depth = depth.max(1);
        self
    }

    /// Honor each material's `doubleSided` flag instead of forcing two-sided.
    pub fn single_sided(mut self) -> Self {
        self.force_double_sided = false;
        self
    }

    /// Leave primitives without normals as they are.
    pub fn without_normal_generation(mut self) -> Self {
        self.compute_normals = false;
        self
    }
}
