//! In-memory GLB builder shared by the integration tests.

#![allow(dead_code)]

use std::future::Future;

use glb_loader::container::{GLB_CHUNK_BIN, GLB_CHUNK_JSON, GLB_MAGIC, GLB_VERSION};
use glb_loader::{Fetch, FetchError};
use serde_json::{json, Value};

pub const FLOAT: u32 = 5126;
pub const UNSIGNED_SHORT: u32 = 5123;

/// Builds GLB files: JSON document plus a BIN chunk.
pub struct GlbBuilder {
    pub doc: Value,
    pub bin: Vec<u8>,
}

impl Default for GlbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self {
            doc: json!({
                "asset": {"version": "2.0"},
                "scenes": [{"nodes": []}],
                "bufferViews": [],
                "accessors": []
            }),
            bin: Vec::new(),
        }
    }

    /// Append raw bytes as a new buffer view.
    pub fn push_bytes(&mut self, bytes: &[u8], stride: Option<usize>) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);

        let mut view = json!({"buffer": 0, "byteOffset": offset, "byteLength": bytes.len()});
        if let Some(stride) = stride {
            view["byteStride"] = json!(stride);
        }
        push(&mut self.doc["bufferViews"], view)
    }

    pub fn push_floats(&mut self, values: &[f32]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_bytes(&bytes, None)
    }

    pub fn push_u16(&mut self, values: &[u16]) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push_bytes(&bytes, None)
    }

    /// Add an accessor and return its index.
    pub fn accessor(
        &mut self,
        view: usize,
        byte_offset: usize,
        component_type: u32,
        count: usize,
        element: &str,
    ) -> usize {
        push(
            &mut self.doc["accessors"],
            json!({
                "bufferView": view,
                "byteOffset": byte_offset,
                "componentType": component_type,
                "count": count,
                "type": element
            }),
        )
    }

    /// Add a float VEC3 position accessor for `positions`.
    pub fn positions(&mut self, positions: &[f32]) -> usize {
        let view = self.push_floats(positions);
        self.accessor(view, 0, FLOAT, positions.len() / 3, "VEC3")
    }

    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.doc[key] = value;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = self.doc.clone();
        if !self.bin.is_empty() {
            doc["buffers"] = json!([{"byteLength": self.bin.len()}]);
        }
        let mut json = serde_json::to_vec(&doc).unwrap();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = self.bin.clone();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&GLB_VERSION.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&json);
        if !bin.is_empty() {
            out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
            out.extend_from_slice(&GLB_CHUNK_BIN.to_le_bytes());
            out.extend_from_slice(&bin);
        }
        let total = out.len() as u32;
        out[8..12].copy_from_slice(&total.to_le_bytes());
        out
    }
}

fn push(array: &mut Value, value: Value) -> usize {
    if !array.is_array() {
        *array = json!([]);
    }
    let items = array.as_array_mut().unwrap();
    items.push(value);
    items.len() - 1
}

/// Header-only GLB with the given JSON, no BIN chunk.
pub fn glb_from_json(json: &str) -> Vec<u8> {
    let mut builder = GlbBuilder::new();
    builder.doc = serde_json::from_str(json).unwrap();
    builder.build()
}

/// Serves fixed bytes for any URL.
pub struct MemoryFetcher(pub Vec<u8>);

impl Fetch for MemoryFetcher {
    fn fetch(&self, _url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        let bytes = self.0.clone();
        async move { Ok(bytes) }
    }
}

/// Fails every fetch with the given error.
pub struct FailingFetcher(pub FetchError);

impl Fetch for FailingFetcher {
    fn fetch(&self, _url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        let err = self.0.clone();
        async move { Err(err) }
    }
}
