//! GLB container reader.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ magic │ version │ length     │  12-byte header
//! ├──────────────────────────────┤
//! │ length │ "JSON" │ payload... │  chunk 0 (required)
//! ├──────────────────────────────┤
//! │ length │ "BIN\0" │ payload...│  chunk 1 (optional)
//! └──────────────────────────────┘
//! ```
//!
//! All fields are little-endian `u32`. Chunk payloads are borrowed from the
//! input; nothing is copied until the document is parsed.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{LoadError, Result};

/// GLB magic number.
pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF" in little-endian
/// GLB version 2.
pub const GLB_VERSION: u32 = 2;
/// JSON chunk type.
pub const GLB_CHUNK_JSON: u32 = 0x4E4F534A; // "JSON" in little-endian
/// Binary chunk type.
pub const GLB_CHUNK_BIN: u32 = 0x004E4942; // "BIN\0" in little-endian

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Chunk type as read from the chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Json,
    Binary,
    Unknown(u32),
}

impl ChunkKind {
    fn from_code(code: u32) -> Self {
        match code {
            GLB_CHUNK_JSON => ChunkKind::Json,
            GLB_CHUNK_BIN => ChunkKind::Binary,
            other => ChunkKind::Unknown(other),
        }
    }
}

/// One chunk of a GLB container.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub kind: ChunkKind,
    /// Length declared in the chunk header.
    pub declared_length: u32,
    /// Payload bytes actually available.
    pub payload: &'a [u8],
}

impl Chunk<'_> {
    /// Whether the payload was cut short by the end of input.
    pub fn is_truncated(&self) -> bool {
        self.payload.len() < self.declared_length as usize
    }
}

/// Header and chunk table of a GLB file.
#[derive(Debug, Clone)]
pub struct GlbContainer<'a> {
    pub version: u32,
    /// Total length declared in the header. Recorded, never enforced.
    pub declared_length: u32,
    /// JSON chunk first, then at most one more.
    pub chunks: SmallVec<[Chunk<'a>; 2]>,
}

impl<'a> GlbContainer<'a> {
    /// Parse the header and chunk table without interpreting the JSON.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(LoadError::malformed("truncated header"));
        }

        let magic = read_u32(data, 0);
        if magic != GLB_MAGIC {
            return Err(LoadError::malformed("bad magic"));
        }

        let version = read_u32(data, 4);
        let declared_length = read_u32(data, 8);
        if version != GLB_VERSION {
            warn!(version, "unexpected GLB version, continuing");
        }
        if declared_length as usize != data.len() {
            debug!(
                declared = declared_length,
                actual = data.len(),
                "GLB length does not match input size"
            );
        }

        let mut chunks = SmallVec::new();

        let mut offset = HEADER_LEN;
        if data.len() < offset + CHUNK_HEADER_LEN {
            return Err(LoadError::malformed("missing JSON chunk"));
        }
        let json_length = read_u32(data, offset);
        if ChunkKind::from_code(read_u32(data, offset + 4)) != ChunkKind::Json {
            return Err(LoadError::malformed("missing JSON chunk"));
        }
        offset += CHUNK_HEADER_LEN;
        let json_end = offset
            .checked_add(json_length as usize)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| LoadError::malformed("JSON chunk extends past end of input"))?;
        chunks.push(Chunk {
            kind: ChunkKind::Json,
            declared_length: json_length,
            payload: &data[offset..json_end],
        });
        offset = json_end;

        if data.len() >= offset + CHUNK_HEADER_LEN {
            let declared_length = read_u32(data, offset);
            let kind = ChunkKind::from_code(read_u32(data, offset + 4));
            offset += CHUNK_HEADER_LEN;
            let end = offset.saturating_add(declared_length as usize).min(data.len());
            let chunk = Chunk {
                kind,
                declared_length,
                payload: &data[offset..end],
            };
            match kind {
                ChunkKind::Binary if chunk.is_truncated() => warn!(
                    declared = declared_length,
                    available = chunk.payload.len(),
                    "BIN chunk truncated, clamping to available bytes"
                ),
                ChunkKind::Unknown(code) => debug!(code, "ignoring unknown chunk"),
                _ => {}
            }
            chunks.push(chunk);
        } else if data.len() > offset {
            debug!(trailing = data.len() - offset, "ignoring trailing bytes");
        }

        Ok(Self {
            version,
            declared_length,
            chunks,
        })
    }

    /// The JSON chunk payload.
    pub fn json(&self) -> &'a [u8] {
        self.chunks
            .iter()
            .find(|c| c.kind == ChunkKind::Json)
            .map(|c| c.payload)
            .unwrap_or_default()
    }

    /// The binary chunk payload, if present.
    pub fn binary(&self) -> Option<&'a [u8]> {
        self.chunks
            .iter()
            .find(|c| c.kind == ChunkKind::Binary)
            .map(|c| c.payload)
    }
}

/// A parsed GLB file: container, document and the binary buffer.
#[derive(Debug, Clone)]
pub struct GlbAsset<'a> {
    pub container: GlbContainer<'a>,
    pub document: Document,
    pub binary: Option<&'a [u8]>,
}

/// Parse a GLB byte stream into its document and binary buffer.
pub fn parse_glb(data: &[u8]) -> Result<GlbAsset<'_>> {
    let container = GlbContainer::parse(data)?;
    let document = Document::from_slice(container.json())?;
    let binary = container.binary();

    debug!(
        version = container.version,
        json_bytes = container.json().len(),
        binary_bytes = binary.map(<[u8]>::len).unwrap_or(0),
        "parsed GLB container"
    );

    Ok(GlbAsset {
        container,
        document,
        binary,
    })
}

/// Check for the GLB magic number.
pub fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && read_u32(data, 0) == GLB_MAGIC
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
