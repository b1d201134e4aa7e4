//! Accessor resolution.
//!
//! An accessor describes typed elements inside a buffer view, which in turn is
//! a window onto a buffer. In a GLB file the only supported buffer is the
//! embedded BIN chunk, so every view resolves to a slice of it:
//!
//! ```text
//! accessor ──► bufferView ──► buffer 0 (BIN chunk)
//!   byteOffset    byteOffset
//!   componentType byteStride
//!   type, count
//! ```
//!
//! [`AccessorView`] borrows the BIN chunk and decodes values on demand, so
//! resolving an accessor never copies. Geometry building copies out of the
//! view with [`AccessorView::to_attribute_data`] and [`AccessorView::to_indices`].

use glam::Vec3;
use glb_scene::AttributeData;
use tracing::warn;

use crate::document::{ComponentType, Document};
use crate::error::AccessorError;

/// A typed, strided view of an accessor's data in the binary buffer.
#[derive(Debug, Clone, Copy)]
pub struct AccessorView<'a> {
    index: usize,
    /// Bytes from the first element to the end of the binary buffer.
    bytes: &'a [u8],
    component_type: ComponentType,
    component_count: usize,
    count: usize,
    stride: usize,
    normalized: bool,
    fallback: bool,
}

/// Resolve accessor `index` against the binary buffer.
pub fn resolve_accessor<'a>(
    document: &Document,
    binary: Option<&'a [u8]>,
    index: usize,
) -> Result<AccessorView<'a>, AccessorError> {
    let accessor = document
        .accessors
        .get(index)
        .ok_or(AccessorError::UnknownAccessor(index))?;
    let view_index = accessor
        .buffer_view
        .ok_or(AccessorError::MissingBufferView { accessor: index })?;
    let view = document
        .buffer_views
        .get(view_index)
        .ok_or(AccessorError::UnknownBufferView(view_index))?;
    let buffer = embedded_buffer(document, binary, view.buffer)?;

    let (component_type, fallback) = match accessor.component() {
        Some(component_type) => (component_type, false),
        None => {
            warn!(
                accessor = index,
                component_type = accessor.component_type,
                "unknown accessor component type, reading as float32"
            );
            (ComponentType::F32, true)
        }
    };

    let component_count = accessor.component_count();
    let element_size = component_count * component_type.size();
    let stride = view
        .byte_stride
        .filter(|&stride| stride > element_size)
        .unwrap_or(element_size);

    let start = view.byte_offset.saturating_add(accessor.byte_offset);
    let span = match accessor.count {
        0 => 0,
        n => (n - 1)
            .saturating_mul(stride)
            .saturating_add(element_size),
    };
    let end = start.saturating_add(span);
    if end > buffer.len() {
        return Err(AccessorError::OutOfBounds {
            start,
            end,
            len: buffer.len(),
        });
    }

    Ok(AccessorView {
        index,
        bytes: &buffer[start..],
        component_type,
        component_count,
        count: accessor.count,
        stride,
        normalized: accessor.normalized,
        fallback,
    })
}

/// Slice the bytes of buffer view `view_index`.
pub fn buffer_view_bytes<'a>(
    document: &Document,
    binary: Option<&'a [u8]>,
    view_index: usize,
) -> Result<&'a [u8], AccessorError> {
    let view = document
        .buffer_views
        .get(view_index)
        .ok_or(AccessorError::UnknownBufferView(view_index))?;
    let buffer = embedded_buffer(document, binary, view.buffer)?;

    let start = view.byte_offset;
    let end = start.saturating_add(view.byte_length);
    if end > buffer.len() {
        return Err(AccessorError::OutOfBounds {
            start,
            end,
            len: buffer.len(),
        });
    }
    Ok(&buffer[start..end])
}

/// Map a buffer index to the BIN chunk. Only buffer 0 without a URI is
/// embedded.
fn embedded_buffer<'a>(
    document: &Document,
    binary: Option<&'a [u8]>,
    buffer: usize,
) -> Result<&'a [u8], AccessorError> {
    let external = buffer != 0
        || document
            .buffers
            .get(buffer)
            .is_some_and(|b| b.uri.is_some());
    if external {
        return Err(AccessorError::ExternalBuffer { buffer });
    }
    binary.ok_or(AccessorError::MissingBinaryChunk)
}

impl<'a> AccessorView<'a> {
    /// Accessor index in the document.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Total number of scalar values (`count * component_count`).
    pub fn len(&self) -> usize {
        self.count * self.component_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.count
    }

    /// Components per element.
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Byte distance between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    /// Whether an unknown component type was read as float32.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Value `i` (flattened over elements and components) as f32.
    pub fn get(&self, i: usize) -> Option<f32> {
        let offset = self.offset_of(i)?;
        let bytes = self.bytes;
        Some(match self.component_type {
            ComponentType::I8 => bytes[offset] as i8 as f32,
            ComponentType::U8 => bytes[offset] as f32,
            ComponentType::I16 => i16::from_le_bytes(le_bytes(bytes, offset)) as f32,
            ComponentType::U16 => u16::from_le_bytes(le_bytes(bytes, offset)) as f32,
            ComponentType::U32 => u32::from_le_bytes(le_bytes(bytes, offset)) as f32,
            ComponentType::F32 => f32::from_le_bytes(le_bytes(bytes, offset)),
        })
    }

    /// Iterate over every value as f32.
    pub fn iter_f32(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Read the first three components of element `element`.
    pub fn read_vec3(&self, element: usize) -> Option<Vec3> {
        if self.component_count < 3 {
            return None;
        }
        let base = element.checked_mul(self.component_count)?;
        Some(Vec3::new(
            self.get(base)?,
            self.get(base + 1)?,
            self.get(base + 2)?,
        ))
    }

    /// Copy the values out with their original component type.
    pub fn to_attribute_data(&self) -> AttributeData {
        let n = self.len();
        match self.component_type {
            ComponentType::I8 => AttributeData::I8(self.collect(n, |b, o| b[o] as i8)),
            ComponentType::U8 => AttributeData::U8(self.collect(n, |b, o| b[o])),
            ComponentType::I16 => {
                AttributeData::I16(self.collect(n, |b, o| i16::from_le_bytes(le_bytes(b, o))))
            }
            ComponentType::U16 => {
                AttributeData::U16(self.collect(n, |b, o| u16::from_le_bytes(le_bytes(b, o))))
            }
            ComponentType::U32 => {
                AttributeData::U32(self.collect(n, |b, o| u32::from_le_bytes(le_bytes(b, o))))
            }
            ComponentType::F32 => {
                AttributeData::F32(self.collect(n, |b, o| f32::from_le_bytes(le_bytes(b, o))))
            }
        }
    }

    /// Copy the values out as u32 indices.
    pub fn to_indices(&self) -> Vec<u32> {
        let n = self.len();
        match self.component_type {
            ComponentType::U8 => self.collect(n, |b, o| b[o] as u32),
            ComponentType::U16 => self.collect(n, |b, o| u16::from_le_bytes(le_bytes(b, o)) as u32),
            ComponentType::U32 => self.collect(n, |b, o| u32::from_le_bytes(le_bytes(b, o))),
            _ => self.iter_f32().map(|v| v as u32).collect(),
        }
    }

    fn offset_of(&self, i: usize) -> Option<usize> {
        if i >= self.len() {
            return None;
        }
        let element = i / self.component_count;
        let component = i % self.component_count;
        Some(element * self.stride + component * self.component_type.size())
    }

    fn collect<T>(&self, n: usize, read: impl Fn(&[u8], usize) -> T) -> Vec<T> {
        (0..n)
            .filter_map(|i| self.offset_of(i))
            .map(|offset| read(self.bytes, offset))
            .collect()
    }
}

fn le_bytes<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}
