//! Embedded texture decoding.
//!
//! Each texture's image bytes are sliced from the BIN chunk and wrapped in a
//! `data:` URI, then handed to an [`ImageDecoder`] on a blocking task. All
//! decodes run concurrently; results are collected by texture index, not by
//! completion order.

use std::sync::Arc;

use base64::Engine as _;
use glb_scene::{DecodedImage, DecodedTexture, LoadWarning};
use image::ImageFormat;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::accessor::buffer_view_bytes;
use crate::document::Document;
use crate::error::DecodeError;

/// MIME type assumed when an image does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// One image to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Texture index in the document.
    pub texture: usize,
    pub name: String,
    pub mime_type: String,
    /// `data:<mime>;base64,<payload>`
    pub data_uri: String,
}

impl ImageRequest {
    /// Build a request from raw image bytes.
    pub fn new(texture: usize, name: String, mime_type: String, bytes: &[u8]) -> Self {
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data_uri = format!("data:{};base64,{}", mime_type, payload);
        Self {
            texture,
            name,
            mime_type,
            data_uri,
        }
    }
}

/// Turns a data URI into RGBA8 pixels. Implemented by the host.
pub trait ImageDecoder: Send + Sync + 'static {
    fn decode(&self, request: &ImageRequest) -> Result<DecodedImage, DecodeError>;
}

/// [`ImageDecoder`] backed by the `image` crate. Handles PNG and JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, request: &ImageRequest) -> Result<DecodedImage, DecodeError> {
        let (mime_type, bytes) = decode_data_uri(&request.data_uri)?;
        let format = match mime_type {
            "image/png" => ImageFormat::Png,
            "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
            other => return Err(DecodeError::UnsupportedMimeType(other.to_string())),
        };

        let rgba = image::load_from_memory_with_format(&bytes, format)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage::new(width, height, rgba.into_raw()))
    }
}

/// Decode a base64 data URI into its MIME type and bytes.
pub fn decode_data_uri(uri: &str) -> Result<(&str, Vec<u8>), DecodeError> {
    // Format: data:[<mediatype>][;base64],<data>
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| DecodeError::InvalidDataUri("missing data: scheme".into()))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUri("missing payload separator".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| DecodeError::InvalidDataUri("URL-encoded data URIs not supported".into()))?;

    let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;
    Ok((mime_type, bytes))
}

/// Decoded textures in document order, plus the warnings for absent slots.
#[derive(Debug, Default)]
pub struct TextureSlots {
    pub slots: Vec<Option<Arc<DecodedTexture>>>,
    pub warnings: Vec<LoadWarning>,
}

impl TextureSlots {
    /// Texture at `index`, if it decoded.
    pub fn get(&self, index: usize) -> Option<&Arc<DecodedTexture>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    fn skip(&mut self, texture: usize, reason: String) {
        warn!(texture, %reason, "texture skipped");
        self.slots.push(None);
        self.warnings.push(LoadWarning::TextureSkipped { texture, reason });
    }
}

/// Build the decode request for texture `index`.
pub fn image_request(
    document: &Document,
    binary: Option<&[u8]>,
    index: usize,
) -> Result<ImageRequest, String> {
    let texture = document
        .textures
        .get(index)
        .ok_or_else(|| "texture does not exist".to_string())?;
    let source = texture
        .source
        .ok_or_else(|| "texture has no image source".to_string())?;
    let image = document
        .images
        .get(source)
        .ok_or_else(|| format!("image {} does not exist", source))?;

    let view = match (image.buffer_view, &image.uri) {
        (Some(view), _) => view,
        (None, Some(_)) => return Err("external image URIs are not supported".to_string()),
        (None, None) => return Err(format!("image {} has no buffer view", source)),
    };
    let bytes = buffer_view_bytes(document, binary, view).map_err(|e| e.to_string())?;

    let name = texture
        .name
        .clone()
        .or_else(|| image.name.clone())
        .unwrap_or_else(|| format!("Texture_{}", index));
    let mime_type = image
        .mime_type
        .clone()
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    Ok(ImageRequest::new(index, name, mime_type, bytes))
}

/// Decode every texture in the document.
///
/// Never fails as a whole. Without a decoder every slot is absent.
pub async fn decode_all(
    document: &Document,
    binary: Option<&[u8]>,
    decoder: Option<Arc<dyn ImageDecoder>>,
) -> TextureSlots {
    let mut out = TextureSlots::default();
    let Some(decoder) = decoder else {
        for index in 0..document.textures.len() {
            out.skip(index, "no image decoder configured".to_string());
        }
        return out;
    };

    // Fan out: one blocking task per request, spawned before any is awaited.
    let pending: Vec<Result<JoinHandle<_>, String>> = (0..document.textures.len())
        .map(|index| {
            let request = image_request(document, binary, index)?;
            let decoder = Arc::clone(&decoder);
            Ok(tokio::task::spawn_blocking(move || {
                let result = decoder.decode(&request);
                (request, result)
            }))
        })
        .collect();

    // Fan in, by index.
    for (index, pending) in pending.into_iter().enumerate() {
        let handle = match pending {
            Ok(handle) => handle,
            Err(reason) => {
                out.skip(index, reason);
                continue;
            }
        };

        match handle.await {
            Ok((request, Ok(image))) if image.is_valid() => {
                debug!(
                    texture = index,
                    width = image.width,
                    height = image.height,
                    "decoded texture"
                );
                out.slots.push(Some(Arc::new(DecodedTexture::new(
                    index,
                    request.name,
                    request.mime_type,
                    image,
                ))));
            }
            Ok((_, Ok(image))) => out.skip(
                index,
                format!(
                    "decoder returned {}x{} image with {} bytes",
                    image.width,
                    image.height,
                    image.pixels.len()
                ),
            ),
            Ok((_, Err(err))) => out.skip(index, err.to_string()),
            Err(err) => out.skip(index, format!("decode task failed: {}", err)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_data_uri_round_trip() {
        let request = ImageRequest::new(0, "t".into(), "image/png".into(), &[1, 2, 3]);
        assert_eq!(request.data_uri, "data:image/png;base64,AQID");
        let (mime, bytes) = decode_data_uri(&request.data_uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_data_uris() {
        assert!(decode_data_uri("image/png;base64,AQID").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_raster_decoder_png() {
        let request = ImageRequest::new(0, "red".into(), "image/png".into(), &png_bytes(2, 3));
        let image = RasterDecoder.decode(&request).unwrap();
        assert_eq!((image.width, image.height), (2, 3));
        assert!(image.is_valid());
        assert_eq!(&image.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_raster_decoder_rejects_unknown_mime() {
        let request = ImageRequest::new(0, "x".into(), "image/ktx2".into(), &[0; 8]);
        assert_eq!(
            RasterDecoder.decode(&request),
            Err(DecodeError::UnsupportedMimeType("image/ktx2".into()))
        );
    }

    #[test]
    fn test_image_request_naming_and_defaults() {
        let doc = Document::from_slice(
            br#"{"bufferViews":[{"buffer":0,"byteLength":2}],
                 "images":[{"bufferView":0},{"uri":"far.png"}],
                 "textures":[{"source":0},{"source":1},{},{"source":0,"name":"named"}]}"#,
        )
        .unwrap();
        let bin = [1u8, 2];

        let request = image_request(&doc, Some(&bin[..]), 0).unwrap();
        assert_eq!(request.name, "Texture_0");
        assert_eq!(request.mime_type, DEFAULT_MIME_TYPE);

        assert!(image_request(&doc, Some(&bin[..]), 1)
            .unwrap_err()
            .contains("external"));
        assert!(image_request(&doc, Some(&bin[..]), 2).is_err());
        assert_eq!(image_request(&doc, Some(&bin[..]), 3).unwrap().name, "named");
    }

    #[tokio::test]
    async fn test_decode_all_without_decoder() {
        let doc = Document::from_slice(br#"{"textures":[{},{}]}"#).unwrap();
        let slots = decode_all(&doc, None, None).await;
        assert_eq!(slots.slots, vec![None, None]);
        assert_eq!(slots.warnings.len(), 2);
    }

    #[tokio::test]
    async fn test_decode_all_keeps_index_order() {
        let png = png_bytes(1, 1);
        let json = format!(
            r#"{{"bufferViews":[{{"buffer":0,"byteLength":{len}}}],
                "images":[{{"bufferView":0,"mimeType":"image/png"}}],
                "textures":[{{"source":0}},{{"source":7}},{{"source":0}}]}}"#,
            len = png.len()
        );
        let doc = Document::from_slice(json.as_bytes()).unwrap();
        let slots = decode_all(&doc, Some(&png[..]), Some(Arc::new(RasterDecoder))).await;

        assert_eq!(slots.slots.len(), 3);
        assert_eq!(slots.get(0).map(|t| t.index), Some(0));
        assert!(slots.get(1).is_none());
        assert_eq!(slots.get(2).map(|t| t.index), Some(2));
        assert_eq!(
            slots.warnings,
            vec![LoadWarning::TextureSkipped {
                texture: 1,
                reason: "image 7 does not exist".into()
            }]
        );
    }
}
