//! Decoded textures and their sampling parameters.

use serde::{Deserialize, Serialize};

/// Texture filter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    Nearest,
    Linear,
    /// Trilinear: linear within and between mip levels.
    LinearMipmapLinear,
}

/// Texture wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Wrap {
    ClampToEdge,
    #[default]
    Repeat,
    MirroredRepeat,
}

/// Color space the texel values are encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Non-linear sRGB.
    Srgb,
    Linear,
}

/// Sampler state applied to every decoded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSampling {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_u: Wrap,
    pub wrap_v: Wrap,
    /// Anisotropic filtering level.
    pub anisotropy: u16,
    pub color_space: ColorSpace,
}

impl TextureSampling {
    /// Fixed sampling used for embedded GLB images.
    pub const EMBEDDED: TextureSampling = TextureSampling {
        min_filter: Filter::LinearMipmapLinear,
        mag_filter: Filter::Linear,
        wrap_u: Wrap::Repeat,
        wrap_v: Wrap::Repeat,
        anisotropy: 16,
        color_space: ColorSpace::Srgb,
    };
}

impl Default for TextureSampling {
    fn default() -> Self {
        Self::EMBEDDED
    }
}

/// Raw RGBA8 pixels produced by an image decoder.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, top row first.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Check the pixel buffer matches the dimensions.
    pub fn is_valid(&self) -> bool {
        let expected = self.width as usize * self.height as usize * 4;
        self.width > 0 && self.height > 0 && self.pixels.len() == expected
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// A texture ready to be uploaded by the host renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTexture {
    /// Index of the texture in the source document.
    pub index: usize,
    /// Texture name (`Texture_<index>` when the document has none).
    pub name: String,
    /// MIME type the image was decoded from.
    pub mime_type: String,
    pub image: DecodedImage,
    pub sampling: TextureSampling,
    /// glTF UVs have their origin at the top-left, so images are never flipped.
    pub flip_y: bool,
}

impl DecodedTexture {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        image: DecodedImage,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            mime_type: mime_type.into(),
            image,
            sampling: TextureSampling::EMBEDDED,
            flip_y: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }
}
