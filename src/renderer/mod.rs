use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
};

use lazy_static::lazy_static;

use crate::math::Size;

mod geometry;
mod software;

pub use self::{
    geometry::{GeometryBatch, GeometryBuffer, QuadSplitMode, Vertex},
    software::{ImageRenderer, ImageTexture},
};

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// Uniquely identifies a texture for the lifetime of the process. This depends
/// on creation order and is not related to the image data in any way.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    /// Returns a new, never before returned id.
    #[must_use]
    pub fn next() -> Self {
        Self(GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst))
    }
}

/// The layout of pixel data handed to [`Texture::load_from_memory`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    /// Four bytes per pixel: red, green, blue, alpha.
    Rgba8,
}

impl PixelFormat {
    /// The number of bytes a single pixel occupies.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
        }
    }
}

/// A two dimensional texture owned by a [`Renderer`].
pub trait Texture: Debug + Send + Sync {
    /// The unique id of this texture.
    fn id(&self) -> TextureId;

    /// The current size of the texture in pixels.
    fn size(&self) -> Size<u32>;

    /// The size of the image data the texture was created from, before any
    /// padding the backend may have applied.
    fn original_size(&self) -> Size<u32> {
        self.size()
    }

    /// Replaces the contents of this texture with `pixels`.
    fn load_from_memory(
        &mut self,
        pixels: &[u8],
        size: Size<u32>,
        format: PixelFormat,
    ) -> crate::Result<()>;

    /// Returns a copy of the texture's RGBA contents, if the backend keeps
    /// them on the CPU.
    fn rgba_pixels(&self) -> Option<Vec<u8>> {
        None
    }
}

/// The rendering capabilities the font system depends on.
pub trait Renderer: Debug + Send + Sync {
    /// Creates an empty texture of `size`.
    fn create_texture(&self, size: Size<u32>) -> crate::Result<Box<dyn Texture>>;

    /// Creates a texture from an image file located through the resource
    /// provider.
    fn create_texture_from_file(
        &self,
        filename: &str,
        resource_group: &str,
    ) -> crate::Result<Box<dyn Texture>>;

    /// Releases a texture created by this renderer.
    fn destroy_texture(&self, texture: Box<dyn Texture>);

    /// The largest supported texture edge length, in pixels.
    fn max_texture_size(&self) -> u32;

    /// The horizontal resolution of the display, in dots per inch.
    fn horizontal_dpi(&self) -> u32;

    /// The vertical resolution of the display, in dots per inch.
    fn vertical_dpi(&self) -> u32;

    /// The current size of the display, in pixels.
    fn display_size(&self) -> Size<f32>;
}
