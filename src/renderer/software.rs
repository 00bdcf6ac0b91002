use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, PoisonError, RwLock,
};

use image::RgbaImage;

use crate::{
    math::Size,
    renderer::{PixelFormat, Renderer, Texture, TextureId},
    resource::ResourceProvider,
    Error,
};

/// A renderer that keeps every texture in CPU memory as an
/// [`image::RgbaImage`]. Useful for headless layout, glyph cache inspection
/// and tests.
#[derive(Debug)]
pub struct ImageRenderer {
    resources: Arc<dyn ResourceProvider>,
    max_texture_size: u32,
    dpi: Size<u32>,
    display_size: RwLock<Size<f32>>,
    live_textures: Arc<AtomicUsize>,
}

impl ImageRenderer {
    /// The default largest texture edge length.
    pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 4096;
    /// The default display resolution, in dots per inch.
    pub const DEFAULT_DPI: u32 = 96;

    /// Returns a renderer that loads image files through `resources`.
    #[must_use]
    pub fn new(resources: Arc<dyn ResourceProvider>) -> Self {
        Self {
            resources,
            max_texture_size: Self::DEFAULT_MAX_TEXTURE_SIZE,
            dpi: Size::new(Self::DEFAULT_DPI, Self::DEFAULT_DPI),
            display_size: RwLock::new(Size::new(640., 480.)),
            live_textures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sets the largest texture edge length this renderer will create.
    #[must_use]
    pub const fn with_max_texture_size(mut self, max_texture_size: u32) -> Self {
        self.max_texture_size = max_texture_size;
        self
    }

    /// Sets the reported display resolution.
    #[must_use]
    pub const fn with_dpi(mut self, horizontal: u32, vertical: u32) -> Self {
        self.dpi = Size::new(horizontal, vertical);
        self
    }

    /// Sets the reported display size.
    #[must_use]
    pub fn with_display_size(self, size: Size<f32>) -> Self {
        self.set_display_size(size);
        self
    }

    /// Updates the reported display size. Fonts and atlases are only
    /// rescaled once they are notified of the change.
    pub fn set_display_size(&self, size: Size<f32>) {
        let mut display_size = self
            .display_size
            .write()
            .map_or_else(PoisonError::into_inner, |g| g);
        *display_size = size;
    }

    /// The number of textures created and not yet destroyed.
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.live_textures.load(Ordering::SeqCst)
    }

    fn check_size(&self, size: Size<u32>) -> crate::Result<()> {
        let requested = size.width.max(size.height);
        if requested > self.max_texture_size {
            Err(Error::TextureTooLarge {
                requested,
                maximum: self.max_texture_size,
            })
        } else {
            Ok(())
        }
    }

    fn track(&self, image: RgbaImage) -> ImageTexture {
        self.live_textures.fetch_add(1, Ordering::SeqCst);
        ImageTexture {
            id: TextureId::next(),
            image,
        }
    }
}

impl Renderer for ImageRenderer {
    fn create_texture(&self, size: Size<u32>) -> crate::Result<Box<dyn Texture>> {
        self.check_size(size)?;
        Ok(Box::new(
            self.track(RgbaImage::new(size.width, size.height)),
        ))
    }

    fn create_texture_from_file(
        &self,
        filename: &str,
        resource_group: &str,
    ) -> crate::Result<Box<dyn Texture>> {
        let data = self.resources.load_raw_data(filename, resource_group)?;
        let image = image::load_from_memory(&data)?.to_rgba8();
        self.check_size(Size::new(image.width(), image.height()))?;
        tracing::debug!(
            file = filename,
            width = image.width(),
            height = image.height(),
            "loaded texture"
        );
        Ok(Box::new(self.track(image)))
    }

    fn destroy_texture(&self, texture: Box<dyn Texture>) {
        tracing::trace!(id = ?texture.id(), "destroying texture");
        self.live_textures.fetch_sub(1, Ordering::SeqCst);
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn horizontal_dpi(&self) -> u32 {
        self.dpi.width
    }

    fn vertical_dpi(&self) -> u32 {
        self.dpi.height
    }

    fn display_size(&self) -> Size<f32> {
        *self
            .display_size
            .read()
            .map_or_else(PoisonError::into_inner, |g| g)
    }
}

/// A texture created by [`ImageRenderer`].
#[derive(Debug)]
pub struct ImageTexture {
    id: TextureId,
    image: RgbaImage,
}

impl ImageTexture {
    /// The texture contents.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl Texture for ImageTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn size(&self) -> Size<u32> {
        Size::new(self.image.width(), self.image.height())
    }

    fn load_from_memory(
        &mut self,
        pixels: &[u8],
        size: Size<u32>,
        format: PixelFormat,
    ) -> crate::Result<()> {
        let expected = size.area() as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(Error::InvalidRequest(format!(
                "expected {} bytes of pixel data, got {}",
                expected,
                pixels.len()
            )));
        }

        self.image = RgbaImage::from_raw(size.width, size.height, pixels.to_vec()).ok_or_else(
            || Error::InvalidRequest(String::from("pixel buffer does not match texture size")),
        )?;
        Ok(())
    }

    fn rgba_pixels(&self) -> Option<Vec<u8>> {
        Some(self.image.as_raw().clone())
    }
}
