use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    color::ColorRect,
    math::{PixelAlignment, Point, Rect, Size},
    renderer::{GeometryBuffer, PixelFormat, QuadSplitMode, Renderer, Texture, TextureId},
    Error,
};

mod definition;
mod registry;

pub(crate) use self::definition::required_str;
pub use self::{
    definition::{AtlasDefinition, ImageDefinition},
    registry::AtlasRegistry,
};

/// The native resolution assumed when none is given.
pub const DEFAULT_NATIVE_RESOLUTION: Size<f32> = Size::new(640., 480.);

/// The name of the image covering the whole texture of an atlas created from
/// a single image file.
pub const FULL_IMAGE_NAME: &str = "full_image";

/// A texture split into named sub-images. Cloning the atlas returns another
/// handle to the same texture.
///
/// The texture is destroyed through the renderer when [`TextureAtlas::unload`]
/// is called or the last handle is dropped.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    data: Arc<RwLock<AtlasData>>,
}

#[derive(Debug)]
struct AtlasData {
    name: String,
    renderer: Arc<dyn Renderer>,
    texture: Option<Box<dyn Texture>>,
    native_resolution: Size<f32>,
    display_size: Size<f32>,
    scale: Size<f32>,
    auto_scale: bool,
    images: BTreeMap<String, Image>,
}

impl TextureAtlas {
    /// Creates an atlas with a new, blank texture of `size`.
    pub fn new(
        name: impl Into<String>,
        renderer: Arc<dyn Renderer>,
        size: Size<u32>,
    ) -> crate::Result<Self> {
        let maximum = renderer.max_texture_size();
        let requested = size.width.max(size.height);
        if requested > maximum {
            return Err(Error::TextureTooLarge { requested, maximum });
        }
        let texture = renderer.create_texture(size)?;
        Ok(Self::from_texture(name, renderer, texture))
    }

    /// Creates an atlas that owns `texture`.
    pub fn from_texture(
        name: impl Into<String>,
        renderer: Arc<dyn Renderer>,
        texture: Box<dyn Texture>,
    ) -> Self {
        let native_resolution = DEFAULT_NATIVE_RESOLUTION;
        let display_size = renderer.display_size();
        Self {
            data: Arc::new(RwLock::new(AtlasData {
                name: name.into(),
                renderer,
                texture: Some(texture),
                native_resolution,
                display_size,
                scale: scale_between(native_resolution, display_size),
                auto_scale: false,
                images: BTreeMap::new(),
            })),
        }
    }

    /// Creates an atlas from an image file, defining a single image named
    /// [`FULL_IMAGE_NAME`] that covers the entire texture.
    pub fn from_file(
        name: impl Into<String>,
        renderer: Arc<dyn Renderer>,
        filename: &str,
        resource_group: &str,
    ) -> crate::Result<Self> {
        let texture = renderer.create_texture_from_file(filename, resource_group)?;
        let size = texture.original_size();
        let atlas = Self::from_texture(name, renderer, texture);
        atlas.define_image(
            FULL_IMAGE_NAME,
            Rect::sized(Point::new(0, 0), size),
            Point::default(),
        )?;
        Ok(atlas)
    }

    fn data(&self) -> RwLockReadGuard<'_, AtlasData> {
        self.data.read().map_or_else(PoisonError::into_inner, |g| g)
    }

    fn data_mut(&self) -> RwLockWriteGuard<'_, AtlasData> {
        self.data.write().map_or_else(PoisonError::into_inner, |g| g)
    }

    /// The unique name of this atlas.
    #[must_use]
    pub fn name(&self) -> String {
        self.data().name.clone()
    }

    /// Returns true if `other` is a handle to the same atlas.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// The id of the underlying texture, or `None` once unloaded.
    #[must_use]
    pub fn texture_id(&self) -> Option<TextureId> {
        self.data().texture.as_ref().map(|texture| texture.id())
    }

    /// The size of the underlying texture. Unloaded atlases are zero sized.
    #[must_use]
    pub fn texture_size(&self) -> Size<u32> {
        self.data()
            .texture
            .as_ref()
            .map(|texture| texture.size())
            .unwrap_or_default()
    }

    /// Returns true until [`TextureAtlas::unload`] is called.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.data().texture.is_some()
    }

    /// Defines a new image named `name` covering `source` texture pixels.
    /// `offset` is added to the position the image is drawn at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if the name is taken and
    /// [`Error::InvalidRequest`] if `source` is not inside the texture. The
    /// atlas is unmodified on error.
    pub fn define_image(
        &self,
        name: impl Into<String>,
        source: Rect<u32>,
        offset: Point<f32>,
    ) -> crate::Result<()> {
        let name = name.into();
        let mut data = self.data_mut();
        if data.images.contains_key(&name) {
            return Err(Error::already_exists("image", name));
        }

        let (texture, texture_size) = match &data.texture {
            Some(texture) => (texture.id(), texture.size()),
            None => {
                return Err(Error::InvalidRequest(format!(
                    "atlas '{}' has been unloaded",
                    data.name
                )))
            }
        };
        if !Rect::sized(Point::new(0, 0), texture_size).contains_rect(&source) {
            return Err(Error::InvalidRequest(format!(
                "image '{}' at {:?} lies outside of the {}x{} texture",
                name, source, texture_size.width, texture_size.height
            )));
        }

        let scale = data.image_scale();
        tracing::trace!(atlas = %data.name, image = %name, "defining image");
        let image = Image::new(name.clone(), texture, texture_size, source, offset, scale);
        data.images.insert(name, image);
        Ok(())
    }

    /// Returns a copy of the image named `name`.
    pub fn image(&self, name: &str) -> crate::Result<Image> {
        let data = self.data();
        data.images
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_object("image", name))
    }

    /// Returns true if an image named `name` is defined.
    #[must_use]
    pub fn is_image_defined(&self, name: &str) -> bool {
        self.data().images.contains_key(name)
    }

    /// The number of images defined.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.data().images.len()
    }

    /// Returns every image, sorted by name.
    #[must_use]
    pub fn images(&self) -> Vec<Image> {
        self.data().images.values().cloned().collect()
    }

    /// Removes the image named `name`, if defined. The texture is untouched.
    pub fn undefine_image(&self, name: &str) {
        self.data_mut().images.remove(name);
    }

    /// Removes every image. The texture is untouched.
    pub fn undefine_all_images(&self) {
        self.data_mut().images.clear();
    }

    /// Enables or disables scaling images by the ratio of the display size to
    /// the native resolution. Every image is updated immediately.
    pub fn set_auto_scaling_enabled(&self, enabled: bool) {
        let mut data = self.data_mut();
        if data.auto_scale != enabled {
            data.auto_scale = enabled;
            data.update_image_scaling();
        }
    }

    /// Returns true if images are scaled with the display size.
    #[must_use]
    pub fn is_auto_scaled(&self) -> bool {
        self.data().auto_scale
    }

    /// Sets the resolution the images were authored for and recomputes the
    /// scale against the most recently notified display size.
    pub fn set_native_resolution(&self, resolution: Size<f32>) {
        let mut data = self.data_mut();
        data.native_resolution = resolution;
        data.update_image_scaling();
    }

    /// The resolution the images were authored for.
    #[must_use]
    pub fn native_resolution(&self) -> Size<f32> {
        self.data().native_resolution
    }

    /// The horizontal and vertical ratios of display size to native
    /// resolution.
    #[must_use]
    pub fn scale(&self) -> Size<f32> {
        self.data().scale
    }

    /// Recomputes the scale factors for a display of `size`.
    pub fn notify_display_size_changed(&self, size: Size<f32>) {
        let mut data = self.data_mut();
        data.display_size = size;
        data.update_image_scaling();
    }

    /// Queues a quad drawing `source` texture pixels into `dest`, clipped to
    /// `clip`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        buffer: &mut GeometryBuffer,
        source: Rect<f32>,
        dest: Rect<f32>,
        z: f32,
        clip: &Rect<f32>,
        colors: &ColorRect,
        split: QuadSplitMode,
    ) {
        let data = self.data();
        if let Some(texture) = &data.texture {
            draw_quad(
                buffer,
                texture.id(),
                texture.size(),
                source,
                dest,
                z,
                clip,
                colors,
                split,
            );
        }
    }

    /// Replaces the texture contents with RGBA8 `pixels`.
    pub fn upload(&self, pixels: &[u8], size: Size<u32>) -> crate::Result<()> {
        let mut data = self.data_mut();
        let name = data.name.clone();
        let texture = data.texture.as_mut().ok_or_else(|| {
            Error::InvalidRequest(format!("atlas '{}' has been unloaded", name))
        })?;
        texture.load_from_memory(pixels, size, PixelFormat::Rgba8)
    }

    /// Returns the texture contents, if the renderer keeps them in memory.
    #[must_use]
    pub fn rgba_pixels(&self) -> Option<Vec<u8>> {
        self.data()
            .texture
            .as_ref()
            .and_then(|texture| texture.rgba_pixels())
    }

    /// Destroys the texture and removes every image. Calling this more than
    /// once has no further effect.
    pub fn unload(&self) {
        self.data_mut().unload();
    }
}

impl AtlasData {
    fn image_scale(&self) -> Size<f32> {
        if self.auto_scale {
            self.scale
        } else {
            Size::new(1., 1.)
        }
    }

    fn update_image_scaling(&mut self) {
        self.scale = scale_between(self.native_resolution, self.display_size);
        let scale = self.image_scale();
        for image in self.images.values_mut() {
            image.set_scale(scale);
        }
    }

    fn unload(&mut self) {
        self.images.clear();
        if let Some(texture) = self.texture.take() {
            tracing::debug!(atlas = %self.name, "unloading atlas");
            self.renderer.destroy_texture(texture);
        }
    }
}

impl Drop for AtlasData {
    fn drop(&mut self) {
        self.unload();
    }
}

pub(crate) fn scale_between(native: Size<f32>, display: Size<f32>) -> Size<f32> {
    let ratio = |display: f32, native: f32| if native > 0. { display / native } else { 1. };
    Size::new(
        ratio(display.width, native.width),
        ratio(display.height, native.height),
    )
}

/// A named region of an atlas texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    name: String,
    texture: TextureId,
    texture_size: Size<u32>,
    source: Rect<u32>,
    offset: Point<f32>,
    scale: Size<f32>,
    scaled_size: Size<f32>,
    scaled_offset: Point<f32>,
}

impl Image {
    fn new(
        name: String,
        texture: TextureId,
        texture_size: Size<u32>,
        source: Rect<u32>,
        offset: Point<f32>,
        scale: Size<f32>,
    ) -> Self {
        let mut image = Self {
            name,
            texture,
            texture_size,
            source,
            offset,
            scale: Size::new(1., 1.),
            scaled_size: source.size.to_f32(),
            scaled_offset: offset,
        };
        image.set_scale(scale);
        image
    }

    fn set_scale(&mut self, scale: Size<f32>) {
        self.scale = scale;
        self.scaled_size = Size::new(
            (self.source.size.width as f32 * scale.width).pixel_aligned(),
            (self.source.size.height as f32 * scale.height).pixel_aligned(),
        );
        self.scaled_offset = Point::new(
            (self.offset.x * scale.width).pixel_aligned(),
            (self.offset.y * scale.height).pixel_aligned(),
        );
    }

    /// The image's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The texture this image is part of.
    #[must_use]
    pub const fn texture(&self) -> TextureId {
        self.texture
    }

    /// The region of the texture, in texture pixels.
    #[must_use]
    pub const fn source_rect(&self) -> Rect<u32> {
        self.source
    }

    /// The unscaled render offset.
    #[must_use]
    pub const fn offset(&self) -> Point<f32> {
        self.offset
    }

    /// The scale applied to this image.
    #[must_use]
    pub const fn scale(&self) -> Size<f32> {
        self.scale
    }

    /// The scaled, pixel aligned size.
    #[must_use]
    pub const fn size(&self) -> Size<f32> {
        self.scaled_size
    }

    /// The scaled width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.scaled_size.width
    }

    /// The scaled height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.scaled_size.height
    }

    /// The scaled, pixel aligned render offset.
    #[must_use]
    pub const fn scaled_offset(&self) -> Point<f32> {
        self.scaled_offset
    }

    /// The scaled horizontal render offset.
    #[must_use]
    pub const fn offset_x(&self) -> f32 {
        self.scaled_offset.x
    }

    /// The scaled vertical render offset.
    #[must_use]
    pub const fn offset_y(&self) -> f32 {
        self.scaled_offset.y
    }

    /// Queues this image at `position` stretched to `size`. The render
    /// offset is added to `position`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        buffer: &mut GeometryBuffer,
        position: Point<f32>,
        size: Size<f32>,
        z: f32,
        clip: &Rect<f32>,
        colors: &ColorRect,
        split: QuadSplitMode,
    ) {
        let dest = Rect::sized(position + self.scaled_offset, size);
        draw_quad(
            buffer,
            self.texture,
            self.texture_size,
            self.source.to_f32(),
            dest,
            z,
            clip,
            colors,
            split,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_quad(
    buffer: &mut GeometryBuffer,
    texture: TextureId,
    texture_size: Size<u32>,
    source: Rect<f32>,
    dest: Rect<f32>,
    z: f32,
    clip: &Rect<f32>,
    colors: &ColorRect,
    split: QuadSplitMode,
) {
    let clipped = dest.intersection(clip);
    if clipped.width() <= 0. || clipped.height() <= 0. || texture_size.is_empty() {
        return;
    }

    let tex_per_pixel_x = source.width() / dest.width();
    let tex_per_pixel_y = source.height() / dest.height();
    let texture_size = texture_size.to_f32();
    let tex_rect = Rect::new(
        Point::new(
            (source.x1() + (clipped.x1() - dest.x1()) * tex_per_pixel_x) / texture_size.width,
            (source.y1() + (clipped.y1() - dest.y1()) * tex_per_pixel_y) / texture_size.height,
        ),
        Point::new(
            (source.x2() + (clipped.x2() - dest.x2()) * tex_per_pixel_x) / texture_size.width,
            (source.y2() + (clipped.y2() - dest.y2()) * tex_per_pixel_y) / texture_size.height,
        ),
    );

    let colors = if clipped == dest {
        *colors
    } else {
        colors.sub_rect(
            (clipped.x1() - dest.x1()) / dest.width(),
            (clipped.x2() - dest.x1()) / dest.width(),
            (clipped.y1() - dest.y1()) / dest.height(),
            (clipped.y2() - dest.y1()) / dest.height(),
        )
    };

    buffer.push_quad(
        texture,
        clipped.pixel_aligned(),
        z,
        tex_rect,
        &colors,
        split,
    );
}
