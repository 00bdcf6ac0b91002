//! Glyph rasterization, texture atlases and text layout for GUI toolkits.
//!
//! Glyphs are rendered on demand into atlas textures created through a
//! [`Renderer`](renderer::Renderer), and text is laid out into a
//! [`GeometryBuffer`](renderer::GeometryBuffer) of textured quads.

#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    missing_docs,
    clippy::nursery,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms,
)]
#![cfg_attr(doc, deny(rustdoc::all))]
#![allow(
    clippy::missing_errors_doc, // TODO clippy::missing_errors_doc
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::float_cmp,
)]

/// Named regions of textures.
pub mod atlas;
mod color;
mod error;
/// Math types for 2d geometry.
pub mod math;
/// Shelf packing of glyph images into atlas pages.
pub mod pack;
pub mod raster;
/// Textures, renderers and the geometry they consume.
pub mod renderer;
/// Loading raw data by filename and resource group.
pub mod resource;
#[cfg(test)]
mod tests;
pub mod text;

// Re-exports
pub use image;

pub use self::{
    color::{Color, ColorRect},
    error::Error,
};

/// A collection of commonly used exports provided by this crate.
pub mod prelude {
    pub use super::{
        atlas::{AtlasDefinition, AtlasRegistry, Image, TextureAtlas},
        math::{PixelAlignment, Point, Rect, Size},
        raster::{truetype::TrueTypeRasterizer, Face, Rasterizer},
        renderer::{GeometryBuffer, ImageRenderer, QuadSplitMode, Renderer, Texture},
        resource::{DefaultResourceProvider, MemoryResourceProvider, ResourceProvider},
        text::{
            DuplicatePolicy, Font, FontContext, FontDefinition, FontKind, FontManager,
            FontVariant, HorizontalAdvance, TextFormatting,
        },
        Color, ColorRect, Error,
    };
}

/// Alias for [`std::result::Result`] where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
