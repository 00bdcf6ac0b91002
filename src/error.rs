/// All errors that `glyph-atlas` can return.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An object with the same name is already registered.
    #[error("{kind} named '{name}' already exists")]
    AlreadyExists {
        /// What kind of object was being created.
        kind: &'static str,
        /// The conflicting name.
        name: String,
    },
    /// A named object could not be found.
    #[error("{kind} named '{name}' could not be found")]
    UnknownObject {
        /// What kind of object was being looked up.
        kind: &'static str,
        /// The name that was requested.
        name: String,
    },
    /// A request was malformed or is not supported by the receiver.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// A resource could not be located by the resource provider.
    #[error("resource '{filename}' not found in resource group '{group}'")]
    ResourceNotFound {
        /// The requested file.
        filename: String,
        /// The resource group searched.
        group: String,
    },
    /// The font data could not be opened by the rasterizer.
    #[error("'{0}' does not contain a valid font")]
    InvalidFontData(String),
    /// The font face has no unicode character map.
    #[error("the font '{0}' does not have a unicode charmap, and cannot be used")]
    NoUnicodeCharmap(String),
    /// The font face cannot be rasterized at the requested size.
    #[error("the font '{font}' cannot be rasterized at a size of {point_size} points")]
    UnsupportedPointSize {
        /// The font's name.
        font: String,
        /// The requested size.
        point_size: f32,
    },
    /// A texture was requested that is larger than the renderer supports.
    #[error("texture size {requested} exceeds the renderer maximum of {maximum}")]
    TextureTooLarge {
        /// The requested edge length.
        requested: u32,
        /// The largest supported edge length.
        maximum: u32,
    },
    /// A single glyph failed to rasterize.
    #[error("failed to rasterize codepoint {codepoint}: {reason}")]
    Rasterization {
        /// The glyph's codepoint.
        codepoint: u32,
        /// A description of the failure.
        reason: String,
    },
    /// A font or atlas definition is malformed.
    #[error("invalid definition: {0}")]
    Definition(String),
    /// An error decoding an image.
    #[error("error reading image: {0}")]
    Image(#[from] image::ImageError),
    /// An error parsing Json.
    #[error("error parsing json: {0}")]
    Json(#[from] json::Error),
    /// An error reading a resource.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn unknown_object(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownObject {
            kind,
            name: name.into(),
        }
    }
}
