use std::{
    collections::{btree_map::Entry, BTreeMap},
    sync::Arc,
};

use crate::{
    atlas::AtlasRegistry,
    math::Size,
    raster::{truetype::TrueTypeRasterizer, Rasterizer},
    renderer::Renderer,
    resource::ResourceProvider,
    text::{definition::FontDefinition, font::Font},
    Error,
};

/// The collaborators every font is created with.
#[derive(Clone, Debug)]
pub struct FontContext {
    /// Creates and destroys the textures glyphs are drawn from.
    pub renderer: Arc<dyn Renderer>,
    /// Loads font files and definitions.
    pub resources: Arc<dyn ResourceProvider>,
    /// Opens font faces.
    pub rasterizer: Arc<dyn Rasterizer>,
    /// The resource group used when a definition does not name one.
    pub default_resource_group: String,
}

impl FontContext {
    /// Returns a context using `rasterizer` for font faces.
    pub fn new(
        renderer: Arc<dyn Renderer>,
        resources: Arc<dyn ResourceProvider>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            renderer,
            resources,
            rasterizer,
            default_resource_group: String::new(),
        }
    }

    /// Returns a context using the built-in [`TrueTypeRasterizer`].
    pub fn truetype(renderer: Arc<dyn Renderer>, resources: Arc<dyn ResourceProvider>) -> Self {
        Self::new(renderer, resources, Arc::new(TrueTypeRasterizer))
    }

    /// Sets the resource group used when a definition does not name one.
    #[must_use]
    pub fn with_default_resource_group(mut self, group: impl Into<String>) -> Self {
        self.default_resource_group = group.into();
        self
    }
}

/// What [`FontManager::create`] does when a font with the same name exists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DuplicatePolicy {
    /// Fail with [`Error::AlreadyExists`].
    Error,
    /// Destroy the existing font once the new one is created.
    Replace,
    /// Keep and return the existing font.
    Return,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self::Error
    }
}

/// Owns every font by name, and the atlases pixmap fonts can share.
#[derive(Debug)]
pub struct FontManager {
    context: FontContext,
    fonts: BTreeMap<String, Font>,
    default_font: Option<String>,
    atlases: AtlasRegistry,
}

impl FontManager {
    /// Returns an empty manager creating fonts with `context`.
    #[must_use]
    pub fn new(context: FontContext) -> Self {
        Self {
            context,
            fonts: BTreeMap::new(),
            default_font: None,
            atlases: AtlasRegistry::default(),
        }
    }

    /// The context fonts are created with.
    #[must_use]
    pub const fn context(&self) -> &FontContext {
        &self.context
    }

    /// Creates the font described by `definition`. The first font created
    /// becomes the default font.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if a font with the same name exists
    /// and `policy` is [`DuplicatePolicy::Error`]. Errors creating the font
    /// are returned without anything being registered.
    pub fn create(
        &mut self,
        definition: &FontDefinition,
        policy: DuplicatePolicy,
    ) -> crate::Result<&mut Font> {
        if self.fonts.contains_key(&definition.name) {
            match policy {
                DuplicatePolicy::Error => {
                    return Err(Error::already_exists("font", definition.name.clone()))
                }
                DuplicatePolicy::Return => return self.get_mut(&definition.name),
                DuplicatePolicy::Replace => {}
            }
        }

        let font = Font::new(definition, self.context.clone(), &self.atlases)?;
        if self.default_font.is_none() {
            self.default_font = Some(definition.name.clone());
        }

        match self.fonts.entry(definition.name.clone()) {
            Entry::Occupied(mut entry) => {
                tracing::info!(font = %definition.name, "replacing font");
                entry.insert(font);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(font)),
        }
    }

    /// Parses the font definition file `filename` and creates the font. An
    /// empty `resource_group` selects the context's default group.
    pub fn create_from_file(
        &mut self,
        filename: &str,
        resource_group: &str,
        policy: DuplicatePolicy,
    ) -> crate::Result<&mut Font> {
        let group = if resource_group.is_empty() {
            self.context.default_resource_group.as_str()
        } else {
            resource_group
        };
        let raw = self.context.resources.load_raw_data(filename, group)?;
        let raw = String::from_utf8(raw)
            .map_err(|_| Error::Definition(format!("'{}' is not valid utf-8", filename)))?;
        let definition = FontDefinition::parse(&raw)?;
        self.create(&definition, policy)
    }

    /// Returns the definition file contents that recreate the font `name`.
    pub fn write_font(&self, name: &str) -> crate::Result<String> {
        Ok(self.get(name)?.to_definition().to_json_string())
    }

    /// Destroys the font `name`, releasing its glyph pages and any atlas it
    /// owns.
    pub fn destroy(&mut self, name: &str) -> crate::Result<()> {
        let font = self
            .fonts
            .remove(name)
            .ok_or_else(|| Error::unknown_object("font", name))?;
        if self.default_font.as_deref() == Some(name) {
            self.default_font = None;
        }
        tracing::info!(font = %font.name(), "destroying font");
        Ok(())
    }

    /// Destroys every font.
    pub fn destroy_all(&mut self) {
        self.fonts.clear();
        self.default_font = None;
    }

    /// Returns the font `name`.
    pub fn get(&self, name: &str) -> crate::Result<&Font> {
        self.fonts
            .get(name)
            .ok_or_else(|| Error::unknown_object("font", name))
    }

    /// Returns the font `name` for modification.
    pub fn get_mut(&mut self, name: &str) -> crate::Result<&mut Font> {
        self.fonts
            .get_mut(name)
            .ok_or_else(|| Error::unknown_object("font", name))
    }

    /// Returns true if a font named `name` exists.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// The names of every font, in order.
    pub fn font_names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// The number of fonts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Returns true if there are no fonts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// The font used when none is specified.
    #[must_use]
    pub fn default_font(&self) -> Option<&Font> {
        self.default_font
            .as_deref()
            .and_then(|name| self.fonts.get(name))
    }

    /// The default font, for modification.
    pub fn default_font_mut(&mut self) -> Option<&mut Font> {
        let name = self.default_font.as_deref()?;
        self.fonts.get_mut(name)
    }

    /// Makes the font `name` the default font.
    pub fn set_default_font(&mut self, name: &str) -> crate::Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(Error::unknown_object("font", name));
        }
        self.default_font = Some(name.to_owned());
        Ok(())
    }

    /// Forwards a display size change to every atlas and font. Every font is
    /// notified even if one fails; the first error is returned.
    pub fn notify_display_size_changed(&mut self, size: Size<f32>) -> crate::Result<()> {
        self.atlases.notify_display_size_changed(size);

        let mut result = Ok(());
        for font in self.fonts.values_mut() {
            if let Err(err) = font.notify_display_size_changed(size) {
                tracing::error!(font = %font.name(), error = %err, "failed to rescale font");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// The atlases available to pixmap fonts.
    #[must_use]
    pub const fn atlases(&self) -> &AtlasRegistry {
        &self.atlases
    }

    /// The atlases available to pixmap fonts, for registering.
    pub fn atlases_mut(&mut self) -> &mut AtlasRegistry {
        &mut self.atlases
    }
}
