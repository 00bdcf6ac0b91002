use std::collections::HashMap;

use crate::{atlas::TextureAtlas, math::Size, Error};

/// Atlases shared by name. Pixmap fonts can draw their glyphs from an atlas
/// registered here instead of owning one.
#[derive(Debug, Default)]
pub struct AtlasRegistry {
    atlases: HashMap<String, TextureAtlas>,
}

impl AtlasRegistry {
    /// Registers `atlas` under its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if an atlas with the same name is
    /// registered.
    pub fn register(&mut self, atlas: TextureAtlas) -> crate::Result<TextureAtlas> {
        let name = atlas.name();
        if self.atlases.contains_key(&name) {
            return Err(Error::already_exists("atlas", name));
        }
        self.atlases.insert(name, atlas.clone());
        Ok(atlas)
    }

    /// Returns a handle to the atlas named `name`.
    pub fn get(&self, name: &str) -> crate::Result<TextureAtlas> {
        self.atlases
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_object("atlas", name))
    }

    /// Returns true if an atlas named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.atlases.contains_key(name)
    }

    /// The number of registered atlases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    /// Removes the atlas named `name` and unloads it. Fonts still drawing
    /// from it will draw nothing.
    pub fn destroy(&mut self, name: &str) -> crate::Result<()> {
        let atlas = self
            .atlases
            .remove(name)
            .ok_or_else(|| Error::unknown_object("atlas", name))?;
        atlas.unload();
        Ok(())
    }

    /// Forwards a display size change to every registered atlas.
    pub fn notify_display_size_changed(&self, size: Size<f32>) {
        for atlas in self.atlases.values() {
            atlas.notify_display_size_changed(size);
        }
    }
}
