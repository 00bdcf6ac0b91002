use std::sync::Arc;

use json::JsonValue;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::{
    atlas::{TextureAtlas, DEFAULT_NATIVE_RESOLUTION},
    math::{Point, Rect, Size},
    renderer::Renderer,
    Error,
};

/// A serializable description of a [`TextureAtlas`]: the image file to load
/// and the named regions within it.
///
/// The Json format looks like:
///
/// ```json
/// {
///     "Name": "Icons",
///     "Imagefile": "icons.png",
///     "ResourceGroup": "",
///     "NativeHorzRes": 640,
///     "NativeVertRes": 480,
///     "AutoScaled": false,
///     "Images": [
///         { "Name": "Close", "XPos": 0, "YPos": 0, "Width": 16, "Height": 16 }
///     ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct AtlasDefinition {
    /// The unique atlas name.
    pub name: String,
    /// The image file containing the texture.
    pub image_file: String,
    /// The resource group to load `image_file` from.
    pub resource_group: String,
    /// The resolution the images were authored for.
    pub native_resolution: Size<f32>,
    /// Whether images scale with the display size.
    pub auto_scaled: bool,
    /// The regions of the texture.
    pub images: Vec<ImageDefinition>,
}

/// One named region of an [`AtlasDefinition`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ImageDefinition {
    /// The image name.
    pub name: String,
    /// The region of the texture, in pixels.
    pub source: Rect<u32>,
    /// The render offset.
    pub offset: Point<f32>,
}

impl AtlasDefinition {
    /// Returns an empty definition for `image_file`.
    pub fn new(name: impl Into<String>, image_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_file: image_file.into(),
            resource_group: String::new(),
            native_resolution: DEFAULT_NATIVE_RESOLUTION,
            auto_scaled: false,
            images: Vec::new(),
        }
    }

    /// Parses a definition from Json.
    pub fn parse(raw_json: &str) -> crate::Result<Self> {
        let json = json::parse(raw_json)?;
        if !json.is_object() {
            return Err(Error::Definition(
                "atlas definition must be a json object".to_owned(),
            ));
        }

        let name = required_str(&json, "Name")?;
        let image_file = required_str(&json, "Imagefile")?;
        let resource_group = json["ResourceGroup"].as_str().unwrap_or_default().to_owned();
        let native_resolution = Size::new(
            json["NativeHorzRes"]
                .as_f32()
                .unwrap_or(DEFAULT_NATIVE_RESOLUTION.width),
            json["NativeVertRes"]
                .as_f32()
                .unwrap_or(DEFAULT_NATIVE_RESOLUTION.height),
        );
        let auto_scaled = json["AutoScaled"].as_bool().unwrap_or(false);

        let mut images = Vec::new();
        for image in json["Images"].members() {
            let component = |key: &str| {
                image[key].as_u32().ok_or_else(|| {
                    Error::Definition(format!(
                        "image in atlas '{}' has an invalid {}",
                        name, key
                    ))
                })
            };
            images.push(ImageDefinition {
                name: required_str(image, "Name")?,
                source: Rect::sized(
                    Point::new(component("XPos")?, component("YPos")?),
                    Size::new(component("Width")?, component("Height")?),
                ),
                offset: Point::new(
                    image["XOffset"].as_f32().unwrap_or_default(),
                    image["YOffset"].as_f32().unwrap_or_default(),
                ),
            });
        }

        Ok(Self {
            name,
            image_file,
            resource_group,
            native_resolution,
            auto_scaled,
            images,
        })
    }

    /// Returns the definition of an existing atlas. The atlas does not
    /// remember where its texture came from, so `image_file` and
    /// `resource_group` must be provided.
    pub fn from_atlas(
        atlas: &TextureAtlas,
        image_file: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self {
            name: atlas.name(),
            image_file: image_file.into(),
            resource_group: resource_group.into(),
            native_resolution: atlas.native_resolution(),
            auto_scaled: atlas.is_auto_scaled(),
            images: atlas
                .images()
                .into_iter()
                .map(|image| ImageDefinition {
                    name: image.name().to_owned(),
                    source: image.source_rect(),
                    offset: image.offset(),
                })
                .collect(),
        }
    }

    /// Loads the texture and defines every image. `default_resource_group`
    /// is used when the definition does not name a group.
    pub fn load(
        &self,
        renderer: Arc<dyn Renderer>,
        default_resource_group: &str,
    ) -> crate::Result<TextureAtlas> {
        let group = if self.resource_group.is_empty() {
            default_resource_group
        } else {
            &self.resource_group
        };
        let texture = renderer.create_texture_from_file(&self.image_file, group)?;
        let atlas = TextureAtlas::from_texture(self.name.clone(), renderer, texture);
        atlas.set_native_resolution(self.native_resolution);
        atlas.set_auto_scaling_enabled(self.auto_scaled);
        for image in &self.images {
            atlas.define_image(image.name.clone(), image.source, image.offset)?;
        }
        tracing::debug!(
            atlas = %self.name,
            images = self.images.len(),
            "loaded atlas definition"
        );
        Ok(atlas)
    }

    /// Converts this definition to Json.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut json = JsonValue::new_object();
        json["Name"] = self.name.as_str().into();
        json["Imagefile"] = self.image_file.as_str().into();
        if !self.resource_group.is_empty() {
            json["ResourceGroup"] = self.resource_group.as_str().into();
        }
        json["NativeHorzRes"] = self.native_resolution.width.into();
        json["NativeVertRes"] = self.native_resolution.height.into();
        json["AutoScaled"] = self.auto_scaled.into();

        let mut images = JsonValue::new_array();
        for image in &self.images {
            let mut entry = JsonValue::new_object();
            entry["Name"] = image.name.as_str().into();
            entry["XPos"] = image.source.origin.x.into();
            entry["YPos"] = image.source.origin.y.into();
            entry["Width"] = image.source.size.width.into();
            entry["Height"] = image.source.size.height.into();
            if image.offset.x != 0. {
                entry["XOffset"] = image.offset.x.into();
            }
            if image.offset.y != 0. {
                entry["YOffset"] = image.offset.y.into();
            }
            // Pushing onto an array value cannot fail.
            let _ = images.push(entry);
        }
        json["Images"] = images;
        json
    }

    /// Converts this definition to a pretty-printed Json string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        json::stringify_pretty(self.to_json(), 4)
    }
}

pub(crate) fn required_str(json: &JsonValue, key: &str) -> crate::Result<String> {
    json[key]
        .as_str()
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::Definition(format!("missing required attribute '{}'", key)))
}
