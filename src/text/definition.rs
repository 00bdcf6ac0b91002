use std::{fmt::Display, str::FromStr};

use json::JsonValue;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::{
    atlas::{required_str, DEFAULT_NATIVE_RESOLUTION},
    math::Size,
    text::{
        font::{invalid_native_resolution, is_valid_resolution},
        pixmap::HorizontalAdvance,
    },
    Error,
};

/// The point size used when a definition does not give one.
pub const DEFAULT_POINT_SIZE: f32 = 12.;

/// The kind of glyph source a font uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FontKind {
    /// Glyphs rasterized from an outline font file.
    FreeType,
    /// Glyphs mapped onto images of an atlas.
    Pixmap,
}

impl Display for FontKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FreeType => "FreeType",
            Self::Pixmap => "Pixmap",
        })
    }
}

impl FromStr for FontKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FreeType" => Ok(Self::FreeType),
            "Pixmap" => Ok(Self::Pixmap),
            other => Err(Error::Definition(format!("unknown font type '{}'", other))),
        }
    }
}

/// Everything needed to create a [`Font`](crate::text::Font).
///
/// The Json format looks like:
///
/// ```json
/// {
///     "Name": "DejaVuSans-12",
///     "Type": "FreeType",
///     "Filename": "DejaVuSans.ttf",
///     "Size": 12,
///     "AntiAlias": true
/// }
/// ```
///
/// Pixmap fonts list their glyphs under `Mappings`, each with a `Codepoint`,
/// an `Image` and an optional `HorzAdvance`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FontDefinition {
    /// The unique font name.
    pub name: String,
    /// The glyph source.
    pub kind: FontKind,
    /// The font file, or the atlas definition file of a pixmap font.
    pub filename: String,
    /// The resource group to load `filename` from. `"*"` makes a pixmap font
    /// use the already registered atlas named `filename`.
    pub resource_group: String,
    /// The point size of a FreeType font.
    pub point_size: f32,
    /// Whether a FreeType font renders grayscale coverage.
    pub anti_aliased: bool,
    /// Whether the font scales with the display size.
    pub auto_scaled: bool,
    /// The resolution sizes are given for.
    pub native_resolution: Size<f32>,
    /// Overrides the face's line spacing when greater than zero.
    pub line_spacing: f32,
    /// The glyphs of a pixmap font.
    pub mappings: Vec<MappingDefinition>,
}

/// One glyph of a pixmap font.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct MappingDefinition {
    /// The codepoint being mapped.
    pub codepoint: u32,
    /// The atlas image drawn for the codepoint.
    pub image: String,
    /// The horizontal advance at native resolution.
    pub advance: HorizontalAdvance,
}

impl FontDefinition {
    fn new(name: String, kind: FontKind, filename: String) -> Self {
        Self {
            name,
            kind,
            filename,
            resource_group: String::new(),
            point_size: DEFAULT_POINT_SIZE,
            anti_aliased: true,
            auto_scaled: false,
            native_resolution: DEFAULT_NATIVE_RESOLUTION,
            line_spacing: 0.,
            mappings: Vec::new(),
        }
    }

    /// Returns a definition of a FreeType font loaded from `filename`.
    pub fn freetype(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::new(name.into(), FontKind::FreeType, filename.into())
    }

    /// Returns a definition of a pixmap font whose atlas is described by
    /// the atlas definition file `filename`.
    pub fn pixmap(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::new(name.into(), FontKind::Pixmap, filename.into())
    }

    /// Parses a definition from Json.
    pub fn parse(raw_json: &str) -> crate::Result<Self> {
        let json = json::parse(raw_json)?;
        if !json.is_object() {
            return Err(Error::Definition(
                "font definition must be a json object".to_owned(),
            ));
        }

        let name = required_str(&json, "Name")?;
        let kind = required_str(&json, "Type")?.parse::<FontKind>()?;
        let mut definition = Self::new(name, kind, required_str(&json, "Filename")?);
        if let Some(group) = json["ResourceGroup"].as_str() {
            definition.resource_group = group.to_owned();
        }
        if let Some(point_size) = json["Size"].as_f32() {
            definition.point_size = point_size;
        }
        if let Some(anti_aliased) = json["AntiAlias"].as_bool() {
            definition.anti_aliased = anti_aliased;
        }
        if let Some(auto_scaled) = json["AutoScaled"].as_bool() {
            definition.auto_scaled = auto_scaled;
        }
        if let Some(width) = json["NativeHorzRes"].as_f32() {
            definition.native_resolution.width = width;
        }
        if let Some(height) = json["NativeVertRes"].as_f32() {
            definition.native_resolution.height = height;
        }
        if !is_valid_resolution(definition.native_resolution) {
            return Err(invalid_native_resolution(&definition.name));
        }
        if let Some(line_spacing) = json["LineSpacing"].as_f32() {
            definition.line_spacing = line_spacing;
        }

        for mapping in json["Mappings"].members() {
            let codepoint = mapping["Codepoint"].as_u32().ok_or_else(|| {
                Error::Definition(format!(
                    "mapping in font '{}' has an invalid Codepoint",
                    definition.name
                ))
            })?;
            definition.mappings.push(MappingDefinition {
                codepoint,
                image: required_str(mapping, "Image")?,
                advance: mapping["HorzAdvance"]
                    .as_f32()
                    .map_or(HorizontalAdvance::Auto, HorizontalAdvance::from_f32),
            });
        }

        Ok(definition)
    }

    /// Converts this definition to Json. Attributes that do not apply to
    /// the font's kind are omitted.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut json = JsonValue::new_object();
        json["Name"] = self.name.as_str().into();
        json["Type"] = self.kind.to_string().into();
        json["Filename"] = self.filename.as_str().into();
        if !self.resource_group.is_empty() {
            json["ResourceGroup"] = self.resource_group.as_str().into();
        }
        json["AutoScaled"] = self.auto_scaled.into();
        json["NativeHorzRes"] = self.native_resolution.width.into();
        json["NativeVertRes"] = self.native_resolution.height.into();

        match self.kind {
            FontKind::FreeType => {
                json["Size"] = self.point_size.into();
                json["AntiAlias"] = self.anti_aliased.into();
                if self.line_spacing > 0. {
                    json["LineSpacing"] = self.line_spacing.into();
                }
            }
            FontKind::Pixmap => {
                let mut mappings = JsonValue::new_array();
                for mapping in &self.mappings {
                    let mut entry = JsonValue::new_object();
                    entry["Codepoint"] = mapping.codepoint.into();
                    entry["Image"] = mapping.image.as_str().into();
                    if let HorizontalAdvance::Fixed(advance) = mapping.advance {
                        entry["HorzAdvance"] = advance.into();
                    }
                    // Pushing onto an array value cannot fail.
                    let _ = mappings.push(entry);
                }
                json["Mappings"] = mappings;
            }
        }
        json
    }

    /// Converts this definition to a pretty-printed Json string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        json::stringify_pretty(self.to_json(), 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freetype_defaults() {
        let definition = FontDefinition::parse(
            r#"{ "Name": "Sans", "Type": "FreeType", "Filename": "sans.ttf" }"#,
        )
        .unwrap();
        assert_eq!(definition, FontDefinition::freetype("Sans", "sans.ttf"));
        assert_eq!(definition.point_size, DEFAULT_POINT_SIZE);
        assert!(definition.anti_aliased);
        assert_eq!(definition.native_resolution, Size::new(640., 480.));
    }

    #[test]
    fn pixmap_mappings() {
        let definition = FontDefinition::parse(
            r#"{
                "Name": "Digits",
                "Type": "Pixmap",
                "Filename": "digits.json",
                "ResourceGroup": "fonts",
                "AutoScaled": true,
                "NativeHorzRes": 800,
                "NativeVertRes": 600,
                "Mappings": [
                    { "Codepoint": 48, "Image": "zero" },
                    { "Codepoint": 49, "Image": "one", "HorzAdvance": 7 },
                    { "Codepoint": 50, "Image": "two", "HorzAdvance": -1 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(definition.kind, FontKind::Pixmap);
        assert_eq!(definition.resource_group, "fonts");
        assert!(definition.auto_scaled);
        assert_eq!(definition.native_resolution, Size::new(800., 600.));
        let advances: Vec<_> = definition.mappings.iter().map(|m| m.advance).collect();
        assert_eq!(
            advances,
            vec![
                HorizontalAdvance::Auto,
                HorizontalAdvance::Fixed(7.),
                HorizontalAdvance::Auto
            ]
        );
        assert_eq!(
            FontDefinition::parse(&definition.to_json_string()).unwrap(),
            definition
        );
    }

    #[test]
    fn freetype_json_omits_mappings() {
        let mut definition = FontDefinition::freetype("Sans", "sans.ttf");
        definition.line_spacing = 18.;
        let json = definition.to_json();
        assert!(json["Mappings"].is_null());
        assert_eq!(json["LineSpacing"].as_f32(), Some(18.));
        assert_eq!(FontDefinition::parse(&json.dump()).unwrap(), definition);
    }

    #[test]
    fn invalid_definitions() {
        assert!(matches!(
            FontDefinition::parse(r#"{ "Name": "a", "Type": "Vector", "Filename": "a" }"#),
            Err(Error::Definition(_))
        ));
        assert!(matches!(
            FontDefinition::parse(r#"{ "Type": "FreeType", "Filename": "a" }"#),
            Err(Error::Definition(_))
        ));
        assert!(matches!(
            FontDefinition::parse(
                r#"{ "Name": "a", "Type": "Pixmap", "Filename": "a", "Mappings": [{ "Image": "x" }] }"#
            ),
            Err(Error::Definition(_))
        ));
        assert!(matches!(
            FontDefinition::parse(
                r#"{ "Name": "a", "Type": "FreeType", "Filename": "a", "NativeHorzRes": 0, "NativeVertRes": 0 }"#
            ),
            Err(Error::Definition(_))
        ));
        assert!(matches!(
            FontDefinition::parse(
                r#"{ "Name": "a", "Type": "FreeType", "Filename": "a", "NativeVertRes": -480 }"#
            ),
            Err(Error::Definition(_))
        ));
        assert!(matches!(FontDefinition::parse("[]"), Err(Error::Definition(_))));
    }
}
