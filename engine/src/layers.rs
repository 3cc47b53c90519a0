//! Turns the layer tree of a layered image document into a template.
//! Parsing the document itself happens elsewhere; this module only maps the
//! parsed layers onto template objects.

use std::io::Cursor;
use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use serde::{Serialize, Deserialize};
use crate::colors::rgba_to_hex;
use crate::id::object_id;
use crate::template::{TemplateDescription, TemplateObject, TemplateProperties};
use crate::types::{Background, ObjectKind};

fn one() -> f64 { 1.0 }

/// Channels in 0..=255, alpha in 0..=1.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "one")]
    pub a: f64,
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TextStyle {
    /// PostScript-style name, e.g. `Poppins-Bold`.
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub fill: Option<Rgba>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TextLayer {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
}

/// Raw pixels of a layer, row-major RGBA8.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerPixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DocumentLayer {
    pub name: Option<String>,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub opacity: Option<f64>,
    pub text: Option<TextLayer>,
    /// Already encoded picture. Takes precedence over `pixels`.
    pub image_url: Option<String>,
    pub pixels: Option<LayerPixels>,
    pub children: Vec<DocumentLayer>,
}

/// Leaf layers in document order; groups are replaced by their contents.
pub fn flatten_layers(layers: &[DocumentLayer]) -> Vec<&DocumentLayer> {
    let mut out = Vec::new();
    for layer in layers {
        if layer.children.is_empty() {
            out.push(layer);
        } else {
            out.extend(flatten_layers(&layer.children));
        }
    }
    out
}

/// `data:image/png;base64,...` for the pixels, or `None` when the buffer does
/// not match the stated size.
pub fn encode_png_data_url(pixels: &LayerPixels) -> Option<String> {
    let buffer = RgbaImage::from_raw(pixels.width, pixels.height, pixels.rgba.clone())?;
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(buffer).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png).ok()?;
    Some(format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(&bytes)))
}

fn layer_object(layer: &DocumentLayer) -> TemplateObject {
    let kind = if layer.text.is_some() { ObjectKind::Text } else { ObjectKind::Image };
    let mut properties = TemplateProperties {
        left: Some(layer.left),
        top: Some(layer.top),
        width: Some((layer.right - layer.left).ceil()),
        height: Some((layer.bottom - layer.top).ceil()),
        opacity: layer.opacity,
        ..TemplateProperties::default()
    };
    let content = match &layer.text {
        Some(text) => {
            let style = &text.style;
            let fill = style.fill.unwrap_or_default();
            properties.fill = Some(rgba_to_hex(fill.r, fill.g, fill.b, fill.a));
            properties.font_size = style.font_size.filter(|s| *s > 0.0).map(f64::ceil);
            properties.font_family = style.font_name.as_deref().filter(|n| !n.is_empty()).map(|n| n.replace('-', " "));
            text.text.clone()
        }
        None => match (&layer.image_url, &layer.pixels) {
            (Some(url), _) => url.clone(),
            (None, Some(pixels)) => encode_png_data_url(pixels).unwrap_or_else(|| {
                log::warn!("layer `{}`: pixel buffer does not match {}x{}", layer.name.as_deref().unwrap_or(""), pixels.width, pixels.height);
                String::new()
            }),
            (None, None) => String::new(),
        },
    };
    TemplateObject {
        kind,
        name: Some(layer.name.clone().filter(|n| !n.is_empty()).unwrap_or_else(|| object_id(kind))),
        properties,
        content,
    }
}

/// Maps every leaf layer to a text object (layers with text) or an image
/// object. Font family and size fall back to the editor defaults at load time.
pub fn template_from_layers(width: f64, height: f64, layers: &[DocumentLayer]) -> TemplateDescription {
    let objects: Vec<TemplateObject> = flatten_layers(layers).into_iter().map(layer_object).collect();
    log::debug!("converted {} layers", objects.len());
    TemplateDescription {
        width,
        height,
        background: Background::Color("#FFFFFF00".to_string()),
        objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::decode_data_url;

    fn text_layer(name: &str) -> DocumentLayer {
        DocumentLayer {
            name: Some(name.to_string()),
            left: 10.0,
            top: 20.0,
            right: 110.4,
            bottom: 60.0,
            text: Some(TextLayer {
                text: "Sale".to_string(),
                style: TextStyle {
                    font_name: Some("Poppins-Bold".to_string()),
                    font_size: Some(47.2),
                    fill: Some(Rgba { r: 255.0, g: 0.0, b: 0.0, a: 1.0 }),
                },
            }),
            ..DocumentLayer::default()
        }
    }

    #[test]
    fn groups_are_flattened_depth_first() {
        let group = DocumentLayer {
            name: Some("group".to_string()),
            children: vec![text_layer("a"), DocumentLayer { children: vec![text_layer("b")], ..DocumentLayer::default() }],
            ..DocumentLayer::default()
        };
        let layers = vec![group, text_layer("c")];
        let names: Vec<_> = flatten_layers(&layers).iter().map(|l| l.name.clone().unwrap()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn text_layers_map_to_text_objects() {
        let template = template_from_layers(500.0, 400.0, &[text_layer("headline")]);
        assert_eq!(template.background, Background::Color("#FFFFFF00".to_string()));
        let object = &template.objects[0];
        assert_eq!(object.kind, ObjectKind::Text);
        assert_eq!(object.content, "Sale");
        let p = &object.properties;
        assert_eq!(p.font_family.as_deref(), Some("Poppins Bold"));
        assert_eq!(p.font_size, Some(48.0));
        assert_eq!(p.fill.as_deref(), Some("#FF0000"));
        assert_eq!((p.width, p.height), (Some(101.0), Some(40.0)));
    }

    #[test]
    fn pixel_layers_become_png_images() {
        let layer = DocumentLayer {
            right: 4.0,
            bottom: 2.0,
            pixels: Some(LayerPixels { width: 4, height: 2, rgba: vec![255; 4 * 2 * 4] }),
            ..DocumentLayer::default()
        };
        let template = template_from_layers(100.0, 100.0, &[layer]);
        let object = &template.objects[0];
        assert_eq!(object.kind, ObjectKind::Image);
        assert!(object.name.as_deref().unwrap().starts_with("image_"));
        let decoded = decode_data_url(&object.content).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
    }

    #[test]
    fn short_pixel_buffers_leave_the_source_empty() {
        let pixels = LayerPixels { width: 4, height: 4, rgba: vec![0; 3] };
        assert_eq!(encode_png_data_url(&pixels), None);
    }
}
