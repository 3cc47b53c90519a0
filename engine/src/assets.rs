use std::collections::HashMap;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use image::GenericImageView;
use crate::error::AssetError;

/// A decoded image, reduced to what the editor needs to place it.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

/// Font and image resolution. Both calls are suspension points; the editor
/// never holds a selection across them without re-checking it afterwards.
#[async_trait(?Send)]
pub trait AssetResolver {
    /// Returns the canonical family name once the font is usable.
    async fn resolve_font(&self, family: &str) -> Result<String, AssetError>;
    async fn decode_image(&self, source: &str) -> Result<DecodedImage, AssetError>;
}

/// Decodes `data:<mime>;base64,<payload>` sources.
pub fn decode_data_url(source: &str) -> Result<DecodedImage, AssetError> {
    let rest = source.strip_prefix("data:").ok_or(AssetError::InvalidDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(AssetError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") { return Err(AssetError::InvalidDataUrl); }
    let bytes = general_purpose::STANDARD.decode(payload.trim()).map_err(|_| AssetError::InvalidDataUrl)?;
    let img = image::load_from_memory(&bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();
    Ok(DecodedImage { source: source.to_string(), width, height })
}

/// In-process resolver: a set of installed font families plus images whose
/// size is already known. Data URLs are decoded on demand.
#[derive(Default, Clone, Debug)]
pub struct AssetLibrary {
    fonts: Vec<String>,
    images: HashMap<String, (u32, u32)>,
}

impl AssetLibrary {
    pub fn new() -> Self { Self::default() }

    pub fn with_font(mut self, family: &str) -> Self {
        self.register_font(family);
        self
    }

    pub fn with_image(mut self, source: &str, width: u32, height: u32) -> Self {
        self.register_image(source, width, height);
        self
    }

    pub fn register_font(&mut self, family: &str) {
        if !self.fonts.iter().any(|f| f.eq_ignore_ascii_case(family)) {
            self.fonts.push(family.to_string());
        }
    }

    pub fn register_image(&mut self, source: &str, width: u32, height: u32) {
        self.images.insert(source.to_string(), (width, height));
    }
}

#[async_trait(?Send)]
impl AssetResolver for AssetLibrary {
    async fn resolve_font(&self, family: &str) -> Result<String, AssetError> {
        self.fonts
            .iter()
            .find(|f| f.eq_ignore_ascii_case(family.trim()))
            .cloned()
            .ok_or_else(|| AssetError::UnknownFont(family.to_string()))
    }

    async fn decode_image(&self, source: &str) -> Result<DecodedImage, AssetError> {
        if let Some(&(width, height)) = self.images.get(source) {
            return Ok(DecodedImage { source: source.to_string(), width, height });
        }
        if source.starts_with("data:") {
            return decode_data_url(source);
        }
        Err(AssetError::UnresolvedImage(source.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, RgbaImage};
    use std::io::Cursor;

    fn png_data_url(width: u32, height: u32) -> String {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(&bytes))
    }

    #[test]
    fn data_urls_decode_to_natural_size() {
        let url = png_data_url(7, 3);
        let decoded = decode_data_url(&url).unwrap();
        assert_eq!((decoded.width, decoded.height), (7, 3));
        assert_eq!(decode_data_url("data:image/png,abc"), Err(AssetError::InvalidDataUrl));
        assert!(matches!(decode_data_url("data:image/png;base64,aGVsbG8="), Err(AssetError::Decode(_))));
    }

    #[test]
    fn library_resolves_registered_assets() {
        let lib = AssetLibrary::new().with_font("Poppins Black").with_image("hero.png", 400, 300);
        assert_eq!(pollster::block_on(lib.resolve_font("poppins black")), Ok("Poppins Black".to_string()));
        assert_eq!(pollster::block_on(lib.resolve_font("Comic")), Err(AssetError::UnknownFont("Comic".to_string())));
        let hero = pollster::block_on(lib.decode_image("hero.png")).unwrap();
        assert_eq!((hero.width, hero.height), (400, 300));
        assert!(pollster::block_on(lib.decode_image("missing.png")).is_err());
        let inline = pollster::block_on(lib.decode_image(&png_data_url(2, 2))).unwrap();
        assert_eq!(inline.width, 2);
    }
}
