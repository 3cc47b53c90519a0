use serde::{Serialize, Deserialize};
use crate::editor::{EditOutcome, Phase, SceneEditor};
use crate::error::Warning;
use crate::lifecycle::DEFAULT_TEXT_WIDTH;
use crate::objects::{Common, ImageProps, ObjectProps, ShapeProps, TextProps};
use crate::surface::Surface;
use crate::types::{Background, Dimensions, ObjectKind, TextAlign};

const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// A stored scene to start editing from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TemplateDescription {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub objects: Vec<TemplateObject>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TemplateObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: TemplateProperties,
    /// Text for text objects, image source for images.
    #[serde(default)]
    pub content: String,
}

/// Initial properties. Anything left out takes the editor default.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TemplateProperties {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    pub opacity: Option<f64>,
    pub fill: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub text_align: Option<TextAlign>,
    pub rx: Option<f64>,
}

impl TemplateDescription {
    pub fn from_json(json: &str) -> serde_json::Result<Self> { serde_json::from_str(json) }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions { width: self.width, height: self.height }
    }
}

fn apply_properties(props: &mut ObjectProps, p: &TemplateProperties, viewport: kurbo::Size) {
    let common = props.common_mut();
    if let Some(v) = p.scale_x { common.scale_x = v; }
    if let Some(v) = p.scale_y { common.scale_y = v; }
    if let Some(v) = p.angle { common.angle = v; }
    if let Some(v) = p.opacity { common.opacity = v.clamp(0.0, 1.0); }
    if let Some(w) = p.width { props.set_width(w); }
    if let Some(h) = p.height { props.set_height(h); }
    let common = props.common_mut();
    let centered = common.centered_in(viewport);
    common.left = p.left.unwrap_or(centered.x);
    common.top = p.top.unwrap_or(centered.y);
}

impl<S: Surface> SceneEditor<S> {
    /// Replaces the scene with `template`. Objects are added in order; one that
    /// fails to resolve is reported and left out. The loaded scene becomes the
    /// base state of a fresh history.
    pub async fn load_template(&mut self, template: &TemplateDescription) -> EditOutcome {
        if self.surface.is_none() { return EditOutcome::Skipped; }
        log::info!("loading template: {} objects, {}x{}", template.objects.len(), template.width, template.height);
        self.phase = Phase::Loading;
        self.history.clear();
        self.clipboard = None;
        self.filters.clear();

        let background = match &template.background {
            Background::Color(color) => Background::Color(color.clone()),
            Background::Image(source) => {
                let result = self.resolver.decode_image(source).await;
                match result {
                    Ok(decoded) => Background::Image(decoded.source),
                    Err(e) => {
                        self.warn(Warning::ImageUnavailable { source: source.clone(), reason: e.to_string() });
                        self.config.background()
                    }
                }
            }
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
            surface.set_dimensions(Some(template.width), Some(template.height));
            surface.set_background(background);
        }
        self.flush_events();

        let mut loaded = 0;
        for object in &template.objects {
            let Some(props) = self.build_object(object, template.dimensions()).await else { continue };
            self.filters.index_object(&props);
            if let Some(surface) = self.surface.as_mut() {
                surface.create_object(props);
            }
            loaded += 1;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.discard_active_object();
        }
        self.flush_events();
        self.phase = Phase::Idle;
        self.settle();
        log::info!("template loaded: {}/{} objects", loaded, template.objects.len());
        EditOutcome::Applied
    }

    async fn build_object(&mut self, object: &TemplateObject, dimensions: Dimensions) -> Option<ObjectProps> {
        let name = match &object.name {
            Some(name) if !self.name_taken(name) => name.clone(),
            Some(name) => {
                log::debug!("template object name `{}` is taken, generating one", name);
                self.fresh_name(object.kind)
            }
            None => self.fresh_name(object.kind),
        };
        let p = &object.properties;
        let mut props = match object.kind {
            ObjectKind::Text => {
                let requested = p.font_family.clone().unwrap_or_else(|| self.config.default_font.clone());
                let font_family = self.resolve_font_or_default(&requested).await;
                let mut text = TextProps {
                    common: Common::new(&name, DEFAULT_TEXT_WIDTH, 0.0),
                    text: object.content.clone(),
                    font_family,
                    font_size: p.font_size.filter(|s| *s > 0.0).unwrap_or(self.config.default_font_size),
                    fill: p.fill.clone().unwrap_or_else(|| "#000000".to_string()),
                    text_align: p.text_align.unwrap_or_default(),
                };
                text.relayout();
                ObjectProps::Text(text)
            }
            ObjectKind::Image => {
                let result = self.resolver.decode_image(&object.content).await;
                let decoded = match result {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        self.warn(Warning::ImageUnavailable { source: object.content.clone(), reason: e.to_string() });
                        return None;
                    }
                };
                ObjectProps::Image(ImageProps {
                    common: Common::new(&name, decoded.width as f64, decoded.height as f64),
                    src: decoded.source,
                    filters: Vec::new(),
                })
            }
            ObjectKind::Rectangle | ObjectKind::Frame => {
                let shape = ShapeProps {
                    common: Common::new(&name, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE),
                    fill: p.fill.clone().unwrap_or_else(|| "#000000".to_string()),
                    rx: p.rx.unwrap_or(0.0),
                };
                if object.kind == ObjectKind::Frame { ObjectProps::Frame(shape) } else { ObjectProps::Rectangle(shape) }
            }
        };
        apply_properties(&mut props, p, dimensions.size());
        Some(props)
    }

    fn name_taken(&self, name: &str) -> bool {
        self.surface.as_ref().map_or(false, |s| s.object(name).is_some())
    }
}
