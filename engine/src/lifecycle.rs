use kurbo::Vec2;
use crate::editor::{EditOutcome, SceneEditor};
use crate::error::{EditorError, Warning};
use crate::filters::retarget_masks;
use crate::objects::{Common, ImageProps, ObjectProps, ShapeProps, TextProps};
use crate::surface::Surface;
use crate::types::{LayerOp, ObjectKind, TextAlign};

pub(crate) const DEFAULT_TEXT_WIDTH: f64 = 400.0;

/// Initial properties for a new object. Unset fields take the editor defaults.
#[derive(Clone, Debug, PartialEq)]
pub enum NewObject {
    Text {
        text: String,
        font_family: Option<String>,
        font_size: Option<f64>,
        fill: Option<String>,
        width: Option<f64>,
    },
    Image {
        source: String,
    },
    Rectangle {
        width: f64,
        height: f64,
        fill: String,
    },
}

impl NewObject {
    pub fn text(text: &str) -> Self {
        NewObject::Text { text: text.to_string(), font_family: None, font_size: None, fill: None, width: None }
    }

    pub fn image(source: &str) -> Self {
        NewObject::Image { source: source.to_string() }
    }

    pub fn rectangle(width: f64, height: f64, fill: &str) -> Self {
        NewObject::Rectangle { width, height, fill: fill.to_string() }
    }
}

impl<S: Surface> SceneEditor<S> {
    /// Resolves the family, falling back to the default font with a warning.
    pub(crate) async fn resolve_font_or_default(&mut self, family: &str) -> String {
        let resolved = self.resolver.resolve_font(family).await;
        match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                log::debug!("font resolution failed: {}", e);
                let fallback = self.config.default_font.clone();
                self.warn(Warning::FontFallback { requested: family.to_string(), fallback: fallback.clone() });
                fallback
            }
        }
    }

    /// Creates an object centered in the viewport and selects it. Text waits
    /// for its font, images for their decode.
    pub async fn add_object(&mut self, object: NewObject) -> Result<EditOutcome, EditorError> {
        if self.surface.is_none() { return Ok(EditOutcome::Skipped); }
        let viewport = self.dimensions().size();
        let mut props = match object {
            NewObject::Text { text, font_family, font_size, fill, width } => {
                let requested = font_family.unwrap_or_else(|| self.config.default_font.clone());
                let font_family = self.resolve_font_or_default(&requested).await;
                let mut t = TextProps {
                    common: Common::new(&self.fresh_name(ObjectKind::Text), width.unwrap_or(DEFAULT_TEXT_WIDTH), 0.0),
                    text,
                    font_family,
                    font_size: font_size.unwrap_or(self.config.default_font_size),
                    fill: fill.unwrap_or_else(|| "#000000".to_string()),
                    text_align: TextAlign::Left,
                };
                t.relayout();
                ObjectProps::Text(t)
            }
            NewObject::Image { source } => {
                let result = self.resolver.decode_image(&source).await;
                let decoded = match result {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        self.warn(Warning::ImageUnavailable { source: source.clone(), reason: e.to_string() });
                        return Err(e.into());
                    }
                };
                let mut common = Common::new(&self.fresh_name(ObjectKind::Image), decoded.width as f64, decoded.height as f64);
                // Large images are shrunk to fit the canvas.
                let fit = (viewport.width / common.width).min(viewport.height / common.height).min(1.0);
                if fit.is_finite() && fit > 0.0 {
                    common.scale_x = fit;
                    common.scale_y = fit;
                }
                ObjectProps::Image(ImageProps { common, src: decoded.source, filters: Vec::new() })
            }
            NewObject::Rectangle { width, height, fill } => ObjectProps::Rectangle(ShapeProps {
                common: Common::new(&self.fresh_name(ObjectKind::Rectangle), width, height),
                fill,
                rx: 0.0,
            }),
        };
        let common = props.common_mut();
        common.set_position(common.centered_in(viewport));
        log::debug!("adding {:?} `{}`", props.kind(), props.name());
        self.insert_selected(props);
        Ok(EditOutcome::Applied)
    }

    /// Adds `props` on top, selects it and commits.
    fn insert_selected(&mut self, props: ObjectProps) {
        let Some(surface) = self.surface.as_mut() else { return };
        let name = props.name().to_string();
        self.filters.index_object(&props);
        surface.discard_active_object();
        surface.create_object(props);
        surface.set_active_object(&name);
        self.settle();
    }

    pub fn copy(&mut self) -> EditOutcome {
        let Some(active) = self.active() else { return EditOutcome::Skipped };
        self.clipboard = Some(active);
        EditOutcome::Applied
    }

    /// Pastes a renamed clone one offset step past the clipboard's position,
    /// then advances the clipboard so the next paste does not land on it.
    pub fn paste(&mut self) -> EditOutcome {
        if self.surface.is_none() { return EditOutcome::Skipped; }
        let Some(source) = self.clipboard.as_ref() else { return EditOutcome::Skipped };
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let mut clone = source.clone();
        let name = self.fresh_name(clone.kind());
        let common = clone.common_mut();
        common.name = name;
        common.set_position(common.position() + offset);
        if let Some(clipboard) = self.clipboard.as_mut() {
            let tracked = clipboard.common_mut();
            tracked.set_position(tracked.position() + offset);
        }
        self.insert_selected(clone);
        EditOutcome::Applied
    }

    pub fn duplicate(&mut self) -> EditOutcome {
        match self.copy() {
            EditOutcome::Applied => self.paste(),
            other => other,
        }
    }

    pub fn delete(&mut self) -> EditOutcome {
        let Some(name) = self.active_name() else { return EditOutcome::Skipped };
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        surface.remove_object(&name);
        surface.discard_active_object();
        self.filters.forget(&name);
        self.settle();
        EditOutcome::Applied
    }

    pub fn reorder(&mut self, op: LayerOp) -> EditOutcome {
        let Some(name) = self.active_name() else { return EditOutcome::Skipped };
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        if !surface.restack(&name, op) { return EditOutcome::Skipped; }
        self.refresh_objects();
        self.settle();
        EditOutcome::Applied
    }

    /// Selection is not an edit; nothing is committed.
    pub fn select(&mut self, name: &str) -> EditOutcome {
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        if !surface.set_active_object(name) { return EditOutcome::Skipped; }
        self.flush_events();
        EditOutcome::Applied
    }

    pub fn deselect(&mut self) -> EditOutcome {
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        surface.discard_active_object();
        self.flush_events();
        EditOutcome::Applied
    }

    pub fn rename_object(&mut self, name: &str, new_name: &str) -> Result<EditOutcome, EditorError> {
        let Some(surface) = self.surface.as_mut() else { return Ok(EditOutcome::Skipped) };
        if surface.object(name).is_none() { return Err(EditorError::UnknownObject(name.to_string())); }
        if name == new_name || new_name.trim().is_empty() { return Ok(EditOutcome::Skipped); }
        if surface.object(new_name).is_some() { return Err(EditorError::DuplicateName(new_name.to_string())); }
        surface.update_object(name, &mut |props: &mut ObjectProps| {
            props.common_mut().name = new_name.to_string();
            true
        });
        self.filters.rename(name, new_name);
        // Masks taken from the renamed object keep pointing at it.
        for other in surface.objects() {
            let other_name = other.name().to_string();
            let retargeted = surface.update_object(&other_name, &mut |props: &mut ObjectProps| {
                props.as_image_mut().map_or(false, |image| retarget_masks(image, name, new_name))
            });
            if retargeted {
                surface.apply_filters(&other_name);
                if let Some(props) = surface.object(&other_name) {
                    self.filters.index_object(&props);
                }
            }
        }
        self.settle();
        Ok(EditOutcome::Applied)
    }
}
