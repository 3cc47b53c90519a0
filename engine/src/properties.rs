use std::rc::Rc;
use crate::assets::{AssetResolver, DecodedImage};
use crate::editor::{EditOutcome, SceneEditor};
use crate::error::{AssetError, EditorError, Warning};
use crate::objects::ObjectProps;
use crate::surface::Surface;
use crate::types::{Background, TextAlign, ViewportPlacement};

/// A synchronous edit of the selected object.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyEdit {
    Left(f64),
    Top(f64),
    Width(f64),
    Height(f64),
    Angle(f64),
    Opacity(f64),
    Text(String),
    FontSize(f64),
    Fill(String),
    Align(TextAlign),
}

impl PropertyEdit {
    /// Writes the value into `props`. False when the object has no such property.
    fn apply(&self, props: &mut ObjectProps) -> bool {
        match self {
            PropertyEdit::Left(v) => props.common_mut().left = *v,
            PropertyEdit::Top(v) => props.common_mut().top = *v,
            PropertyEdit::Angle(v) => props.common_mut().angle = v.rem_euclid(360.0),
            PropertyEdit::Opacity(v) => props.common_mut().opacity = v.clamp(0.0, 1.0),
            PropertyEdit::Width(w) => return props.set_width(*w),
            PropertyEdit::Height(h) => return props.set_height(*h),
            PropertyEdit::Fill(color) => match props.filled_mut() {
                Some(filled) => filled.set_fill(color),
                None => return false,
            },
            PropertyEdit::Text(text) => match props.as_text_mut() {
                Some(t) => {
                    t.text = text.clone();
                    t.relayout();
                }
                None => return false,
            },
            PropertyEdit::FontSize(size) => match props.as_text_mut() {
                Some(t) if *size > 0.0 => {
                    t.font_size = *size;
                    t.relayout();
                }
                _ => return false,
            },
            PropertyEdit::Align(align) => match props.as_text_mut() {
                Some(t) => t.text_align = *align,
                None => return false,
            },
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
enum PendingChange {
    FontFamily(String),
    ImageSource(String),
}

/// First half of an asynchronous edit, bound to the object that was selected
/// when it started.
pub struct PendingEdit {
    target: String,
    epoch: u64,
    change: PendingChange,
    resolver: Rc<dyn AssetResolver>,
}

#[derive(Debug)]
enum Resolution {
    Font { requested: String, result: Result<String, AssetError> },
    Image { source: String, result: Result<DecodedImage, AssetError> },
}

/// A resolved edit waiting for [`SceneEditor::finish_edit`].
#[derive(Debug)]
pub struct ResolvedEdit {
    target: String,
    epoch: u64,
    resolution: Resolution,
}

impl PendingEdit {
    pub fn target(&self) -> &str { &self.target }

    /// Runs the font load or image decode. The editor is not borrowed while
    /// this is pending, so other edits may land in the meantime.
    pub async fn resolve(self) -> ResolvedEdit {
        let resolution = match self.change {
            PendingChange::FontFamily(requested) => {
                let result = self.resolver.resolve_font(&requested).await;
                Resolution::Font { requested, result }
            }
            PendingChange::ImageSource(source) => {
                let result = self.resolver.decode_image(&source).await;
                Resolution::Image { source, result }
            }
        };
        ResolvedEdit { target: self.target, epoch: self.epoch, resolution }
    }
}

impl ResolvedEdit {
    pub fn target(&self) -> &str { &self.target }
}

impl<S: Surface> SceneEditor<S> {
    pub fn edit_property(&mut self, edit: PropertyEdit) -> EditOutcome {
        let Some(name) = self.active_name() else { return EditOutcome::Skipped };
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        if !surface.update_object(&name, &mut |props: &mut ObjectProps| edit.apply(props)) {
            return EditOutcome::Skipped;
        }
        self.refresh_selection();
        self.settle();
        EditOutcome::Applied
    }

    /// Bakes an interactive scale of a text object into its font size and
    /// width. Runs before the settled notification that records the result.
    pub fn normalize_scaling(&mut self, name: &str) -> bool {
        let Some(surface) = self.surface.as_mut() else { return false };
        let normalized = surface.update_object(name, &mut |props: &mut ObjectProps| {
            props.as_text_mut().map_or(false, |t| t.normalize_scale())
        });
        if normalized {
            self.refresh_selection();
        }
        normalized
    }

    fn begin_edit(&self, change: PendingChange) -> PendingEdit {
        PendingEdit {
            target: self.selected.as_ref().map(|p| p.name().to_string()).unwrap_or_default(),
            epoch: self.selection_epoch,
            change,
            resolver: Rc::clone(&self.resolver),
        }
    }

    /// Starts a font family change of the selected text.
    pub fn begin_font_family(&self, family: &str) -> Option<PendingEdit> {
        self.selected.as_ref()?.as_text()?;
        Some(self.begin_edit(PendingChange::FontFamily(family.to_string())))
    }

    /// Starts swapping the picture of the selected image.
    pub fn begin_image_source(&self, source: &str) -> Option<PendingEdit> {
        self.selected.as_ref()?.as_image()?;
        Some(self.begin_edit(PendingChange::ImageSource(source.to_string())))
    }

    /// Applies a resolved edit, unless its target stopped being selected while
    /// it was pending, in which case nothing happens and `Stale` is returned.
    pub fn finish_edit(&mut self, resolved: ResolvedEdit) -> Result<EditOutcome, EditorError> {
        self.flush_events();
        let ResolvedEdit { target, epoch, resolution } = resolved;
        if self.active_name().as_deref() != Some(target.as_str()) || self.selection_epoch != epoch {
            log::debug!("discarding stale edit of `{}`", target);
            return Ok(EditOutcome::Stale);
        }
        let applied = match resolution {
            Resolution::Font { requested, result } => {
                let family = match result {
                    Ok(family) => family,
                    Err(e) => {
                        log::debug!("font resolution failed: {}", e);
                        let fallback = self.config.default_font.clone();
                        self.warn(Warning::FontFallback { requested, fallback: fallback.clone() });
                        fallback
                    }
                };
                let Some(surface) = self.surface.as_mut() else { return Ok(EditOutcome::Skipped) };
                surface.update_object(&target, &mut |props: &mut ObjectProps| match props.as_text_mut() {
                    Some(t) => {
                        t.font_family = family.clone();
                        t.relayout();
                        true
                    }
                    None => false,
                })
            }
            Resolution::Image { source, result } => {
                let decoded = match result {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        self.warn(Warning::ImageUnavailable { source, reason: e.to_string() });
                        return Err(e.into());
                    }
                };
                let Some(surface) = self.surface.as_mut() else { return Ok(EditOutcome::Skipped) };
                let swapped = surface.update_object(&target, &mut |props: &mut ObjectProps| {
                    let Some(image) = props.as_image_mut() else { return false };
                    if decoded.width == 0 || decoded.height == 0 { return false; }
                    // The new picture keeps the box the old one was displayed in.
                    let shown = image.common.scaled_size();
                    image.src = decoded.source.clone();
                    image.common.width = decoded.width as f64;
                    image.common.height = decoded.height as f64;
                    image.common.scale_x = shown.width / image.common.width;
                    image.common.scale_y = shown.height / image.common.height;
                    true
                });
                if swapped {
                    surface.apply_filters(&target);
                }
                swapped
            }
        };
        if !applied { return Ok(EditOutcome::Skipped); }
        self.refresh_selection();
        self.settle();
        Ok(EditOutcome::Applied)
    }

    pub async fn set_font_family(&mut self, family: &str) -> Result<EditOutcome, EditorError> {
        let Some(pending) = self.begin_font_family(family) else { return Ok(EditOutcome::Skipped) };
        let resolved = pending.resolve().await;
        self.finish_edit(resolved)
    }

    pub async fn set_image_source(&mut self, source: &str) -> Result<EditOutcome, EditorError> {
        let Some(pending) = self.begin_image_source(source) else { return Ok(EditOutcome::Skipped) };
        let resolved = pending.resolve().await;
        self.finish_edit(resolved)
    }

    pub fn place_in_viewport(&mut self, placement: ViewportPlacement) -> EditOutcome {
        let Some(name) = self.active_name() else { return EditOutcome::Skipped };
        let viewport = self.dimensions().size();
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        surface.update_object(&name, &mut |props: &mut ObjectProps| {
            let common = props.common_mut();
            let target = common.centered_in(viewport);
            match placement {
                ViewportPlacement::Center => common.set_position(target),
                ViewportPlacement::Horizontal => common.left = target.x,
                ViewportPlacement::Vertical => common.top = target.y,
            }
            true
        });
        self.refresh_selection();
        self.settle();
        EditOutcome::Applied
    }

    pub fn set_background_color(&mut self, color: &str) -> EditOutcome {
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        surface.set_background(Background::Color(color.to_string()));
        self.settle();
        EditOutcome::Applied
    }

    /// Decodes `source` and makes it the background. On failure the
    /// background is left as it was.
    pub async fn set_background_image(&mut self, source: &str) -> Result<EditOutcome, EditorError> {
        if self.surface.is_none() { return Ok(EditOutcome::Skipped); }
        let result = self.resolver.decode_image(source).await;
        let decoded = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                self.warn(Warning::ImageUnavailable { source: source.to_string(), reason: e.to_string() });
                return Err(e.into());
            }
        };
        let Some(surface) = self.surface.as_mut() else { return Ok(EditOutcome::Skipped) };
        surface.set_background(Background::Image(decoded.source));
        self.settle();
        Ok(EditOutcome::Applied)
    }

    /// Resizes the canvas. Either side may be left unchanged.
    pub fn set_dimensions(&mut self, width: Option<f64>, height: Option<f64>) -> EditOutcome {
        let width = width.filter(|w| *w > 0.0);
        let height = height.filter(|h| *h > 0.0);
        if width.is_none() && height.is_none() { return EditOutcome::Skipped; }
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        surface.set_dimensions(width, height);
        self.settle();
        EditOutcome::Applied
    }
}
