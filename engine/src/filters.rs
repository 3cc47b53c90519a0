use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::editor::{EditOutcome, SceneEditor};
use crate::error::{EditorError, Warning};
use crate::objects::{ImageProps, ObjectProps};
use crate::surface::Surface;
use crate::types::FilterKind;

/// One slot of an image's filter chain.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterSpec {
    Tint { color: String, opacity: f64 },
    /// Blends with the image that was directly behind when the mask was applied.
    Mask { source: String, src: String },
}

impl FilterSpec {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterSpec::Tint { .. } => FilterKind::Tint,
            FilterSpec::Mask { .. } => FilterKind::Mask,
        }
    }
}

/// `index` is a stable handle into the chain; removal leaves an empty slot
/// rather than shifting later filters.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct FilterDescriptor {
    pub index: usize,
    pub kind: FilterKind,
    pub spec: FilterSpec,
}

#[derive(Serialize, Clone, PartialEq, Debug)]
pub struct FilterQuery {
    pub active: bool,
    pub descriptor: Option<FilterDescriptor>,
}

#[derive(Default, Clone, Debug)]
pub struct FilterRegistry {
    entries: HashMap<String, HashMap<FilterKind, FilterDescriptor>>,
}

impl FilterRegistry {
    pub fn get(&self, name: &str, kind: FilterKind) -> Option<&FilterDescriptor> {
        self.entries.get(name).and_then(|m| m.get(&kind))
    }

    pub fn insert(&mut self, name: &str, descriptor: FilterDescriptor) {
        self.entries.entry(name.to_string()).or_default().insert(descriptor.kind, descriptor);
    }

    pub fn remove(&mut self, name: &str, kind: FilterKind) -> Option<FilterDescriptor> {
        let per_object = self.entries.get_mut(name)?;
        let removed = per_object.remove(&kind);
        if per_object.is_empty() {
            self.entries.remove(name);
        }
        removed
    }

    pub fn forget(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(per_object) = self.entries.remove(from) {
            self.entries.insert(to.to_string(), per_object);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Re-derives the entries of one object from its filter chain.
    pub fn index_object(&mut self, props: &ObjectProps) {
        let name = props.name();
        self.forget(name);
        let Some(image) = props.as_image() else { return };
        for (index, slot) in image.filters.iter().enumerate() {
            if let Some(spec) = slot {
                self.insert(name, FilterDescriptor { index, kind: spec.kind(), spec: spec.clone() });
            }
        }
    }

    pub fn rebuild(&mut self, objects: &[ObjectProps]) {
        self.clear();
        for props in objects {
            self.index_object(props);
        }
    }
}

/// Points masks taken from `from` at `to`. True when any slot changed.
pub(crate) fn retarget_masks(image: &mut ImageProps, from: &str, to: &str) -> bool {
    let mut changed = false;
    for spec in image.filters.iter_mut().flatten() {
        if let FilterSpec::Mask { source, .. } = spec {
            if source == from {
                *source = to.to_string();
                changed = true;
            }
        }
    }
    changed
}

impl<S: Surface> SceneEditor<S> {
    /// Tints the selected image, replacing an existing tint in place.
    pub fn apply_tint(&mut self, color: &str, opacity: Option<f64>) -> EditOutcome {
        let Some(active) = self.active() else { return EditOutcome::Skipped };
        if active.as_image().is_none() { return EditOutcome::Skipped; }
        let spec = FilterSpec::Tint { color: color.to_string(), opacity: opacity.unwrap_or(1.0).clamp(0.0, 1.0) };
        if self.install_filter(active.name(), spec) { EditOutcome::Applied } else { EditOutcome::Skipped }
    }

    /// Masks the selected image with the image directly behind it.
    pub fn apply_mask(&mut self) -> Result<EditOutcome, EditorError> {
        let Some(surface) = self.surface.as_ref() else { return Ok(EditOutcome::Skipped) };
        let Some(name) = surface.active_object() else { return Ok(EditOutcome::Skipped) };
        let objects = surface.objects();
        let Some(position) = objects.iter().position(|o| o.name() == name) else { return Ok(EditOutcome::Skipped) };
        if objects[position].as_image().is_none() { return Ok(EditOutcome::Skipped); }

        let source = match position.checked_sub(1).map(|i| &objects[i]) {
            None => Err("no object behind it".to_string()),
            Some(behind) => match behind.as_image() {
                Some(image) => Ok(FilterSpec::Mask { source: image.common.name.clone(), src: image.src.clone() }),
                None => Err(format!("`{}` behind it is not an image", behind.name())),
            },
        };
        match source {
            Ok(spec) => {
                let applied = self.install_filter(&name, spec);
                Ok(if applied { EditOutcome::Applied } else { EditOutcome::Skipped })
            }
            Err(reason) => {
                self.warn(Warning::MaskSource { name: name.clone(), reason: reason.clone() });
                Err(EditorError::MaskSource { name, reason })
            }
        }
    }

    pub fn remove_filter(&mut self, kind: FilterKind) -> EditOutcome {
        let Some(name) = self.active_name() else { return EditOutcome::Skipped };
        let Some(index) = self.filters.get(&name, kind).map(|d| d.index) else { return EditOutcome::Skipped };
        let Some(surface) = self.surface.as_mut() else { return EditOutcome::Skipped };
        surface.update_object(&name, &mut |props: &mut ObjectProps| {
            match props.as_image_mut().and_then(|image| image.filters.get_mut(index)) {
                Some(slot) => {
                    *slot = None;
                    true
                }
                None => false,
            }
        });
        surface.apply_filters(&name);
        self.filters.remove(&name, kind);
        self.refresh_selection();
        self.settle();
        EditOutcome::Applied
    }

    pub fn query_filter(&self, name: &str, kind: FilterKind) -> FilterQuery {
        let descriptor = self.filters.get(name, kind).cloned();
        FilterQuery { active: descriptor.is_some(), descriptor }
    }

    /// Writes `spec` into the chain: over the slot of the same kind when one is
    /// registered, at the end otherwise.
    fn install_filter(&mut self, name: &str, spec: FilterSpec) -> bool {
        let kind = spec.kind();
        let existing = self.filters.get(name, kind).map(|d| d.index);
        let Some(surface) = self.surface.as_mut() else { return false };
        let mut placed = None;
        surface.update_object(name, &mut |props: &mut ObjectProps| {
            let Some(image) = props.as_image_mut() else { return false };
            let index = match existing {
                Some(i) if i < image.filters.len() => {
                    image.filters[i] = Some(spec.clone());
                    i
                }
                _ => {
                    image.filters.push(Some(spec.clone()));
                    image.filters.len() - 1
                }
            };
            placed = Some(index);
            true
        });
        let Some(index) = placed else { return false };
        surface.apply_filters(name);
        self.filters.insert(name, FilterDescriptor { index, kind, spec });
        self.refresh_selection();
        self.settle();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Common;

    #[test]
    fn registry_indexes_chain_slots() {
        let props = ObjectProps::Image(ImageProps {
            common: Common::new("image_q1w", 10.0, 10.0),
            src: "a.png".to_string(),
            filters: vec![
                None,
                Some(FilterSpec::Tint { color: "#FF0000".to_string(), opacity: 0.5 }),
            ],
        });
        let mut registry = FilterRegistry::default();
        registry.index_object(&props);
        assert_eq!(registry.get("image_q1w", FilterKind::Tint).map(|d| d.index), Some(1));
        assert!(registry.get("image_q1w", FilterKind::Mask).is_none());
        registry.rename("image_q1w", "hero");
        assert!(registry.get("hero", FilterKind::Tint).is_some());
        assert!(registry.remove("hero", FilterKind::Tint).is_some());
        assert!(registry.get("hero", FilterKind::Tint).is_none());
    }

    #[test]
    fn masks_follow_a_renamed_source() {
        let mask = |source: &str| Some(FilterSpec::Mask { source: source.to_string(), src: "b.png".to_string() });
        let mut image = ImageProps { common: Common::new("image_f0r", 10.0, 10.0), src: "a.png".to_string(), filters: vec![None, mask("image_b4k")] };
        assert!(retarget_masks(&mut image, "image_b4k", "backdrop"));
        assert_eq!(image.filters[1], mask("backdrop"));
        assert!(!retarget_masks(&mut image, "image_b4k", "other"));
    }
}
