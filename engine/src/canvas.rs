use std::collections::{HashMap, VecDeque};
use async_trait::async_trait;
use kurbo::Vec2;
use crate::history::SceneSnapshot;
use crate::objects::ObjectProps;
use crate::surface::{Surface, SurfaceEvent};
use crate::types::{Background, Dimensions, LayerOp};

struct CanvasObject {
    props: ObjectProps,
    // Render-side state, never part of a snapshot.
    dirty: bool,
    hovered: bool,
}

impl CanvasObject {
    fn new(props: ObjectProps) -> Self {
        CanvasObject { props, dirty: true, hovered: false }
    }
}

/// Headless surface keeping the object graph in memory. Used by tests and by
/// hosts that render elsewhere from the exported snapshots.
pub struct MemoryCanvas {
    objects: Vec<CanvasObject>,
    active: Option<String>,
    background: Background,
    dimensions: Dimensions,
    events: VecDeque<SurfaceEvent>,
    filter_passes: HashMap<String, u32>,
}

impl MemoryCanvas {
    pub fn new(dimensions: Dimensions, background: Background) -> Self {
        MemoryCanvas {
            objects: Vec::new(),
            active: None,
            background,
            dimensions,
            events: VecDeque::new(),
            filter_passes: HashMap::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.props.name() == name)
    }

    /// How many times the object's filter chain has been run.
    pub fn filter_passes(&self, name: &str) -> u32 {
        self.filter_passes.get(name).copied().unwrap_or(0)
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.position(name).map(|i| self.objects[i].dirty).unwrap_or(false)
    }

    pub fn set_hovered(&mut self, name: &str, hovered: bool) {
        if let Some(i) = self.position(name) {
            self.objects[i].hovered = hovered;
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.objects.iter().find(|o| o.hovered).map(|o| o.props.name())
    }

    /// Marks every object as drawn.
    pub fn render(&mut self) {
        for obj in &mut self.objects {
            obj.dirty = false;
        }
    }

    /// A finished drag: moves the object and reports the scene as settled.
    pub fn drag(&mut self, name: &str, delta: Vec2) -> bool {
        let Some(i) = self.position(name) else { return false };
        let common = self.objects[i].props.common_mut();
        common.set_position(common.position() + delta);
        self.objects[i].dirty = true;
        self.events.push_back(SurfaceEvent::Settled);
        true
    }

    /// A finished resize handle drag: scaling notification, then settled.
    pub fn scale(&mut self, name: &str, scale_x: f64, scale_y: f64) -> bool {
        let Some(i) = self.position(name) else { return false };
        let common = self.objects[i].props.common_mut();
        common.scale_x *= scale_x;
        common.scale_y *= scale_y;
        self.objects[i].dirty = true;
        self.events.push_back(SurfaceEvent::Scaling { name: name.to_string() });
        self.events.push_back(SurfaceEvent::Settled);
        true
    }
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        MemoryCanvas::new(Dimensions { width: 1080.0, height: 1080.0 }, Background::default())
    }
}

#[async_trait(?Send)]
impl Surface for MemoryCanvas {
    fn create_object(&mut self, props: ObjectProps) {
        self.objects.push(CanvasObject::new(props));
    }

    fn remove_object(&mut self, name: &str) -> bool {
        let Some(i) = self.position(name) else { return false };
        self.objects.remove(i);
        self.filter_passes.remove(name);
        if self.active.as_deref() == Some(name) {
            self.discard_active_object();
        }
        true
    }

    fn objects(&self) -> Vec<ObjectProps> {
        self.objects.iter().map(|o| o.props.clone()).collect()
    }

    fn object(&self, name: &str) -> Option<ObjectProps> {
        self.position(name).map(|i| self.objects[i].props.clone())
    }

    fn update_object(&mut self, name: &str, edit: &mut dyn FnMut(&mut ObjectProps) -> bool) -> bool {
        let Some(i) = self.position(name) else { return false };
        let obj = &mut self.objects[i];
        if !edit(&mut obj.props) { return false; }
        obj.dirty = true;
        let renamed = obj.props.name() != name;
        if renamed {
            let new_name = obj.props.name().to_string();
            if let Some(passes) = self.filter_passes.remove(name) {
                self.filter_passes.insert(new_name.clone(), passes);
            }
            if self.active.as_deref() == Some(name) {
                self.active = Some(new_name);
            }
        }
        true
    }

    fn active_object(&self) -> Option<String> {
        self.active.clone()
    }

    fn set_active_object(&mut self, name: &str) -> bool {
        if self.position(name).is_none() { return false; }
        self.active = Some(name.to_string());
        self.events.push_back(SurfaceEvent::SelectionChanged { name: name.to_string() });
        true
    }

    fn discard_active_object(&mut self) {
        if self.active.take().is_some() {
            self.events.push_back(SurfaceEvent::SelectionCleared);
        }
    }

    fn background(&self) -> Background {
        self.background.clone()
    }

    fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn set_dimensions(&mut self, width: Option<f64>, height: Option<f64>) {
        if let Some(w) = width { self.dimensions.width = w; }
        if let Some(h) = height { self.dimensions.height = h; }
    }

    fn restack(&mut self, name: &str, op: LayerOp) -> bool {
        let Some(pos) = self.position(name) else { return false };
        let last = self.objects.len() - 1;
        let target = match op {
            LayerOp::ToBack => 0,
            LayerOp::ToFront => last,
            LayerOp::Forward => (pos + 1).min(last),
            LayerOp::Backward => pos.saturating_sub(1),
            LayerOp::ToIndex(index) => index.min(last),
        };
        if target == pos { return false; }
        let obj = self.objects.remove(pos);
        self.objects.insert(target, obj);
        self.objects[target].dirty = true;
        true
    }

    fn apply_filters(&mut self, name: &str) {
        if let Some(i) = self.position(name) {
            self.objects[i].dirty = true;
            *self.filter_passes.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    fn clear(&mut self) {
        self.discard_active_object();
        self.objects.clear();
        self.filter_passes.clear();
    }

    async fn restore(&mut self, snapshot: &SceneSnapshot) {
        self.clear();
        self.background = snapshot.background.clone();
        self.dimensions = snapshot.dimensions;
        for props in &snapshot.objects {
            self.objects.push(CanvasObject::new(props.clone()));
            if props.as_image().map_or(false, |img| img.filters.iter().any(Option::is_some)) {
                self.filter_passes.insert(props.name().to_string(), 1);
            }
        }
        // Loading counts as a modification on real canvases too.
        self.events.push_back(SurfaceEvent::Settled);
    }

    fn fire(&mut self, event: SurfaceEvent) {
        self.events.push_back(event);
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        self.events.pop_front()
    }
}
