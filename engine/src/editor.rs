use std::rc::Rc;
use serde::Serialize;
use crate::assets::AssetResolver;
use crate::config::EditorConfig;
use crate::error::Warning;
use crate::filters::FilterRegistry;
use crate::history::History;
use crate::id::unique_object_id;
use crate::objects::ObjectProps;
use crate::surface::{Surface, SurfaceEvent};
use crate::types::{Background, Dimensions, ObjectKind, SceneObject};

/// What a mutating call did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EditOutcome {
    Applied,
    /// A precondition was not met (no surface, no selection, empty clipboard...).
    Skipped,
    /// An async edit finished after its target stopped being selected.
    Stale,
}

/// Whether settled notifications are recorded. Anything but `Idle` means the
/// editor itself is rebuilding the scene.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Phase {
    Idle,
    Restoring,
    Loading,
}

/// Read-only projection handed to observers.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EditorView {
    pub objects: Vec<SceneObject>,
    pub selected: Option<ObjectProps>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub background: Background,
    pub dimensions: Dimensions,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&EditorView)>;

pub struct SceneEditor<S: Surface> {
    pub(crate) surface: Option<S>,
    pub(crate) resolver: Rc<dyn AssetResolver>,
    pub(crate) config: EditorConfig,
    pub(crate) history: History,
    pub(crate) phase: Phase,
    pub(crate) objects: Vec<SceneObject>,
    pub(crate) selected: Option<ObjectProps>,
    /// Bumped whenever the selected object changes identity.
    pub(crate) selection_epoch: u64,
    pub(crate) clipboard: Option<ObjectProps>,
    pub(crate) filters: FilterRegistry,
    pub(crate) warnings: Vec<Warning>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl<S: Surface> SceneEditor<S> {
    pub fn new(config: EditorConfig, resolver: Rc<dyn AssetResolver>) -> Self {
        SceneEditor {
            surface: None,
            resolver,
            history: History::new(config.history_limit),
            config,
            phase: Phase::Idle,
            objects: Vec::new(),
            selected: None,
            selection_epoch: 0,
            clipboard: None,
            filters: FilterRegistry::default(),
            warnings: Vec::new(),
            observers: Vec::new(),
            next_observer: 1,
        }
    }

    /// Takes over a surface and records its current scene as the base state.
    pub fn attach(&mut self, mut surface: S) {
        while surface.poll_event().is_some() {}
        self.filters.rebuild(&surface.objects());
        self.surface = Some(surface);
        self.history.clear();
        self.clipboard = None;
        self.phase = Phase::Idle;
        self.commit();
    }

    pub fn detach(&mut self) -> Option<S> {
        let surface = self.surface.take();
        self.history.clear();
        self.filters.clear();
        self.clipboard = None;
        self.objects.clear();
        self.refresh_selection();
        self.notify();
        surface
    }

    pub fn surface(&self) -> Option<&S> { self.surface.as_ref() }

    /// For the rendering side to apply interactive transforms. Follow up with
    /// [`SceneEditor::flush_events`] so the resulting notifications are handled.
    pub fn surface_mut(&mut self) -> Option<&mut S> { self.surface.as_mut() }

    pub fn config(&self) -> &EditorConfig { &self.config }
    pub fn objects(&self) -> &[SceneObject] { &self.objects }
    pub fn selected(&self) -> Option<&ObjectProps> { self.selected.as_ref() }
    pub fn clipboard(&self) -> Option<&ObjectProps> { self.clipboard.as_ref() }
    pub fn history(&self) -> &History { &self.history }

    pub fn can_undo(&self) -> bool { self.phase == Phase::Idle && self.history.can_undo() }
    pub fn can_redo(&self) -> bool { self.phase == Phase::Idle && self.history.can_redo() }

    pub fn background(&self) -> Background {
        self.surface.as_ref().map(|s| s.background()).unwrap_or_else(|| self.config.background())
    }

    pub fn dimensions(&self) -> Dimensions {
        self.surface.as_ref().map(|s| s.dimensions()).unwrap_or_else(|| self.config.dimensions())
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            objects: self.objects.clone(),
            selected: self.selected.clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            background: self.background(),
            dimensions: self.dimensions(),
        }
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> { std::mem::take(&mut self.warnings) }

    pub fn subscribe(&mut self, observer: impl FnMut(&EditorView) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() < before
    }

    pub fn dispatch(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Settled => {
                if self.phase != Phase::Idle {
                    log::debug!("settled while {:?}, not recorded", self.phase);
                    return;
                }
                self.commit();
            }
            SurfaceEvent::Scaling { name } => {
                self.normalize_scaling(&name);
            }
            SurfaceEvent::SelectionChanged { .. } | SurfaceEvent::SelectionCleared => {
                self.refresh_selection();
                self.notify();
            }
        }
    }

    /// Handles every notification the surface has queued.
    pub fn flush_events(&mut self) {
        while let Some(event) = self.surface.as_mut().and_then(|s| s.poll_event()) {
            self.dispatch(event);
        }
    }

    pub(crate) fn settle(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.fire(SurfaceEvent::Settled);
        }
        self.flush_events();
    }

    pub(crate) fn notify(&mut self) {
        if self.observers.is_empty() { return; }
        let view = self.view();
        for (_, observer) in self.observers.iter_mut() {
            observer(&view);
        }
    }

    pub(crate) fn refresh_objects(&mut self) {
        self.objects = match &self.surface {
            Some(surface) => surface
                .objects()
                .iter()
                .enumerate()
                .map(|(index, props)| SceneObject { name: props.name().to_string(), kind: props.kind(), index })
                .collect(),
            None => Vec::new(),
        };
    }

    pub(crate) fn refresh_selection(&mut self) {
        let next = self.active();
        let changed = self.selected.as_ref().map(|p| p.name()) != next.as_ref().map(|p| p.name());
        if changed {
            self.selection_epoch += 1;
        }
        self.selected = next;
    }

    pub(crate) fn active_name(&self) -> Option<String> {
        self.surface.as_ref().and_then(|s| s.active_object())
    }

    pub(crate) fn active(&self) -> Option<ObjectProps> {
        let surface = self.surface.as_ref()?;
        surface.object(&surface.active_object()?)
    }

    pub(crate) fn fresh_name(&self, kind: ObjectKind) -> String {
        match &self.surface {
            Some(surface) => unique_object_id(kind, |name| surface.object(name).is_some()),
            None => unique_object_id(kind, |_| false),
        }
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }
}
