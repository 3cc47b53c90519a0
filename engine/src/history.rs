use std::collections::VecDeque;
use serde::{Serialize, Deserialize};
use crate::editor::{EditOutcome, Phase, SceneEditor};
use crate::objects::ObjectProps;
use crate::surface::Surface;
use crate::types::{Background, Dimensions};

/// The whole scene in its exported projection.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct SceneSnapshot {
    pub objects: Vec<ObjectProps>,
    pub background: Background,
    pub dimensions: Dimensions,
}

impl SceneSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string(self) }
    pub fn from_json(json: &str) -> serde_json::Result<Self> { serde_json::from_str(json) }
}

/// Bounded undo/redo stacks. The top of the undo stack is the current scene
/// and its bottom entry is the base state, which can never be undone.
#[derive(Clone, Debug)]
pub struct History {
    undo: VecDeque<SceneSnapshot>,
    redo: Vec<SceneSnapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        History { undo: VecDeque::new(), redo: Vec::new(), limit: limit.max(1) }
    }

    pub fn record(&mut self, snapshot: SceneSnapshot) {
        self.redo.clear();
        self.undo.push_back(snapshot);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Moves the current state to the redo stack and returns the one below it.
    pub fn step_back(&mut self) -> Option<SceneSnapshot> {
        if !self.can_undo() { return None; }
        let current = self.undo.pop_back()?;
        self.redo.push(current);
        self.undo.back().cloned()
    }

    pub fn step_forward(&mut self) -> Option<SceneSnapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(next.clone());
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool { self.undo.len() > 1 }
    pub fn can_redo(&self) -> bool { !self.redo.is_empty() }
    pub fn undo_len(&self) -> usize { self.undo.len() }
    pub fn redo_len(&self) -> usize { self.redo.len() }
    pub fn current(&self) -> Option<&SceneSnapshot> { self.undo.back() }
    pub fn limit(&self) -> usize { self.limit }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl<S: Surface> SceneEditor<S> {
    /// Records the surface's current scene. Driven by settled notifications.
    pub(crate) fn commit(&mut self) {
        let Some(surface) = self.surface.as_ref() else { return };
        let snapshot = surface.serialize();
        self.history.record(snapshot);
        log::debug!("commit: {} undo / {} redo", self.history.undo_len(), self.history.redo_len());
        self.refresh_objects();
        self.refresh_selection();
        self.notify();
    }

    pub async fn undo(&mut self) -> EditOutcome {
        if self.surface.is_none() || !self.can_undo() { return EditOutcome::Skipped; }
        let Some(previous) = self.history.step_back() else { return EditOutcome::Skipped };
        log::debug!("undo: {} undo / {} redo", self.history.undo_len(), self.history.redo_len());
        self.restore(previous).await;
        EditOutcome::Applied
    }

    pub async fn redo(&mut self) -> EditOutcome {
        if self.surface.is_none() || !self.can_redo() { return EditOutcome::Skipped; }
        let Some(next) = self.history.step_forward() else { return EditOutcome::Skipped };
        log::debug!("redo: {} undo / {} redo", self.history.undo_len(), self.history.redo_len());
        self.restore(next).await;
        EditOutcome::Applied
    }

    /// Loads `snapshot` without recording it, then re-selects the previously
    /// selected object if it survived.
    async fn restore(&mut self, snapshot: SceneSnapshot) {
        let reselect = self.selected.as_ref().map(|p| p.name().to_string());
        self.phase = Phase::Restoring;
        if let Some(surface) = self.surface.as_mut() {
            surface.restore(&snapshot).await;
            match reselect.filter(|name| surface.object(name).is_some()) {
                Some(name) => { surface.set_active_object(&name); }
                None => surface.discard_active_object(),
            }
        }
        self.flush_events();
        self.phase = Phase::Idle;
        self.filters.rebuild(&snapshot.objects);
        self.refresh_objects();
        self.refresh_selection();
        self.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Common, ShapeProps};

    fn snapshot(marker: f64) -> SceneSnapshot {
        SceneSnapshot {
            objects: vec![ObjectProps::Rectangle(ShapeProps { common: Common::new("rect_abc", marker, 10.0), fill: "#000000".to_string(), rx: 0.0 })],
            background: Background::default(),
            dimensions: Dimensions { width: 100.0, height: 100.0 },
        }
    }

    #[test]
    fn base_state_cannot_be_undone() {
        let mut history = History::new(25);
        assert!(!history.can_undo());
        history.record(snapshot(0.0));
        assert!(!history.can_undo());
        assert_eq!(history.step_back(), None);
        history.record(snapshot(1.0));
        assert!(history.can_undo());
        assert_eq!(history.step_back(), Some(snapshot(0.0)));
        assert!(history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::new(25);
        history.record(snapshot(0.0));
        history.record(snapshot(1.0));
        history.step_back();
        history.record(snapshot(2.0));
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&snapshot(2.0)));
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.record(snapshot(i as f64));
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.step_back(), Some(snapshot(3.0)));
        assert_eq!(history.step_back(), Some(snapshot(2.0)));
        assert_eq!(history.step_back(), None);
        assert_eq!(history.step_forward(), Some(snapshot(3.0)));
        assert_eq!(history.current(), Some(&snapshot(3.0)));
    }

    #[test]
    fn snapshots_survive_json() {
        let snap = snapshot(4.0);
        let json = snap.to_json().unwrap();
        assert_eq!(SceneSnapshot::from_json(&json).unwrap(), snap);
    }
}
