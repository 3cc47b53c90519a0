use async_trait::async_trait;
use crate::history::SceneSnapshot;
use crate::objects::ObjectProps;
use crate::types::{Background, Dimensions, LayerOp};

/// Notifications a surface raises. The editor drains them after each command
/// it issues; hosts forward interactive ones through `SceneEditor::dispatch`.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    /// A mutation finished and the scene is stable.
    Settled,
    /// An object is being resized interactively.
    Scaling { name: String },
    SelectionChanged { name: String },
    SelectionCleared,
}

/// The rendering engine contract. A surface owns the live object graph;
/// objects are addressed by their unique name and exchanged as the exported
/// `ObjectProps` projection, ordered back to front.
#[async_trait(?Send)]
pub trait Surface {
    fn create_object(&mut self, props: ObjectProps);
    fn remove_object(&mut self, name: &str) -> bool;
    fn objects(&self) -> Vec<ObjectProps>;
    fn object(&self, name: &str) -> Option<ObjectProps>;
    /// Mutation primitive. Returns false when the object is unknown or `edit`
    /// declined the change.
    fn update_object(&mut self, name: &str, edit: &mut dyn FnMut(&mut ObjectProps) -> bool) -> bool;

    fn active_object(&self) -> Option<String>;
    fn set_active_object(&mut self, name: &str) -> bool;
    fn discard_active_object(&mut self);

    fn background(&self) -> Background;
    fn set_background(&mut self, background: Background);
    fn dimensions(&self) -> Dimensions;
    fn set_dimensions(&mut self, width: Option<f64>, height: Option<f64>);

    /// False when the object is unknown or already where `op` would put it.
    fn restack(&mut self, name: &str, op: LayerOp) -> bool;
    /// Re-runs the object's filter chain.
    fn apply_filters(&mut self, name: &str);
    /// Drops every object. Background and dimensions are kept.
    fn clear(&mut self);

    fn serialize(&self) -> SceneSnapshot {
        SceneSnapshot {
            objects: self.objects(),
            background: self.background(),
            dimensions: self.dimensions(),
        }
    }

    /// Replaces the whole scene. Completes once every object is live again.
    async fn restore(&mut self, snapshot: &SceneSnapshot);

    fn fire(&mut self, event: SurfaceEvent);
    fn poll_event(&mut self) -> Option<SurfaceEvent>;
}
