pub mod types;
pub mod objects;
pub mod surface;
pub mod canvas;
pub mod assets;
pub mod id;
pub mod colors;
pub mod config;
pub mod error;
pub mod logging;
pub mod editor;
pub mod history;
pub mod lifecycle;
pub mod properties;
pub mod filters;
pub mod template;
pub mod layers;
pub mod viewport;

pub use editor::{EditOutcome, EditorView, ObserverId, SceneEditor};
pub use surface::{Surface, SurfaceEvent};
pub use canvas::MemoryCanvas;
pub use assets::{AssetLibrary, AssetResolver, DecodedImage};
pub use config::{EditorConfig, ZoomConfig};
pub use error::{AssetError, ConfigError, EditorError, Warning};
pub use history::{History, SceneSnapshot};
pub use lifecycle::NewObject;
pub use properties::{PendingEdit, PropertyEdit, ResolvedEdit};
pub use filters::{FilterDescriptor, FilterQuery, FilterSpec};
pub use template::{TemplateDescription, TemplateObject, TemplateProperties};
pub use logging::{init_logging, LoggingConfig};
pub use viewport::Zoom;
pub use types::*;
pub use objects::*;
