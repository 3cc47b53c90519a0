use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Text,
    Image,
    Rectangle,
    Frame,
}

impl ObjectKind {
    /// Prefix used when generating object names.
    pub fn prefix(self) -> &'static str {
        match self {
            ObjectKind::Text => "text",
            ObjectKind::Image => "image",
            ObjectKind::Rectangle => "rect",
            ObjectKind::Frame => "frame",
        }
    }
}

/// Entry of the derived object list. Recomputed from the surface, never edited.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub index: usize,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "kind", content = "source", rename_all = "lowercase")]
pub enum Background {
    Color(String),
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color("#FFFFFF".to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn size(&self) -> kurbo::Size {
        kurbo::Size::new(self.width, self.height)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Restack operations, matching the layer panel buttons.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum LayerOp {
    ToBack,
    Backward,
    ToFront,
    Forward,
    ToIndex(usize),
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Tint,
    Mask,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ViewportPlacement {
    Center,
    Horizontal,
    Vertical,
}
