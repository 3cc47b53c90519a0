use serde::{Serialize, Deserialize};
use kurbo::{Point, Rect, Size};
use crate::types::{ObjectKind, TextAlign};
use crate::filters::FilterSpec;

/// Line height multiplier used to derive a text box's height.
pub const LINE_HEIGHT: f64 = 1.16;

fn one() -> f64 { 1.0 }

/// Properties every object carries. Together with the per-kind structs below
/// this is the exported projection: whatever a surface keeps outside of it
/// (hover state, cached coordinates, filter output) never reaches a snapshot.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Common {
    pub name: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "one")]
    pub opacity: f64,
}

impl Common {
    pub fn new(name: &str, width: f64, height: f64) -> Self {
        Common {
            name: name.to_string(),
            left: 0.0,
            top: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            opacity: 1.0,
        }
    }

    pub fn position(&self) -> Point { Point::new(self.left, self.top) }

    pub fn set_position(&mut self, p: Point) {
        self.left = p.x;
        self.top = p.y;
    }

    /// Size as displayed, scale factors applied.
    pub fn scaled_size(&self) -> Size { Size::new(self.width * self.scale_x, self.height * self.scale_y) }

    /// Where `left`/`top` must be for the object to sit centered in `area`.
    pub fn centered_in(&self, area: Size) -> Point {
        let center = Rect::from_origin_size(Point::ORIGIN, area).center();
        center - self.scaled_size().to_vec2() / 2.0
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct TextProps {
    #[serde(flatten)]
    pub common: Common,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub fill: String,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl TextProps {
    pub fn relayout(&mut self) {
        let lines = self.text.lines().count().max(1);
        self.common.height = self.font_size * LINE_HEIGHT * lines as f64;
    }

    /// Bakes a pending scale transform into font size and width. Returns false
    /// when the box was not scaled.
    pub fn normalize_scale(&mut self) -> bool {
        let c = &mut self.common;
        if c.scale_x == 1.0 && c.scale_y == 1.0 { return false; }
        self.font_size = (self.font_size * c.scale_y).round().max(1.0);
        c.width *= c.scale_x;
        c.scale_x = 1.0;
        c.scale_y = 1.0;
        self.relayout();
        true
    }
}

/// Images are scaled, never resized: `width`/`height` hold the natural size.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ImageProps {
    #[serde(flatten)]
    pub common: Common,
    pub src: String,
    #[serde(default)]
    pub filters: Vec<Option<FilterSpec>>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ShapeProps {
    #[serde(flatten)]
    pub common: Common,
    pub fill: String,
    #[serde(default)]
    pub rx: f64,
}

/// Objects with a solid fill color.
pub trait Filled {
    fn fill(&self) -> &str;
    fn set_fill(&mut self, fill: &str);
}

impl Filled for TextProps {
    fn fill(&self) -> &str { &self.fill }
    fn set_fill(&mut self, fill: &str) { self.fill = fill.to_string(); }
}

impl Filled for ShapeProps {
    fn fill(&self) -> &str { &self.fill }
    fn set_fill(&mut self, fill: &str) { self.fill = fill.to_string(); }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectProps {
    Text(TextProps),
    Image(ImageProps),
    Rectangle(ShapeProps),
    Frame(ShapeProps),
}

impl ObjectProps {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectProps::Text(_) => ObjectKind::Text,
            ObjectProps::Image(_) => ObjectKind::Image,
            ObjectProps::Rectangle(_) => ObjectKind::Rectangle,
            ObjectProps::Frame(_) => ObjectKind::Frame,
        }
    }

    pub fn common(&self) -> &Common {
        match self {
            ObjectProps::Text(t) => &t.common,
            ObjectProps::Image(i) => &i.common,
            ObjectProps::Rectangle(s) | ObjectProps::Frame(s) => &s.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut Common {
        match self {
            ObjectProps::Text(t) => &mut t.common,
            ObjectProps::Image(i) => &mut i.common,
            ObjectProps::Rectangle(s) | ObjectProps::Frame(s) => &mut s.common,
        }
    }

    pub fn name(&self) -> &str { &self.common().name }

    pub fn filled(&self) -> Option<&dyn Filled> {
        match self {
            ObjectProps::Text(t) => Some(t),
            ObjectProps::Rectangle(s) | ObjectProps::Frame(s) => Some(s),
            ObjectProps::Image(_) => None,
        }
    }

    pub fn filled_mut(&mut self) -> Option<&mut dyn Filled> {
        match self {
            ObjectProps::Text(t) => Some(t),
            ObjectProps::Rectangle(s) | ObjectProps::Frame(s) => Some(s),
            ObjectProps::Image(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        if let ObjectProps::Text(t) = self { Some(t) } else { None }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextProps> {
        if let ObjectProps::Text(t) = self { Some(t) } else { None }
    }

    pub fn as_image(&self) -> Option<&ImageProps> {
        if let ObjectProps::Image(i) = self { Some(i) } else { None }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut ImageProps> {
        if let ObjectProps::Image(i) = self { Some(i) } else { None }
    }

    /// Sets the displayed width. Images adjust their scale factor instead.
    pub fn set_width(&mut self, width: f64) -> bool {
        match self {
            ObjectProps::Text(t) => {
                t.common.width = width;
                t.relayout();
            }
            ObjectProps::Image(i) => {
                if i.common.width <= 0.0 { return false; }
                i.common.scale_x = width / i.common.width;
            }
            ObjectProps::Rectangle(s) | ObjectProps::Frame(s) => s.common.width = width,
        }
        true
    }

    /// Sets the displayed height. Text height follows its content and is read-only.
    pub fn set_height(&mut self, height: f64) -> bool {
        match self {
            ObjectProps::Text(_) => false,
            ObjectProps::Image(i) => {
                if i.common.height <= 0.0 { return false; }
                i.common.scale_y = height / i.common.height;
                true
            }
            ObjectProps::Rectangle(s) | ObjectProps::Frame(s) => {
                s.common.height = height;
                true
            }
        }
    }
}
