use crate::config::ZoomConfig;

/// Zoom level of the editing viewport, stepped and clamped.
#[derive(Clone, Debug, PartialEq)]
pub struct Zoom {
    scale: f64,
    config: ZoomConfig,
}

impl Zoom {
    pub fn new(config: ZoomConfig) -> Self {
        let scale = config.initial.clamp(config.min, config.max);
        Zoom { scale, config }
    }

    pub fn scale(&self) -> f64 { self.scale }

    pub fn can_zoom_in(&self) -> bool { self.scale < self.config.max }
    pub fn can_zoom_out(&self) -> bool { self.scale > self.config.min }

    pub fn zoom_in(&mut self) -> f64 {
        self.scale = (self.scale + self.config.step).min(self.config.max);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.scale = (self.scale - self.config.step).max(self.config.min);
        self.scale
    }

    pub fn set(&mut self, scale: f64) -> f64 {
        self.scale = scale.clamp(self.config.min, self.config.max);
        self.scale
    }

    pub fn reset(&mut self) -> f64 {
        self.set(self.config.initial)
    }
}

impl Default for Zoom {
    fn default() -> Self { Zoom::new(ZoomConfig::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut zoom = Zoom::default();
        for _ in 0..20 { zoom.zoom_in(); }
        assert_eq!(zoom.scale(), 1.0);
        assert!(!zoom.can_zoom_in());
        for _ in 0..20 { zoom.zoom_out(); }
        assert_eq!(zoom.scale(), 0.1);
        assert!(!zoom.can_zoom_out());
        assert_eq!(zoom.reset(), 0.4);
        assert_eq!(zoom.set(7.0), 1.0);
    }
}
