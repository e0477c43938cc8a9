use eframe::egui::{Pos2, Rect, Vec2, pos2};

/// Model units to pixels at scale 1.0.
pub const MODEL_SCALE: f32 = 100.0;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

/// Pan offset plus zoom scale mapping projection coordinates to screen
/// pixels. Reset wholesale whenever a new projection result is loaded.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Viewport {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_screen(&self, surface: Rect, x: f32, y: f32) -> Pos2 {
        pos2(
            x * self.scale * MODEL_SCALE + surface.center().x + self.offset.x,
            y * self.scale * MODEL_SCALE + surface.center().y + self.offset.y,
        )
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// One wheel tick: positive scroll zooms in, negative zooms out, zero is
    /// ignored. Out-of-range results are clamped, never rejected.
    pub fn apply_scroll(&mut self, scroll_y: f32) {
        if scroll_y > 0.0 {
            self.scale *= ZOOM_IN_FACTOR;
        } else if scroll_y < 0.0 {
            self.scale *= ZOOM_OUT_FACTOR;
        } else {
            return;
        }
        self.scale = self.scale.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
