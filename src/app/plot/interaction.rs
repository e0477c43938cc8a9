use eframe::egui::{self, CursorIcon, Pos2, Rect, Response, Ui};

use crate::projection::Point;

use super::super::ViewModel;
use super::super::viewport::Viewport;

pub(in crate::app) const HIT_RADIUS: f32 = 10.0;

/// Pointer-driven state read by the renderer. Mutated only while handling
/// input for the plot surface.
#[derive(Debug, Default)]
pub(in crate::app) struct Interaction {
    pub hovered: Option<usize>,
    pub dragging: bool,
}

impl Interaction {
    pub(in crate::app) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// egui reports `hovered()` false while a drag is in progress, so the wheel
/// gate has to account for dragging separately.
pub(in crate::app) fn accepts_scroll(hovered: bool, dragging: bool) -> bool {
    hovered || dragging
}

/// First point within the hit radius wins, in insertion order. Overlapping
/// points deliberately do not fall back to a nearest-point search.
pub(in crate::app) fn hit_test(
    points: &[Point],
    viewport: &Viewport,
    surface: Rect,
    pointer: Pos2,
) -> Option<usize> {
    points.iter().position(|point| {
        viewport
            .to_screen(surface, point.x, point.y)
            .distance(pointer)
            <= HIT_RADIUS
    })
}

impl ViewModel {
    pub(in crate::app) fn handle_plot_input(
        &mut self,
        ui: &Ui,
        surface: Rect,
        response: &Response,
    ) {
        // Wheel zoom applies in every state and changes neither dragging
        // nor hover.
        if accepts_scroll(response.hovered(), response.dragged()) {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                self.viewport.apply_scroll(scroll);
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            // Panning suppresses hover recomputation; the previous hover is
            // kept for cursor styling.
            self.interaction.dragging = true;
            self.viewport.pan_by(response.drag_delta());
        } else {
            self.interaction.dragging = false;
            if let Some(pointer) = response.hover_pos() {
                self.interaction.hovered =
                    hit_test(&self.result.points, &self.viewport, surface, pointer);
            }
        }

        if response.clicked()
            && let Some(index) = self.interaction.hovered
            && let Some(point) = self.result.points.get(index)
        {
            (self.open_callback)(&point.path);
        }

        if self.interaction.dragging {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::Grabbing);
        } else if self.interaction.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::PointingHand);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn point(title: &str, x: f32, y: f32) -> Point {
        crate::projection::test_point(title, x, y, -1)
    }

    fn surface() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(1600.0, 700.0))
    }

    #[test]
    fn pointer_within_radius_hits() {
        let points = vec![point("a", 0.0, 0.0)]; // screen (800, 350)
        let viewport = Viewport::default();

        assert_eq!(
            hit_test(&points, &viewport, surface(), pos2(806.0, 358.0)),
            Some(0)
        );
        assert_eq!(
            hit_test(&points, &viewport, surface(), pos2(800.0, 360.0)),
            Some(0)
        );
    }

    #[test]
    fn pointer_outside_radius_misses() {
        let points = vec![point("a", 0.0, 0.0)];
        let viewport = Viewport::default();

        assert_eq!(
            hit_test(&points, &viewport, surface(), pos2(800.0, 360.5)),
            None
        );
    }

    #[test]
    fn overlap_resolves_to_first_point_in_insertion_order() {
        let points = vec![point("first", 0.0, 0.0), point("second", 0.0, 0.0)];
        let viewport = Viewport::default();

        assert_eq!(
            hit_test(&points, &viewport, surface(), pos2(800.0, 350.0)),
            Some(0)
        );
    }

    #[test]
    fn hit_testing_respects_the_viewport_transform() {
        let points = vec![point("a", 1.0, 0.0)];
        let mut viewport = Viewport::default();
        viewport.pan_by(vec2(-100.0, 0.0)); // screen x: 800 + 100 - 100

        assert_eq!(
            hit_test(&points, &viewport, surface(), pos2(800.0, 350.0)),
            Some(0)
        );
    }

    #[test]
    fn wheel_zoom_stays_live_while_dragging() {
        assert!(accepts_scroll(true, false));
        assert!(accepts_scroll(false, true));
        assert!(!accepts_scroll(false, false));
    }

    #[test]
    fn empty_point_set_never_hits() {
        assert_eq!(
            hit_test(&[], &Viewport::default(), surface(), pos2(800.0, 350.0)),
            None
        );
    }
}
