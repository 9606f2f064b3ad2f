use std::collections::BTreeMap;

use crate::data::model::ControlPoint;
use crate::session::{autoscale_y, Notice, PointId, RenderSurface, ScrollDirection, ViewLimits};

/// Wheel travel, in points, of one scroll notch.
pub const SCROLL_NOTCH: f32 = 50.0;

// ---------------------------------------------------------------------------
// Scene – what the plots show, independent of egui
// ---------------------------------------------------------------------------

/// Retained display state written by the session and read by the plot
/// widgets every frame.
#[derive(Debug, Clone)]
pub struct Scene {
    spectrum: Vec<[f64; 2]>,
    markers: BTreeMap<PointId, ControlPoint>,
    continuum: Option<Vec<[f64; 2]>>,
    normalized: Option<Vec<[f64; 2]>>,
    view: ViewLimits,
    /// Set when the session moved the view and the widget has not applied it yet.
    pending_view: bool,
    normalized_x: [f64; 2],
    notice: Option<Notice>,
    /// Wheel travel not yet turned into a scroll step.
    scroll_travel: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            spectrum: Vec::new(),
            markers: BTreeMap::new(),
            continuum: None,
            normalized: None,
            view: ViewLimits::new([0.0, 1.0], [0.0, 1.0]),
            pending_view: false,
            normalized_x: [0.0, 1.0],
            notice: None,
            scroll_travel: 0.0,
        }
    }
}

fn zip_points(xs: &[f64], ys: &[f64]) -> Vec<[f64; 2]> {
    xs.iter().zip(ys).map(|(&x, &y)| [x, y]).collect()
}

impl Scene {
    pub fn spectrum(&self) -> &[[f64; 2]] {
        &self.spectrum
    }

    pub fn markers(&self) -> &BTreeMap<PointId, ControlPoint> {
        &self.markers
    }

    pub fn continuum(&self) -> Option<&[[f64; 2]]> {
        self.continuum.as_deref()
    }

    pub fn normalized(&self) -> Option<&[[f64; 2]]> {
        self.normalized.as_deref()
    }

    pub fn normalized_x(&self) -> [f64; 2] {
        self.normalized_x
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// View the widget must apply this frame, if the session moved it.
    pub fn take_pending_view(&mut self) -> Option<ViewLimits> {
        if std::mem::take(&mut self.pending_view) {
            Some(self.view)
        } else {
            None
        }
    }

    /// Record limits the user reached with the widget's own pan/zoom.
    /// Returns `true` when they differ from the last known view.
    pub fn observe_view(&mut self, limits: ViewLimits) -> bool {
        if limits.approx_eq(&self.view) {
            return false;
        }
        self.view = limits;
        true
    }

    /// Limits for the normalized panel: shared x, y autoscaled over it.
    pub fn normalized_view(&self) -> Option<ViewLimits> {
        let points = self.normalized.as_ref()?;
        let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
        let y = autoscale_y(&xs, &ys, self.normalized_x).unwrap_or([0.0, 2.0]);
        Some(ViewLimits::new(self.normalized_x, y))
    }
}

impl Scene {
    /// Add one frame of wheel travel. Yields a step once a full notch has
    /// built up in one direction; smooth scrolling spreads a notch over
    /// several frames.
    pub fn accumulate_scroll(&mut self, dy: f32) -> Option<ScrollDirection> {
        if dy == 0.0 {
            return None;
        }
        if dy.signum() != self.scroll_travel.signum() {
            self.scroll_travel = 0.0;
        }
        self.scroll_travel += dy;
        if self.scroll_travel.abs() < SCROLL_NOTCH {
            return None;
        }
        let direction = if self.scroll_travel > 0.0 {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        };
        // One step per call; extra travel from a fast flick is dropped.
        self.scroll_travel = 0.0;
        Some(direction)
    }
}

impl RenderSurface for Scene {
    fn clear(&mut self) {
        self.spectrum.clear();
        self.markers.clear();
        self.continuum = None;
        self.normalized = None;
    }

    fn draw_spectrum(&mut self, wavelength: &[f64], flux: &[f64]) {
        self.spectrum = zip_points(wavelength, flux);
    }

    fn draw_marker(&mut self, id: PointId, point: ControlPoint) {
        self.markers.insert(id, point);
    }

    fn erase_marker(&mut self, id: PointId) {
        self.markers.remove(&id);
    }

    fn draw_continuum(&mut self, wavelength: &[f64], continuum: &[f64]) {
        self.continuum = Some(zip_points(wavelength, continuum));
    }

    fn erase_continuum(&mut self) {
        self.continuum = None;
    }

    fn draw_normalized(&mut self, wavelength: &[f64], normalized: &[f64]) {
        self.normalized = Some(zip_points(wavelength, normalized));
    }

    fn view_limits(&self) -> ViewLimits {
        self.view
    }

    fn set_view_limits(&mut self, limits: ViewLimits) {
        self.view = limits;
        self.pending_view = true;
    }

    fn set_normalized_x_limits(&mut self, x: [f64; 2]) {
        self.normalized_x = x;
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_view_is_taken_once() {
        let mut scene = Scene::default();
        let limits = ViewLimits::new([1.0, 2.0], [3.0, 4.0]);
        scene.set_view_limits(limits);
        assert_eq!(scene.take_pending_view(), Some(limits));
        assert_eq!(scene.take_pending_view(), None);
        assert_eq!(scene.view_limits(), limits);
    }

    #[test]
    fn observe_view_reports_only_changes() {
        let mut scene = Scene::default();
        let limits = ViewLimits::new([1.0, 2.0], [3.0, 4.0]);
        scene.set_view_limits(limits);
        assert!(!scene.observe_view(limits));
        let moved = ViewLimits::new([1.5, 2.5], [3.0, 4.0]);
        assert!(scene.observe_view(moved));
        assert_eq!(scene.view_limits(), moved);
    }

    #[test]
    fn normalized_view_follows_shared_x() {
        let mut scene = Scene::default();
        assert!(scene.normalized_view().is_none());
        scene.draw_normalized(&[1.0, 2.0, 3.0, 4.0], &[0.9, 1.1, 5.0, f64::NAN]);
        scene.set_normalized_x_limits([1.0, 2.0]);
        let v = scene.normalized_view().unwrap();
        assert_eq!(v.x, [1.0, 2.0]);
        assert!((v.y[0] - 0.89).abs() < 1e-12 && (v.y[1] - 1.11).abs() < 1e-12);
    }

    #[test]
    fn wheel_travel_becomes_one_step_per_notch() {
        let mut scene = Scene::default();
        // A notch delivered over four frames.
        let steps: Vec<_> = [-12.5f32; 4]
            .iter()
            .filter_map(|&dy| scene.accumulate_scroll(dy))
            .collect();
        assert_eq!(steps, vec![ScrollDirection::Down]);

        assert_eq!(scene.accumulate_scroll(0.0), None);
        assert_eq!(scene.accumulate_scroll(-30.0), None);
        // Reversing discards the partial travel.
        assert_eq!(scene.accumulate_scroll(30.0), None);
        assert_eq!(scene.accumulate_scroll(30.0), Some(ScrollDirection::Up));
        // A flick worth several notches is still one step.
        assert_eq!(scene.accumulate_scroll(400.0), Some(ScrollDirection::Up));
        assert_eq!(scene.accumulate_scroll(1.0), None);
    }

    #[test]
    fn clear_erases_everything_drawn() {
        let mut scene = Scene::default();
        scene.draw_spectrum(&[1.0], &[1.0]);
        scene.draw_continuum(&[1.0], &[1.0]);
        scene.clear();
        assert!(scene.spectrum().is_empty());
        assert!(scene.continuum().is_none());
    }
}
