//! Interactive continuum normalization of one spectrum.
//!
//! ```text
//!             primary click                 middle click (>= 4 distinct x)
//!  Viewing ─────────────────▶ PointSelecting ──────────────────────────▶ Fitted
//!     ▲   ◀── last point removed ──┘   ▲                                   │
//!     │                                └───────── primary click ───────────┘
//!     └──────────────────── 'r' from any state ───────────────────────────
//! ```
//!
//! The session knows nothing about the toolkit: the front-end turns input into
//! [`SessionEvent`]s and the session answers through a [`RenderSurface`].

use std::path::{Path, PathBuf};

pub mod points;
pub mod surface;

pub use points::{ControlPointSet, PointId};
pub use surface::{Notice, NoticeLevel, RenderSurface, ViewLimits};

use crate::data::model::{value_range_within, ControlPoint, Spectrum};
use crate::data::text::write_two_columns;
use crate::error::SaveError;

/// Default half-width, in wavelength units, of the window whose median flux
/// becomes a clicked point's y value.
pub const DEFAULT_WINDOW_HALF_WIDTH: f64 = 0.5;

/// Default marker pick radius in screen pixels.
pub const DEFAULT_PICK_RADIUS_PX: f32 = 8.0;

/// Fraction of the data span added above and below on y autoscale.
const Y_MARGIN: f64 = 0.05;

/// Extension of written normalized spectra.
pub const OUTPUT_EXTENSION: &str = "nspec";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub window_half_width: f64,
    pub pick_radius_px: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            window_half_width: DEFAULT_WINDOW_HALF_WIDTH,
            pick_radius_px: DEFAULT_PICK_RADIUS_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Spectrum shown, nothing picked.
    Viewing,
    /// Control points being edited; any continuum on screen is stale.
    PointSelecting,
    /// Continuum fitted through the current points.
    Fitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Input delivered by the front-end, already in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Left click at wavelength `x`. `navigating` is set while a pan/zoom tool
    /// owns the mouse.
    PrimaryClick { x: f64, navigating: bool },
    /// Right click that landed on the marker of `PointId`.
    SecondaryClickOnMarker(PointId),
    MiddleClick,
    Scroll(ScrollDirection),
    Key(char),
    /// The spectrum panel was moved by something other than the session.
    ViewChanged(ViewLimits),
}

/// Owns one spectrum and everything derived from it for one interactive run.
#[derive(Debug)]
pub struct NormalizationSession {
    source: PathBuf,
    spectrum: Spectrum,
    config: SessionConfig,
    points: ControlPointSet,
    continuum: Option<Vec<f64>>,
    normalized: Option<Vec<f64>>,
    view: ViewLimits,
    state: SessionState,
}

impl NormalizationSession {
    /// Start a session on `spectrum` (read from `source`) and draw it.
    pub fn new(
        spectrum: Spectrum,
        source: impl Into<PathBuf>,
        config: SessionConfig,
        surface: &mut dyn RenderSurface,
    ) -> Self {
        let view = full_view(&spectrum);
        let mut session = NormalizationSession {
            source: source.into(),
            spectrum,
            config,
            points: ControlPointSet::new(),
            continuum: None,
            normalized: None,
            view,
            state: SessionState::Viewing,
        };
        session.redraw_raw(surface);
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn control_points(&self) -> &ControlPointSet {
        &self.points
    }

    pub fn continuum(&self) -> Option<&[f64]> {
        self.continuum.as_deref()
    }

    pub fn normalized(&self) -> Option<&[f64]> {
        self.normalized.as_deref()
    }

    pub fn view(&self) -> ViewLimits {
        self.view
    }

    /// `<source without extension>.nspec`.
    pub fn output_path(&self) -> PathBuf {
        self.source.with_extension(OUTPUT_EXTENSION)
    }

    /// Apply one event and return the resulting state.
    pub fn handle(&mut self, event: SessionEvent, surface: &mut dyn RenderSurface) -> SessionState {
        let before = self.state;
        match event {
            SessionEvent::PrimaryClick { x, navigating } => self.add_point(x, navigating, surface),
            SessionEvent::SecondaryClickOnMarker(id) => self.remove_point(id, surface),
            SessionEvent::MiddleClick => self.fit_continuum(surface),
            SessionEvent::Scroll(direction) => self.scroll(direction, surface),
            SessionEvent::Key('r') => self.reset(surface),
            SessionEvent::Key('w') => self.write(surface),
            SessionEvent::Key(_) => {}
            SessionEvent::ViewChanged(limits) => self.follow_view(limits, surface),
        }
        if self.state != before {
            log::debug!("{event:?}: {before:?} -> {:?}", self.state);
        }
        self.state
    }

    fn add_point(&mut self, x: f64, navigating: bool, surface: &mut dyn RenderSurface) {
        if navigating {
            return;
        }
        if !x.is_finite() || !self.spectrum.covers(x) {
            let msg = format!("Click at {x:.3} is outside the spectrum; point not added");
            log::warn!("{msg}");
            surface.notify(Notice::warning(msg));
            return;
        }

        let half = self.config.window_half_width;
        let Some(y) = crate::fit::window_median(self.spectrum.wavelength(), self.spectrum.flux(), x, half)
        else {
            let msg = format!("No samples within ±{half} of {x:.3}; point not added");
            log::warn!("{msg}");
            surface.notify(Notice::warning(msg));
            return;
        };

        let point = ControlPoint::new(x, y);
        let id = self.points.insert(point);
        surface.draw_marker(id, point);
        self.state = SessionState::PointSelecting;
    }

    fn remove_point(&mut self, id: PointId, surface: &mut dyn RenderSurface) {
        if self.points.remove(id).is_none() {
            return;
        }
        surface.erase_marker(id);
        if !self.points.is_empty() {
            self.state = SessionState::PointSelecting;
            return;
        }
        // A fit without any points behind it cannot be written.
        if self.continuum.take().is_some() {
            self.normalized = None;
            self.redraw_raw(surface);
        }
        self.state = SessionState::Viewing;
    }

    fn fit_continuum(&mut self, surface: &mut dyn RenderSurface) {
        let spline = match crate::fit::fit(&self.points.points()) {
            Ok(spline) => spline,
            Err(err) => {
                log::warn!("continuum fit skipped: {err}");
                surface.notify(Notice::warning(err.to_string()));
                return;
            }
        };

        let wavelength = self.spectrum.wavelength();
        let continuum = spline.evaluate(wavelength);
        let normalized = crate::fit::normalize(self.spectrum.flux(), &continuum);

        surface.erase_continuum();
        surface.draw_continuum(wavelength, &continuum);
        surface.draw_normalized(wavelength, &normalized);
        surface.set_normalized_x_limits(self.view.x);

        self.continuum = Some(continuum);
        self.normalized = Some(normalized);
        self.state = SessionState::Fitted;
    }

    fn scroll(&mut self, direction: ScrollDirection, surface: &mut dyn RenderSurface) {
        let shift = self.view.width() / 2.0;
        let shift = match direction {
            ScrollDirection::Down => shift,
            ScrollDirection::Up => -shift,
        };
        let x = [self.view.x[0] + shift, self.view.x[1] + shift];
        let y = autoscale_y(self.spectrum.wavelength(), self.spectrum.flux(), x).unwrap_or(self.view.y);

        self.view = ViewLimits::new(x, y);
        surface.set_view_limits(self.view);
        surface.set_normalized_x_limits(x);
    }

    fn reset(&mut self, surface: &mut dyn RenderSurface) {
        self.points.clear();
        self.continuum = None;
        self.normalized = None;
        self.view = full_view(&self.spectrum);
        self.redraw_raw(surface);
        self.state = SessionState::Viewing;
    }

    fn write(&mut self, surface: &mut dyn RenderSurface) {
        if self.normalized.is_none() {
            log::debug!("nothing to write yet");
            return;
        }
        match self.save() {
            Ok(path) => {
                log::info!("Saved to file {}", path.display());
                surface.notify(Notice::info(format!("Saved to file {}", path.display())));
            }
            Err(err) => {
                log::error!("{err}");
                surface.notify(Notice::error(err.to_string()));
            }
        }
    }

    /// Write `(wavelength, normalized flux)` to [`output_path`](Self::output_path).
    pub fn save(&self) -> Result<PathBuf, SaveError> {
        let normalized = self.normalized.as_deref().ok_or(SaveError::NothingToSave)?;
        let path = self.output_path();
        write_two_columns(&path, self.spectrum.wavelength(), normalized).map_err(|source| {
            SaveError::Write {
                path: path.clone(),
                source,
            }
        })?;
        Ok(path)
    }

    fn follow_view(&mut self, limits: ViewLimits, surface: &mut dyn RenderSurface) {
        if !limits.same_y(&self.view) {
            log::debug!("y-limits now {:?}", limits.y);
            self.view.y = limits.y;
        }
        if self.view.x != limits.x {
            self.view.x = limits.x;
            surface.set_normalized_x_limits(limits.x);
        }
    }

    fn redraw_raw(&self, surface: &mut dyn RenderSurface) {
        surface.clear();
        surface.draw_spectrum(self.spectrum.wavelength(), self.spectrum.flux());
        surface.set_view_limits(self.view);
        surface.set_normalized_x_limits(self.view.x);
    }
}

/// Whole wavelength range, y autoscaled over it.
fn full_view(spectrum: &Spectrum) -> ViewLimits {
    let x = spectrum.x_range();
    let y = autoscale_y(spectrum.wavelength(), spectrum.flux(), x).unwrap_or([0.0, 1.0]);
    ViewLimits::new(x, y)
}

/// y-range of `values` over `x`, padded by [`Y_MARGIN`] of the span.
pub fn autoscale_y(xs: &[f64], values: &[f64], x: [f64; 2]) -> Option<[f64; 2]> {
    let [min, max] = value_range_within(xs, values, x[0], x[1])?;
    let span = max - min;
    let pad = if span > 0.0 {
        span * Y_MARGIN
    } else {
        (min.abs() * Y_MARGIN).max(0.5)
    };
    Some([min - pad, max + pad])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::scene::Scene;

    fn spectrum() -> Spectrum {
        let wave: Vec<f64> = (0..41).map(|i| 4000.0 + i as f64 * 0.5).collect();
        let flux: Vec<f64> = wave.iter().map(|w| 2.0 + 0.01 * (w - 4000.0)).collect();
        Spectrum::from_samples(wave, flux).unwrap()
    }

    fn session(scene: &mut Scene) -> NormalizationSession {
        NormalizationSession::new(spectrum(), "/tmp/star.fits", SessionConfig::default(), scene)
    }

    fn click(x: f64) -> SessionEvent {
        SessionEvent::PrimaryClick { x, navigating: false }
    }

    #[test]
    fn starts_viewing_with_spectrum_drawn() {
        let mut scene = Scene::default();
        let s = session(&mut scene);
        assert_eq!(s.state(), SessionState::Viewing);
        assert_eq!(scene.spectrum().len(), 41);
        assert_eq!(scene.view_limits().x, [4000.0, 4020.0]);
        assert_eq!(s.output_path(), PathBuf::from("/tmp/star.nspec"));
    }

    #[test]
    fn primary_click_adds_median_point() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);

        assert_eq!(s.handle(click(4005.0), &mut scene), SessionState::PointSelecting);
        let points = s.control_points().points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 4005.0);
        // Window 4004.5..4005.5 holds 4004.5, 4005.0, 4005.5; flux is linear.
        assert!((points[0].y - 2.05).abs() < 1e-12);
        assert_eq!(scene.markers().len(), 1);
    }

    #[test]
    fn clicks_ignored_while_navigating_or_outside_range() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);

        let ev = SessionEvent::PrimaryClick { x: 4005.0, navigating: true };
        assert_eq!(s.handle(ev, &mut scene), SessionState::Viewing);
        assert_eq!(s.handle(click(3990.0), &mut scene), SessionState::Viewing);
        assert!(s.control_points().is_empty());
        assert!(scene.markers().is_empty());
    }

    #[test]
    fn add_then_remove_restores_set_without_refit() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        for x in [4001.0, 4006.0, 4011.0, 4016.0] {
            s.handle(click(x), &mut scene);
        }
        s.handle(SessionEvent::MiddleClick, &mut scene);
        let before_points = s.control_points().points();
        let before_continuum = s.continuum().unwrap().to_vec();

        s.handle(click(4013.0), &mut scene);
        let id = s.control_points().iter().last().unwrap().0;
        s.handle(SessionEvent::SecondaryClickOnMarker(id), &mut scene);

        assert_eq!(s.control_points().points(), before_points);
        assert_eq!(s.continuum().unwrap(), before_continuum.as_slice());
        assert_eq!(s.state(), SessionState::PointSelecting);
        assert_eq!(scene.markers().len(), 4);
    }

    #[test]
    fn removing_last_point_returns_to_viewing() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        s.handle(click(4002.0), &mut scene);
        let id = s.control_points().iter().next().unwrap().0;
        assert_eq!(
            s.handle(SessionEvent::SecondaryClickOnMarker(id), &mut scene),
            SessionState::Viewing
        );
        // A stale id is a no-op.
        assert_eq!(
            s.handle(SessionEvent::SecondaryClickOnMarker(id), &mut scene),
            SessionState::Viewing
        );
    }

    #[test]
    fn removing_every_point_after_fit_drops_the_fit() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("star.txt");
        let mut scene = Scene::default();
        let mut s = NormalizationSession::new(spectrum(), &source, SessionConfig::default(), &mut scene);
        for x in [4001.0, 4006.0, 4011.0, 4016.0] {
            s.handle(click(x), &mut scene);
        }
        assert_eq!(s.handle(SessionEvent::MiddleClick, &mut scene), SessionState::Fitted);

        let ids: Vec<PointId> = s.control_points().iter().map(|(id, _)| id).collect();
        for id in ids {
            s.handle(SessionEvent::SecondaryClickOnMarker(id), &mut scene);
        }
        assert_eq!(s.state(), SessionState::Viewing);
        assert!(s.continuum().is_none());
        assert!(s.normalized().is_none());
        assert!(scene.continuum().is_none());
        assert!(scene.normalized().is_none());
        assert_eq!(scene.spectrum().len(), 41);

        s.handle(SessionEvent::Key('w'), &mut scene);
        assert!(!s.output_path().exists());
    }

    #[test]
    fn middle_click_with_too_few_points_is_a_notice() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        for x in [4001.0, 4006.0, 4011.0] {
            s.handle(click(x), &mut scene);
        }
        assert_eq!(s.handle(SessionEvent::MiddleClick, &mut scene), SessionState::PointSelecting);
        assert!(s.continuum().is_none());
        let notice = scene.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("at least 4"), "{}", notice.message);
    }

    #[test]
    fn fit_normalizes_flux() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        for x in [4002.0, 4006.0, 4010.0, 4014.0, 4018.0] {
            s.handle(click(x), &mut scene);
        }
        assert_eq!(s.handle(SessionEvent::MiddleClick, &mut scene), SessionState::Fitted);

        let flux = s.spectrum().flux();
        let continuum = s.continuum().unwrap();
        let normalized = s.normalized().unwrap();
        assert_eq!(continuum.len(), flux.len());
        for i in 0..flux.len() {
            assert!((normalized[i] - flux[i] / continuum[i]).abs() < 1e-12);
            // Linear spectrum: the continuum through it is the spectrum.
            assert!((normalized[i] - 1.0).abs() < 1e-6, "i = {i}: {}", normalized[i]);
        }
        assert!(scene.continuum().is_some());
        assert!(scene.normalized().is_some());
    }

    #[test]
    fn scroll_shifts_by_half_width_and_autoscales() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);

        s.handle(SessionEvent::Scroll(ScrollDirection::Down), &mut scene);
        assert_eq!(s.view().x, [4010.0, 4030.0]);
        assert_eq!(scene.view_limits().x, [4010.0, 4030.0]);
        assert_eq!(scene.normalized_x(), [4010.0, 4030.0]);
        // Flux over 4010..4020 spans 2.10..2.20.
        let y = s.view().y;
        assert!((y[0] - (2.10 - 0.005)).abs() < 1e-9 && (y[1] - (2.20 + 0.005)).abs() < 1e-9);

        s.handle(SessionEvent::Scroll(ScrollDirection::Up), &mut scene);
        s.handle(SessionEvent::Scroll(ScrollDirection::Up), &mut scene);
        assert_eq!(s.view().x, [3990.0, 4010.0]);
    }

    #[test]
    fn external_view_change_is_mirrored() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        let limits = ViewLimits::new([4003.0, 4007.0], [1.0, 3.0]);
        s.handle(SessionEvent::ViewChanged(limits), &mut scene);
        assert_eq!(s.view(), limits);
        assert_eq!(scene.normalized_x(), [4003.0, 4007.0]);
    }

    #[test]
    fn y_only_view_change_is_recorded() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        let x = s.view().x;
        let limits = ViewLimits::new(x, [0.5, 4.5]);
        s.handle(SessionEvent::ViewChanged(limits), &mut scene);
        assert_eq!(s.view().y, [0.5, 4.5]);
        assert_eq!(s.view().x, x);
        assert_eq!(scene.normalized_x(), x);

        // The next scroll starts from the recorded view.
        s.handle(SessionEvent::Scroll(ScrollDirection::Down), &mut scene);
        assert_eq!(s.view().x, [x[0] + 10.0, x[1] + 10.0]);
    }

    #[test]
    fn reset_clears_and_makes_write_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("star.txt");
        let mut scene = Scene::default();
        let mut s = NormalizationSession::new(spectrum(), &source, SessionConfig::default(), &mut scene);
        for x in [4000.0, 4005.0, 4010.0, 4015.0] {
            s.handle(click(x), &mut scene);
        }
        s.handle(SessionEvent::MiddleClick, &mut scene);
        s.handle(SessionEvent::Scroll(ScrollDirection::Down), &mut scene);

        assert_eq!(s.handle(SessionEvent::Key('r'), &mut scene), SessionState::Viewing);
        assert!(s.control_points().is_empty());
        assert!(s.continuum().is_none());
        assert!(s.normalized().is_none());
        assert!(scene.markers().is_empty());
        assert!(scene.continuum().is_none());
        assert_eq!(s.view().x, [4000.0, 4020.0]);

        s.handle(SessionEvent::Key('w'), &mut scene);
        assert!(!s.output_path().exists());
        assert!(matches!(s.save(), Err(SaveError::NothingToSave)));
    }

    #[test]
    fn write_saves_normalized_spectrum() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("star.fits");
        let mut scene = Scene::default();
        let mut s = NormalizationSession::new(spectrum(), &source, SessionConfig::default(), &mut scene);
        for x in [4000.0, 4005.0, 4010.0, 4015.0] {
            s.handle(click(x), &mut scene);
        }
        s.handle(SessionEvent::MiddleClick, &mut scene);
        assert_eq!(s.handle(SessionEvent::Key('w'), &mut scene), SessionState::Fitted);

        let written = dir.path().join("star.nspec");
        let (w, f) = crate::data::text::parse_two_columns(&std::fs::read(&written).unwrap()).unwrap();
        assert_eq!(w.len(), 41);
        for (a, b) in f.iter().zip(s.normalized().unwrap()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert_eq!(scene.notice().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut scene = Scene::default();
        let mut s = session(&mut scene);
        s.handle(click(4002.0), &mut scene);
        assert_eq!(s.handle(SessionEvent::Key('x'), &mut scene), SessionState::PointSelecting);
        assert_eq!(s.control_points().len(), 1);
    }

    #[test]
    fn wider_window_is_configurable() {
        let mut scene = Scene::default();
        let config = SessionConfig {
            window_half_width: 5.0,
            ..SessionConfig::default()
        };
        let mut s = NormalizationSession::new(spectrum(), "a.txt", config, &mut scene);
        s.handle(click(4000.2), &mut scene);
        // 4000.0..4005.0 -> 11 samples, median at 4002.5.
        let y = s.control_points().points()[0].y;
        assert!((y - 2.025).abs() < 1e-12);
    }
}
