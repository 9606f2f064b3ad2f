use std::path::Path;

use crate::data::loader::load_file;
use crate::data::model::Spectrum;
use crate::error::LoadError;
use crate::session::{NormalizationSession, SessionConfig, SessionEvent, SessionState};
use crate::ui::scene::Scene;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Who owns a primary-button drag on the spectrum plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Clicks pick continuum points.
    Select,
    /// Drag pans, ctrl-scroll and box drag zoom; clicks pick nothing.
    PanZoom,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Active normalization session (None until a spectrum is loaded).
    pub session: Option<NormalizationSession>,

    /// What the plots draw; written by the session.
    pub scene: Scene,

    pub config: SessionConfig,

    pub navigation: NavigationMode,

    /// Load error shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: None,
            scene: Scene::default(),
            config,
            navigation: NavigationMode::Select,
            status_message: None,
        }
    }

    /// Replace the current session with one on `spectrum`.
    pub fn set_spectrum(&mut self, spectrum: Spectrum, source: &Path) {
        self.scene = Scene::default();
        self.session = Some(NormalizationSession::new(
            spectrum,
            source,
            self.config,
            &mut self.scene,
        ));
        self.status_message = None;
    }

    /// Load `path` and start a session on it.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        let spectrum = load_file(path)?;
        log::info!("Loaded {} samples from {}", spectrum.len(), path.display());
        self.set_spectrum(spectrum, path);
        Ok(())
    }

    pub fn is_navigating(&self) -> bool {
        self.navigation == NavigationMode::PanZoom
    }

    /// Forward an event to the session, if any.
    pub fn dispatch(&mut self, event: SessionEvent) -> Option<SessionState> {
        let session = self.session.as_mut()?;
        Some(session.handle(event, &mut self.scene))
    }
}
