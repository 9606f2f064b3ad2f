use super::points::PointId;
use crate::data::model::ControlPoint;

/// Visible data window of a plot panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLimits {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl ViewLimits {
    pub fn new(x: [f64; 2], y: [f64; 2]) -> Self {
        ViewLimits { x, y }
    }

    pub fn width(&self) -> f64 {
        self.x[1] - self.x[0]
    }

    /// Equal up to a tiny fraction of each span.
    pub fn approx_eq(&self, other: &ViewLimits) -> bool {
        fn close(a: [f64; 2], b: [f64; 2]) -> bool {
            let tol = 1e-9 * (a[1] - a[0]).abs().max(b[1] - b[0]).max(f64::MIN_POSITIVE);
            (a[0] - b[0]).abs() <= tol && (a[1] - b[1]).abs() <= tol
        }
        close(self.x, other.x) && close(self.y, other.y)
    }

    pub fn same_y(&self, other: &ViewLimits) -> bool {
        ViewLimits::new(other.x, self.y).approx_eq(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// What a [`NormalizationSession`](super::NormalizationSession) can do to the display.
///
/// The spectrum panel holds the raw spectrum, the control-point markers and
/// the continuum; the normalized panel holds the normalized flux and follows
/// the x-range of the spectrum panel.
pub trait RenderSurface {
    /// Erase everything from both panels.
    fn clear(&mut self);

    fn draw_spectrum(&mut self, wavelength: &[f64], flux: &[f64]);

    fn draw_marker(&mut self, id: PointId, point: ControlPoint);

    fn erase_marker(&mut self, id: PointId);

    fn draw_continuum(&mut self, wavelength: &[f64], continuum: &[f64]);

    fn erase_continuum(&mut self);

    fn draw_normalized(&mut self, wavelength: &[f64], normalized: &[f64]);

    /// Current limits of the spectrum panel.
    fn view_limits(&self) -> ViewLimits;

    /// Programmatically move the spectrum panel.
    fn set_view_limits(&mut self, limits: ViewLimits);

    /// Move the normalized panel to `x`.
    fn set_normalized_x_limits(&mut self, x: [f64; 2]);

    fn notify(&mut self, notice: Notice);
}
