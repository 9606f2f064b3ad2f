use thiserror::Error;

// ---------------------------------------------------------------------------
// Spectrum – wavelength / flux pairs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    #[error("wavelength has {wavelength} values but flux has {flux}")]
    LengthMismatch { wavelength: usize, flux: usize },

    #[error("no samples with finite wavelength and flux")]
    Empty,
}

/// A 1-D spectrum. Immutable once built; every wavelength and flux value is
/// finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelength: Vec<f64>,
    flux: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from raw samples, dropping every sample whose
    /// wavelength or flux is NaN or infinite. Wavelength and flux stay
    /// index-aligned.
    pub fn from_samples(wavelength: Vec<f64>, flux: Vec<f64>) -> Result<Self, SpectrumError> {
        if wavelength.len() != flux.len() {
            return Err(SpectrumError::LengthMismatch {
                wavelength: wavelength.len(),
                flux: flux.len(),
            });
        }

        let (wavelength, flux): (Vec<f64>, Vec<f64>) = wavelength
            .into_iter()
            .zip(flux)
            .filter(|(w, f)| w.is_finite() && f.is_finite())
            .unzip();

        if flux.is_empty() {
            return Err(SpectrumError::Empty);
        }

        Ok(Spectrum { wavelength, flux })
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// `[min, max]` of the wavelength axis.
    pub fn x_range(&self) -> [f64; 2] {
        let min = self.wavelength.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.wavelength.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        [min, max]
    }

    /// Whether `x` lies inside the wavelength coverage (inclusive).
    pub fn covers(&self, x: f64) -> bool {
        let [min, max] = self.x_range();
        x >= min && x <= max
    }
}

// ---------------------------------------------------------------------------
// ControlPoint – a user pick on the continuum
// ---------------------------------------------------------------------------

/// A `(wavelength, flux)` sample believed to lie on the continuum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ControlPoint { x, y }
    }
}

/// `[min, max]` of `values` over the samples whose `xs` fall in `[x0, x1]`.
/// Non-finite values are skipped. `None` when no sample qualifies.
pub fn value_range_within(xs: &[f64], values: &[f64], x0: f64, x1: f64) -> Option<[f64; 2]> {
    let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (&x, &v) in xs.iter().zip(values) {
        if x >= lo && x <= hi && v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some([min, max])
    } else {
        None
    }
}
