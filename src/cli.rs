//! Command-line parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::session::{SessionConfig, DEFAULT_PICK_RADIUS_PX, DEFAULT_WINDOW_HALF_WIDTH};

#[derive(Debug, Parser)]
#[command(name = "rusty-norm", version, about = "Interactive continuum normalization of 1-D spectra")]
pub struct Cli {
    /// Spectrum to normalize (FITS image, FITS table, HDF5 or two-column text).
    /// A file dialog opens when omitted.
    pub spectrum: Option<PathBuf>,

    /// Half-width, in wavelength units, of the median window around a click.
    #[arg(long = "window", default_value_t = DEFAULT_WINDOW_HALF_WIDTH, value_parser = positive_f64)]
    pub window: f64,

    /// Radius in pixels within which a right click removes a marker.
    #[arg(long = "pick-radius", default_value_t = DEFAULT_PICK_RADIUS_PX, value_parser = positive_f32)]
    pub pick_radius: f32,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            window_half_width: self.window,
            pick_radius_px: self.pick_radius,
        }
    }
}

fn positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("must be a positive number, got {s}"))
    }
}

fn positive_f32(s: &str) -> Result<f32, String> {
    let v = positive_f64(s)?;
    Ok(v as f32)
}
