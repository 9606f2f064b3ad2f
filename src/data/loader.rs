use std::path::Path;

use super::echelle::EchelleReader;
use super::fits::{find_column, Fits, FitsError};
use super::model::Spectrum;
use super::text::{parse_two_columns, TextError};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Format probes
// ---------------------------------------------------------------------------

/// One way of interpreting a file. Probes for a path are tried in order and
/// the first success wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Primary image with a CRVAL1/CDELT1 wavelength axis.
    FitsImage,
    /// BINTABLE extension with named wavelength / flux columns.
    FitsTable,
    /// Hierarchical échelle container through an [`EchelleReader`].
    Echelle,
    /// Whitespace-delimited two-column text.
    Text,
}

impl Probe {
    pub fn label(self) -> &'static str {
        match self {
            Probe::FitsImage => "standard 1D fits",
            Probe::FitsTable => "fits binary table",
            Probe::Echelle => "uves hdf5",
            Probe::Text => "ascii spectrum",
        }
    }
}

const FITS_PROBES: &[Probe] = &[Probe::FitsImage, Probe::FitsTable];
const ECHELLE_PROBES: &[Probe] = &[Probe::Echelle];
const TEXT_PROBES: &[Probe] = &[Probe::Text];

const WAVE_COLUMNS: &[&str] = &["WAVE", "WAVELENGTH"];
const FLUX_COLUMNS: &[&str] = &["FLUX", "FLUX_REDUCED"];

/// Probes to try for `path`, chosen by extension.
///
/// * `.fits` / `.fit` / `.fts` – image first, then binary table
/// * `.hdf5` / `.h5`           – échelle reader
/// * anything else             – two-column text
pub fn probes_for(path: &Path) -> &'static [Probe] {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "fits" | "fit" | "fts" => FITS_PROBES,
        "hdf5" | "h5" => ECHELLE_PROBES,
        _ => TEXT_PROBES,
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Loads spectra from disk.
#[derive(Default)]
pub struct SpectrumSource {
    echelle: Option<Box<dyn EchelleReader>>,
}

impl SpectrumSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reader used for `.hdf5` échelle products.
    pub fn with_echelle_reader(mut self, reader: Box<dyn EchelleReader>) -> Self {
        self.echelle = Some(reader);
        self
    }

    /// Load `path` as a spectrum, dropping samples with non-finite wavelength or flux.
    pub fn load(&self, path: &Path) -> Result<Spectrum, LoadError> {
        let probes = probes_for(path);
        let mut failures: Vec<(Probe, LoadError)> = Vec::new();

        for &probe in probes {
            match self.run_probe(probe, path) {
                Ok((wave, flux)) => {
                    log::info!("{}: {}", path.display(), probe.label());
                    return Spectrum::from_samples(wave, flux)
                        .map_err(|e| LoadError::malformed(path, e.to_string()));
                }
                Err(LoadError::Io { path, source }) => {
                    return Err(LoadError::Io { path, source });
                }
                Err(err) => {
                    log::debug!("{}: {} failed: {err}", path.display(), probe.label());
                    failures.push((probe, err));
                }
            }
        }

        Err(combine_failures(path, failures))
    }

    fn run_probe(&self, probe: Probe, path: &Path) -> Result<(Vec<f64>, Vec<f64>), LoadError> {
        match probe {
            Probe::FitsImage => read_fits_image(path).map_err(|e| fits_error(path, e)),
            Probe::FitsTable => read_fits_table(path).map_err(|e| fits_error(path, e)),
            Probe::Echelle => match &self.echelle {
                Some(reader) => {
                    log::debug!("{}: delegating to {}", path.display(), reader.name());
                    reader.read(path)
                }
                None => Err(LoadError::unsupported(
                    path,
                    "no échelle (HDF5) reader is available",
                )),
            },
            Probe::Text => {
                let bytes = read_bytes(path)?;
                parse_two_columns(&bytes).map_err(|e| text_error(path, e))
            }
        }
    }
}

/// Load `path` with the default set of readers.
pub fn load_file(path: &Path) -> Result<Spectrum, LoadError> {
    SpectrumSource::default().load(path)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn fits_error(path: &Path, err: FitsError) -> LoadError {
    match err {
        FitsError::NotFits => LoadError::unsupported(path, err.to_string()),
        FitsError::Io(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => LoadError::malformed(path, other.to_string()),
    }
}

fn text_error(path: &Path, err: TextError) -> LoadError {
    match err {
        TextError::NotText => LoadError::unsupported(path, err.to_string()),
        other => LoadError::malformed(path, other.to_string()),
    }
}

/// Surface the failure of the last probe; if any probe recognised the
/// encoding, report malformed data with every probe's reason.
fn combine_failures(path: &Path, failures: Vec<(Probe, LoadError)>) -> LoadError {
    let recognised = failures.iter().any(|(_, e)| e.is_recognised());
    if recognised && failures.len() > 1 {
        let reasons: Vec<String> = failures
            .iter()
            .map(|(probe, err)| format!("{}: {}", probe.label(), reason_of(err)))
            .collect();
        return LoadError::malformed(path, reasons.join("; "));
    }
    match failures.into_iter().last() {
        Some((_, err)) => err,
        None => LoadError::unsupported(path, "no reader for this file"),
    }
}

fn reason_of(err: &LoadError) -> String {
    match err {
        LoadError::UnsupportedFormat { reason, .. } | LoadError::MalformedData { reason, .. } => {
            reason.clone()
        }
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// FITS readers
// ---------------------------------------------------------------------------

/// Image spectrum: flux from the first image row, wavelength rebuilt as
/// `CRVAL1 + i * CDELT1` (`CD1_1` when `CDELT1` is absent), exponentiated
/// when `CTYP1`/`CTYPE1` names a log axis.
fn read_fits_image(path: &Path) -> Result<(Vec<f64>, Vec<f64>), FitsError> {
    let mut fits = Fits::open(path)?;
    let (hdu, flux) = fits.read_image_row()?;

    let step = fits
        .real_key(&hdu, "CDELT1")
        .or_else(|| fits.real_key(&hdu, "CD1_1"))
        .ok_or_else(|| FitsError::MissingKeyword("CDELT1 or CD1_1".to_string()))?;
    let start = fits
        .real_key(&hdu, "CRVAL1")
        .ok_or_else(|| FitsError::MissingKeyword("CRVAL1".to_string()))?;

    let mut wave: Vec<f64> = (0..flux.len()).map(|i| start + i as f64 * step).collect();

    let log_axis = ["CTYP1", "CTYPE1"]
        .iter()
        .any(|key| fits.text_key(&hdu, key).is_some_and(|t| t.contains("log")));
    if log_axis {
        for w in &mut wave {
            *w = w.exp();
        }
    }

    Ok((wave, flux))
}

/// Table spectrum from the first table extension: `WAVE` (else `wavelength`)
/// and `FLUX` (else `FLUX_REDUCED`), names compared without case.
fn read_fits_table(path: &Path) -> Result<(Vec<f64>, Vec<f64>), FitsError> {
    let mut fits = Fits::open(path)?;
    let (table, columns) = fits.first_table()?;
    let missing = |names: &[&str]| FitsError::MissingColumn(names.iter().map(|s| s.to_string()).collect());

    let wave_col = find_column(&columns, WAVE_COLUMNS).ok_or_else(|| missing(WAVE_COLUMNS))?;
    let flux_col = find_column(&columns, FLUX_COLUMNS).ok_or_else(|| missing(FLUX_COLUMNS))?;

    let wave = fits.read_column(&table, wave_col)?;
    let flux = fits.read_column(&table, flux_col)?;
    Ok((wave, flux))
}
