use std::path::Path;

use crate::error::LoadError;

/// Reader for hierarchical échelle containers (UVES-style HDF5 products).
///
/// Such files need a dedicated reader that knows the container layout, so it
/// is plugged into [`SpectrumSource`](super::loader::SpectrumSource) from
/// outside rather than built into the loader.
pub trait EchelleReader {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Return `(wavelength, flux)` merged over all orders.
    fn read(&self, path: &Path) -> Result<(Vec<f64>, Vec<f64>), LoadError>;
}
