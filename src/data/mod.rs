/// Data layer: spectrum type, file readers, and the `.nspec` writer.
///
/// Architecture:
/// ```text
///  .fits / .hdf5 / text
///        │
///        ▼
///   ┌──────────┐   fits     – image row + CRVAL1/CDELT1 axis, BINTABLE columns
///   │  loader   │   echelle  – pluggable hierarchical container reader
///   └──────────┘   text     – two whitespace-delimited columns
///        │
///        ▼
///   ┌──────────┐
///   │ Spectrum  │  wavelength / flux, non-finite samples dropped
///   └──────────┘
/// ```

pub mod echelle;
pub mod fits;
pub mod loader;
pub mod model;
pub mod text;
