//! FITS access through `fitsio` (cfitsio).
//!
//! Only what a 1-D spectrum needs: the first row of the primary image with a
//! few axis keywords, named columns of the first table extension, and writers
//! for both layouts.

use std::io::Read;
use std::path::Path;

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::images::{ImageDescription, ImageType};
use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;
use thiserror::Error;

const SIGNATURE: &[u8] = b"SIMPLE  =";

#[derive(Debug, Error)]
pub enum FitsError {
    #[error("content is not FITS")]
    NotFits,

    #[error("missing header keyword {0}")]
    MissingKeyword(String),

    #[error("primary HDU holds no image data")]
    NoImage,

    #[error("no BINTABLE extension")]
    NoTable,

    #[error("no column named any of {0:?}")]
    MissingColumn(Vec<String>),

    #[error("column {name} holds {repeat} values per row; only scalar columns are read")]
    VectorColumn { name: String, repeat: usize },

    /// Header sizes that cannot be backed by the bytes on disk.
    #[error("{what} of {count} elements exceeds the {file_len}-byte file")]
    Oversized {
        what: &'static str,
        count: usize,
        file_len: u64,
    },

    #[error(transparent)]
    Fits(#[from] fitsio::errors::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Header value written by [`write_image`].
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

/// An opened FITS file with its size on disk.
pub struct Fits {
    file: FitsFile,
    len: u64,
}

impl Fits {
    /// Open `path` after checking the FITS signature, so other content is
    /// reported as [`FitsError::NotFits`] rather than a cfitsio status.
    pub fn open(path: &Path) -> Result<Self, FitsError> {
        let file = std::fs::File::open(path)?;
        let len = file.metadata()?.len();
        let mut head = Vec::with_capacity(SIGNATURE.len());
        file.take(SIGNATURE.len() as u64).read_to_end(&mut head)?;
        if head != SIGNATURE {
            return Err(FitsError::NotFits);
        }
        Ok(Fits {
            file: FitsFile::open(path)?,
            len,
        })
    }

    /// Reject element counts the file cannot hold; every element takes at
    /// least one byte.
    fn check_fits_on_disk(&self, what: &'static str, count: usize) -> Result<(), FitsError> {
        if count as u64 > self.len {
            return Err(FitsError::Oversized {
                what,
                count,
                file_len: self.len,
            });
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<FitsHdu, FitsError> {
        Ok(self.file.primary_hdu()?)
    }

    /// Optional keyword of `hdu`; a missing key and an unreadable one both
    /// come back as `None`.
    pub fn real_key(&mut self, hdu: &FitsHdu, key: &str) -> Option<f64> {
        hdu.read_key::<f64>(&mut self.file, key).ok()
    }

    pub fn text_key(&mut self, hdu: &FitsHdu, key: &str) -> Option<String> {
        hdu.read_key::<String>(&mut self.file, key).ok()
    }

    /// First `NAXIS1` samples of the primary image; higher axes are reduced
    /// to their first index.
    pub fn read_image_row(&mut self) -> Result<(FitsHdu, Vec<f64>), FitsError> {
        let hdu = self.primary()?;
        let naxis1 = match &hdu.info {
            // cfitsio reports the shape slowest axis first.
            HduInfo::ImageInfo { shape, .. } if !shape.contains(&0) => shape.last().copied(),
            _ => None,
        }
        .ok_or(FitsError::NoImage)?;

        self.check_fits_on_disk("image row", naxis1)?;
        let row: Vec<f64> = hdu.read_section(&mut self.file, 0, naxis1)?;
        Ok((hdu, row))
    }

    /// First table extension and its column names.
    pub fn first_table(&mut self) -> Result<(FitsHdu, Vec<String>), FitsError> {
        let count = self.file.iter().count();
        for i in 1..count {
            let hdu = self.file.hdu(i)?;
            if let HduInfo::TableInfo {
                column_descriptions,
                num_rows,
            } = &hdu.info
            {
                self.check_fits_on_disk("table", *num_rows)?;
                let names = column_descriptions.iter().map(|c| c.name.clone()).collect();
                return Ok((hdu, names));
            }
        }
        Err(FitsError::NoTable)
    }

    pub fn read_column(&mut self, hdu: &FitsHdu, name: &str) -> Result<Vec<f64>, FitsError> {
        if let HduInfo::TableInfo {
            column_descriptions, ..
        } = &hdu.info
        {
            let repeat = column_descriptions
                .iter()
                .find(|c| c.name == name)
                .map_or(1, |c| c.data_type.repeat);
            if repeat > 1 {
                return Err(FitsError::VectorColumn {
                    name: name.to_string(),
                    repeat,
                });
            }
        }
        Ok(hdu.read_col::<f64>(&mut self.file, name)?)
    }
}

/// The first of `candidates` naming one of `columns`, ignoring ASCII case.
/// Returns the column's own spelling.
pub fn find_column<'a>(columns: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|want| {
        columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(want))
            .map(String::as_str)
    })
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn create(path: &Path) -> Result<(), FitsError> {
    // cfitsio refuses to overwrite.
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Write `data` as a double-precision primary image. `dimensions` are given
/// slowest axis first (`[NAXIS2, NAXIS1]`), `keys` are added to the header.
pub fn write_image(
    path: &Path,
    dimensions: &[usize],
    data: &[f64],
    keys: &[(&str, HeaderValue)],
) -> Result<(), FitsError> {
    create(path)?;
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions,
    };
    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .open()?;
    let hdu = fptr.primary_hdu()?;
    hdu.write_image(&mut fptr, data)?;
    for (key, value) in keys {
        match value {
            HeaderValue::Integer(v) => hdu.write_key(&mut fptr, key, *v)?,
            HeaderValue::Real(v) => hdu.write_key(&mut fptr, key, *v)?,
            HeaderValue::Text(v) => hdu.write_key(&mut fptr, key, v.as_str())?,
        }
    }
    Ok(())
}

/// Write `flux` as a 1-D primary image.
pub fn write_image_1d(path: &Path, flux: &[f64], keys: &[(&str, HeaderValue)]) -> Result<(), FitsError> {
    write_image(path, &[flux.len()], flux, keys)
}

/// Write an empty primary HDU followed by a binary table of double columns.
pub fn write_bintable(path: &Path, columns: &[(&str, &[f64])]) -> Result<(), FitsError> {
    create(path)?;
    let descriptions = columns
        .iter()
        .map(|(name, _)| {
            ColumnDescription::new(*name)
                .with_type(ColumnDataType::Double)
                .create()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut fptr = FitsFile::create(path).open()?;
    let hdu = fptr.create_table("SPECTRUM", &descriptions)?;
    for (name, values) in columns {
        hdu.write_col(&mut fptr, *name, values)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_roundtrip_through_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.fits");
        let flux = [1.0, 2.5, f64::NAN, 4.0];
        write_image_1d(&path, &flux, &[("CRVAL1", HeaderValue::Real(5000.0))]).unwrap();

        let mut fits = Fits::open(&path).unwrap();
        let (hdu, row) = fits.read_image_row().unwrap();
        assert_eq!(fits.real_key(&hdu, "CRVAL1"), Some(5000.0));
        assert_eq!(fits.real_key(&hdu, "CDELT1"), None);
        assert_eq!(row.len(), 4);
        assert_eq!(row[1], 2.5);
        assert!(row[2].is_nan());
    }

    #[test]
    fn reads_first_row_of_cube() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.fits");
        // NAXIS3 = 2, NAXIS2 = 3, NAXIS1 = 4
        let data: Vec<f64> = (0..24).map(f64::from).collect();
        write_image(&path, &[2, 3, 4], &data, &[]).unwrap();

        let mut fits = Fits::open(&path).unwrap();
        let (_, row) = fits.read_image_row().unwrap();
        assert_eq!(row, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn bintable_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tab.fits");
        let wave = [1.0, 2.0, 3.0];
        let flux = [0.5, 0.6, 0.7];
        write_bintable(&path, &[("Wave", &wave[..]), ("FLUX_REDUCED", &flux[..])]).unwrap();

        let mut fits = Fits::open(&path).unwrap();
        assert!(matches!(fits.read_image_row(), Err(FitsError::NoImage)));

        let (table, names) = fits.first_table().unwrap();
        assert_eq!(names, vec!["Wave", "FLUX_REDUCED"]);
        assert_eq!(find_column(&names, &["FLUX", "FLUX_REDUCED"]), Some("FLUX_REDUCED"));
        assert_eq!(find_column(&names, &["WAVE"]), Some("Wave"));
        assert_eq!(fits.read_column(&table, "Wave").unwrap(), wave.to_vec());
        assert_eq!(fits.read_column(&table, "FLUX_REDUCED").unwrap(), flux.to_vec());
    }

    #[test]
    fn column_lookup_keeps_candidate_order() {
        let names = vec!["flux_reduced".to_string(), "Flux".to_string()];
        assert_eq!(find_column(&names, &["FLUX", "FLUX_REDUCED"]), Some("Flux"));
        assert_eq!(find_column(&names, &["WAVE"]), None);
    }

    #[test]
    fn rejects_non_fits_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.fits");
        std::fs::write(&path, "4000.0 1.0\n4001.0 1.1\n").unwrap();
        assert!(matches!(Fits::open(&path), Err(FitsError::NotFits)));

        std::fs::write(&path, "short").unwrap();
        assert!(matches!(Fits::open(&path), Err(FitsError::NotFits)));
    }
}
