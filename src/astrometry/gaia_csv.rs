//! Parsing of Gaia archive CSV exports into [`AstrometricRecord`]s.
//!
//! The reader expects a header row and looks up the columns
//! `ra, dec, parallax, pmra, pmdec, radial_velocity` by name, in any order; other columns
//! (`source_id`, photometry, ...) are ignored. Empty or unparsable fields are treated as
//! missing: a missing `radial_velocity` stays `None`, any other missing field becomes `NaN`
//! so that the record is rejected by the
//! [`CoordinateTransformer`](crate::astrometry::CoordinateTransformer) with its index.

use std::{fs::File, io::Read};

use camino::Utf8Path;
use serde::Deserialize;
use tracing::info;

use crate::{astrometry::AstrometricRecord, galorbit_errors::GalorbitError};

#[derive(Debug, Deserialize)]
struct GaiaRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ra: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    dec: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    parallax: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pmra: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pmdec: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    radial_velocity: Option<f64>,
}

impl From<GaiaRow> for AstrometricRecord {
    fn from(row: GaiaRow) -> Self {
        AstrometricRecord::new(
            row.ra.unwrap_or(f64::NAN),
            row.dec.unwrap_or(f64::NAN),
            row.parallax.unwrap_or(f64::NAN),
            row.pmra.unwrap_or(f64::NAN),
            row.pmdec.unwrap_or(f64::NAN),
            row.radial_velocity,
        )
    }
}

/// Read astrometric records from any CSV source with a header row.
///
/// Errors
/// ----------
/// * [`GalorbitError::CsvError`] on malformed CSV (unbalanced quotes, ragged rows, I/O failure).
pub fn read_gaia_csv<R: Read>(reader: R) -> Result<Vec<AstrometricRecord>, GalorbitError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    rdr.deserialize::<GaiaRow>()
        .map(|row| row.map(AstrometricRecord::from).map_err(GalorbitError::from))
        .collect()
}

/// Read astrometric records from a CSV file on disk.
pub fn read_gaia_csv_path(path: &Utf8Path) -> Result<Vec<AstrometricRecord>, GalorbitError> {
    let records = read_gaia_csv(File::open(path)?)?;
    info!("Read {} astrometric records from {}", records.len(), path);
    Ok(records)
}
