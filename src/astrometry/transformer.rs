//! # Astrometry → Galactocentric Cartesian transformer
//!
//! [`CoordinateTransformer`] converts batches of [`AstrometricRecord`]s into
//! [`CartesianState`]s in the Galactocentric frame.
//!
//! ## Pipeline (per record)
//!
//! 1. **Unit conversion** of every field to deg / mas / mas/yr / km/s, using the factors
//!    resolved once at setup from [`AstrometricUnits`].
//! 2. **Validation**: non-finite sky positions or proper motions and non-positive or
//!    non-finite parallaxes reject the record (see [`RejectionReason`]).
//! 3. **Distance** `d[kpc] = 1 / ϖ[mas]`.
//! 4. **Missing radial velocity** defaults to 0 km/s. This biases the velocity along the
//!    line of sight; the record is flagged with `radial_velocity_defaulted` rather than
//!    corrected.
//! 5. **Spherical → Cartesian** in the heliocentric ICRS frame.
//! 6. **Frame change** ICRS → Galactic → Galactocentric through [`FrameTransform`].
//!
//! ## Batches
//!
//! Records are independent, so [`CoordinateTransformer::transform_batch`] maps them in
//! parallel when the `parallel` feature is enabled. Rejected records never abort the batch:
//! they are collected in [`TransformedBatch::rejected`] with their input index, and the
//! surviving records keep their relative input order.

use nalgebra::Vector3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    astrometry::{AstrometricRecord, AxisColumns, CartesianState},
    constants::{Degree, Kpc, RADEG},
    conversion::{radec_to_galactic, spherical_to_cartesian},
    galorbit_errors::GalorbitError,
    ref_system::{cartesian_to_radec, FrameTransform, GalacticPole, GalactocentricFrame},
    units::{parallax_to_distance_kpc, AstrometricUnits, UnitScales},
};

/// Why a record was left out of a transformed batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RejectionReason {
    /// Parallax ≤ 0 (non-physical, or a missing-value sentinel).
    NonPositiveParallax(f64),
    /// Parallax is NaN or infinite.
    NonFiniteParallax,
    /// Parallax so small that `1/ϖ` overflows.
    NonFiniteDistance,
    /// Another required field is NaN or infinite.
    NonFiniteField(&'static str),
}

/// A record dropped from a batch, identified by its position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: RejectionReason,
}

/// A successfully transformed record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformedRecord {
    /// Position of the source record in the input batch.
    pub index: usize,
    pub state: CartesianState,
    /// The radial velocity was missing and set to 0 km/s.
    pub radial_velocity_defaulted: bool,
}

/// Result of [`CoordinateTransformer::transform_batch`]: the surviving records in input
/// order, plus the rejected ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformedBatch {
    pub records: Vec<TransformedRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl TransformedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dropped_count(&self) -> usize {
        self.rejected.len()
    }

    /// Number of records whose radial velocity was defaulted to zero.
    pub fn defaulted_radial_velocity_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.radial_velocity_defaulted)
            .count()
    }

    pub fn states(&self) -> impl Iterator<Item = &CartesianState> + '_ {
        self.records.iter().map(|r| &r.state)
    }

    pub fn into_states(self) -> Vec<CartesianState> {
        self.records.into_iter().map(|r| r.state).collect()
    }

    /// Largest Galactocentric radius in the batch (kpc), `None` if the batch is empty.
    pub fn max_radius(&self) -> Option<Kpc> {
        self.states().map(CartesianState::radius).reduce(f64::max)
    }

    /// Positions split by axis, for plotting and viewer tooling.
    pub fn axis_columns(&self) -> AxisColumns {
        self.states().map(|s| &s.position).collect()
    }
}

/// Stateless converter from astrometric records to Galactocentric state vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransformer {
    frame: FrameTransform,
    scales: UnitScales,
}

impl CoordinateTransformer {
    /// Validate the frame and unit configuration and precompute the frame matrices.
    ///
    /// Errors
    /// ----------
    /// * [`GalorbitError::UnitMismatch`] if a declared unit has the wrong dimension.
    /// * [`GalorbitError::InvalidFrameParameter`] if a frame constant is non-physical.
    pub fn new(
        pole: &GalacticPole,
        frame: &GalactocentricFrame,
        units: &AstrometricUnits,
    ) -> Result<Self, GalorbitError> {
        let scales = units.resolve()?;
        let frame = FrameTransform::new(pole, frame)?;
        Ok(CoordinateTransformer { frame, scales })
    }

    /// Transformer with the default Galactic pole, Galactocentric frame, and Gaia units.
    pub fn with_defaults() -> Result<Self, GalorbitError> {
        CoordinateTransformer::new(
            &GalacticPole::default(),
            &GalactocentricFrame::default(),
            &AstrometricUnits::default(),
        )
    }

    pub fn frame(&self) -> &FrameTransform {
        &self.frame
    }

    pub fn unit_scales(&self) -> &UnitScales {
        &self.scales
    }

    /// Transform a single record.
    ///
    /// Return
    /// ----------
    /// * `Ok((state, radial_velocity_defaulted))`, or the [`RejectionReason`] when the
    ///   record cannot be converted.
    pub fn transform_record(
        &self,
        record: &AstrometricRecord,
    ) -> Result<(CartesianState, bool), RejectionReason> {
        let s = &self.scales;
        let ra = record.ra * s.sky_angle_to_deg;
        let dec = record.dec * s.sky_angle_to_deg;
        let pmra = record.pmra * s.proper_motion_to_masyr;
        let pmdec = record.pmdec * s.proper_motion_to_masyr;

        for (name, value) in [("ra", ra), ("dec", dec), ("pmra", pmra), ("pmdec", pmdec)] {
            if !value.is_finite() {
                return Err(RejectionReason::NonFiniteField(name));
            }
        }

        let parallax = record.parallax * s.parallax_to_mas;
        if parallax.is_nan() || parallax.is_infinite() {
            return Err(RejectionReason::NonFiniteParallax);
        }
        if parallax <= 0.0 {
            return Err(RejectionReason::NonPositiveParallax(record.parallax));
        }
        let distance = parallax_to_distance_kpc(parallax);
        if !distance.is_finite() {
            return Err(RejectionReason::NonFiniteDistance);
        }

        // a NaN radial velocity is a missing value, like an absent one
        let (radial_velocity, defaulted) = match record.radial_velocity {
            Some(rv) if rv.is_finite() => (rv * s.radial_velocity_to_kms, false),
            _ => (0.0, true),
        };

        let (pos_icrs, vel_icrs) =
            spherical_to_cartesian(ra, dec, distance, pmra, pmdec, radial_velocity);
        let (position, velocity) = self.frame.icrs_to_galactocentric(&pos_icrs, &vel_icrs);

        Ok((CartesianState::new(position, velocity), defaulted))
    }

    /// Transform a batch of records, keeping the input order of the surviving records.
    ///
    /// Invalid records are reported in [`TransformedBatch::rejected`]; the number of
    /// surviving records is `records.len() - dropped_count()`.
    pub fn transform_batch(&self, records: &[AstrometricRecord]) -> TransformedBatch {
        #[cfg(feature = "parallel")]
        let results: Vec<_> = records
            .par_iter()
            .map(|record| self.transform_record(record))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = records
            .iter()
            .map(|record| self.transform_record(record))
            .collect();

        let mut batch = TransformedBatch::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok((state, radial_velocity_defaulted)) => batch.records.push(TransformedRecord {
                    index,
                    state,
                    radial_velocity_defaulted,
                }),
                Err(reason) => batch.rejected.push(RejectedRecord { index, reason }),
            }
        }

        if batch.dropped_count() > 0 {
            warn!(
                "Dropped {} of {} astrometric records (invalid parallax or non-finite fields)",
                batch.dropped_count(),
                records.len()
            );
        }
        debug!(
            "Transformed {} records, {} with radial velocity defaulted to 0 km/s",
            batch.len(),
            batch.defaulted_radial_velocity_count()
        );
        batch
    }

    /// Heliocentric sky position of a Galactocentric position.
    ///
    /// Return
    /// ----------
    /// * `(ra, dec, distance)` in degrees, degrees and kpc.
    pub fn to_sky(&self, state: &CartesianState) -> (Degree, Degree, Kpc) {
        let (pos_icrs, _) = self
            .frame
            .galactocentric_to_icrs(&state.position, &Vector3::zeros());
        let (ra, dec, distance) = cartesian_to_radec(&pos_icrs);
        (ra / RADEG, dec / RADEG, distance)
    }

    /// Galactic longitude and latitude (degrees) of a record.
    pub fn galactic_coordinates(&self, record: &AstrometricRecord) -> (Degree, Degree) {
        radec_to_galactic(
            record.ra * self.scales.sky_angle_to_deg,
            record.dec * self.scales.sky_angle_to_deg,
            self.frame.icrs_to_galactic(),
        )
    }
}
