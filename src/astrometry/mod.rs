//! # Astrometric records and Galactocentric state vectors
//!
//! This module defines the input and output data of the coordinate pipeline:
//!
//! - [`AstrometricRecord`] – one catalog entry (sky position, parallax, proper motion, and
//!   an optional radial velocity), immutable once ingested.
//! - [`CartesianState`] – a position (kpc) and velocity (km/s) in the Galactocentric frame.
//! - [`AxisColumns`] – per-axis arrays (`x`, `y`, `z`) as consumed by plotting and viewer
//!   tooling.
//!
//! The conversion itself lives in [`transformer`]; [`gaia_csv`] parses the CSV produced by
//! a Gaia archive query into records.
//!
//! ## Units
//!
//! | Field             | Unit   |
//! |-------------------|--------|
//! | `ra`, `dec`       | degree |
//! | `parallax`        | mas    |
//! | `pmra`, `pmdec`   | mas/yr (`pmra` includes the cos δ factor) |
//! | `radial_velocity` | km/s   |
//!
//! Other input units are declared with [`AstrometricUnits`](crate::units::AstrometricUnits)
//! and converted at the boundary.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, KmPerSec, Kpc, MasPerYear, MilliArcSec},
    potential::PotentialModel,
};

pub mod gaia_csv;
pub mod transformer;

pub use transformer::{
    CoordinateTransformer, RejectedRecord, RejectionReason, TransformedBatch, TransformedRecord,
};

/// One astrometric catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstrometricRecord {
    pub ra: Degree,
    pub dec: Degree,
    pub parallax: MilliArcSec,
    pub pmra: MasPerYear,
    pub pmdec: MasPerYear,
    pub radial_velocity: Option<KmPerSec>,
}

impl AstrometricRecord {
    pub fn new(
        ra: Degree,
        dec: Degree,
        parallax: MilliArcSec,
        pmra: MasPerYear,
        pmdec: MasPerYear,
        radial_velocity: Option<KmPerSec>,
    ) -> Self {
        AstrometricRecord {
            ra,
            dec,
            parallax,
            pmra,
            pmdec,
            radial_velocity,
        }
    }
}

/// Position (kpc) and velocity (km/s) in the Galactocentric frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl CartesianState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        CartesianState { position, velocity }
    }

    pub fn from_components(
        x: Kpc,
        y: Kpc,
        z: Kpc,
        vx: KmPerSec,
        vy: KmPerSec,
        vz: KmPerSec,
    ) -> Self {
        CartesianState {
            position: Vector3::new(x, y, z),
            velocity: Vector3::new(vx, vy, vz),
        }
    }

    /// Circular orbit initial condition at `(radius, 0, 0)` moving along +y, with the
    /// circular speed of `model` at that radius.
    pub fn circular(model: &PotentialModel, radius: Kpc) -> Self {
        CartesianState::from_components(
            radius,
            0.0,
            0.0,
            0.0,
            model.circular_velocity(radius),
            0.0,
        )
    }

    pub fn x(&self) -> Kpc {
        self.position.x
    }

    pub fn y(&self) -> Kpc {
        self.position.y
    }

    pub fn z(&self) -> Kpc {
        self.position.z
    }

    pub fn vx(&self) -> KmPerSec {
        self.velocity.x
    }

    pub fn vy(&self) -> KmPerSec {
        self.velocity.y
    }

    pub fn vz(&self) -> KmPerSec {
        self.velocity.z
    }

    /// Distance from the Galactic centre (kpc).
    pub fn radius(&self) -> Kpc {
        self.position.norm()
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|v| v.is_finite())
    }
}

/// Coordinates split by axis, serialized as `{"x": [...], "y": [...], "z": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl AxisColumns {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl<'a> FromIterator<&'a Vector3<f64>> for AxisColumns {
    fn from_iter<I: IntoIterator<Item = &'a Vector3<f64>>>(iter: I) -> Self {
        let mut columns = AxisColumns::default();
        for p in iter {
            columns.x.push(p.x);
            columns.y.push(p.y);
            columns.z.push(p.z);
        }
        columns
    }
}

impl From<&[CartesianState]> for AxisColumns {
    fn from(states: &[CartesianState]) -> Self {
        states.iter().map(|s| &s.position).collect()
    }
}
