//! # Dimensioned units at the astrometric boundary
//!
//! Catalog columns arrive as bare floating-point numbers whose unit is a convention of the
//! data source. This module makes that convention explicit: every input quantity of the
//! [`CoordinateTransformer`](crate::astrometry::CoordinateTransformer) is declared with a
//! [`Unit`], and the declaration is checked once, at setup, against the physical dimension
//! the quantity must have.
//!
//! A [`Unit`] is a symbol, a [`Dimension`] (integer exponents of length, time and angle) and
//! a scale factor to the base units (m, s, rad). Two units can be converted into each other
//! only when their exponents agree; anything else is a
//! [`GalorbitError::UnitMismatch`].
//!
//! ```rust
//! use galorbit::units::{AstrometricUnits, Unit};
//!
//! let units = AstrometricUnits {
//!     parallax: Unit::from_symbol("arcsec").unwrap(),
//!     ..AstrometricUnits::default()
//! };
//! let scales = units.resolve().unwrap();
//! assert!((scales.parallax_to_mas - 1000.0).abs() < 1e-9);
//!
//! // A velocity unit where an angle is expected fails at setup, not mid-batch.
//! let bad = AstrometricUnits {
//!     parallax: Unit::from_symbol("km/s").unwrap(),
//!     ..AstrometricUnits::default()
//! };
//! assert!(bad.resolve().is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    constants::{KPC_KM, RADEG, RADMAS, RADSEC, SECONDS_PER_JULIAN_YEAR},
    galorbit_errors::GalorbitError,
};

/// Integer exponents of the base dimensions carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub length: i8,
    pub time: i8,
    pub angle: i8,
}

impl Dimension {
    pub const ANGLE: Dimension = Dimension {
        length: 0,
        time: 0,
        angle: 1,
    };
    pub const ANGULAR_RATE: Dimension = Dimension {
        length: 0,
        time: -1,
        angle: 1,
    };
    pub const VELOCITY: Dimension = Dimension {
        length: 1,
        time: -1,
        angle: 0,
    };
    pub const LENGTH: Dimension = Dimension {
        length: 1,
        time: 0,
        angle: 0,
    };

    fn describe(&self) -> &'static str {
        match *self {
            Dimension::ANGLE => "angle",
            Dimension::ANGULAR_RATE => "angular rate",
            Dimension::VELOCITY => "velocity",
            Dimension::LENGTH => "length",
            _ => "composite",
        }
    }
}

/// A named unit with its dimension and its scale to the base units (m, s, rad).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "String")]
pub struct Unit {
    pub symbol: &'static str,
    pub dimension: Dimension,
    pub scale: f64,
}

impl Unit {
    pub const DEGREE: Unit = Unit::new("deg", Dimension::ANGLE, RADEG);
    pub const RADIAN: Unit = Unit::new("rad", Dimension::ANGLE, 1.0);
    pub const ARCSEC: Unit = Unit::new("arcsec", Dimension::ANGLE, RADSEC);
    pub const MILLIARCSEC: Unit = Unit::new("mas", Dimension::ANGLE, RADMAS);
    pub const MICROARCSEC: Unit = Unit::new("uas", Dimension::ANGLE, RADMAS * 1e-3);
    pub const MAS_PER_YEAR: Unit = Unit::new(
        "mas/yr",
        Dimension::ANGULAR_RATE,
        RADMAS / SECONDS_PER_JULIAN_YEAR,
    );
    pub const ARCSEC_PER_YEAR: Unit = Unit::new(
        "arcsec/yr",
        Dimension::ANGULAR_RATE,
        RADSEC / SECONDS_PER_JULIAN_YEAR,
    );
    pub const KM_PER_SEC: Unit = Unit::new("km/s", Dimension::VELOCITY, 1000.0);
    pub const M_PER_SEC: Unit = Unit::new("m/s", Dimension::VELOCITY, 1.0);
    pub const KPC: Unit = Unit::new("kpc", Dimension::LENGTH, KPC_KM * 1000.0);
    pub const PC: Unit = Unit::new("pc", Dimension::LENGTH, KPC_KM);

    const KNOWN: [Unit; 11] = [
        Unit::DEGREE,
        Unit::RADIAN,
        Unit::ARCSEC,
        Unit::MILLIARCSEC,
        Unit::MICROARCSEC,
        Unit::MAS_PER_YEAR,
        Unit::ARCSEC_PER_YEAR,
        Unit::KM_PER_SEC,
        Unit::M_PER_SEC,
        Unit::KPC,
        Unit::PC,
    ];

    pub const fn new(symbol: &'static str, dimension: Dimension, scale: f64) -> Self {
        Unit {
            symbol,
            dimension,
            scale,
        }
    }

    /// Look up one of the supported units by its symbol (`"deg"`, `"mas/yr"`, `"km/s"`, ...).
    pub fn from_symbol(symbol: &str) -> Result<Unit, GalorbitError> {
        let symbol = symbol.trim();
        Unit::KNOWN
            .iter()
            .find(|u| u.symbol == symbol)
            .copied()
            .ok_or_else(|| GalorbitError::UnknownUnit(symbol.to_string()))
    }

    /// Multiplicative factor converting a value expressed in `self` into `target`.
    ///
    /// Return
    /// ----------
    /// * The factor `k` such that `value_in_target = k * value_in_self`, or
    ///   [`GalorbitError::UnitMismatch`] when the two dimensions differ.
    pub fn conversion_factor(
        &self,
        target: &Unit,
        quantity: &'static str,
    ) -> Result<f64, GalorbitError> {
        if self.dimension != target.dimension {
            return Err(GalorbitError::UnitMismatch {
                quantity,
                expected: target.dimension.describe(),
                found: self.symbol.to_string(),
            });
        }
        Ok(self.scale / target.scale)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl TryFrom<String> for Unit {
    type Error = GalorbitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Unit::from_symbol(&value)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let symbol = String::deserialize(deserializer)?;
        Unit::try_from(symbol).map_err(serde::de::Error::custom)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol.to_string()
    }
}

/// Units in which the fields of an [`AstrometricRecord`](crate::astrometry::AstrometricRecord)
/// are expressed by the data source.
///
/// The default matches the Gaia archive: degrees, milliarcseconds, mas/yr and km/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstrometricUnits {
    pub sky_angle: Unit,
    pub parallax: Unit,
    pub proper_motion: Unit,
    pub radial_velocity: Unit,
}

impl Default for AstrometricUnits {
    fn default() -> Self {
        AstrometricUnits {
            sky_angle: Unit::DEGREE,
            parallax: Unit::MILLIARCSEC,
            proper_motion: Unit::MAS_PER_YEAR,
            radial_velocity: Unit::KM_PER_SEC,
        }
    }
}

/// Conversion factors from the declared input units to the internal conventions
/// (deg, mas, mas/yr, km/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitScales {
    pub sky_angle_to_deg: f64,
    pub parallax_to_mas: f64,
    pub proper_motion_to_masyr: f64,
    pub radial_velocity_to_kms: f64,
}

impl AstrometricUnits {
    /// Check every declared unit against the dimension of its quantity and compute the
    /// conversion factors to the internal conventions.
    pub fn resolve(&self) -> Result<UnitScales, GalorbitError> {
        Ok(UnitScales {
            sky_angle_to_deg: self.sky_angle.conversion_factor(&Unit::DEGREE, "ra/dec")?,
            parallax_to_mas: self
                .parallax
                .conversion_factor(&Unit::MILLIARCSEC, "parallax")?,
            proper_motion_to_masyr: self
                .proper_motion
                .conversion_factor(&Unit::MAS_PER_YEAR, "proper motion")?,
            radial_velocity_to_kms: self
                .radial_velocity
                .conversion_factor(&Unit::KM_PER_SEC, "radial velocity")?,
        })
    }
}

/// Distance in kpc of a source with the given parallax in milliarcseconds.
///
/// `d[pc] = 1 / ϖ[arcsec]`, hence `d[kpc] = 1 / ϖ[mas]`. Non-positive parallaxes yield a
/// non-finite or negative distance; callers must filter them beforehand.
#[inline]
pub fn parallax_to_distance_kpc(parallax_mas: f64) -> f64 {
    1.0 / parallax_mas
}
