//! # Constants and type definitions for Galorbit
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **unit
//! type aliases** used throughout the `galorbit` library.
//!
//! ## Overview
//!
//! - Astronomical length and time scales (AU, parsec, kiloparsec, Julian year, gigayear)
//! - Angle conversions (degrees ↔ radians, milliarcseconds ↔ radians)
//! - The gravitational constant in the galactic unit system
//! - Unit type aliases documenting the scalar conventions of every public API
//!
//! ## Unit system
//!
//! Every dynamical quantity in the crate is expressed in the same closed system:
//!
//! | Quantity      | Unit         |
//! |---------------|--------------|
//! | position      | kpc          |
//! | velocity      | km/s         |
//! | time          | Gyr          |
//! | mass          | M☉           |
//! | potential     | (km/s)²      |
//! | acceleration  | (km/s)²/kpc  |
//!
//! The mixed kpc / km/s / Gyr system is closed by a single factor,
//! [`KMS_TO_KPC_PER_GYR`], which converts both `dx/dt = v` and `dv/dt = a` into
//! per-Gyr rates.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Parsec in kilometers (IAU 2015, 648000/π AU)
pub const PARSEC_KM: f64 = AU * 648_000.0 / std::f64::consts::PI;

/// Kiloparsec in kilometers
pub const KPC_KM: f64 = 1000.0 * PARSEC_KM;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of seconds in a Julian year (365.25 days)
pub const SECONDS_PER_JULIAN_YEAR: f64 = 365.25 * SECONDS_PER_DAY;

/// Number of seconds in a gigayear (10⁹ Julian years)
pub const SECONDS_PER_GYR: f64 = 1.0e9 * SECONDS_PER_JULIAN_YEAR;

/// 1 km/s expressed in kpc/Gyr (≈ 1.0227)
pub const KMS_TO_KPC_PER_GYR: f64 = SECONDS_PER_GYR / KPC_KM;

/// Tangential velocity in km/s of an object at 1 kpc moving by 1 mas/yr
/// (equivalently, 1 AU/yr in km/s ≈ 4.7405).
pub const KMS_PER_MASYR_KPC: f64 = AU / SECONDS_PER_JULIAN_YEAR;

/// Gravitational constant in kpc (km/s)² / M☉ (CODATA 2018 G, IAU 2015 nominal solar mass)
pub const G_GALACTIC: f64 = 4.300_917_270_038e-6;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Milliarcseconds → radians
pub const RADMAS: f64 = RADSEC / 1000.0;

/// Below this radius (kpc) a position is treated as the origin by the force laws.
pub const ORIGIN_EPS: f64 = 1e-12;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in milliarcseconds
pub type MilliArcSec = f64;
/// Angular rate in milliarcseconds per Julian year
pub type MasPerYear = f64;
/// Distance in kiloparsecs
pub type Kpc = f64;
/// Velocity in kilometers per second
pub type KmPerSec = f64;
/// Time in gigayears
pub type Gyr = f64;
/// Mass in solar masses
pub type SolarMass = f64;

#[cfg(test)]
mod constants_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kms_to_kpc_per_gyr() {
        assert_relative_eq!(KMS_TO_KPC_PER_GYR, 1.0227121650456947, max_relative = 1e-12);
    }

    #[test]
    fn test_proper_motion_factor() {
        assert_relative_eq!(KMS_PER_MASYR_KPC, 4.740470463533348, epsilon = 1e-12);
    }

    #[test]
    fn test_parsec() {
        assert_relative_eq!(PARSEC_KM, 3.0856775814913673e13, max_relative = 1e-14);
    }
}
