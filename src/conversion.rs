use nalgebra::{Matrix3, Vector3};

use crate::{
    constants::{Degree, KmPerSec, Kpc, MasPerYear, KMS_PER_MASYR_KPC, RADEG},
    ref_system::cartesian_to_radec,
};

/// Unit vectors of the local spherical basis at `(ra, dec)`.
///
/// Arguments
/// ---------
/// * `ra`: right ascension in radians
/// * `dec`: declination in radians
///
/// Return
/// ----------
/// * `(ê_r, ê_α, ê_δ)`: radial direction, direction of increasing right ascension, and
///   direction of increasing declination, all expressed in the equatorial Cartesian frame.
pub(crate) fn spherical_basis(ra: f64, dec: f64) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let (sin_ra, cos_ra) = ra.sin_cos();
    let (sin_dec, cos_dec) = dec.sin_cos();

    let e_r = Vector3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec);
    let e_ra = Vector3::new(-sin_ra, cos_ra, 0.0);
    let e_dec = Vector3::new(-sin_dec * cos_ra, -sin_dec * sin_ra, cos_dec);
    (e_r, e_ra, e_dec)
}

/// Tangential speed in km/s of a source at `distance` kpc with proper motion `mu` mas/yr.
#[inline]
pub fn tangential_speed(mu: MasPerYear, distance: Kpc) -> KmPerSec {
    KMS_PER_MASYR_KPC * mu * distance
}

/// Convert an astrometric position and motion into an equatorial Cartesian state vector.
///
/// Arguments
/// ---------
/// * `ra`, `dec`: sky position in degrees
/// * `distance`: heliocentric distance in kpc
/// * `pmra`: proper motion in right ascension, **already multiplied by cos δ** (mas/yr)
/// * `pmdec`: proper motion in declination (mas/yr)
/// * `radial_velocity`: line-of-sight velocity in km/s
///
/// Return
/// ----------
/// * `(position, velocity)` in kpc and km/s, in the heliocentric equatorial frame.
///
/// The velocity is the sum of the radial component along `ê_r` and the two tangential
/// components, each obtained as proper motion × distance.
pub fn spherical_to_cartesian(
    ra: Degree,
    dec: Degree,
    distance: Kpc,
    pmra: MasPerYear,
    pmdec: MasPerYear,
    radial_velocity: KmPerSec,
) -> (Vector3<f64>, Vector3<f64>) {
    let (e_r, e_ra, e_dec) = spherical_basis(ra * RADEG, dec * RADEG);

    let position = distance * e_r;
    let velocity = radial_velocity * e_r
        + tangential_speed(pmra, distance) * e_ra
        + tangential_speed(pmdec, distance) * e_dec;
    (position, velocity)
}

/// Galactic longitude and latitude (degrees) of an equatorial direction.
///
/// Arguments
/// ---------
/// * `ra`, `dec`: equatorial coordinates in degrees
/// * `icrs_to_galactic`: rotation matrix of the Galactic frame
///
/// Return
/// ----------
/// * `(l, b)` with `l` in [0, 360) and `b` in [-90, 90].
pub fn radec_to_galactic(
    ra: Degree,
    dec: Degree,
    icrs_to_galactic: &Matrix3<f64>,
) -> (Degree, Degree) {
    let (e_r, _, _) = spherical_basis(ra * RADEG, dec * RADEG);
    let (l, b, _) = cartesian_to_radec(&(icrs_to_galactic * e_r));
    (l / RADEG, b / RADEG)
}
