//! # Reference frames: ICRS, Galactic and Galactocentric
//!
//! This module builds the fixed rotations and offsets carrying a heliocentric equatorial
//! (ICRS) vector into the **Galactocentric** frame:
//!
//! ```text
//!   x_gal = M · x_icrs                    (ICRS → Galactic, fixed by the Galactic pole)
//!   x_gc  = A_gal · x_gal + r_sun         (Galactic → Galactocentric, then shift to the centre)
//!   v_gc  = A_gal · v_gal + v_sun         (add the Sun's velocity around the centre)
//! ```
//!
//! The Galactocentric frame follows the usual right-handed convention: the origin is the
//! Galactic centre, the Sun lies on the negative x axis at `(-d·cos θ, 0, z_sun)`, and the
//! y axis points along the direction of Galactic rotation.
//!
//! All angles and offsets are **configuration** ([`GalacticPole`], [`GalactocentricFrame`]);
//! the matrices are assembled once by [`FrameTransform::new`] and reused for every record.
//!
//! ## Conventions
//!
//! `rotmt` returns an *active* rotation (rotates the vector). Frame changes are *passive*
//! rotations, obtained as `rotmt(-angle, axis)`.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, KmPerSec, Kpc, Radian, DPI, RADEG},
    galorbit_errors::GalorbitError,
};

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes (X, Y, or Z).
///
/// The returned matrix is an **active rotation** of a vector by `alpha` radians in the
/// direct (counter-clockwise) sense around the chosen axis.
///
/// # Arguments
///
/// * `alpha` - Rotation angle in **radians**.
/// * `k` - Index of the axis of rotation: `0` → X, `1` → Y, `2` → Z.
///
/// # Panics
///
/// Panics if `k > 2`, as only axes 0–2 are valid.
pub(crate) fn rotmt(alpha: Radian, k: usize) -> Matrix3<f64> {
    let axis = match k {
        0 => Vector3::x_axis(),
        1 => Vector3::y_axis(),
        2 => Vector3::z_axis(),
        _ => panic!("**** ROTMT: invalid axis index {k} (must be 0,1,2) ****"),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Change-of-basis matrix for a frame rotated by `angle` around axis `k`.
#[inline]
fn frame_rotation(angle: Radian, k: usize) -> Matrix3<f64> {
    rotmt(-angle, k)
}

/// Orientation of the Galactic frame with respect to ICRS.
///
/// * `ra_ngp`, `dec_ngp`: equatorial coordinates of the North Galactic Pole (degrees).
/// * `lon_ncp`: Galactic longitude of the North Celestial Pole (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalacticPole {
    pub ra_ngp: Degree,
    pub dec_ngp: Degree,
    pub lon_ncp: Degree,
}

impl Default for GalacticPole {
    fn default() -> Self {
        GalacticPole {
            ra_ngp: 192.85948,
            dec_ngp: 27.12825,
            lon_ncp: 122.93192,
        }
    }
}

impl GalacticPole {
    /// Rotation matrix `M` such that `x_gal = M · x_icrs`.
    pub fn icrs_to_galactic(&self) -> Matrix3<f64> {
        frame_rotation((180.0 - self.lon_ncp) * RADEG, 2)
            * frame_rotation((90.0 - self.dec_ngp) * RADEG, 1)
            * frame_rotation(self.ra_ngp * RADEG, 2)
    }
}

/// Position and motion of the Sun relative to the Galactic centre.
///
/// The defaults are the astropy v4.0 Galactocentric parameters (GRAVITY 2018 distance,
/// Bennett & Bovy 2019 solar height, Drimmel & Poggio 2018 solar motion).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalactocentricFrame {
    /// ICRS right ascension of the Galactic centre (degrees).
    pub galcen_ra: Degree,
    /// ICRS declination of the Galactic centre (degrees).
    pub galcen_dec: Degree,
    /// Sun–Galactic centre distance (kpc).
    pub galcen_distance: Kpc,
    /// Height of the Sun above the Galactic midplane (kpc).
    pub z_sun: Kpc,
    /// Extra roll of the frame around the Sun–centre axis (degrees).
    pub roll: Degree,
    /// Roll aligning the frame with the Galactic plane when `roll = 0` (degrees).
    pub roll0: Degree,
    /// Velocity of the Sun in the Galactocentric frame (km/s).
    pub v_sun: [KmPerSec; 3],
}

impl Default for GalactocentricFrame {
    fn default() -> Self {
        GalactocentricFrame {
            galcen_ra: 266.4051,
            galcen_dec: -28.936175,
            galcen_distance: 8.122,
            z_sun: 0.0208,
            roll: 0.0,
            roll0: 58.5986320306,
            v_sun: [12.9, 245.6, 7.78],
        }
    }
}

impl GalactocentricFrame {
    fn validate(&self) -> Result<(), GalorbitError> {
        let finite = [
            ("galcen_ra", self.galcen_ra),
            ("galcen_dec", self.galcen_dec),
            ("z_sun", self.z_sun),
            ("roll", self.roll),
            ("roll0", self.roll0),
            ("v_sun.x", self.v_sun[0]),
            ("v_sun.y", self.v_sun[1]),
            ("v_sun.z", self.v_sun[2]),
        ];
        if let Some((name, value)) = finite.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(GalorbitError::InvalidFrameParameter { name, value });
        }
        if !(self.galcen_distance.is_finite() && self.galcen_distance > 0.0) {
            return Err(GalorbitError::InvalidFrameParameter {
                name: "galcen_distance",
                value: self.galcen_distance,
            });
        }
        if self.z_sun.abs() >= self.galcen_distance {
            return Err(GalorbitError::InvalidFrameParameter {
                name: "z_sun",
                value: self.z_sun,
            });
        }
        Ok(())
    }

    /// Rotation `A` such that `x_gc = A · x_icrs + r_sun`, and the solar offset `r_sun`.
    fn icrs_rotation_and_offset(&self) -> (Matrix3<f64>, Vector3<f64>) {
        let align = frame_rotation((self.roll0 - self.roll) * RADEG, 0)
            * frame_rotation(-self.galcen_dec * RADEG, 1)
            * frame_rotation(self.galcen_ra * RADEG, 2);

        // tilt accounting for the height of the Sun above the midplane
        let tilt = frame_rotation(-(self.z_sun / self.galcen_distance).asin(), 1);
        let offset = -(tilt * Vector3::new(self.galcen_distance, 0.0, 0.0));

        (tilt * align, offset)
    }
}

/// Precomputed rotations and offsets of the ICRS → Galactic → Galactocentric chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransform {
    icrs_to_galactic: Matrix3<f64>,
    galactic_to_galactocentric: Matrix3<f64>,
    sun_position: Vector3<f64>,
    sun_velocity: Vector3<f64>,
}

impl FrameTransform {
    /// Validate the frame parameters and assemble the transformation matrices.
    pub fn new(pole: &GalacticPole, frame: &GalactocentricFrame) -> Result<Self, GalorbitError> {
        let pole_angles = [
            ("ra_ngp", pole.ra_ngp),
            ("dec_ngp", pole.dec_ngp),
            ("lon_ncp", pole.lon_ncp),
        ];
        if let Some((name, value)) = pole_angles.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(GalorbitError::InvalidFrameParameter { name, value });
        }
        frame.validate()?;

        let icrs_to_galactic = pole.icrs_to_galactic();
        let (icrs_to_gc, sun_position) = frame.icrs_rotation_and_offset();

        Ok(FrameTransform {
            icrs_to_galactic,
            // M is orthonormal, so M⁻¹ = Mᵀ
            galactic_to_galactocentric: icrs_to_gc * icrs_to_galactic.transpose(),
            sun_position,
            sun_velocity: Vector3::from(frame.v_sun),
        })
    }

    pub fn icrs_to_galactic(&self) -> &Matrix3<f64> {
        &self.icrs_to_galactic
    }

    pub fn galactic_to_galactocentric(&self) -> &Matrix3<f64> {
        &self.galactic_to_galactocentric
    }

    /// Position of the Sun in the Galactocentric frame (kpc).
    pub fn sun_position(&self) -> &Vector3<f64> {
        &self.sun_position
    }

    /// Velocity of the Sun in the Galactocentric frame (km/s).
    pub fn sun_velocity(&self) -> &Vector3<f64> {
        &self.sun_velocity
    }

    /// Carry a heliocentric ICRS position (kpc) and velocity (km/s) into the
    /// Galactocentric frame.
    pub fn icrs_to_galactocentric(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let pos_gal = self.icrs_to_galactic * position;
        let vel_gal = self.icrs_to_galactic * velocity;
        (
            self.galactic_to_galactocentric * pos_gal + self.sun_position,
            self.galactic_to_galactocentric * vel_gal + self.sun_velocity,
        )
    }

    /// Inverse of [`FrameTransform::icrs_to_galactocentric`].
    pub fn galactocentric_to_icrs(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let back = self.icrs_to_galactic.transpose() * self.galactic_to_galactocentric.transpose();
        (
            back * (position - self.sun_position),
            back * (velocity - self.sun_velocity),
        )
    }
}

/// Convert a 3D Cartesian position vector to right ascension and declination.
///
/// Returns
/// --------
/// * Tuple `(α, δ, ρ)`:
///     - `α`: right ascension in radians, in the range [0, 2π).
///     - `δ`: declination in radians, in the range [−π/2, +π/2].
///     - `ρ`: Euclidean norm of the vector (distance to the origin).
///
/// If the input vector has zero norm, the result is `(0.0, 0.0, 0.0)`.
pub fn cartesian_to_radec(cartesian_position: &Vector3<f64>) -> (Radian, Radian, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).clamp(-1.0, 1.0).asin();

    let cos_delta = delta.cos();
    if cos_delta == 0.0 {
        return (0.0, delta, pos_norm);
    }

    let cos_alpha = cartesian_position.x / (pos_norm * cos_delta);
    let sin_alpha = cartesian_position.y / (pos_norm * cos_delta);
    let alpha = sin_alpha.atan2(cos_alpha);
    let alpha = if alpha < 0.0 { alpha + DPI } else { alpha };
    (alpha, delta, pos_norm)
}
