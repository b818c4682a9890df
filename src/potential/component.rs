//! # Closed-form potential components
//!
//! Each [`PotentialComponent`] variant is an analytic mass model with a scalar potential
//! `Φ(x)` and its acceleration `a(x) = −∇Φ(x)`.
//!
//! | Variant          | Role            | Φ(x)                                                   |
//! |------------------|-----------------|--------------------------------------------------------|
//! | `Hernquist`      | bulge / nucleus | `−G m / (r + c)`                                       |
//! | `Plummer`        | bulge           | `−G m / √(r² + b²)`                                    |
//! | `MiyamotoNagai`  | disk            | `−G m / √(R² + (a + √(z² + b²))²)`                     |
//! | `Nfw`            | halo            | `−G m ln(1 + r/r_s) / r`                               |
//! | `Logarithmic`    | halo            | `½ v_c² ln(r_h² + x²/q1² + y²/q2² + z²/q3²)`           |
//!
//! Units: kpc, km/s, M☉; potentials in (km/s)², accelerations in (km/s)²/kpc.
//!
//! ## Behaviour at the origin
//!
//! The Hernquist and NFW force laws have a finite magnitude but no defined direction at
//! `r = 0`. Within [`ORIGIN_EPS`] of the centre they return the zero vector, which is
//! the limit imposed by symmetry. The NFW enclosed-mass term is evaluated from its series
//! expansion at small `r/r_s` to avoid the cancellation in `ln(1+u) − u/(1+u)`.

use nalgebra::Vector3;
use serde::Serialize;

use crate::constants::{KmPerSec, Kpc, SolarMass, G_GALACTIC, ORIGIN_EPS};

/// Below this value of `r/r_s` the NFW enclosed-mass term uses its series expansion.
const NFW_SERIES_LIMIT: f64 = 1e-4;

/// A single analytic contribution to a [`PotentialModel`](crate::potential::PotentialModel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PotentialComponent {
    /// Spherical Hernquist (1990) profile: total mass `m`, scale radius `c`.
    Hernquist { m: SolarMass, c: Kpc },
    /// Spherical Plummer (1911) sphere: total mass `m`, scale radius `b`.
    Plummer { m: SolarMass, b: Kpc },
    /// Axisymmetric Miyamoto & Nagai (1975) disk: mass `m`, scale length `a`, scale height `b`.
    MiyamotoNagai { m: SolarMass, a: Kpc, b: Kpc },
    /// Navarro, Frenk & White (1996) halo: scale mass `m`, scale radius `r_s`.
    Nfw { m: SolarMass, r_s: Kpc },
    /// Logarithmic halo with a flat rotation curve at `v_c`, core radius `r_h`, and axis
    /// ratios `q1`, `q2`, `q3` along x, y, z.
    Logarithmic {
        v_c: KmPerSec,
        r_h: Kpc,
        q1: f64,
        q2: f64,
        q3: f64,
    },
}

impl PotentialComponent {
    /// Short name of the component kind, as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            PotentialComponent::Hernquist { .. } => "hernquist",
            PotentialComponent::Plummer { .. } => "plummer",
            PotentialComponent::MiyamotoNagai { .. } => "miyamoto_nagai",
            PotentialComponent::Nfw { .. } => "nfw",
            PotentialComponent::Logarithmic { .. } => "logarithmic",
        }
    }

    /// Whether the component is symmetric under rotations about the z axis.
    pub fn is_axisymmetric(&self) -> bool {
        match *self {
            PotentialComponent::Logarithmic { q1, q2, .. } => q1 == q2,
            _ => true,
        }
    }

    /// Smallest length scale of the mass model (kpc): core or scale radius, or the disk
    /// scale height.
    pub fn scale_length(&self) -> Kpc {
        match *self {
            PotentialComponent::Hernquist { c, .. } => c,
            PotentialComponent::Plummer { b, .. } => b,
            PotentialComponent::MiyamotoNagai { b, .. } => b,
            PotentialComponent::Nfw { r_s, .. } => r_s,
            PotentialComponent::Logarithmic { r_h, .. } => r_h,
        }
    }

    /// Gravitational acceleration `−∇Φ` at `position` (kpc), in (km/s)²/kpc.
    pub fn acceleration(&self, position: &Vector3<f64>) -> Vector3<f64> {
        match *self {
            PotentialComponent::Hernquist { m, c } => {
                let r = position.norm();
                if r < ORIGIN_EPS {
                    return Vector3::zeros();
                }
                position * (-G_GALACTIC * m / (r * (r + c) * (r + c)))
            }
            PotentialComponent::Plummer { m, b } => {
                let s2 = position.norm_squared() + b * b;
                position * (-G_GALACTIC * m / (s2 * s2.sqrt()))
            }
            PotentialComponent::MiyamotoNagai { m, a, b } => {
                let (x, y, z) = (position.x, position.y, position.z);
                let zb = (z * z + b * b).sqrt();
                let azb = a + zb;
                let d2 = x * x + y * y + azb * azb;
                let k = -G_GALACTIC * m / (d2 * d2.sqrt());
                Vector3::new(k * x, k * y, k * z * azb / zb)
            }
            PotentialComponent::Nfw { m, r_s } => {
                let r = position.norm();
                if r < ORIGIN_EPS {
                    return Vector3::zeros();
                }
                let u = r / r_s;
                position * (-G_GALACTIC * m * nfw_enclosed(u) / (r * r * r))
            }
            PotentialComponent::Logarithmic {
                v_c,
                r_h,
                q1,
                q2,
                q3,
            } => {
                let (qx2, qy2, qz2) = (q1 * q1, q2 * q2, q3 * q3);
                let m2 = r_h * r_h
                    + position.x * position.x / qx2
                    + position.y * position.y / qy2
                    + position.z * position.z / qz2;
                let k = -v_c * v_c / m2;
                Vector3::new(
                    k * position.x / qx2,
                    k * position.y / qy2,
                    k * position.z / qz2,
                )
            }
        }
    }

    /// Scalar potential `Φ` at `position` (kpc), in (km/s)².
    pub fn potential(&self, position: &Vector3<f64>) -> f64 {
        match *self {
            PotentialComponent::Hernquist { m, c } => -G_GALACTIC * m / (position.norm() + c),
            PotentialComponent::Plummer { m, b } => {
                -G_GALACTIC * m / (position.norm_squared() + b * b).sqrt()
            }
            PotentialComponent::MiyamotoNagai { m, a, b } => {
                let zb = (position.z * position.z + b * b).sqrt();
                let d2 = position.x * position.x + position.y * position.y + (a + zb) * (a + zb);
                -G_GALACTIC * m / d2.sqrt()
            }
            PotentialComponent::Nfw { m, r_s } => {
                let u = position.norm() / r_s;
                // ln(1+u)/u → 1 − u/2 + u²/3 at the centre
                let ln_term = if u < NFW_SERIES_LIMIT {
                    1.0 - u / 2.0 + u * u / 3.0
                } else {
                    u.ln_1p() / u
                };
                -G_GALACTIC * m * ln_term / r_s
            }
            PotentialComponent::Logarithmic {
                v_c,
                r_h,
                q1,
                q2,
                q3,
            } => {
                let m2 = r_h * r_h
                    + (position.x / q1).powi(2)
                    + (position.y / q2).powi(2)
                    + (position.z / q3).powi(2);
                0.5 * v_c * v_c * m2.ln()
            }
        }
    }
}

/// Dimensionless NFW enclosed-mass term `ln(1+u) − u/(1+u)`.
fn nfw_enclosed(u: f64) -> f64 {
    if u < NFW_SERIES_LIMIT {
        u * u * (0.5 - 2.0 * u / 3.0 + 0.75 * u * u)
    } else {
        u.ln_1p() - u / (1.0 + u)
    }
}
