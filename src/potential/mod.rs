//! # Composite gravitational potentials
//!
//! A [`PotentialModel`] is an ordered, non-empty list of [`PotentialComponent`]s whose
//! potentials and accelerations add linearly. Models are immutable once built, hold no
//! interior state, and can be shared read-only between threads integrating independent
//! orbits.
//!
//! ## Typical workflow
//!
//! ```rust
//! use galorbit::potential::{ComponentSpec, PotentialModel};
//! use nalgebra::Vector3;
//!
//! let specs: Vec<ComponentSpec> = [
//!     "hernquist:m=5e9,c=1.0",
//!     "miyamoto_nagai:m=6.8e10,a=3.0,b=0.28",
//!     "nfw:m=5.4e11,r_s=15.62",
//! ]
//! .iter()
//! .map(|s| s.parse().unwrap())
//! .collect();
//!
//! let model = PotentialModel::from_specs(&specs).unwrap();
//! let acc = model.acceleration(&Vector3::new(8.0, 0.0, 0.0));
//! assert!(acc.x < 0.0);
//! ```
//!
//! ## Presets
//!
//! * [`PotentialModel::milky_way`] – Hernquist nucleus and bulge, Miyamoto–Nagai disk,
//!   NFW halo (Bovy 2015 / Price-Whelan 2017 mass budget).
//! * [`PotentialModel::logarithmic_halo`] – a single spherical logarithmic halo with a
//!   flat rotation curve.

use nalgebra::Vector3;
use tracing::debug;

use crate::{
    constants::{KmPerSec, Kpc},
    galorbit_errors::GalorbitError,
};

pub mod component;
pub mod spec;

pub use component::PotentialComponent;
pub use spec::ComponentSpec;

/// Sum of analytic potential components.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialModel {
    components: Vec<PotentialComponent>,
}

impl PotentialModel {
    /// Build a model from already-validated components.
    ///
    /// Errors
    /// ----------
    /// * [`GalorbitError::EmptyPotentialModel`] if `components` is empty.
    pub fn new(components: Vec<PotentialComponent>) -> Result<Self, GalorbitError> {
        if components.is_empty() {
            return Err(GalorbitError::EmptyPotentialModel);
        }
        for component in &components {
            debug!("Adding potential component: {:?}", component);
        }
        Ok(PotentialModel { components })
    }

    /// Validate a list of configuration specs and build the model.
    ///
    /// The first invalid spec aborts the construction; no partially-built model is returned.
    pub fn from_specs(specs: &[ComponentSpec]) -> Result<Self, GalorbitError> {
        let components = specs
            .iter()
            .map(ComponentSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        PotentialModel::new(components)
    }

    /// Four-component Milky Way model: Hernquist nucleus, Hernquist bulge,
    /// Miyamoto–Nagai disk and NFW halo.
    pub fn milky_way() -> Self {
        PotentialModel {
            components: vec![
                PotentialComponent::Hernquist { m: 1.71e9, c: 0.07 },
                PotentialComponent::Hernquist { m: 5.0e9, c: 1.0 },
                PotentialComponent::MiyamotoNagai {
                    m: 6.8e10,
                    a: 3.0,
                    b: 0.28,
                },
                PotentialComponent::Nfw {
                    m: 5.4e11,
                    r_s: 15.62,
                },
            ],
        }
    }

    /// Spherical logarithmic halo with circular speed `v_c` (km/s) and core radius `r_h` (kpc).
    pub fn logarithmic_halo(v_c: KmPerSec, r_h: Kpc) -> Result<Self, GalorbitError> {
        let spec = ComponentSpec::new("logarithmic", &[("v_c", v_c), ("r_h", r_h)]);
        PotentialModel::new(vec![spec.build()?])
    }

    pub fn components(&self) -> &[PotentialComponent] {
        &self.components
    }

    /// Gravitational acceleration at `position` (kpc), in (km/s)²/kpc.
    pub fn acceleration(&self, position: &Vector3<f64>) -> Vector3<f64> {
        self.components
            .iter()
            .fold(Vector3::zeros(), |acc, c| acc + c.acceleration(position))
    }

    /// Scalar potential at `position` (kpc), in (km/s)².
    pub fn potential(&self, position: &Vector3<f64>) -> f64 {
        self.components.iter().map(|c| c.potential(position)).sum()
    }

    /// Whether every component is symmetric about the z axis, so that `L_z` is conserved.
    pub fn is_axisymmetric(&self) -> bool {
        self.components.iter().all(PotentialComponent::is_axisymmetric)
    }

    /// Smallest [`PotentialComponent::scale_length`] of the model (kpc).
    pub fn scale_length(&self) -> Kpc {
        self.components
            .iter()
            .map(PotentialComponent::scale_length)
            .fold(f64::INFINITY, f64::min)
    }

    /// Circular speed (km/s) at cylindrical radius `radius` (kpc) in the midplane,
    /// measured along the x axis.
    ///
    /// Returns 0 where the radial force is not attractive.
    pub fn circular_velocity(&self, radius: Kpc) -> KmPerSec {
        let a_r = self.acceleration(&Vector3::new(radius, 0.0, 0.0)).x;
        (-radius * a_r).max(0.0).sqrt()
    }
}
