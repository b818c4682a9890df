//! # Orbits in a Galactic potential
//!
//! Data types produced by the [`OrbitIntegrator`](crate::orbit::integrator::OrbitIntegrator):
//!
//! - [`OrbitState`] – time (Gyr), position (kpc) and velocity (km/s) of a test particle.
//! - [`Trajectory`] – the states at each requested output time, in increasing time order,
//!   together with the [`IntegrationDiagnostics`] of the run.
//!
//! Conserved quantities are evaluated in the internal unit system: energies in (km/s)²,
//! angular momenta in kpc·km/s.
//!
//! See also
//! ------------
//! * [`linspace`] – evenly spaced output times.
//! * [`integrator`] – the stepping algorithm and its numeric policy.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    astrometry::{AxisColumns, CartesianState},
    constants::{Gyr, KmPerSec, Kpc},
    potential::PotentialModel,
};

pub mod integrator;

/// State of a test particle at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    pub time: Gyr,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl OrbitState {
    pub fn new(time: Gyr, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        OrbitState {
            time,
            position,
            velocity,
        }
    }

    pub fn from_cartesian(time: Gyr, state: &CartesianState) -> Self {
        OrbitState::new(time, state.position, state.velocity)
    }

    /// Position and velocity, without the time stamp.
    pub fn cartesian(&self) -> CartesianState {
        CartesianState::new(self.position, self.velocity)
    }

    pub fn radius(&self) -> Kpc {
        self.position.norm()
    }

    pub fn speed(&self) -> KmPerSec {
        self.velocity.norm()
    }

    /// Specific kinetic energy, (km/s)².
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.velocity.norm_squared()
    }

    /// Specific total energy `½v² + Φ(x)` in `model`, (km/s)².
    pub fn energy(&self, model: &PotentialModel) -> f64 {
        self.kinetic_energy() + model.potential(&self.position)
    }

    /// Specific angular momentum `r × v` about the Galactic centre, kpc·km/s.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Component of the angular momentum along the symmetry axis.
    pub fn lz(&self) -> f64 {
        self.position.x * self.velocity.y - self.position.y * self.velocity.x
    }
}

/// Conservation statistics of one integration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IntegrationDiagnostics {
    /// Number of leapfrog steps on the main sequence; partial steps to output times excluded.
    pub substeps: usize,
    /// Largest `|E - E0| / |E0|` over the output times.
    pub max_relative_energy_drift: f64,
    /// Largest `|Lz - Lz0| / (|r0| |v0|)` over the output times; `None` when the potential
    /// is not axisymmetric and `Lz` is not a conserved quantity.
    pub max_relative_angular_momentum_drift: Option<f64>,
}

/// The states of an orbit at the requested output times.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trajectory {
    states: Vec<OrbitState>,
    diagnostics: IntegrationDiagnostics,
}

impl Trajectory {
    pub(crate) fn new(states: Vec<OrbitState>, diagnostics: IntegrationDiagnostics) -> Self {
        Trajectory {
            states,
            diagnostics,
        }
    }

    pub fn states(&self) -> &[OrbitState] {
        &self.states
    }

    pub fn into_states(self) -> Vec<OrbitState> {
        self.states
    }

    pub fn diagnostics(&self) -> &IntegrationDiagnostics {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&OrbitState> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&OrbitState> {
        self.states.last()
    }

    pub fn times(&self) -> Vec<Gyr> {
        self.states.iter().map(|s| s.time).collect()
    }

    pub fn x(&self) -> Vec<Kpc> {
        self.states.iter().map(|s| s.position.x).collect()
    }

    pub fn y(&self) -> Vec<Kpc> {
        self.states.iter().map(|s| s.position.y).collect()
    }

    pub fn z(&self) -> Vec<Kpc> {
        self.states.iter().map(|s| s.position.z).collect()
    }

    pub fn radii(&self) -> Vec<Kpc> {
        self.states.iter().map(OrbitState::radius).collect()
    }

    /// Positions split by axis, for plotting and viewer tooling.
    pub fn axis_columns(&self) -> AxisColumns {
        self.states.iter().map(|s| &s.position).collect()
    }
}

/// `n` evenly spaced times from `start` to `end` (both included).
///
/// `n = 0` gives an empty grid and `n = 1` gives `[start]`. The last element is exactly `end`.
pub fn linspace(start: Gyr, end: Gyr, n: usize) -> Vec<Gyr> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}
