//! # Galorbit: configuration and façade
//!
//! [`Galorbit`] wires together, from a single [`GalorbitConfig`]:
//!
//! 1. **Coordinate transformer** ([`CoordinateTransformer`]) – frame constants and input
//!    units, validated and precomputed once.
//! 2. **Potential model** ([`PotentialModel`]) – built from the configured component list.
//! 3. **Orbit integrator** ([`OrbitIntegrator`]) – step policy and conservation tolerances.
//!
//! Every configuration problem (unit mismatch, missing potential parameter, empty model,
//! invalid integrator setting) is raised by [`Galorbit::new`], before any record is
//! transformed or any orbit integrated.
//!
//! ## Configuration file
//!
//! All sections are optional and fall back to their defaults:
//!
//! ```json
//! {
//!   "frame": { "galcen_distance": 8.122, "z_sun": 0.0208, "v_sun": [12.9, 245.6, 7.78] },
//!   "galactic_pole": { "ra_ngp": 192.85948, "dec_ngp": 27.12825, "lon_ncp": 122.93192 },
//!   "units": { "parallax": "mas", "radial_velocity": "km/s" },
//!   "potential": [
//!     "hernquist:m=1.71e9,c=0.07",
//!     { "kind": "miyamoto_nagai", "m": 6.8e10, "a": 3.0, "b": 0.28 }
//!   ],
//!   "integrator": { "substeps_per_period": 100, "energy_tolerance": 0.005 }
//! }
//! ```
//!
//! ## Typical usage
//!
//! ```rust
//! use galorbit::astrometry::AstrometricRecord;
//! use galorbit::galorbit::{Galorbit, GalorbitConfig};
//! use galorbit::orbit::linspace;
//!
//! let galorbit = Galorbit::new(GalorbitConfig::default()).unwrap();
//!
//! let batch = galorbit.transform_batch(&[
//!     AstrometricRecord::new(45.0, 30.0, 2.0, 5.0, -3.0, Some(20.0)),
//!     AstrometricRecord::new(10.0, -5.0, -0.1, 0.0, 0.0, None),
//! ]);
//! assert_eq!(batch.dropped_count(), 1);
//!
//! let trajectory = galorbit
//!     .integrate(&batch.records[0].state, &linspace(0.0, 0.5, 50))
//!     .unwrap();
//! assert_eq!(trajectory.len(), 50);
//! ```

use camino::Utf8Path;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::{
    astrometry::{AstrometricRecord, CartesianState, CoordinateTransformer, TransformedBatch},
    constants::Gyr,
    galorbit_errors::GalorbitError,
    orbit::{
        integrator::{IntegratorSettings, OrbitIntegrator},
        Trajectory,
    },
    potential::{ComponentSpec, PotentialModel},
    ref_system::{GalacticPole, GalactocentricFrame},
    units::AstrometricUnits,
};

/// Complete configuration of a [`Galorbit`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalorbitConfig {
    pub frame: GalactocentricFrame,
    pub galactic_pole: GalacticPole,
    pub units: AstrometricUnits,
    /// Potential components, as JSON objects or compact `"kind:k=v,..."` strings.
    #[serde(deserialize_with = "deserialize_component_specs")]
    pub potential: Vec<ComponentSpec>,
    pub integrator: IntegratorSettings,
}

impl Default for GalorbitConfig {
    /// Default frame and units, the [`PotentialModel::milky_way`] components and the default
    /// integrator settings.
    fn default() -> Self {
        GalorbitConfig {
            frame: GalactocentricFrame::default(),
            galactic_pole: GalacticPole::default(),
            units: AstrometricUnits::default(),
            potential: PotentialModel::milky_way()
                .components()
                .iter()
                .map(ComponentSpec::from)
                .collect(),
            integrator: IntegratorSettings::default(),
        }
    }
}

fn deserialize_component_specs<'de, D>(deserializer: D) -> Result<Vec<ComponentSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Compact(String),
        Full(ComponentSpec),
    }

    Vec::<Entry>::deserialize(deserializer)?
        .into_iter()
        .map(|entry| match entry {
            Entry::Compact(s) => s.parse().map_err(serde::de::Error::custom),
            Entry::Full(spec) => Ok(spec),
        })
        .collect()
}

impl GalorbitConfig {
    pub fn from_json_str(json: &str) -> Result<Self, GalorbitError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: &Utf8Path) -> Result<Self, GalorbitError> {
        let config = GalorbitConfig::from_json_str(&std::fs::read_to_string(path)?)?;
        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

/// Validated transformer, potential and integrator built from a [`GalorbitConfig`].
#[derive(Debug, Clone)]
pub struct Galorbit {
    config: GalorbitConfig,
    transformer: CoordinateTransformer,
    potential: PotentialModel,
    integrator: OrbitIntegrator,
}

impl Galorbit {
    /// Validate the configuration and build every component.
    pub fn new(config: GalorbitConfig) -> Result<Self, GalorbitError> {
        let transformer =
            CoordinateTransformer::new(&config.galactic_pole, &config.frame, &config.units)?;
        let potential = PotentialModel::from_specs(&config.potential)?;
        let integrator = OrbitIntegrator::new(config.integrator)?;

        info!(
            "Galorbit ready: {} potential components, {} substeps per period",
            potential.components().len(),
            config.integrator.substeps_per_period
        );
        Ok(Galorbit {
            config,
            transformer,
            potential,
            integrator,
        })
    }

    pub fn from_json_path(path: &Utf8Path) -> Result<Self, GalorbitError> {
        Galorbit::new(GalorbitConfig::from_json_path(path)?)
    }

    pub fn config(&self) -> &GalorbitConfig {
        &self.config
    }

    pub fn transformer(&self) -> &CoordinateTransformer {
        &self.transformer
    }

    pub fn potential(&self) -> &PotentialModel {
        &self.potential
    }

    pub fn integrator(&self) -> &OrbitIntegrator {
        &self.integrator
    }

    pub fn transform_batch(&self, records: &[AstrometricRecord]) -> TransformedBatch {
        self.transformer.transform_batch(records)
    }

    pub fn integrate(
        &self,
        initial: &CartesianState,
        times: &[Gyr],
    ) -> Result<Trajectory, GalorbitError> {
        self.integrator.integrate(initial, &self.potential, times)
    }

    /// Integrate the orbit of every record of a transformed batch.
    ///
    /// Return
    /// ----------
    /// * `(source_index, result)` pairs, in the order of `batch.records`.
    pub fn integrate_batch(
        &self,
        batch: &TransformedBatch,
        times: &[Gyr],
    ) -> Vec<(usize, Result<Trajectory, GalorbitError>)> {
        let initial: Vec<CartesianState> = batch.states().copied().collect();
        batch
            .records
            .iter()
            .map(|r| r.index)
            .zip(
                self.integrator
                    .integrate_many(&initial, &self.potential, times),
            )
            .collect()
    }
}
