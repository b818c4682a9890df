//! # Orbit integration (kick–drift–kick leapfrog)
//!
//! [`OrbitIntegrator`] advances a test particle through a [`PotentialModel`] and reports its
//! state at a caller-supplied, strictly increasing sequence of output times.
//!
//! ## Method
//!
//! Second-order symplectic leapfrog in kick–drift–kick form:
//!
//! ```text
//! v ← v + a(x) · h/2
//! x ← x + v · h
//! v ← v + a(x) · h/2
//! ```
//!
//! The acceleration at the end of a step is reused as the first kick of the next one.
//! Velocities are in km/s and time in Gyr; both
//! derivatives are scaled by [`KMS_TO_KPC_PER_GYR`].
//!
//! ## Step size
//!
//! The step length follows the local time scale
//!
//! ```text
//! τ(x, v) = min(2π·sqrt(r / |a|), 2π·sqrt(r² + ℓ²) / |v|) / substeps_per_period
//! ```
//!
//! capped at `max_step`, where `ℓ` is the smallest scale length of the model. The first term
//! is the period of the circular orbit through the current point, the second the time to
//! cross the current radius (or the innermost core) at the current speed. Where neither is
//! defined the step is `max_step`. `substeps_per_period` is at least 50.
//!
//! Each step is time-symmetric: its length solves `h = ½·(τ(start) + τ(end))` by fixed-point
//! iteration, so the energy error of eccentric orbits stays bounded over the run.
//!
//! The step sequence never depends on the requested output times. The state at an output
//! time is obtained by a separate partial step from the last state before it, and the main
//! sequence carries on from that state unchanged. A coarse output cadence therefore never
//! becomes the integration step.
//!
//! ## Conservation checks
//!
//! At every output time the relative energy drift `|E − E0| / |E0|` is compared with
//! [`IntegratorSettings::energy_tolerance`]. For axisymmetric models the drift of `Lz`,
//! scaled by `|r0|·|v0|`, is compared with
//! [`IntegratorSettings::angular_momentum_tolerance`]. A violation aborts the run with
//! [`GalorbitError::NumericInstability`]; more than [`IntegratorSettings::max_steps`]
//! substeps abort it with [`GalorbitError::MaxStepsExceeded`].

use itertools::Itertools;
use nalgebra::Vector3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    astrometry::CartesianState,
    constants::{Gyr, Kpc, DPI, KMS_TO_KPC_PER_GYR},
    galorbit_errors::{ConservedQuantity, GalorbitError},
    orbit::{IntegrationDiagnostics, OrbitState, Trajectory},
    potential::PotentialModel,
};

/// Smallest accepted number of substeps per local dynamical time.
pub const MIN_SUBSTEPS_PER_PERIOD: usize = 50;

/// Fixed-point iterations spent on the length of a time-symmetric step.
const MAX_SYMMETRY_ITERATIONS: usize = 8;
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Position, velocity and the acceleration at that position.
#[derive(Debug, Clone, Copy)]
struct Phase {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    acceleration: Vector3<f64>,
}

impl Phase {
    fn new(model: &PotentialModel, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Phase {
            position,
            velocity,
            acceleration: model.acceleration(&position),
        }
    }

    /// Kick–drift–kick step of length `h` (Gyr).
    fn leapfrog(&self, model: &PotentialModel, h: Gyr) -> Phase {
        let kick = 0.5 * h * KMS_TO_KPC_PER_GYR;
        let half = self.velocity + self.acceleration * kick;
        let position = self.position + half * (h * KMS_TO_KPC_PER_GYR);
        let acceleration = model.acceleration(&position);
        Phase {
            position,
            velocity: half + acceleration * kick,
            acceleration,
        }
    }
}

/// Numeric policy of the [`OrbitIntegrator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    /// Substeps per local dynamical time (≥ 50).
    pub substeps_per_period: usize,
    /// Upper bound on the substep length (Gyr).
    pub max_step: Gyr,
    /// Largest accepted relative energy drift.
    pub energy_tolerance: f64,
    /// Largest accepted drift of `Lz`, relative to `|r0|·|v0|`.
    pub angular_momentum_tolerance: f64,
    /// Largest number of substeps in a single run.
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        IntegratorSettings {
            substeps_per_period: 100,
            max_step: 0.01,
            energy_tolerance: 5e-3,
            angular_momentum_tolerance: 1e-6,
            max_steps: 50_000_000,
        }
    }
}

impl IntegratorSettings {
    pub fn validate(&self) -> Result<(), GalorbitError> {
        if self.substeps_per_period < MIN_SUBSTEPS_PER_PERIOD {
            return Err(GalorbitError::InvalidIntegratorSettings(format!(
                "substeps_per_period must be at least {MIN_SUBSTEPS_PER_PERIOD}, got {}",
                self.substeps_per_period
            )));
        }
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(GalorbitError::InvalidIntegratorSettings(format!(
                "max_step must be a positive number of Gyr, got {}",
                self.max_step
            )));
        }
        for (name, tolerance) in [
            ("energy_tolerance", self.energy_tolerance),
            ("angular_momentum_tolerance", self.angular_momentum_tolerance),
        ] {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(GalorbitError::InvalidIntegratorSettings(format!(
                    "{name} must be positive, got {tolerance}"
                )));
            }
        }
        if self.max_steps == 0 {
            return Err(GalorbitError::InvalidIntegratorSettings(
                "max_steps must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Leapfrog orbit integrator with adaptive substepping and conservation monitoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitIntegrator {
    settings: IntegratorSettings,
}

/// Reference values of the conserved quantities, taken at the first output time.
struct ConservationMonitor {
    energy0: f64,
    lz0: f64,
    lz_scale: Option<f64>,
    diagnostics: IntegrationDiagnostics,
}

impl ConservationMonitor {
    fn new(initial: &OrbitState, model: &PotentialModel) -> Self {
        let lz_scale = if model.is_axisymmetric() {
            let scale = initial.radius() * initial.speed();
            (scale > 0.0).then_some(scale)
        } else {
            None
        };
        ConservationMonitor {
            energy0: initial.energy(model),
            lz0: initial.lz(),
            lz_scale,
            diagnostics: IntegrationDiagnostics {
                max_relative_angular_momentum_drift: lz_scale.map(|_| 0.0),
                ..IntegrationDiagnostics::default()
            },
        }
    }

    fn check(
        &mut self,
        state: &OrbitState,
        model: &PotentialModel,
        settings: &IntegratorSettings,
    ) -> Result<(), GalorbitError> {
        let energy = state.energy(model);
        let energy_drift = if self.energy0 != 0.0 {
            ((energy - self.energy0) / self.energy0).abs()
        } else {
            (energy - self.energy0).abs()
        };
        self.diagnostics.max_relative_energy_drift =
            self.diagnostics.max_relative_energy_drift.max(energy_drift);
        // written so that a NaN drift fails the check
        if !(energy_drift <= settings.energy_tolerance) {
            return Err(unstable(
                ConservedQuantity::Energy,
                state.time,
                energy_drift,
                settings.energy_tolerance,
            ));
        }

        if let Some(scale) = self.lz_scale {
            let lz_drift = (state.lz() - self.lz0).abs() / scale;
            self.diagnostics.max_relative_angular_momentum_drift = self
                .diagnostics
                .max_relative_angular_momentum_drift
                .map(|d| d.max(lz_drift));
            if !(lz_drift <= settings.angular_momentum_tolerance) {
                return Err(unstable(
                    ConservedQuantity::AngularMomentumZ,
                    state.time,
                    lz_drift,
                    settings.angular_momentum_tolerance,
                ));
            }
        }
        Ok(())
    }
}

fn unstable(quantity: ConservedQuantity, time: Gyr, drift: f64, tolerance: f64) -> GalorbitError {
    warn!(
        "Orbit integration unstable: {} drift {:e} exceeds {:e} at t = {} Gyr",
        quantity, drift, tolerance, time
    );
    GalorbitError::NumericInstability {
        quantity,
        time,
        drift,
        tolerance,
    }
}

fn validate_times(times: &[Gyr]) -> Result<(), GalorbitError> {
    if let Some(t) = times.iter().find(|t| !t.is_finite()) {
        return Err(GalorbitError::InvalidTimeGrid(format!(
            "output times must be finite, got {t}"
        )));
    }
    if let Some((i, (a, b))) = times
        .iter()
        .tuple_windows()
        .enumerate()
        .find(|(_, (a, b))| b <= a)
    {
        return Err(GalorbitError::InvalidTimeGrid(format!(
            "output times must be strictly increasing, got {a} then {b} at index {}",
            i + 1
        )));
    }
    Ok(())
}

impl OrbitIntegrator {
    pub fn new(settings: IntegratorSettings) -> Result<Self, GalorbitError> {
        settings.validate()?;
        Ok(OrbitIntegrator { settings })
    }

    pub fn settings(&self) -> &IntegratorSettings {
        &self.settings
    }

    /// Local step length `τ` (Gyr) at `phase`, for a model of smallest scale length `scale`.
    fn step_size(&self, phase: &Phase, scale: Kpc) -> Gyr {
        let r = phase.position.norm();
        let orbital = DPI * (r / phase.acceleration.norm()).sqrt();
        let crossing = DPI * (r * r + scale * scale).sqrt() / phase.velocity.norm();
        // kpc/(km/s) → Gyr
        let t_loc = orbital.min(crossing) / KMS_TO_KPC_PER_GYR;

        if t_loc.is_finite() && t_loc > 0.0 {
            (t_loc / self.settings.substeps_per_period as f64).min(self.settings.max_step)
        } else {
            self.settings.max_step
        }
    }

    /// One time-symmetric leapfrog step from `phase`.
    fn symmetric_step(&self, model: &PotentialModel, phase: &Phase, scale: Kpc) -> (Gyr, Phase) {
        let tau0 = self.step_size(phase, scale);
        let mut h = tau0;
        let mut next = phase.leapfrog(model, h);
        for _ in 0..MAX_SYMMETRY_ITERATIONS {
            let h_sym = 0.5 * (tau0 + self.step_size(&next, scale));
            if (h_sym - h).abs() <= SYMMETRY_TOLERANCE * h {
                break;
            }
            h = h_sym;
            next = phase.leapfrog(model, h);
        }
        (h, next)
    }

    /// Integrate `initial` through `model` and report the state at each of `times`.
    ///
    /// Arguments
    /// ---------
    /// * `initial`: Galactocentric state at `times[0]`.
    /// * `model`: the gravitational potential.
    /// * `times`: strictly increasing output times (Gyr).
    ///
    /// Return
    /// ----------
    /// * A [`Trajectory`] with exactly one state per entry of `times`, the first one being
    ///   `initial`. Zero or one output times return a trivial trajectory without stepping.
    ///
    /// Errors
    /// ----------
    /// * [`GalorbitError::InvalidTimeGrid`] for non-finite or non-increasing times.
    /// * [`GalorbitError::InvalidInitialState`] for a non-finite initial state.
    /// * [`GalorbitError::NumericInstability`] when a conserved quantity drifts beyond tolerance.
    /// * [`GalorbitError::MaxStepsExceeded`] when the run needs more than `max_steps` substeps.
    pub fn integrate(
        &self,
        initial: &CartesianState,
        model: &PotentialModel,
        times: &[Gyr],
    ) -> Result<Trajectory, GalorbitError> {
        validate_times(times)?;
        if !initial.is_finite() {
            return Err(GalorbitError::InvalidInitialState(format!(
                "non-finite position or velocity: {:?}",
                initial
            )));
        }

        let Some((&t0, rest)) = times.split_first() else {
            return Ok(Trajectory::default());
        };

        let first = OrbitState::from_cartesian(t0, initial);
        let mut monitor = ConservationMonitor::new(&first, model);
        let mut states = Vec::with_capacity(times.len());
        states.push(first);

        let scale = model.scale_length();
        let mut t = t0;
        let mut phase = Phase::new(model, initial.position, initial.velocity);
        let mut pending: Option<(Gyr, Phase)> = None;
        let mut substeps = 0_usize;

        for &t_next in rest {
            loop {
                let (h, next) = match pending.take() {
                    Some(step) => step,
                    None => {
                        if substeps >= self.settings.max_steps {
                            warn!(
                                "Orbit integration stopped after {} substeps at t = {} Gyr",
                                substeps, t
                            );
                            return Err(GalorbitError::MaxStepsExceeded(self.settings.max_steps));
                        }
                        self.symmetric_step(model, &phase, scale)
                    }
                };
                if t + h > t_next {
                    pending = Some((h, next));
                    break;
                }
                t += h;
                phase = next;
                substeps += 1;
            }

            let at_output = if t < t_next {
                phase.leapfrog(model, t_next - t)
            } else {
                phase
            };
            let state = OrbitState::new(t_next, at_output.position, at_output.velocity);
            monitor.check(&state, model, &self.settings)?;
            states.push(state);
        }

        let diagnostics = IntegrationDiagnostics {
            substeps,
            ..monitor.diagnostics
        };
        debug!(
            "Integrated orbit from {} to {} Gyr: {} outputs, {} substeps, max energy drift {:e}",
            t0,
            times[times.len() - 1],
            states.len(),
            substeps,
            diagnostics.max_relative_energy_drift
        );
        Ok(Trajectory::new(states, diagnostics))
    }

    /// Integrate independent initial conditions with the same model and output times.
    ///
    /// Return
    /// ----------
    /// * One result per initial condition, in input order. A failing orbit does not affect
    ///   the others.
    pub fn integrate_many(
        &self,
        initial: &[CartesianState],
        model: &PotentialModel,
        times: &[Gyr],
    ) -> Vec<Result<Trajectory, GalorbitError>> {
        #[cfg(feature = "progress")]
        let pb = {
            let pb = ProgressBar::new(initial.len() as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
            ) {
                pb.set_style(style);
            }
            pb
        };

        let run = |state: &CartesianState| {
            let result = self.integrate(state, model, times);
            #[cfg(feature = "progress")]
            pb.inc(1);
            result
        };

        #[cfg(feature = "parallel")]
        let results: Vec<_> = initial.par_iter().map(run).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = initial.iter().map(run).collect();

        #[cfg(feature = "progress")]
        pb.finish_and_clear();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!("{} of {} orbit integrations failed", failed, initial.len());
        }
        results
    }
}

#[cfg(test)]
mod integrator_test {
    use super::*;
    use crate::{orbit::linspace, potential::PotentialComponent, unit_test_global::MILKY_WAY};
    use approx::assert_relative_eq;

    fn circular_orbit() -> (&'static PotentialModel, CartesianState) {
        let state = CartesianState::circular(&MILKY_WAY, 8.0);
        (&*MILKY_WAY, state)
    }

    #[test]
    fn test_settings_validation() {
        assert!(IntegratorSettings::default().validate().is_ok());

        let bad = [
            IntegratorSettings {
                substeps_per_period: 49,
                ..Default::default()
            },
            IntegratorSettings {
                max_step: 0.0,
                ..Default::default()
            },
            IntegratorSettings {
                energy_tolerance: f64::NAN,
                ..Default::default()
            },
            IntegratorSettings {
                angular_momentum_tolerance: -1.0,
                ..Default::default()
            },
            IntegratorSettings {
                max_steps: 0,
                ..Default::default()
            },
        ];
        for settings in bad {
            assert!(matches!(
                OrbitIntegrator::new(settings),
                Err(GalorbitError::InvalidIntegratorSettings(_))
            ));
        }
    }

    #[test]
    fn test_settings_from_partial_json() {
        let settings: IntegratorSettings =
            serde_json::from_str(r#"{"substeps_per_period": 200}"#).unwrap();
        assert_eq!(settings.substeps_per_period, 200);
        assert_eq!(settings.max_steps, IntegratorSettings::default().max_steps);
    }

    #[test]
    fn test_circular_orbit_ten_gyr() {
        let (model, initial) = circular_orbit();
        let times = linspace(0.0, 10.0, 1000);
        let trajectory = OrbitIntegrator::default()
            .integrate(&initial, &model, &times)
            .unwrap();

        assert_eq!(trajectory.len(), 1000);
        assert_eq!(trajectory.times(), times);
        assert_eq!(trajectory.first().unwrap().cartesian(), initial);
        for r in trajectory.radii() {
            assert!((r - 8.0).abs() / 8.0 < 1e-2, "radius drifted to {r}");
        }

        let e0 = trajectory.states()[0].energy(&model);
        for state in trajectory.states() {
            assert_relative_eq!(state.energy(&model), e0, max_relative = 1e-4);
        }
        let diagnostics = trajectory.diagnostics();
        assert!(diagnostics.max_relative_energy_drift < 1e-4);
        assert!(diagnostics.max_relative_angular_momentum_drift.unwrap() < 1e-9);
    }

    #[test]
    fn test_substeps_resolve_the_orbital_period() {
        let (model, initial) = circular_orbit();
        let v_c = initial.vy();
        let period = DPI * 8.0 / v_c / KMS_TO_KPC_PER_GYR;

        // a coarse output cadence must not become the integration step
        let trajectory = OrbitIntegrator::default()
            .integrate(&initial, &model, &[0.0, 10.0])
            .unwrap();
        let periods = 10.0 / period;
        assert!(trajectory.diagnostics().substeps as f64 >= 50.0 * periods);
        assert_relative_eq!(trajectory.last().unwrap().radius(), 8.0, max_relative = 1e-2);
    }

    #[test]
    fn test_determinism() {
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(8.0, 0.0, 0.0, 30.0, 180.0, 40.0);
        let times = linspace(0.0, 2.0, 50);
        let integrator = OrbitIntegrator::default();
        let a = integrator.integrate(&initial, &model, &times).unwrap();
        let b = integrator.integrate(&initial, &model, &times).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_eccentric_orbit_conserves_lz() {
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(8.0, 0.0, 0.0, 30.0, 180.0, 40.0);
        let trajectory = OrbitIntegrator::default()
            .integrate(&initial, &model, &linspace(0.0, 5.0, 500))
            .unwrap();
        let lz0 = trajectory.states()[0].lz();
        for state in trajectory.states() {
            assert_relative_eq!(state.lz(), lz0, max_relative = 1e-8);
        }
        assert!(trajectory.diagnostics().max_relative_energy_drift < 5e-3);
    }

    #[test]
    fn test_trivial_time_grids() {
        let (model, initial) = circular_orbit();
        let integrator = OrbitIntegrator::default();

        let empty = integrator.integrate(&initial, &model, &[]).unwrap();
        assert!(empty.is_empty());

        let single = integrator.integrate(&initial, &model, &[3.5]).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.states()[0], OrbitState::from_cartesian(3.5, &initial));
        assert_eq!(single.diagnostics().substeps, 0);
    }

    #[test]
    fn test_invalid_time_grids() {
        let (model, initial) = circular_orbit();
        let integrator = OrbitIntegrator::default();
        for times in [
            vec![0.0, 1.0, 1.0],
            vec![0.0, 2.0, 1.0],
            vec![0.0, f64::NAN],
            vec![f64::INFINITY],
        ] {
            assert!(matches!(
                integrator.integrate(&initial, &model, &times),
                Err(GalorbitError::InvalidTimeGrid(_))
            ));
        }
    }

    #[test]
    fn test_non_finite_initial_state() {
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(8.0, 0.0, 0.0, f64::NAN, 220.0, 0.0);
        assert!(matches!(
            OrbitIntegrator::default().integrate(&initial, &model, &[0.0, 1.0]),
            Err(GalorbitError::InvalidInitialState(_))
        ));
    }

    #[test]
    fn test_energy_drift_beyond_tolerance_is_an_error() {
        let (model, initial) = circular_orbit();
        let integrator = OrbitIntegrator::new(IntegratorSettings {
            energy_tolerance: 1e-12,
            ..Default::default()
        })
        .unwrap();
        let err = integrator
            .integrate(&initial, &model, &linspace(0.0, 1.0, 10))
            .unwrap_err();
        assert!(matches!(
            err,
            GalorbitError::NumericInstability {
                quantity: ConservedQuantity::Energy,
                ..
            }
        ));
        assert_eq!(
            err.category(),
            crate::galorbit_errors::ErrorCategory::NumericInstability
        );
    }

    #[test]
    fn test_max_steps_guard() {
        let (model, initial) = circular_orbit();
        let integrator = OrbitIntegrator::new(IntegratorSettings {
            max_steps: 10,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            integrator.integrate(&initial, &model, &[0.0, 1.0]),
            Err(GalorbitError::MaxStepsExceeded(10))
        );
    }

    #[test]
    fn test_triaxial_halo_skips_lz_check() {
        let model = PotentialModel::new(vec![PotentialComponent::Logarithmic {
            v_c: 220.0,
            r_h: 1.0,
            q1: 1.0,
            q2: 0.8,
            q3: 0.9,
        }])
        .unwrap();
        let initial = CartesianState::from_components(8.0, 0.0, 0.5, 0.0, 200.0, 10.0);
        let trajectory = OrbitIntegrator::default()
            .integrate(&initial, &model, &linspace(0.0, 1.0, 20))
            .unwrap();
        assert_eq!(trajectory.diagnostics().max_relative_angular_momentum_drift, None);
    }

    #[test]
    fn test_passing_through_the_centre() {
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(1.0, 0.0, 0.0, -50.0, 0.0, 0.0);
        let trajectory = OrbitIntegrator::default()
            .integrate(&initial, &model, &linspace(0.0, 1.0, 10))
            .unwrap();
        assert!(trajectory.states().iter().all(|s| s.cartesian().is_finite()));
        assert!(trajectory.radii().iter().any(|&r| r < 0.5));
    }

    /// Largest relative energy error over the states up to `t_max`.
    fn max_energy_drift(trajectory: &Trajectory, model: &PotentialModel, t_max: Gyr) -> f64 {
        let e0 = trajectory.states()[0].energy(model);
        trajectory
            .states()
            .iter()
            .take_while(|s| s.time <= t_max)
            .map(|s| ((s.energy(model) - e0) / e0).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_eccentric_orbit_energy_error_does_not_grow() {
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(8.0, 0.0, 0.0, 0.0, 60.0, 0.0);
        let trajectory = OrbitIntegrator::default()
            .integrate(&initial, &model, &linspace(0.0, 40.0, 4001))
            .unwrap();

        let early = max_energy_drift(&trajectory, &model, 5.0);
        let late = max_energy_drift(&trajectory, &model, 40.0);
        assert!(early > 0.0);
        assert!(late <= 1.2 * early, "drift grew from {early:e} to {late:e}");
        assert!(late < 1e-3);
        assert_relative_eq!(trajectory.diagnostics().max_relative_energy_drift, late);
    }

    #[test]
    fn test_output_times_do_not_change_the_orbit() {
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(8.0, 0.0, 0.0, 30.0, 180.0, 40.0);
        let integrator = OrbitIntegrator::default();
        let coarse = integrator
            .integrate(&initial, &model, &linspace(0.0, 4.0, 5))
            .unwrap();
        let fine = integrator
            .integrate(&initial, &model, &linspace(0.0, 4.0, 4001))
            .unwrap();

        assert_eq!(coarse.last(), fine.last());
        assert_eq!(coarse.diagnostics().substeps, fine.diagnostics().substeps);
    }

    #[test]
    fn test_radial_orbit_through_the_centre() {
        // the force changes direction discontinuously at the cusped centre
        let model = PotentialModel::milky_way();
        let initial = CartesianState::from_components(8.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let trajectory = OrbitIntegrator::new(IntegratorSettings {
            substeps_per_period: 200,
            ..Default::default()
        })
        .unwrap()
        .integrate(&initial, &model, &linspace(0.0, 10.0, 1001))
        .unwrap();

        let first_gyr = max_energy_drift(&trajectory, &model, 1.0);
        let whole = max_energy_drift(&trajectory, &model, 10.0);
        assert!(whole <= 1.2 * first_gyr, "drift grew from {first_gyr:e} to {whole:e}");
        assert!(trajectory.radii().iter().any(|&r| r < 0.5));
    }

    #[test]
    fn test_integrate_many_keeps_order() {
        let model = PotentialModel::milky_way();
        let initial: Vec<_> = [6.0, 8.0, 10.0]
            .iter()
            .map(|&r| CartesianState::circular(&model, r))
            .chain(std::iter::once(CartesianState::from_components(
                f64::NAN,
                0.0,
                0.0,
                0.0,
                0.0,
                0.0,
            )))
            .collect();
        let times = linspace(0.0, 0.5, 5);
        let integrator = OrbitIntegrator::default();
        let results = integrator.integrate_many(&initial, &model, &times);

        assert_eq!(results.len(), 4);
        for (state, result) in initial.iter().zip(&results).take(3) {
            let trajectory = result.as_ref().unwrap();
            assert_eq!(trajectory, &integrator.integrate(state, &model, &times).unwrap());
        }
        assert!(results[3].is_err());
    }
}
