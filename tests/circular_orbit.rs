use approx::assert_relative_eq;
use camino::Utf8Path;
use rand::{rngs::StdRng, Rng, SeedableRng};
use galorbit::{
    astrometry::CartesianState,
    galorbit::Galorbit,
    orbit::linspace,
    potential::PotentialModel,
    GalorbitError,
};

mod common;
use common::max_radial_deviation;

fn galorbit() -> Galorbit {
    Galorbit::from_json_path(Utf8Path::new("tests/data/config.json")).unwrap()
}

#[test]
fn test_circular_orbit_over_ten_gyr() {
    let galorbit = galorbit();
    let initial = CartesianState::circular(galorbit.potential(), 8.0);
    assert_relative_eq!(initial.vy(), 231.76143310957647, max_relative = 1e-9);

    let times = linspace(0.0, 10.0, 1000);
    let trajectory = galorbit.integrate(&initial, &times).unwrap();

    assert_eq!(trajectory.len(), times.len());
    assert!(max_radial_deviation(&trajectory, 8.0) < 1e-2);

    let e0 = trajectory.states()[0].energy(galorbit.potential());
    let max_drift = trajectory
        .states()
        .iter()
        .map(|s| ((s.energy(galorbit.potential()) - e0) / e0).abs())
        .fold(0.0, f64::max);
    assert!(max_drift < 1e-4);
    assert_relative_eq!(
        max_drift,
        trajectory.diagnostics().max_relative_energy_drift,
        max_relative = 1e-12
    );

    // the orbit stays in the midplane
    assert!(trajectory.z().iter().all(|z| *z == 0.0));
}

#[test]
fn test_eccentric_orbit_with_default_settings() {
    let galorbit = galorbit();
    let initial = CartesianState::from_components(8.0, 0.0, 0.0, 0.0, 20.0, 0.0);
    let trajectory = galorbit
        .integrate(&initial, &linspace(0.0, 10.0, 1001))
        .unwrap();

    let model = galorbit.potential();
    let e0 = trajectory.states()[0].energy(model);
    let drift_until = |t_max: f64| {
        trajectory
            .states()
            .iter()
            .take_while(|s| s.time <= t_max)
            .map(|s| ((s.energy(model) - e0) / e0).abs())
            .fold(0.0, f64::max)
    };
    assert!(drift_until(10.0) < 1e-3);
    assert!(drift_until(10.0) <= 1.2 * drift_until(2.0));
    // deep pericentre passages
    assert!(trajectory.radii().iter().any(|&r| r < 1.0));
}

#[test]
fn test_nearby_stars_over_ten_gyr() {
    let galorbit = galorbit();
    let mut rng = StdRng::seed_from_u64(0x0B17);
    let initial: Vec<_> = (0..100)
        .map(|_| {
            CartesianState::from_components(
                -8.12 + rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                0.02 + rng.random_range(-0.3..0.3),
                12.9 + rng.random_range(-80.0..80.0),
                245.6 + rng.random_range(-120.0..60.0),
                7.8 + rng.random_range(-60.0..60.0),
            )
        })
        .collect();

    let times = linspace(0.0, 10.0, 200);
    let results = galorbit
        .integrator()
        .integrate_many(&initial, galorbit.potential(), &times);
    for result in results {
        let trajectory = result.unwrap();
        assert!(trajectory.diagnostics().max_relative_energy_drift < 1e-3);
    }
}

#[test]
fn test_integration_is_deterministic() {
    let galorbit = galorbit();
    let initial = CartesianState::from_components(8.0, 0.0, 0.0, 30.0, 180.0, 40.0);
    let times = linspace(0.0, 1.0, 100);
    let first = galorbit.integrate(&initial, &times).unwrap();
    let second = galorbit.integrate(&initial, &times).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_trivial_time_grids() {
    let galorbit = galorbit();
    let initial = CartesianState::circular(galorbit.potential(), 8.0);

    assert!(galorbit.integrate(&initial, &[]).unwrap().is_empty());

    let single = galorbit.integrate(&initial, &[0.0]).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single.states()[0].cartesian(), initial);
}

#[test]
fn test_flat_rotation_curve_orbits() {
    let model = PotentialModel::logarithmic_halo(220.0, 0.5).unwrap();
    let integrator = galorbit().integrator().clone();
    let initial: Vec<_> = [4.0, 8.0, 16.0]
        .iter()
        .map(|&r| CartesianState::circular(&model, r))
        .collect();
    let results = integrator.integrate_many(&initial, &model, &linspace(0.0, 2.0, 200));
    for (state, result) in initial.iter().zip(results) {
        let trajectory = result.unwrap();
        assert!(max_radial_deviation(&trajectory, state.x()) < 1e-2);
    }
}

#[test]
fn test_non_increasing_times_are_rejected() {
    let galorbit = galorbit();
    let initial = CartesianState::circular(galorbit.potential(), 8.0);
    assert!(matches!(
        galorbit.integrate(&initial, &[0.0, 1.0, 0.5]),
        Err(GalorbitError::InvalidTimeGrid(_))
    ));
}
