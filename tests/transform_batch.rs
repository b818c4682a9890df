use approx::assert_relative_eq;
use camino::Utf8Path;
use galorbit::astrometry::{
    gaia_csv::read_gaia_csv_path, AstrometricRecord, CartesianState, CoordinateTransformer,
    RejectionReason,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

mod common;
use common::{assert_state_close, record};

#[test]
fn test_gaia_sample_file() {
    let records = read_gaia_csv_path(Utf8Path::new("tests/data/gaia_sample.csv")).unwrap();
    assert_eq!(records.len(), 6);

    let transformer = CoordinateTransformer::with_defaults().unwrap();
    let batch = transformer.transform_batch(&records);

    assert_eq!(batch.len(), 4);
    assert_eq!(batch.dropped_count(), 2);
    assert_eq!(batch.rejected[0].index, 3);
    assert_eq!(
        batch.rejected[0].reason,
        RejectionReason::NonPositiveParallax(-0.12)
    );
    assert_eq!(batch.rejected[1].index, 5);
    assert_eq!(batch.rejected[1].reason, RejectionReason::NonFiniteParallax);
    assert_eq!(batch.defaulted_radial_velocity_count(), 1);
    assert!(batch.records[2].radial_velocity_defaulted);

    assert_state_close(
        &batch.records[0].state,
        &CartesianState::from_components(
            -8.527710611641437,
            0.20183500462553566,
            -0.1904816094844824,
            -9.543056589286303,
            241.3289864204517,
            -0.5314478742442725,
        ),
        1e-9,
    );
    assert_state_close(
        &batch.records[1].state,
        &CartesianState::from_components(
            -8.17906918645601,
            0.4941107627040049,
            -0.8467221158451738,
            12.9,
            245.6,
            7.78,
        ),
        1e-10,
    );
}

#[test]
fn test_reference_star_sits_one_kpc_from_the_sun() {
    let transformer = CoordinateTransformer::with_defaults().unwrap();
    let (state, _) = transformer
        .transform_record(&AstrometricRecord::new(0.0, 0.0, 1.0, 0.0, 0.0, Some(0.0)))
        .unwrap();
    let offset = state.position - transformer.frame().sun_position();
    assert_relative_eq!(offset.norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_random_batch_keeps_order() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let records: Vec<AstrometricRecord> = (0..2_000)
        .map(|_| {
            let parallax = rng.random_range(-0.5..3.0);
            let rv = if rng.random_bool(0.3) {
                None
            } else {
                Some(rng.random_range(-200.0..200.0))
            };
            record(
                rng.random_range(0.0..360.0),
                rng.random_range(-90.0..90.0),
                parallax,
                rv,
            )
        })
        .collect();

    let transformer = CoordinateTransformer::with_defaults().unwrap();
    let batch = transformer.transform_batch(&records);

    let expected_dropped = records.iter().filter(|r| r.parallax <= 0.0).count();
    assert_eq!(batch.dropped_count(), expected_dropped);
    assert_eq!(batch.len(), records.len() - expected_dropped);
    assert!(batch.records.windows(2).all(|w| w[0].index < w[1].index));

    for transformed in &batch.records {
        let (state, defaulted) = transformer
            .transform_record(&records[transformed.index])
            .unwrap();
        assert_eq!(state, transformed.state);
        assert_eq!(defaulted, records[transformed.index].radial_velocity.is_none());
    }
}

#[test]
fn test_axis_columns_json() {
    let transformer = CoordinateTransformer::with_defaults().unwrap();
    let batch = transformer.transform_batch(&[
        record(10.0, 20.0, 1.0, Some(5.0)),
        record(200.0, -30.0, 0.5, None),
    ]);
    let json = serde_json::to_value(batch.axis_columns()).unwrap();
    for axis in ["x", "y", "z"] {
        assert_eq!(json[axis].as_array().unwrap().len(), 2);
    }
    assert!(batch.max_radius().unwrap() > 6.0);
}
