#![allow(dead_code)]

use approx::assert_relative_eq;
use galorbit::astrometry::{AstrometricRecord, CartesianState};
use galorbit::orbit::Trajectory;

/// Gaia-like record at the given sky position and parallax, with fixed small motions.
pub fn record(ra: f64, dec: f64, parallax: f64, radial_velocity: Option<f64>) -> AstrometricRecord {
    AstrometricRecord::new(ra, dec, parallax, 1.5, -2.0, radial_velocity)
}

pub fn assert_state_close(actual: &CartesianState, expected: &CartesianState, epsilon: f64) {
    assert_relative_eq!(actual.x(), expected.x(), epsilon = epsilon);
    assert_relative_eq!(actual.y(), expected.y(), epsilon = epsilon);
    assert_relative_eq!(actual.z(), expected.z(), epsilon = epsilon);
    assert_relative_eq!(actual.vx(), expected.vx(), epsilon = epsilon);
    assert_relative_eq!(actual.vy(), expected.vy(), epsilon = epsilon);
    assert_relative_eq!(actual.vz(), expected.vz(), epsilon = epsilon);
}

/// Largest relative deviation of the trajectory radius from `radius`.
pub fn max_radial_deviation(trajectory: &Trajectory, radius: f64) -> f64 {
    trajectory
        .radii()
        .into_iter()
        .map(|r| (r - radius).abs() / radius)
        .fold(0.0, f64::max)
}
