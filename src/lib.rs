pub mod astrometry;
pub mod constants;
pub mod conversion;
pub mod galorbit;
pub mod galorbit_errors;
pub mod orbit;
pub mod potential;
pub mod ref_system;
pub mod units;

pub use astrometry::{AstrometricRecord, CartesianState, CoordinateTransformer, TransformedBatch};
pub use galorbit::{Galorbit, GalorbitConfig};
pub use galorbit_errors::GalorbitError;
pub use orbit::{integrator::OrbitIntegrator, OrbitState, Trajectory};
pub use potential::{PotentialComponent, PotentialModel};
