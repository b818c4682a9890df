use thiserror::Error;

use crate::constants::Gyr;

/// Coarse classification of [`GalorbitError`] values.
///
/// Record-level validation problems never surface as errors: they are reported as
/// [`RejectedRecord`](crate::astrometry::RejectedRecord) entries alongside the successful
/// results of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Inconsistent units, missing or non-physical parameters, invalid inputs to a run.
    Configuration,
    /// Conservation drift detected during integration, or a runaway integration.
    NumericInstability,
    /// Reading configuration or catalog files.
    Io,
}

/// Conserved quantity monitored by the orbit integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConservedQuantity {
    Energy,
    AngularMomentumZ,
}

impl std::fmt::Display for ConservedQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConservedQuantity::Energy => write!(f, "total energy"),
            ConservedQuantity::AngularMomentumZ => write!(f, "angular momentum Lz"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GalorbitError {
    #[error("Unknown unit symbol: {0}")]
    UnknownUnit(String),

    #[error("Unit mismatch for {quantity}: expected a {expected} unit, got '{found}'")]
    UnitMismatch {
        quantity: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid frame parameter {name}: {value}")]
    InvalidFrameParameter { name: &'static str, value: f64 },

    #[error("Potential model must contain at least one component")]
    EmptyPotentialModel,

    #[error("Unknown potential component: {0}")]
    UnknownPotentialComponent(String),

    #[error("Missing parameter '{parameter}' for potential component {component}")]
    MissingPotentialParameter {
        component: &'static str,
        parameter: &'static str,
    },

    #[error("Unexpected parameter '{parameter}' for potential component {component}")]
    UnexpectedPotentialParameter {
        component: &'static str,
        parameter: String,
    },

    #[error("Invalid value {value} for parameter '{parameter}' of potential component {component}")]
    InvalidPotentialParameter {
        component: &'static str,
        parameter: &'static str,
        value: f64,
    },

    #[error("Invalid potential component specification: {0}")]
    InvalidComponentSpec(String),

    #[error("Invalid integrator settings: {0}")]
    InvalidIntegratorSettings(String),

    #[error("Invalid time grid: {0}")]
    InvalidTimeGrid(String),

    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    #[error(
        "Numeric instability: relative drift of {quantity} reached {drift:e} at t = {time} Gyr (tolerance {tolerance:e})"
    )]
    NumericInstability {
        quantity: ConservedQuantity,
        time: Gyr,
        drift: f64,
        tolerance: f64,
    },

    #[error("Integration exceeded the maximum number of substeps ({0})")]
    MaxStepsExceeded(usize),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV reading error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON configuration error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GalorbitError {
    /// Map the error onto its [`ErrorCategory`].
    pub fn category(&self) -> ErrorCategory {
        use GalorbitError::*;
        match self {
            NumericInstability { .. } | MaxStepsExceeded(_) => ErrorCategory::NumericInstability,
            IoError(_) | CsvError(_) => ErrorCategory::Io,
            _ => ErrorCategory::Configuration,
        }
    }
}

impl PartialEq for GalorbitError {
    fn eq(&self, other: &Self) -> bool {
        use GalorbitError::*;
        match (self, other) {
            (UnknownUnit(a), UnknownUnit(b)) => a == b,
            (
                UnitMismatch {
                    quantity: q1,
                    found: f1,
                    ..
                },
                UnitMismatch {
                    quantity: q2,
                    found: f2,
                    ..
                },
            ) => q1 == q2 && f1 == f2,
            (
                InvalidFrameParameter { name: a, value: va },
                InvalidFrameParameter { name: b, value: vb },
            ) => a == b && (va == vb || (va.is_nan() && vb.is_nan())),
            (UnknownPotentialComponent(a), UnknownPotentialComponent(b)) => a == b,
            (
                MissingPotentialParameter {
                    component: c1,
                    parameter: p1,
                },
                MissingPotentialParameter {
                    component: c2,
                    parameter: p2,
                },
            ) => c1 == c2 && p1 == p2,
            (
                UnexpectedPotentialParameter {
                    component: c1,
                    parameter: p1,
                },
                UnexpectedPotentialParameter {
                    component: c2,
                    parameter: p2,
                },
            ) => c1 == c2 && p1 == p2,
            (
                InvalidPotentialParameter {
                    component: c1,
                    parameter: p1,
                    ..
                },
                InvalidPotentialParameter {
                    component: c2,
                    parameter: p2,
                    ..
                },
            ) => c1 == c2 && p1 == p2,
            (InvalidComponentSpec(a), InvalidComponentSpec(b)) => a == b,
            (InvalidIntegratorSettings(a), InvalidIntegratorSettings(b)) => a == b,
            (InvalidTimeGrid(a), InvalidTimeGrid(b)) => a == b,
            (InvalidInitialState(a), InvalidInitialState(b)) => a == b,
            (MaxStepsExceeded(a), MaxStepsExceeded(b)) => a == b,

            // Drift values are run-dependent: same quantity is enough
            (NumericInstability { quantity: a, .. }, NumericInstability { quantity: b, .. }) => {
                a == b
            }

            // Not comparable: equal when same variant
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (JsonError(_), JsonError(_)) => true,

            (EmptyPotentialModel, EmptyPotentialModel) => true,

            _ => false,
        }
    }
}
