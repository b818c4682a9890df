//! # Potential component specifications
//!
//! A [`ComponentSpec`] is the configuration-side description of a potential component: a
//! kind and a bag of named parameters. It is validated into a [`PotentialComponent`]
//! before any computation takes place, so that missing, unknown or non-physical
//! parameters surface as configuration errors at setup.
//!
//! Two equivalent input forms are accepted:
//!
//! ```text
//! JSON:    {"kind": "miyamoto_nagai", "m": 6.8e10, "a": 3.0, "b": 0.28}
//! compact: "miyamoto_nagai:m=6.8e10,a=3.0,b=0.28"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{galorbit_errors::GalorbitError, potential::component::PotentialComponent};

/// Configuration-side description of a potential component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub kind: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, f64>,
}

/// Parameter list of a component kind: `(name, default)`; `None` marks a required parameter.
type ParamTable = &'static [(&'static str, Option<f64>)];

const HERNQUIST_PARAMS: ParamTable = &[("m", None), ("c", None)];
const PLUMMER_PARAMS: ParamTable = &[("m", None), ("b", None)];
const MIYAMOTO_NAGAI_PARAMS: ParamTable = &[("m", None), ("a", None), ("b", None)];
const NFW_PARAMS: ParamTable = &[("m", None), ("r_s", None)];
const LOGARITHMIC_PARAMS: ParamTable = &[
    ("v_c", None),
    ("r_h", None),
    ("q1", Some(1.0)),
    ("q2", Some(1.0)),
    ("q3", Some(1.0)),
];

impl ComponentSpec {
    pub fn new(kind: &str, params: &[(&str, f64)]) -> Self {
        ComponentSpec {
            kind: kind.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// Validate the specification and build the corresponding [`PotentialComponent`].
    ///
    /// Errors
    /// ----------
    /// * [`GalorbitError::UnknownPotentialComponent`] if the kind is not supported.
    /// * [`GalorbitError::MissingPotentialParameter`] if a required parameter is absent.
    /// * [`GalorbitError::UnexpectedPotentialParameter`] if an extra parameter is given.
    /// * [`GalorbitError::InvalidPotentialParameter`] if a value is non-finite or non-physical.
    pub fn build(&self) -> Result<PotentialComponent, GalorbitError> {
        let kind = self.kind.trim().to_ascii_lowercase();
        match kind.as_str() {
            "hernquist" => {
                let p = self.resolve("hernquist", HERNQUIST_PARAMS)?;
                positive("hernquist", "m", p[0])?;
                positive("hernquist", "c", p[1])?;
                Ok(PotentialComponent::Hernquist { m: p[0], c: p[1] })
            }
            "plummer" => {
                let p = self.resolve("plummer", PLUMMER_PARAMS)?;
                positive("plummer", "m", p[0])?;
                positive("plummer", "b", p[1])?;
                Ok(PotentialComponent::Plummer { m: p[0], b: p[1] })
            }
            "miyamoto_nagai" => {
                let p = self.resolve("miyamoto_nagai", MIYAMOTO_NAGAI_PARAMS)?;
                positive("miyamoto_nagai", "m", p[0])?;
                non_negative("miyamoto_nagai", "a", p[1])?;
                positive("miyamoto_nagai", "b", p[2])?;
                Ok(PotentialComponent::MiyamotoNagai {
                    m: p[0],
                    a: p[1],
                    b: p[2],
                })
            }
            "nfw" => {
                let p = self.resolve("nfw", NFW_PARAMS)?;
                positive("nfw", "m", p[0])?;
                positive("nfw", "r_s", p[1])?;
                Ok(PotentialComponent::Nfw { m: p[0], r_s: p[1] })
            }
            "logarithmic" => {
                let p = self.resolve("logarithmic", LOGARITHMIC_PARAMS)?;
                positive("logarithmic", "v_c", p[0])?;
                positive("logarithmic", "r_h", p[1])?;
                positive("logarithmic", "q1", p[2])?;
                positive("logarithmic", "q2", p[3])?;
                positive("logarithmic", "q3", p[4])?;
                Ok(PotentialComponent::Logarithmic {
                    v_c: p[0],
                    r_h: p[1],
                    q1: p[2],
                    q2: p[3],
                    q3: p[4],
                })
            }
            _ => Err(GalorbitError::UnknownPotentialComponent(self.kind.clone())),
        }
    }

    /// Pick the parameters of `table` from the spec, in table order.
    fn resolve(
        &self,
        component: &'static str,
        table: ParamTable,
    ) -> Result<Vec<f64>, GalorbitError> {
        if let Some(extra) = self
            .params
            .keys()
            .find(|k| !table.iter().any(|(name, _)| *name == k.as_str()))
        {
            return Err(GalorbitError::UnexpectedPotentialParameter {
                component,
                parameter: extra.clone(),
            });
        }

        table
            .iter()
            .map(|(name, default)| {
                self.params.get(*name).copied().or(*default).ok_or(
                    GalorbitError::MissingPotentialParameter {
                        component,
                        parameter: *name,
                    },
                )
            })
            .collect()
    }
}

fn positive(
    component: &'static str,
    parameter: &'static str,
    value: f64,
) -> Result<(), GalorbitError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GalorbitError::InvalidPotentialParameter {
            component,
            parameter,
            value,
        })
    }
}

fn non_negative(
    component: &'static str,
    parameter: &'static str,
    value: f64,
) -> Result<(), GalorbitError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GalorbitError::InvalidPotentialParameter {
            component,
            parameter,
            value,
        })
    }
}

impl FromStr for ComponentSpec {
    type Err = GalorbitError;

    /// Parse the compact form `kind:name=value,name=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| GalorbitError::InvalidComponentSpec(s.to_string()))?;
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(GalorbitError::InvalidComponentSpec(s.to_string()));
        }

        let mut params = BTreeMap::new();
        for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| GalorbitError::InvalidComponentSpec(pair.to_string()))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| GalorbitError::InvalidComponentSpec(pair.to_string()))?;
            if params.insert(name.trim().to_string(), value).is_some() {
                return Err(GalorbitError::InvalidComponentSpec(format!(
                    "duplicate parameter '{}'",
                    name.trim()
                )));
            }
        }

        Ok(ComponentSpec {
            kind: kind.to_string(),
            params,
        })
    }
}

impl TryFrom<&str> for ComponentSpec {
    type Error = GalorbitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.kind)?;
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{}", params.join(","))
    }
}

impl From<&PotentialComponent> for ComponentSpec {
    fn from(component: &PotentialComponent) -> Self {
        let kind = component.name();
        match *component {
            PotentialComponent::Hernquist { m, c } => {
                ComponentSpec::new(kind, &[("m", m), ("c", c)])
            }
            PotentialComponent::Plummer { m, b } => {
                ComponentSpec::new(kind, &[("m", m), ("b", b)])
            }
            PotentialComponent::MiyamotoNagai { m, a, b } => {
                ComponentSpec::new(kind, &[("m", m), ("a", a), ("b", b)])
            }
            PotentialComponent::Nfw { m, r_s } => {
                ComponentSpec::new(kind, &[("m", m), ("r_s", r_s)])
            }
            PotentialComponent::Logarithmic {
                v_c,
                r_h,
                q1,
                q2,
                q3,
            } => ComponentSpec::new(
                kind,
                &[("v_c", v_c), ("r_h", r_h), ("q1", q1), ("q2", q2), ("q3", q3)],
            ),
        }
    }
}
