//! Hyperparameter search space

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::learner::Architecture;
use crate::{Error, Result};

/// Parameter value (sampled from domain)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
}

impl ParameterValue {
    /// Get as float (converts int to float if needed)
    pub fn as_float(&self) -> f64 {
        match self {
            Self::Float(v) => *v,
            Self::Int(v) => *v as f64,
        }
    }

    /// Get as int (truncates floats)
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(v) => *v,
            Self::Float(v) => *v as i64,
        }
    }
}

/// Parameter domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterDomain {
    /// Continuous range [low, high], optionally log-scaled
    Continuous { low: f64, high: f64, log_scale: bool },
    /// Discrete integer range [low, high]
    Discrete { low: i64, high: i64 },
    /// One of a fixed set of integers
    Choice { values: Vec<i64> },
}

impl ParameterDomain {
    /// Sample a random value from this domain
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ParameterValue {
        match self {
            Self::Continuous {
                low,
                high,
                log_scale,
            } => {
                let value = if *log_scale {
                    let (log_low, log_high) = (low.ln(), high.ln());
                    (log_low + rng.random::<f64>() * (log_high - log_low)).exp()
                } else {
                    low + rng.random::<f64>() * (high - low)
                };
                ParameterValue::Float(value)
            }
            Self::Discrete { low, high } => ParameterValue::Int(rng.random_range(*low..=*high)),
            Self::Choice { values } => {
                ParameterValue::Int(values[rng.random_range(0..values.len())])
            }
        }
    }

    /// Check that the domain can be sampled at all
    fn check(&self, name: &str) -> Result<()> {
        let ok = match self {
            Self::Continuous {
                low,
                high,
                log_scale,
            } => low.is_finite() && high.is_finite() && low <= high && (!log_scale || *low > 0.0),
            Self::Discrete { low, high } => low <= high,
            Self::Choice { values } => !values.is_empty(),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::Config(format!("search domain for '{name}' is empty or invalid")))
        }
    }

    /// Check if a value is valid for this domain
    pub fn contains(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (Self::Continuous { low, high, .. }, ParameterValue::Float(v)) => v >= low && v <= high,
            (Self::Discrete { low, high }, ParameterValue::Int(v)) => v >= low && v <= high,
            (Self::Choice { values }, ParameterValue::Int(v)) => values.contains(v),
            _ => false,
        }
    }
}

/// A sampled configuration, keyed by parameter name.
pub type Configuration = BTreeMap<String, ParameterValue>;

/// Names the classifier space understands.
pub const HIDDEN_UNITS: &str = "hidden_units";
pub const DROPOUT: &str = "dropout";
pub const L2: &str = "l2";
pub const LEARNING_RATE: &str = "learning_rate";

/// Hyperparameter search space.
///
/// Ordered by name so a seeded sampler always draws parameters in the same
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperparameterSpace {
    params: BTreeMap<String, ParameterDomain>,
}

impl HyperparameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// The space searched for [`SequenceClassifier`](crate::learner::SequenceClassifier).
    pub fn classifier() -> Self {
        let mut space = Self::new();
        space.add(
            HIDDEN_UNITS,
            ParameterDomain::Choice {
                values: vec![32, 64, 128],
            },
        );
        space.add(
            DROPOUT,
            ParameterDomain::Continuous {
                low: 0.0,
                high: 0.5,
                log_scale: false,
            },
        );
        space.add(
            L2,
            ParameterDomain::Continuous {
                low: 1e-6,
                high: 1e-2,
                log_scale: true,
            },
        );
        space.add(
            LEARNING_RATE,
            ParameterDomain::Continuous {
                low: 1e-4,
                high: 1e-2,
                log_scale: true,
            },
        );
        space
    }

    /// Add or replace a parameter
    pub fn add(&mut self, name: &str, domain: ParameterDomain) {
        self.params.insert(name.to_string(), domain);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDomain> {
        self.params.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, domain) in &self.params {
            domain.check(name)?;
        }
        Ok(())
    }

    /// Sample a random configuration
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Configuration {
        self.params
            .iter()
            .map(|(name, domain)| (name.clone(), domain.sample(rng)))
            .collect()
    }
}

/// Overlay a sampled configuration on a base architecture. Parameters the
/// configuration does not mention keep their base value.
pub fn apply(base: &Architecture, config: &Configuration) -> Result<Architecture> {
    let mut arch = base.clone();
    for (name, value) in config {
        match name.as_str() {
            HIDDEN_UNITS => {
                arch.hidden_units = usize::try_from(value.as_int()).map_err(|_| {
                    Error::Config(format!("hidden_units must be positive, got {value:?}"))
                })?
            }
            DROPOUT => arch.dropout = value.as_float() as f32,
            L2 => arch.l2 = value.as_float() as f32,
            LEARNING_RATE => arch.learning_rate = value.as_float() as f32,
            other => {
                return Err(Error::Config(format!("unknown search parameter '{other}'")));
            }
        }
    }
    arch.validate()?;
    Ok(arch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_in_domain() {
        let space = HyperparameterSpace::classifier();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let config = space.sample(&mut rng);
            for (name, value) in &config {
                assert!(space.get(name).unwrap().contains(value), "{name}: {value:?}");
            }
        }
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() {
        let space = HyperparameterSpace::classifier();
        let a = space.sample(&mut StdRng::seed_from_u64(9));
        let b = space.sample(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_apply_overlays_base() {
        let mut config = Configuration::new();
        config.insert(HIDDEN_UNITS.into(), ParameterValue::Int(8));
        config.insert(DROPOUT.into(), ParameterValue::Float(0.25));
        let arch = apply(&Architecture::default(), &config).unwrap();
        assert_eq!(arch.hidden_units, 8);
        assert!((arch.dropout - 0.25).abs() < 1e-6);
        assert_eq!(arch.seq_len, Architecture::default().seq_len);
    }

    #[test]
    fn test_apply_rejects_unknown_and_invalid() {
        let mut config = Configuration::new();
        config.insert("momentum".into(), ParameterValue::Float(0.9));
        assert!(apply(&Architecture::default(), &config).is_err());

        let mut config = Configuration::new();
        config.insert(DROPOUT.into(), ParameterValue::Float(1.5));
        assert!(apply(&Architecture::default(), &config).is_err());
    }

    #[test]
    fn test_validate_catches_empty_domains() {
        let mut space = HyperparameterSpace::new();
        space.add(HIDDEN_UNITS, ParameterDomain::Choice { values: vec![] });
        assert!(space.validate().is_err());
        assert!(HyperparameterSpace::classifier().validate().is_ok());
    }
}
