use crate::growth::{GrowthParams, HumidityPolicy, PolicyParams};
use crate::model::{DecayCondition, GrowthCondition};
use crate::rates::RateParams;
use crate::runner::Sampling;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Model configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Sensitivity coefficients.
    pub rates: RateParams,
    /// Decay scenario.
    pub decay: DecayConfig,
    /// Growth scenario.
    pub growth: GrowthConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecayConfig {
    /// Initial number of viable cells.
    pub n_cell_init: u64,
    /// Exposure horizon (days).
    pub t_days: f64,
    /// Conditions in output order.
    pub conditions: Vec<DecayCondition>,
    /// Optional replicate sampling.
    #[serde(default)]
    pub sampling: Option<SamplingConfig>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Number of sampled replicates per condition.
    pub n_reps: usize,
    /// Seed of the random number generator.
    pub seed: u64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    #[serde(flatten)]
    pub params: GrowthParams,
    /// Conditions in output order.
    pub conditions: Vec<GrowthCondition>,
    /// Humidity thresholds.
    #[serde(default)]
    pub policy: PolicyParams,
    /// Keys not claimed by any growth field.
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.rates.validate().context("invalid rates")?;
        self.decay.validate().context("invalid decay")?;
        self.growth.validate().context("invalid growth")?;
        Ok(())
    }
}

impl DecayConfig {
    fn validate(&self) -> Result<()> {
        if self.n_cell_init < 1 {
            bail!("initial number of cells must be at least 1");
        }
        if !(self.t_days >= 0.0 && self.t_days.is_finite()) {
            bail!("t_days must be a non-negative number, but is {}", self.t_days);
        }
        if self.conditions.is_empty() {
            bail!("at least one condition is required");
        }
        for (i_cond, cond) in self.conditions.iter().enumerate() {
            if !cond.temp.is_finite() {
                bail!("condition {i_cond}: temp must be finite, but is {}", cond.temp);
            }
            if !(0.0..=100.0).contains(&cond.rel_hum) {
                bail!(
                    "condition {i_cond}: rel_hum must be in the range 0.0..=100.0, but is {}",
                    cond.rel_hum
                );
            }
        }
        if let Some(sampling) = &self.sampling {
            if sampling.n_reps < 1 {
                bail!("number of replicates must be at least 1");
            }
        }
        Ok(())
    }

    pub fn sampling(&self) -> Option<Sampling> {
        self.sampling.as_ref().map(|cfg| Sampling {
            n_reps: cfg.n_reps,
            seed: cfg.seed,
        })
    }
}

impl GrowthConfig {
    fn validate(&self) -> Result<()> {
        if let Some(key) = self.unknown.keys().next() {
            bail!("unknown field `{key}`");
        }
        self.params.validate().context("invalid growth parameters")?;
        self.policy.validate().context("invalid humidity policy")?;
        if self.conditions.is_empty() {
            bail!("at least one condition is required");
        }
        for (i_cond, cond) in self.conditions.iter().enumerate() {
            if !cond.temp.is_finite() {
                bail!("condition {i_cond}: temp must be finite, but is {}", cond.temp);
            }
            if !(0.0..=100.0).contains(&cond.amb_rel_hum) {
                bail!(
                    "condition {i_cond}: amb_rel_hum must be in the range 0.0..=100.0, but is {}",
                    cond.amb_rel_hum
                );
            }
        }
        Ok(())
    }

    pub fn policy(&self) -> HumidityPolicy {
        self.policy.policy()
    }
}
