use serde::{Deserialize, Serialize};

/// Environmental condition of a decay run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecayCondition {
    /// Temperature (°C).
    pub temp: f64,
    /// Relative humidity (%), in `[0, 100]`.
    pub rel_hum: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl DecayCondition {
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}°C, {}% RH", self.temp, self.rel_hum),
        }
    }
}

/// Environmental condition of a growth run.
///
/// The substrate sees `amb_rel_hum` raised by the configured retention offset.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrowthCondition {
    /// Temperature (°C).
    pub temp: f64,
    /// Ambient relative humidity (%), in `[0, 100]`.
    pub amb_rel_hum: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl GrowthCondition {
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}°C, {}% RH (cloth local RH)", self.temp, self.amb_rel_hum),
        }
    }
}

/// Population sampled over time.
///
/// Times increase from 0 to the horizon; populations are never negative.
#[derive(Debug, PartialEq, Clone)]
pub struct Trajectory {
    time: Vec<f64>,
    pop: Vec<f64>,
}

impl Trajectory {
    pub fn new(time: Vec<f64>, pop: Vec<f64>) -> Self {
        debug_assert_eq!(time.len(), pop.len());
        Self { time, pop }
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn pop(&self) -> &[f64] {
        &self.pop
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Iterate over `(time, population)` samples.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time().iter().copied().zip(self.pop().iter().copied())
    }

    /// Last sample, if any.
    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.time.last()?, *self.pop.last()?))
    }
}

/// Analytic survival statistics at the horizon.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SurvivalStats {
    /// Probability a single cell remains viable.
    pub prob_surv: f64,
    /// Expected number of viable cells.
    pub exp_surv: f64,
    /// Probability that no cell remains viable.
    pub prob_ext: f64,
}

/// Monte-Carlo summary of realised survivor counts.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SampleSummary {
    pub n_reps: usize,
    pub mean_surv: f64,
    pub std_dev_surv: f64,
    /// Fraction of replicates with no survivors.
    pub freq_ext: f64,
}

#[derive(Debug, Clone)]
pub struct DecayResult {
    pub label: String,
    /// Death rate (day⁻¹).
    pub rate: f64,
    pub traj: Trajectory,
    pub stats: SurvivalStats,
    pub sampled: Option<SampleSummary>,
}

#[derive(Debug, Clone)]
pub struct GrowthResult {
    pub label: String,
    /// Local relative humidity (%), at most 100.
    pub local_rel_hum: f64,
    /// Environment-scaled growth rate (day⁻¹).
    pub rate_env: f64,
    /// Die-off rate active for this humidity (day⁻¹).
    pub rate_die_off: f64,
    pub traj: Trajectory,
}
