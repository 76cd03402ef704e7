//! Logistic regrowth of a population on a moisture-retaining substrate.

use crate::error::{ModelError, check_num, check_pos};
use crate::model::Trajectory;
use crate::rates::RateParams;
use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether `t_max` is a multiple of `dt`.
const GRID_TOL: f64 = 1e-9;

/// Largest number of integration steps of one run.
pub const MAX_STEPS: f64 = 1e7;

/// Largest accepted initial population.
pub const MAX_N_INIT: f64 = 1e5;

/// Growth parameters shared by every growth condition.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct GrowthParams {
    /// Initial population.
    #[serde(default = "default_n_init")]
    pub n_init: f64,
    /// Base growth rate (day⁻¹).
    #[serde(default = "default_rate_base")]
    pub rate_base: f64,
    /// Carrying capacity.
    #[serde(default = "default_capacity")]
    pub capacity: f64,
    /// Simulation length (days).
    #[serde(default = "default_t_max")]
    pub t_max: f64,
    /// Time step (days).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Humidity retained by the substrate over ambient (%).
    #[serde(default = "default_retention")]
    pub retention: f64,
}

fn default_n_init() -> f64 {
    100.0
}

fn default_rate_base() -> f64 {
    0.8
}

fn default_capacity() -> f64 {
    5e5
}

fn default_t_max() -> f64 {
    30.0
}

fn default_dt() -> f64 {
    0.05
}

fn default_retention() -> f64 {
    20.0
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            n_init: default_n_init(),
            rate_base: default_rate_base(),
            capacity: default_capacity(),
            t_max: default_t_max(),
            dt: default_dt(),
            retention: default_retention(),
        }
    }
}

impl GrowthParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        check_pos("n_init", self.n_init)?;
        check_num("n_init", self.n_init, ..=MAX_N_INIT)?;
        check_num("rate_base", self.rate_base, 0.0..f64::INFINITY)?;
        check_pos("capacity", self.capacity)?;
        check_num("t_max", self.t_max, 0.0..f64::INFINITY)?;
        check_pos("dt", self.dt)?;
        check_num("dt", self.dt, self.t_max / MAX_STEPS..)?;
        check_num("retention", self.retention, 0.0..=100.0)?;
        Ok(())
    }
}

/// Effect of a humidity rule once local humidity falls below its threshold.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum HumidityEffect {
    /// Replace the moisture multiplier `local_rel_hum / 100` with a fixed value.
    MoisturePenalty(f64),
    /// Subtract `rate * N` from the logistic increment.
    DieOff(f64),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct HumidityRule {
    /// The rule applies when local humidity is strictly below this value (%).
    pub below: f64,
    pub effect: HumidityEffect,
}

impl HumidityRule {
    pub fn applies(&self, local_rel_hum: f64) -> bool {
        local_rel_hum < self.below
    }
}

/// Ordered set of humidity rules.
///
/// For each kind of effect only the first applicable rule counts.
#[derive(Debug, PartialEq, Clone)]
pub struct HumidityPolicy {
    rules: Vec<HumidityRule>,
}

impl HumidityPolicy {
    pub fn new(rules: Vec<HumidityRule>) -> Self {
        Self { rules }
    }

    /// Rules that apply at `local_rel_hum`, in policy order.
    pub fn active_rules(&self, local_rel_hum: f64) -> impl Iterator<Item = &HumidityRule> {
        self.rules.iter().filter(move |rule| rule.applies(local_rel_hum))
    }

    /// Multiplier applied to the growth rate for moisture availability.
    pub fn moisture_multiplier(&self, local_rel_hum: f64) -> f64 {
        self.active_rules(local_rel_hum)
            .find_map(|rule| match rule.effect {
                HumidityEffect::MoisturePenalty(mult) => Some(mult),
                HumidityEffect::DieOff(_) => None,
            })
            .unwrap_or(local_rel_hum / 100.0)
    }

    /// Additional per-capita die-off rate (day⁻¹).
    pub fn die_off_rate(&self, local_rel_hum: f64) -> f64 {
        self.active_rules(local_rel_hum)
            .find_map(|rule| match rule.effect {
                HumidityEffect::DieOff(rate) => Some(rate),
                HumidityEffect::MoisturePenalty(_) => None,
            })
            .unwrap_or(0.0)
    }
}

/// Thresholds and constants of the default two-rule humidity policy.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyParams {
    #[serde(default = "default_moist_threshold")]
    pub moist_threshold: f64,
    #[serde(default = "default_moist_penalty")]
    pub moist_penalty: f64,
    #[serde(default = "default_die_off_threshold")]
    pub die_off_threshold: f64,
    #[serde(default = "default_die_off_rate")]
    pub die_off_rate: f64,
}

fn default_moist_threshold() -> f64 {
    20.0
}

fn default_moist_penalty() -> f64 {
    0.02
}

fn default_die_off_threshold() -> f64 {
    30.0
}

fn default_die_off_rate() -> f64 {
    0.01
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            moist_threshold: default_moist_threshold(),
            moist_penalty: default_moist_penalty(),
            die_off_threshold: default_die_off_threshold(),
            die_off_rate: default_die_off_rate(),
        }
    }
}

impl PolicyParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        check_num("moist_threshold", self.moist_threshold, 0.0..=100.0)?;
        check_num("moist_penalty", self.moist_penalty, 0.0..f64::INFINITY)?;
        check_num("die_off_threshold", self.die_off_threshold, 0.0..=100.0)?;
        check_num("die_off_rate", self.die_off_rate, 0.0..f64::INFINITY)?;
        Ok(())
    }

    pub fn policy(&self) -> HumidityPolicy {
        HumidityPolicy::new(vec![
            HumidityRule {
                below: self.moist_threshold,
                effect: HumidityEffect::MoisturePenalty(self.moist_penalty),
            },
            HumidityRule {
                below: self.die_off_threshold,
                effect: HumidityEffect::DieOff(self.die_off_rate),
            },
        ])
    }
}

impl Default for HumidityPolicy {
    fn default() -> Self {
        PolicyParams::default().policy()
    }
}

/// Humidity seen on the substrate: ambient plus retention, saturating at 100.
pub fn local_rel_hum(amb_rel_hum: f64, retention: f64) -> f64 {
    (amb_rel_hum + retention).min(100.0)
}

/// Outcome of one logistic growth simulation.
#[derive(Debug, Clone)]
pub struct LogisticRun {
    pub traj: Trajectory,
    pub local_rel_hum: f64,
    pub rate_env: f64,
    pub rate_die_off: f64,
}

/// Uniform grid from 0 to `t_max` with step `dt`, including `t_max` when it is a multiple of `dt`.
fn time_grid(t_max: f64, dt: f64) -> Vec<f64> {
    let ratio = t_max / dt;
    let n_steps = (ratio + GRID_TOL).floor() as usize;
    let ends_on_t_max = (ratio - n_steps as f64).abs() <= GRID_TOL;

    (0..=n_steps)
        .map(|i_step| {
            if i_step == n_steps && ends_on_t_max {
                t_max
            } else {
                i_step as f64 * dt
            }
        })
        .collect()
}

/// Integrate logistic growth at temperature `temp` and ambient humidity `amb_rel_hum`.
///
/// Forward Euler with a floor at zero:
/// `N' = rate_env * N * (1 - N / K) - rate_die_off * N`.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] if `temp` is not finite, `amb_rel_hum`
/// is outside `[0, 100]` or any growth parameter is out of range, and
/// [`ModelError::NumericDegeneracy`] if the environmental rate overflows.
pub fn simulate_logistic_growth(
    rates: &RateParams,
    par: &GrowthParams,
    policy: &HumidityPolicy,
    temp: f64,
    amb_rel_hum: f64,
) -> Result<LogisticRun, ModelError> {
    check_num("temp", temp, f64::MIN..=f64::MAX)?;
    check_num("amb_rel_hum", amb_rel_hum, 0.0..=100.0)?;
    par.validate()?;

    let local_rel_hum = local_rel_hum(amb_rel_hum, par.retention);
    let temp_factor = rates.q10_temp_factor(temp);
    let moist_mult = policy.moisture_multiplier(local_rel_hum);
    let rate_env = par.rate_base * temp_factor * moist_mult;
    if !rate_env.is_finite() {
        return Err(ModelError::NumericDegeneracy {
            name: "rate_env",
            value: rate_env,
        });
    }
    let rate_die_off = policy.die_off_rate(local_rel_hum);

    let time = time_grid(par.t_max, par.dt);
    log::debug!(
        "local RH {local_rel_hum}%, {} grid points, {} active rules",
        time.len(),
        policy.active_rules(local_rel_hum).count()
    );

    let mut pop = Vec::with_capacity(time.len());
    let mut n = par.n_init;
    pop.push(n);
    for _ in 1..time.len() {
        let mut dn = rate_env * n * (1.0 - n / par.capacity);
        dn -= rate_die_off * n;
        n = (n + dn * par.dt).max(0.0);
        pop.push(n);
    }

    Ok(LogisticRun {
        traj: Trajectory::new(time, pop),
        local_rel_hum,
        rate_env,
        rate_die_off,
    })
}
