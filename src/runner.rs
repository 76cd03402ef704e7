use crate::decay::{deterministic_decay, sample_survivors, survival_stats};
use crate::error::{ModelError, RunError};
use crate::growth::{GrowthParams, HumidityPolicy, simulate_logistic_growth};
use crate::model::{DecayCondition, DecayResult, GrowthCondition, GrowthResult};
use crate::rates::RateParams;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Replicate sampling settings of a decay run.
#[derive(Debug, PartialEq, Clone)]
pub struct Sampling {
    pub n_reps: usize,
    pub seed: u64,
}

/// Runs each condition through the rate model and one engine, preserving input order.
///
/// The first failing condition aborts the run and no partial results are returned.
pub struct ConditionRunner {
    rates: RateParams,
}

impl ConditionRunner {
    /// # Errors
    /// Returns [`ModelError::InvalidParameter`] if a sensitivity is negative or Q10 is not positive.
    pub fn new(rates: RateParams) -> Result<Self, ModelError> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn run_decay(
        &self,
        conds: &[DecayCondition],
        n_cell_init: u64,
        t_days: f64,
        sampling: Option<&Sampling>,
    ) -> Result<Vec<DecayResult>, RunError> {
        let mut results = Vec::with_capacity(conds.len());
        for (index, cond) in conds.iter().enumerate() {
            let label = cond.label();
            let result = self
                .decay_condition(cond, label.clone(), n_cell_init, t_days, sampling)
                .map_err(|source| RunError::Condition {
                    index,
                    label,
                    source,
                })?;
            log::info!("{}: d = {:.3} day⁻¹", result.label, result.rate);
            results.push(result);
        }
        Ok(results)
    }

    pub fn run_growth(
        &self,
        conds: &[GrowthCondition],
        par: &GrowthParams,
        policy: &HumidityPolicy,
    ) -> Result<Vec<GrowthResult>, RunError> {
        let mut results = Vec::with_capacity(conds.len());
        for (index, cond) in conds.iter().enumerate() {
            let label = cond.label();
            let run = simulate_logistic_growth(&self.rates, par, policy, cond.temp, cond.amb_rel_hum)
                .map_err(|source| RunError::Condition {
                    index,
                    label: label.clone(),
                    source,
                })?;
            log::info!("{label}: r_env = {:.4e} day⁻¹", run.rate_env);
            results.push(GrowthResult {
                label,
                local_rel_hum: run.local_rel_hum,
                rate_env: run.rate_env,
                rate_die_off: run.rate_die_off,
                traj: run.traj,
            });
        }
        Ok(results)
    }

    fn decay_condition(
        &self,
        cond: &DecayCondition,
        label: String,
        n_cell_init: u64,
        t_days: f64,
        sampling: Option<&Sampling>,
    ) -> Result<DecayResult, ModelError> {
        let rate = self.rates.death_rate(cond.temp, cond.rel_hum)?;
        let traj = deterministic_decay(n_cell_init as f64, rate, t_days)?;
        let stats = survival_stats(n_cell_init, rate, t_days)?;

        let sampled = match sampling {
            Some(sampling) => {
                let mut rng = ChaCha12Rng::seed_from_u64(sampling.seed);
                Some(sample_survivors(
                    n_cell_init,
                    stats.prob_surv,
                    sampling.n_reps,
                    &mut rng,
                )?)
            }
            None => None,
        };

        Ok(DecayResult {
            label,
            rate,
            traj,
            stats,
            sampled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay_conds(rel_hums: &[f64]) -> Vec<DecayCondition> {
        rel_hums
            .iter()
            .map(|&rel_hum| DecayCondition {
                temp: 2.0,
                rel_hum,
                label: None,
            })
            .collect()
    }

    #[test]
    fn decay_results_keep_input_order() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let conds = decay_conds(&[45.0, 0.0, 100.0]);
        let results = runner.run_decay(&conds, 1_000_000, 20.0, None).unwrap();

        let labels: Vec<_> = results.iter().map(|res| res.label.as_str()).collect();
        assert_eq!(labels, ["2°C, 45% RH", "2°C, 0% RH", "2°C, 100% RH"]);
        assert!(results[1].rate > results[0].rate);
        assert!(results[0].rate > results[2].rate);
        assert!(results.iter().all(|res| res.sampled.is_none()));
    }

    #[test]
    fn decay_reference_scenario() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let results = runner
            .run_decay(&decay_conds(&[0.0, 45.0]), 1_000_000, 20.0, None)
            .unwrap();

        let dry = &results[0];
        assert!((dry.rate - 0.84062).abs() / 0.84062 < 1e-3);
        assert!((dry.stats.exp_surv - 0.05).abs() / 0.05 < 2e-2);
        assert!((dry.stats.prob_ext - 0.951).abs() / 0.951 < 1e-3);
        assert_eq!(dry.traj.pop()[0], 1e6);

        let humid = &results[1];
        assert!(humid.rate < dry.rate);
        assert!(humid.stats.prob_surv > dry.stats.prob_surv);
        assert!(humid.stats.prob_ext < dry.stats.prob_ext);
    }

    #[test]
    fn bad_condition_aborts_run() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let conds = decay_conds(&[0.0, 145.0, 45.0]);
        let err = runner.run_decay(&conds, 1000, 20.0, None).unwrap_err();
        let RunError::Condition {
            index,
            label,
            source,
        } = err;
        assert_eq!(index, 1);
        assert_eq!(label, "2°C, 145% RH");
        assert!(matches!(
            source,
            ModelError::InvalidParameter { name: "rel_hum", .. }
        ));
    }

    #[test]
    fn overflowing_rate_aborts_run() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let mut conds = decay_conds(&[0.0, 50.0]);
        conds[1].temp = 1e5;
        let RunError::Condition { index, source, .. } =
            runner.run_decay(&conds, 1000, 20.0, None).unwrap_err();
        assert_eq!(index, 1);
        assert!(matches!(
            source,
            ModelError::NumericDegeneracy { name: "death_rate", .. }
        ));

        let conds = vec![GrowthCondition {
            temp: f64::NAN,
            amb_rel_hum: 45.0,
            label: None,
        }];
        let RunError::Condition { index, source, .. } = runner
            .run_growth(&conds, &GrowthParams::default(), &HumidityPolicy::default())
            .unwrap_err();
        assert_eq!(index, 0);
        assert!(matches!(
            source,
            ModelError::InvalidParameter { name: "temp", .. }
        ));
    }

    #[test]
    fn sampling_is_seeded() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let sampling = Sampling {
            n_reps: 200,
            seed: 3,
        };
        let conds = decay_conds(&[60.0]);
        let res_a = runner.run_decay(&conds, 1000, 5.0, Some(&sampling)).unwrap();
        let res_b = runner.run_decay(&conds, 1000, 5.0, Some(&sampling)).unwrap();
        let smp = res_a[0].sampled.unwrap();
        assert_eq!(Some(smp), res_b[0].sampled);
        assert_eq!(smp.n_reps, 200);
    }

    #[test]
    fn invalid_rates_are_rejected() {
        let mut rates = RateParams::new(0.2, 0.8);
        rates.q10 = -2.0;
        assert!(ConditionRunner::new(rates).is_err());
    }

    #[test]
    fn growth_results_keep_input_order() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let conds = vec![
            GrowthCondition {
                temp: 2.0,
                amb_rel_hum: 45.0,
                label: Some("humid".to_string()),
            },
            GrowthCondition {
                temp: 2.0,
                amb_rel_hum: 0.0,
                label: None,
            },
        ];
        let results = runner
            .run_growth(&conds, &GrowthParams::default(), &HumidityPolicy::default())
            .unwrap();
        assert_eq!(results[0].label, "humid");
        assert_eq!(results[0].local_rel_hum, 65.0);
        assert_eq!(results[1].label, "2°C, 0% RH (cloth local RH)");
        assert_eq!(results[1].local_rel_hum, 20.0);
    }

    #[test]
    fn bad_growth_condition_aborts_run() {
        let runner = ConditionRunner::new(RateParams::new(0.2, 0.8)).unwrap();
        let conds = vec![GrowthCondition {
            temp: 2.0,
            amb_rel_hum: -5.0,
            label: None,
        }];
        let err = runner
            .run_growth(&conds, &GrowthParams::default(), &HumidityPolicy::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "condition 0 (2°C, -5% RH (cloth local RH)) failed");
    }
}
