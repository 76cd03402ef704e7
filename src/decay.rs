//! Closed-form exponential decay of a cell population.

use crate::error::{ModelError, check_num};
use crate::model::{SampleSummary, SurvivalStats, Trajectory};
use crate::stats::SurvivorTally;
use rand::prelude::*;
use rand_distr::Binomial;

/// Number of samples of every decay trajectory.
pub const N_SAMPLES: usize = 300;

/// Sample `n_cell_init * exp(-rate * t)` at [`N_SAMPLES`] uniform times over `[0, t_days]`.
///
/// The first sample is `n_cell_init` exactly. A negative rate yields a growing
/// curve and is not rejected.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] if `t_days` is negative.
pub fn deterministic_decay(
    n_cell_init: f64,
    rate: f64,
    t_days: f64,
) -> Result<Trajectory, ModelError> {
    check_num("t_days", t_days, 0.0..)?;

    let dt = t_days / (N_SAMPLES - 1) as f64;
    let mut time = Vec::with_capacity(N_SAMPLES);
    let mut pop = Vec::with_capacity(N_SAMPLES);
    time.push(0.0);
    pop.push(n_cell_init);
    for i_smp in 1..N_SAMPLES {
        let t = if i_smp == N_SAMPLES - 1 {
            t_days
        } else {
            i_smp as f64 * dt
        };
        time.push(t);
        pop.push(n_cell_init * (-rate * t).exp());
    }

    Ok(Trajectory::new(time, pop))
}

/// Survival statistics of `n_cell_init` independent cells after `t_days`.
///
/// The extinction probability `(1 - p)^N` is evaluated as `exp(N * ln(1 - p))`,
/// so tiny but nonzero probabilities survive large `N`, and `p == 1` gives exactly 0.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] if `t_days` is negative and
/// [`ModelError::NumericDegeneracy`] if the survival probability leaves `[0, 1]`
/// (negative or NaN rate).
pub fn survival_stats(
    n_cell_init: u64,
    rate: f64,
    t_days: f64,
) -> Result<SurvivalStats, ModelError> {
    check_num("t_days", t_days, 0.0..)?;

    let prob_surv = (-rate * t_days).exp();
    if !(0.0..=1.0).contains(&prob_surv) {
        return Err(ModelError::NumericDegeneracy {
            name: "prob_surv",
            value: prob_surv,
        });
    }

    let n_cell_init = n_cell_init as f64;
    let exp_surv = n_cell_init * prob_surv;
    let prob_ext = if prob_surv == 1.0 {
        0.0
    } else {
        (n_cell_init * (-prob_surv).ln_1p()).exp()
    };

    Ok(SurvivalStats {
        prob_surv,
        exp_surv,
        prob_ext,
    })
}

/// Draw `n_reps` realised survivor counts from `Binomial(n_cell_init, prob_surv)`.
///
/// # Errors
/// Returns [`ModelError::InvalidParameter`] if `n_reps` is zero or `prob_surv`
/// is not a probability.
pub fn sample_survivors<R: Rng>(
    n_cell_init: u64,
    prob_surv: f64,
    n_reps: usize,
    rng: &mut R,
) -> Result<SampleSummary, ModelError> {
    check_num("n_reps", n_reps as f64, 1.0..)?;
    check_num("prob_surv", prob_surv, 0.0..=1.0)?;

    let dist = Binomial::new(n_cell_init, prob_surv).map_err(|_| {
        ModelError::NumericDegeneracy {
            name: "prob_surv",
            value: prob_surv,
        }
    })?;

    let mut tally = SurvivorTally::default();
    for _ in 0..n_reps {
        tally.record(dist.sample(rng));
    }

    Ok(tally.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateParams;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn decay_starts_at_n0_and_never_increases() {
        for &rate in &[0.0, 0.1, 0.84, 5.0] {
            let traj = deterministic_decay(1e6, rate, 20.0).unwrap();
            assert_eq!(traj.len(), N_SAMPLES);
            assert_eq!(traj.pop()[0], 1e6);
            assert_eq!(traj.time()[0], 0.0);
            assert_eq!(traj.time()[N_SAMPLES - 1], 20.0);
            assert!(traj.pop().windows(2).all(|w| w[1] <= w[0]));
            assert!(traj.time().windows(2).all(|w| w[1] > w[0]));
            assert!(traj.pop().iter().all(|&n| n > 0.0));
        }
    }

    #[test]
    fn infinite_rate_keeps_initial_sample() {
        let traj = deterministic_decay(1e6, f64::INFINITY, 20.0).unwrap();
        assert_eq!(traj.pop()[0], 1e6);
        assert!(traj.pop()[1..].iter().all(|&n| n == 0.0));
        assert_eq!(traj.time()[N_SAMPLES - 1], 20.0);
    }

    #[test]
    fn decay_rejects_negative_horizon() {
        assert!(matches!(
            deterministic_decay(1e6, 0.5, -1.0),
            Err(ModelError::InvalidParameter { name: "t_days", .. })
        ));
    }

    #[test]
    fn negative_rate_grows() {
        let traj = deterministic_decay(10.0, -0.1, 10.0).unwrap();
        assert!(traj.pop()[N_SAMPLES - 1] > 10.0);
    }

    #[test]
    fn zero_rate_is_certain_survival() {
        for &n in &[1, 1000, 1_000_000] {
            for &t_days in &[0.0, 1.0, 365.0] {
                let stats = survival_stats(n, 0.0, t_days).unwrap();
                assert_eq!(stats.prob_surv, 1.0);
                assert_eq!(stats.exp_surv, n as f64);
                assert_eq!(stats.prob_ext, 0.0);
            }
        }
    }

    #[test]
    fn longer_exposure_is_monotone() {
        let mut prev = survival_stats(10, 0.3, 1.0).unwrap();
        assert!(prev.prob_ext > 0.0);
        for t_days in [2.0, 5.0, 10.0, 20.0] {
            let stats = survival_stats(10, 0.3, t_days).unwrap();
            assert!(stats.prob_surv < prev.prob_surv);
            assert!(stats.prob_ext > prev.prob_ext);
            prev = stats;
        }
    }

    #[test]
    fn reference_scenario_chain() {
        let par = RateParams::new(0.2, 0.8);
        let rate = par.death_rate(2.0, 0.0).unwrap();
        let stats = survival_stats(1_000_000, rate, 20.0).unwrap();

        let prob_surv = (-rate * 20.0).exp();
        assert!((stats.prob_surv - prob_surv).abs() / prob_surv < 1e-12);
        assert!(stats.prob_surv > 4.5e-8 && stats.prob_surv < 5.5e-8);
        assert!((stats.exp_surv - 1e6 * prob_surv).abs() < 1e-12);
        let exp_ext = (-1e6 * prob_surv).exp();
        assert!((stats.prob_ext - exp_ext).abs() / exp_ext < 1e-3);
        assert!((stats.prob_ext - 0.951).abs() < 0.002);
    }

    #[test]
    fn humid_condition_survives_better() {
        let par = RateParams::new(0.2, 0.8);
        let dry = survival_stats(1_000_000, par.death_rate(2.0, 0.0).unwrap(), 20.0).unwrap();
        let humid = survival_stats(1_000_000, par.death_rate(2.0, 45.0).unwrap(), 20.0).unwrap();
        assert!(humid.prob_surv > dry.prob_surv);
        assert!(humid.prob_ext < dry.prob_ext);
    }

    #[test]
    fn extinction_keeps_precision_for_rare_survival() {
        // 1 - p rounds to exactly 1.0 here, so the naive power reports certain extinction.
        let rate = 1e17f64.ln();
        let stats = survival_stats(1_000_000_000_000_000, rate, 1.0).unwrap();
        assert_eq!((1.0 - stats.prob_surv).powf(1e15), 1.0);
        let exp_ext = (-1e15 * stats.prob_surv).exp();
        assert!(stats.prob_ext < 1.0);
        assert!((stats.prob_ext - exp_ext).abs() < 1e-9);

        let stats = survival_stats(10, 3.0, 1.0).unwrap();
        let naive = (1.0 - stats.prob_surv).powi(10);
        assert!((stats.prob_ext - naive).abs() < 1e-12);
    }

    #[test]
    fn certain_death_is_certain_extinction() {
        let stats = survival_stats(1_000_000, f64::INFINITY, 1.0).unwrap();
        assert_eq!(stats.prob_surv, 0.0);
        assert_eq!(stats.exp_surv, 0.0);
        assert_eq!(stats.prob_ext, 1.0);
    }

    #[test]
    fn degenerate_rates_are_reported() {
        assert!(matches!(
            survival_stats(100, -0.5, 2.0),
            Err(ModelError::NumericDegeneracy { name: "prob_surv", .. })
        ));
        assert!(matches!(
            survival_stats(100, f64::NAN, 2.0),
            Err(ModelError::NumericDegeneracy { .. })
        ));
    }

    #[test]
    fn sampled_survivors_match_analytic_stats() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let stats = survival_stats(10_000, 0.5, 10.0).unwrap();
        let smp = sample_survivors(10_000, stats.prob_surv, 4000, &mut rng).unwrap();
        assert_eq!(smp.n_reps, 4000);
        assert!((smp.mean_surv - stats.exp_surv).abs() < 0.1 * stats.exp_surv);
        assert!((smp.freq_ext - stats.prob_ext).abs() < 0.05);
    }

    #[test]
    fn sampling_is_reproducible_and_checked() {
        let smp_a = sample_survivors(1000, 0.01, 100, &mut ChaCha12Rng::seed_from_u64(7)).unwrap();
        let smp_b = sample_survivors(1000, 0.01, 100, &mut ChaCha12Rng::seed_from_u64(7)).unwrap();
        assert_eq!(smp_a, smp_b);

        let mut rng = ChaCha12Rng::seed_from_u64(7);
        assert!(sample_survivors(1000, 0.01, 0, &mut rng).is_err());
        assert!(sample_survivors(1000, 1.5, 10, &mut rng).is_err());

        let smp = sample_survivors(1000, 1.0, 10, &mut rng).unwrap();
        assert_eq!(smp.mean_surv, 1000.0);
        assert_eq!(smp.freq_ext, 0.0);
    }
}
