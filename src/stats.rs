use crate::model::SampleSummary;

/// Online tally of sampled survivor counts.
///
/// Mean and spread are updated in a single pass (Welford), extinct replicates are counted.
#[derive(Debug, Default)]
pub struct SurvivorTally {
    n_reps: usize,
    n_ext: usize,
    mean: f64,
    sq_dev_sum: f64,
}

impl SurvivorTally {
    pub fn record(&mut self, n_surv: u64) {
        self.n_reps += 1;
        if n_surv == 0 {
            self.n_ext += 1;
        }

        let val = n_surv as f64;
        let dev_old = val - self.mean;
        self.mean += dev_old / self.n_reps as f64;
        self.sq_dev_sum += dev_old * (val - self.mean);
    }

    /// Sample mean, sample standard deviation and extinction frequency.
    ///
    /// Undefined moments are NaN: every field with no replicates, the spread with one.
    pub fn summary(&self) -> SampleSummary {
        let n_reps = self.n_reps as f64;
        SampleSummary {
            n_reps: self.n_reps,
            mean_surv: if self.n_reps > 0 { self.mean } else { f64::NAN },
            std_dev_surv: if self.n_reps > 1 {
                (self.sq_dev_sum / (n_reps - 1.0)).sqrt()
            } else {
                f64::NAN
            },
            freq_ext: self.n_ext as f64 / n_reps,
        }
    }
}
