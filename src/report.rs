//! Text summaries of finished runs.

use crate::model::{DecayResult, GrowthResult, Trajectory};
use anyhow::Result;
use std::io::Write;

pub fn write_decay_summary(out: &mut dyn Write, results: &[DecayResult]) -> Result<()> {
    for res in results {
        let stats = &res.stats;
        writeln!(out, "Condition: {}", res.label)?;
        writeln!(out, "  Death rate = {:.3} / day", res.rate)?;
        writeln!(out, "  Survival probability p = {:.3e}", stats.prob_surv)?;
        writeln!(out, "  Expected survivors = {:.2}", stats.exp_surv)?;
        writeln!(out, "  Extinction probability = {:.3e}", stats.prob_ext)?;
        if let Some(smp) = &res.sampled {
            writeln!(
                out,
                "  Sampled survivors = {:.2} ± {:.2} ({} replicates, extinct in {:.3})",
                smp.mean_surv, smp.std_dev_surv, smp.n_reps, smp.freq_ext
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_growth_summary(out: &mut dyn Write, results: &[GrowthResult]) -> Result<()> {
    for res in results {
        writeln!(out, "Condition: {}", res.label)?;
        writeln!(out, "  Local RH = {:.1} %", res.local_rel_hum)?;
        writeln!(out, "  r_env = {:.4e}", res.rate_env)?;
        writeln!(out, "  Die-off rate = {:.2} / day", res.rate_die_off)?;
        if let Some((t, n)) = res.traj.last() {
            writeln!(out, "  Population at {t:.2} days = {n:.4e}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write a trajectory as tab-separated `time population` rows under a `#` header.
pub fn write_series(out: &mut dyn Write, label: &str, traj: &Trajectory) -> Result<()> {
    writeln!(out, "# {label} ({} samples)", traj.len())?;
    for (t, n) in traj.samples() {
        writeln!(out, "{t:.6}\t{n:.6e}")?;
    }
    writeln!(out)?;
    Ok(())
}
