mod config;
mod decay;
mod error;
mod growth;
mod model;
mod rates;
mod report;
mod runner;
mod stats;

use crate::config::Config;
use crate::runner::ConditionRunner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    config: PathBuf,

    /// Also print every trajectory as tab-separated rows.
    #[arg(long)]
    series: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Decay,

    Growth,

    All,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to construct cfg")?;
    log::info!("{cfg:#?}");

    let runner = ConditionRunner::new(cfg.rates.clone()).context("failed to construct runner")?;

    let decay_results = match args.command {
        Command::Decay | Command::All => {
            let sampling = cfg.decay.sampling();
            let results = runner
                .run_decay(
                    &cfg.decay.conditions,
                    cfg.decay.n_cell_init,
                    cfg.decay.t_days,
                    sampling.as_ref(),
                )
                .context("failed to run decay")?;
            Some(results)
        }
        Command::Growth => None,
    };
    let growth_results = match args.command {
        Command::Growth | Command::All => {
            let policy = cfg.growth.policy();
            let results = runner
                .run_growth(&cfg.growth.conditions, &cfg.growth.params, &policy)
                .context("failed to run growth")?;
            Some(results)
        }
        Command::Decay => None,
    };

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    if let Some(results) = &decay_results {
        report::write_decay_summary(&mut writer, results)
            .context("failed to write decay summary")?;
        if args.series {
            for res in results {
                report::write_series(&mut writer, &res.label, &res.traj)
                    .context("failed to write decay series")?;
            }
        }
    }
    if let Some(results) = &growth_results {
        report::write_growth_summary(&mut writer, results)
            .context("failed to write growth summary")?;
        if args.series {
            for res in results {
                report::write_series(&mut writer, &res.label, &res.traj)
                    .context("failed to write growth series")?;
            }
        }
    }

    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}
