mod bench;
mod chart;
mod config;
mod error;
mod ext;
mod format;
mod generate;
mod run;
mod stats;
mod timing;

use std::{fs, num::NonZeroUsize, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tempfile::TempDir;

use self::{
  bench::Bench,
  config::{Config, TimingSource},
  run::Subject,
};

#[derive(Parser)]
#[command(version, about = "Measures the parallel speedup of an external program")]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Runs the experiment matrix and reports speedups.
  Bench {
    /// TOML experiment configuration; the built-in flights benchmark if
    /// omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the speedup chart (SVG).
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Trials per configuration.
    #[arg(short, long)]
    repeat: Option<usize>,
    /// Per-trial timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
    /// How trial durations are captured.
    #[arg(long, value_enum)]
    timing: Option<TimingSource>,
    /// Keep per-trial timing artifacts here instead of a temporary directory.
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,
  },
  /// Generates map and query input files from a JSON city list.
  Generate {
    /// JSON array of `{"name", "country"}` objects.
    cities: PathBuf,
    /// Output file for flights.
    maps: PathBuf,
    /// Output file for customer queries.
    queries: PathBuf,
    /// Number of queries to generate.
    count: NonZeroUsize,
  },
  /// Prints the built-in configuration as TOML.
  Config,
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  match Args::parse().command {
    Command::Bench {
      config,
      output,
      repeat,
      timeout,
      timing,
      artifacts_dir,
    } => {
      let mut config = match config {
        Some(path) => Config::load(path).context("load config")?,
        None => Config::default(),
      };

      if let Some(output) = output {
        config.output_file = output.to_string_lossy().into_owned();
      }
      if let Some(repeat) = repeat {
        config.repeat = repeat;
      }
      if let Some(timeout) = timeout {
        config.timeout_secs = Some(timeout);
      }
      if let Some(timing) = timing {
        config.timing = timing;
      }
      config.validate().context("config")?;

      let (_tempdir, artifacts_dir) = match artifacts_dir {
        Some(dir) => {
          fs::create_dir_all(&dir).with_context(|| format!("create {dir:?}"))?;
          (None, dir)
        }
        None => {
          let tempdir = TempDir::with_prefix("speedup-bench-").context("tempdir")?;
          let dir = tempdir.path().to_path_buf();
          (Some(tempdir), dir)
        }
      };

      let mut bench = Bench::new(&config, Subject::new(&config, artifacts_dir));
      bench.bench();

      println!("{}", format::format(&config, &bench.report).context("format")?);

      chart::render(&config, &bench.report, &config.output_file).context("chart")?;
      info!("wrote {}", config.output_file);

      if !bench.report.failures.is_empty() {
        anyhow::bail!("{} measurement(s) failed", bench.report.failures.len());
      }
    }
    Command::Generate {
      cities,
      maps,
      queries,
      count,
    } => {
      generate::generate(cities, maps, queries, count.get()).context("generate")?;
    }
    Command::Config => {
      print!("{}", Config::default().to_toml()?);
    }
  }

  Ok(())
}
