use log::{info, warn};

use crate::{
  config::{Config, Line},
  error::{Error, Mode},
  run::{self, Measure},
  stats::{self, Failure, Report, Row},
};

/// Walks the experiment matrix: every line's sequential baseline, then its
/// parallel sweep.
pub struct Bench<'a, M> {
  config: &'a Config,
  measure: M,
  /// Rows and failures collected so far.
  pub report: Report,
}

impl<'a, M: Measure> Bench<'a, M> {
  pub fn new(config: &'a Config, measure: M) -> Self {
    Self {
      config,
      measure,
      report: Report::default(),
    }
  }

  /// Runs the whole matrix. Failures are recorded in the report and never
  /// stop the remaining cells.
  pub fn bench(&mut self) {
    let config = self.config;
    for line in &config.lines {
      self.bench_line(line);
    }

    info!(
      "finished: {} speedups, {} failures",
      self.report.rows.len(),
      self.report.failures.len()
    );
  }

  fn bench_line(&mut self, line: &Line) {
    let baseline = if line.seq { self.baseline(line) } else { None };

    if !line.par {
      return;
    }

    let config = self.config;
    for &threads in &config.threads {
      match self.cell(line, threads, baseline) {
        Ok(speedup) => {
          info!("data size {}, {threads} threads: speedup {speedup:.3}", line.data_size);

          self.report.rows.push(Row {
            data_size: line.data_size.clone(),
            threads,
            speedup,
          });
        }
        Err(error) => self.fail(line, Mode::Parallel(threads), error),
      }
    }
  }

  /// Mean sequential time of `line`, or `None` if it could not be measured.
  fn baseline(&mut self, line: &Line) -> Option<f64> {
    info!("benchmarking data size {} sequentially", line.data_size);

    let baseline = run::run_trials(&mut self.measure, line, Mode::Sequential, self.config.repeat)
      .and_then(|trials| stats::mean(&trials));

    match baseline {
      Ok(secs) => {
        info!("data size {}: average sequential time {secs:.3}s", line.data_size);
        self.report.baselines.push((line.data_size.clone(), secs));

        Some(secs)
      }
      Err(error) => {
        self.fail(line, Mode::Sequential, error);

        None
      }
    }
  }

  fn cell(&mut self, line: &Line, threads: usize, baseline: Option<f64>) -> Result<f64, Error> {
    let baseline = baseline.ok_or_else(|| Error::InvalidState {
      data_size: line.data_size.clone(),
    })?;

    info!("benchmarking data size {} with {threads} threads", line.data_size);

    let trials = run::run_trials(&mut self.measure, line, Mode::Parallel(threads), self.config.repeat)?;
    let secs = stats::mean(&trials)?;

    info!("data size {}, {threads} threads: average time {secs:.3}s", line.data_size);

    stats::speedup(baseline, secs)
  }

  fn fail(&mut self, line: &Line, mode: Mode, error: Error) {
    warn!("{error}");

    self.report.failures.push(Failure {
      data_size: line.data_size.clone(),
      mode,
      error,
    });
  }
}
