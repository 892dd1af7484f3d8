use crate::error::{Error, Mode};

/// Speedup of one (data size, thread count) cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
  pub data_size: String,
  pub threads: usize,
  pub speedup: f64,
}

/// A baseline or cell that could not be measured.
#[derive(Debug)]
pub struct Failure {
  pub data_size: String,
  pub mode: Mode,
  pub error: Error,
}

/// Everything a benchmark run produced, in configuration order.
#[derive(Debug, Default)]
pub struct Report {
  pub rows: Vec<Row>,
  pub failures: Vec<Failure>,
  /// Mean sequential seconds per data size.
  pub baselines: Vec<(String, f64)>,
}

impl Report {
  pub fn row(&self, data_size: &str, threads: usize) -> Option<&Row> {
    self
      .rows
      .iter()
      .find(|row| row.data_size == data_size && row.threads == threads)
  }

  pub fn failure(&self, data_size: &str, mode: Mode) -> Option<&Failure> {
    self
      .failures
      .iter()
      .find(|failure| failure.data_size == data_size && failure.mode == mode)
  }

  pub fn baseline(&self, data_size: &str) -> Option<f64> {
    self
      .baselines
      .iter()
      .find_map(|(size, secs)| (size == data_size).then_some(*secs))
  }
}

/// Arithmetic mean of a set of trial durations.
pub fn mean(durations: &[f64]) -> Result<f64, Error> {
  if durations.is_empty() {
    return Err(Error::InvalidArgument("mean of an empty set of trials".to_string()));
  }

  if let Some(bad) = durations.iter().find(|secs| !secs.is_finite()) {
    return Err(Error::InvalidArgument(format!("non-finite trial duration {bad}")));
  }

  let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
  let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  let mean = durations.iter().sum::<f64>() / durations.len() as f64;

  // summation rounding can land a hair outside the sample range
  Ok(mean.clamp(min, max))
}

/// `baseline / treatment`, refusing treatments that would make it infinite
/// or meaningless.
pub fn speedup(baseline: f64, treatment: f64) -> Result<f64, Error> {
  if !treatment.is_finite() || treatment <= 0.0 {
    return Err(Error::DegenerateTiming { treatment });
  }

  Ok(baseline / treatment)
}
