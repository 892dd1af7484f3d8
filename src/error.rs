use std::fmt;

use thiserror::Error;

/// Whether a configuration runs the subject sequentially or with a thread
/// count prepended to its arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
  Sequential,
  Parallel(usize),
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Mode::Sequential => write!(f, "sequential"),
      Mode::Parallel(threads) => write!(f, "parallel@{threads}"),
    }
  }
}

/// Identifies a single trial: which data size, which mode, which repetition
/// (1-based).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialId {
  pub data_size: String,
  pub mode: Mode,
  pub trial: usize,
}

impl TrialId {
  pub fn new(data_size: &str, mode: Mode, trial: usize) -> Self {
    Self {
      data_size: data_size.to_string(),
      mode,
      trial,
    }
  }

  /// Suffix of this trial's timing artifact, unique per (data size, mode,
  /// trial).
  pub fn artifact_suffix(&self) -> String {
    match self.mode {
      Mode::Sequential => format!("{}_seq_{}", self.data_size, self.trial),
      Mode::Parallel(threads) => format!("{}_par_{threads}_{}", self.data_size, self.trial),
    }
  }
}

impl fmt::Display for TrialId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "data size {}, {}, trial {}", self.data_size, self.mode, self.trial)
  }
}

/// A duration string that does not have the `<minutes>m<seconds>s` shape.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("malformed duration {input:?}: {reason}")]
pub struct ParseError {
  pub input: String,
  pub reason: &'static str,
}

impl ParseError {
  pub fn new(input: &str, reason: &'static str) -> Self {
    Self {
      input: input.to_string(),
      reason,
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{trial}: {source}")]
  Parse {
    trial: TrialId,
    #[source]
    source: ParseError,
  },

  #[error("{trial}: {reason}")]
  Execution { trial: TrialId, reason: String },

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("no sequential baseline recorded for data size {data_size:?}")]
  InvalidState { data_size: String },

  #[error("treatment timing of {treatment}s leaves the speedup undefined")]
  DegenerateTiming { treatment: f64 },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn artifact_suffixes_are_unique_per_mode_and_trial() {
    let seq = TrialId::new("1000", Mode::Sequential, 1);
    let par = TrialId::new("1000", Mode::Parallel(4), 1);
    let par2 = TrialId::new("1000", Mode::Parallel(4), 2);

    assert_eq!(seq.artifact_suffix(), "1000_seq_1");
    assert_eq!(par.artifact_suffix(), "1000_par_4_1");
    assert_eq!(par2.artifact_suffix(), "1000_par_4_2");
  }

  #[test]
  fn errors_name_the_failing_trial() {
    let err = Error::Execution {
      trial: TrialId::new("25000", Mode::Parallel(2), 3),
      reason: "exited with non-zero status exit status: 1".to_string(),
    };

    assert_eq!(
      err.to_string(),
      "data size 25000, parallel@2, trial 3: exited with non-zero status exit status: 1"
    );
  }
}
