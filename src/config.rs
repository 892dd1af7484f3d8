use std::{collections::HashSet, fs, hash::Hash, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How a trial's wall-clock time is captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimingSource {
  /// Wrap the subject in bash's `time` keyword and scrape the `real` line.
  #[default]
  Shell,
  /// Time the subject from this process and write the seconds to the
  /// artifact.
  Wall,
}

/// One data-size entry of the experiment matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
  pub data_size: String,
  pub map_file: String,
  pub query_file: String,
  /// Run the sequential baseline.
  #[serde(default = "enabled")]
  pub seq: bool,
  /// Run the parallel sweep.
  #[serde(default = "enabled")]
  pub par: bool,
}

impl Line {
  pub fn new(data_size: &str, map_file: &str, query_file: &str) -> Self {
    Self {
      data_size: data_size.to_string(),
      map_file: map_file.to_string(),
      query_file: query_file.to_string(),
      seq: true,
      par: true,
    }
  }
}

fn enabled() -> bool {
  true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
  pub title: String,
  pub x_label: String,
  pub y_label: String,
  /// Command prefix of the subject program; thread count and input files are
  /// appended.
  pub program: Vec<String>,
  pub threads: Vec<usize>,
  pub repeat: usize,
  #[serde(default)]
  pub timing: TimingSource,
  /// Prefix of the per-trial timing artifacts.
  pub timing_output: String,
  pub output_file: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_secs: Option<u64>,
  pub lines: Vec<Line>,
}

impl Default for Config {
  fn default() -> Self {
    let lines = ["25000", "50000", "75000", "100000"]
      .into_iter()
      .map(|size| Line::new(size, &format!("maps{size}.txt"), &format!("queries{size}.txt")))
      .collect();

    Self {
      title: "Flights Search Engine Speedup Graph".to_string(),
      x_label: "Number of Threads (N)".to_string(),
      y_label: "Speedup".to_string(),
      program: vec!["go".to_string(), "run".to_string(), "flights.go".to_string()],
      threads: vec![1, 2, 4, 6, 8],
      repeat: 5,
      timing: TimingSource::Shell,
      timing_output: "timing".to_string(),
      output_file: "speedup.svg".to_string(),
      timeout_secs: None,
      lines,
    }
  }
}

impl Config {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;

    toml::from_str(&text).with_context(|| format!("parse {path:?}"))
  }

  pub fn to_toml(&self) -> Result<String> {
    toml::to_string_pretty(self).context("serialize config")
  }

  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }

  pub fn validate(&self) -> Result<(), Error> {
    let invalid = |msg: String| Err(Error::InvalidArgument(msg));

    if self.program.is_empty() {
      return invalid("program must name the subject to run".to_string());
    }
    if self.threads.is_empty() {
      return invalid("threads must list at least one thread count".to_string());
    }
    if self.threads.contains(&0) {
      return invalid("thread counts must be positive".to_string());
    }
    if let Some(threads) = first_duplicate(self.threads.iter()) {
      return invalid(format!("thread count {threads} is listed twice"));
    }
    if self.repeat == 0 {
      return invalid("repeat must be at least 1".to_string());
    }
    if self.timeout_secs == Some(0) {
      return invalid("timeout must be at least one second".to_string());
    }
    if let Some(size) = first_duplicate(self.lines.iter().map(|line| &line.data_size)) {
      return invalid(format!("data size {size:?} is listed twice"));
    }

    Ok(())
  }
}

fn first_duplicate<T: Hash + Eq + Copy, I: IntoIterator<Item = T>>(items: I) -> Option<T> {
  let mut seen = HashSet::new();
  items.into_iter().find(|item| !seen.insert(*item))
}
