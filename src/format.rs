use std::fmt::Write;

use anyhow::Result;

use crate::{config::Config, error::Mode, stats::Report};

const COLUMN_WIDTH: usize = 12;
const COLUMN_PADDING: &str = "  ";

const FAILED: &str = "failed";
const NOT_RUN: &str = "-";

fn format_header(threads: &[usize]) -> String {
  let header = ["data size".to_string(), "seq (s)".to_string()]
    .into_iter()
    .chain(threads.iter().map(|t| format!("{t} threads")))
    .enumerate()
    .map(|(i, col)| format_column(i, &col))
    .collect::<Vec<_>>()
    .join(COLUMN_PADDING);

  format!("{header}\n{}", "=".repeat(header.len()))
}

/// First column left aligned, numbers right aligned.
fn format_column(i: usize, col: &str) -> String {
  if i == 0 {
    format!("{col:<COLUMN_WIDTH$}")
  } else {
    format!("{col:>COLUMN_WIDTH$}")
  }
}

fn baseline_cell(report: &Report, data_size: &str) -> String {
  match report.baseline(data_size) {
    Some(secs) => format!("{secs:.3}"),
    None if report.failure(data_size, Mode::Sequential).is_some() => FAILED.to_string(),
    None => NOT_RUN.to_string(),
  }
}

fn speedup_cell(report: &Report, data_size: &str, threads: usize) -> String {
  match report.row(data_size, threads) {
    Some(row) => format!("{:.3}", row.speedup),
    None if report.failure(data_size, Mode::Parallel(threads)).is_some() => FAILED.to_string(),
    None => NOT_RUN.to_string(),
  }
}

fn format_rows(config: &Config, report: &Report) -> Result<String> {
  let mut rows = String::new();

  for line in &config.lines {
    let size = &line.data_size;
    let row = [size.clone(), baseline_cell(report, size)]
      .into_iter()
      .chain(config.threads.iter().map(|&t| speedup_cell(report, size, t)))
      .enumerate()
      .map(|(i, col)| format_column(i, &col))
      .collect::<Vec<_>>()
      .join(COLUMN_PADDING);

    writeln!(rows, "{row}")?;
  }

  Ok(rows)
}

/// Speedup table, one row per data size and one column per thread count,
/// followed by the reason for every failed cell.
pub fn format(config: &Config, report: &Report) -> Result<String> {
  let mut table = String::new();

  writeln!(table, "{}", config.title)?;
  writeln!(table, "{}", "=".repeat(config.title.len()))?;
  writeln!(table)?;

  writeln!(table, "{}", format_header(&config.threads))?;
  write!(table, "{}", format_rows(config, report)?)?;

  if !report.failures.is_empty() {
    writeln!(table)?;
    writeln!(table, "failures")?;
    writeln!(table, "--------")?;

    for failure in &report.failures {
      writeln!(table, "{} {}: {}", failure.data_size, failure.mode, failure.error)?;
    }
  }

  Ok(table)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    config::Line,
    error::Error,
    stats::{Failure, Row},
  };

  fn config() -> Config {
    let mut sequential_only = Line::new("3000", "m", "q");
    sequential_only.par = false;

    Config {
      threads: vec![1, 2],
      lines: vec![Line::new("1000", "m", "q"), Line::new("2000", "m", "q"), sequential_only],
      ..Config::default()
    }
  }

  fn report() -> Report {
    let row = |data_size: &str, threads, speedup| Row {
      data_size: data_size.to_string(),
      threads,
      speedup,
    };

    Report {
      rows: vec![row("1000", 1, 1.0), row("1000", 2, 1.9)],
      failures: vec![
        Failure {
          data_size: "2000".to_string(),
          mode: Mode::Sequential,
          error: Error::InvalidArgument("mean of an empty set of trials".to_string()),
        },
        Failure {
          data_size: "2000".to_string(),
          mode: Mode::Parallel(1),
          error: Error::InvalidState {
            data_size: "2000".to_string(),
          },
        },
      ],
      baselines: vec![("1000".to_string(), 4.25), ("3000".to_string(), 9.0)],
    }
  }

  #[test]
  fn marks_failed_and_skipped_cells() {
    let table = format(&config(), &report()).unwrap();
    let lines: Vec<_> = table.lines().collect();

    assert_eq!(lines[0], "Flights Search Engine Speedup Graph");
    assert!(lines[3].starts_with("data size"));
    assert!(lines[3].contains("2 threads"));

    let cells = |line: &str| line.split_whitespace().map(str::to_string).collect::<Vec<_>>();
    assert_eq!(cells(lines[5]), ["1000", "4.250", "1.000", "1.900"]);
    assert_eq!(cells(lines[6]), ["2000", "failed", "failed", "-"]);
    assert_eq!(cells(lines[7]), ["3000", "9.000", "-", "-"]);
  }

  #[test]
  fn lists_failure_reasons() {
    let table = format(&config(), &report()).unwrap();

    assert!(table.contains("failures"));
    assert!(table.contains("2000 parallel@1: no sequential baseline recorded for data size \"2000\""));
  }

  #[test]
  fn no_failure_section_when_everything_ran() {
    let mut report = report();
    report.failures.clear();

    assert!(!format(&config(), &report).unwrap().contains("failures"));
  }
}
