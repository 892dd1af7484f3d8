//! End-to-end runs of the `speedup-bench` binary against shell stand-ins for
//! the subject program.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Writes a config running `script` as the subject, with two thread counts.
fn write_config(dir: &Path, script: &str, lines: &str) -> String {
  let path = dir.join("bench.toml");
  let config = format!(
    r#"
title = "Test Speedup"
x_label = "Threads"
y_label = "Speedup"
program = ["sh", "-c", "{script}", "subject"]
threads = [1, 2]
repeat = 2
timing = "shell"
timing_output = "timing"
output_file = "{output}"
timeout_secs = 30
{lines}
"#,
    output = dir.join("speedup.svg").display(),
  );
  fs::write(&path, config).unwrap();

  path.display().to_string()
}

const ONE_LINE: &str = r#"
[[lines]]
data_size = "1000"
map_file = "maps1000.txt"
query_file = "queries1000.txt"
"#;

fn bench(dir: &TempDir, config: &str) -> Command {
  let mut cmd = Command::cargo_bin("speedup-bench").unwrap();
  cmd
    .arg("bench")
    .arg("--config")
    .arg(config)
    .arg("--artifacts-dir")
    .arg(dir.path().join("artifacts"));

  cmd
}

#[test]
fn test_bench_reports_every_cell() {
  let dir = TempDir::new().unwrap();
  let config = write_config(dir.path(), "sleep 0.02", ONE_LINE);

  bench(&dir, &config)
    .assert()
    .success()
    .stdout(predicate::str::contains("Test Speedup"))
    .stdout(predicate::str::contains("2 threads"))
    .stdout(predicate::str::contains("1000"))
    .stdout(predicate::str::contains("failed").not());

  assert!(dir.path().join("speedup.svg").exists());

  let artifacts = dir.path().join("artifacts");
  for name in [
    "timing_1000_seq_1",
    "timing_1000_seq_2",
    "timing_1000_par_1_1",
    "timing_1000_par_1_2",
    "timing_1000_par_2_1",
    "timing_1000_par_2_2",
  ] {
    let block = fs::read_to_string(artifacts.join(name)).unwrap();
    assert!(block.contains("real"), "{name}: {block:?}");
  }
}

#[test]
fn test_bench_passes_thread_count_first() {
  let dir = TempDir::new().unwrap();
  // record the arguments of every invocation next to the config
  let log = dir.path().join("argv.log");
  let script = format!("echo $# $@ >> {}", log.display());
  let config = write_config(dir.path(), &script, ONE_LINE);

  bench(&dir, &config).assert().success();

  let argv = fs::read_to_string(&log).unwrap();
  let calls: Vec<_> = argv.lines().collect();
  assert_eq!(
    calls,
    [
      "2 maps1000.txt queries1000.txt",
      "2 maps1000.txt queries1000.txt",
      "3 1 maps1000.txt queries1000.txt",
      "3 1 maps1000.txt queries1000.txt",
      "3 2 maps1000.txt queries1000.txt",
      "3 2 maps1000.txt queries1000.txt",
    ]
  );
}

#[test]
fn test_bench_marks_failed_cells() {
  let dir = TempDir::new().unwrap();
  let config = write_config(dir.path(), "exit 1", ONE_LINE);

  bench(&dir, &config)
    .assert()
    .failure()
    .stdout(predicate::str::contains("failed"))
    .stdout(predicate::str::contains("1000 sequential"))
    .stderr(predicate::str::contains("measurement(s) failed"));

  assert!(dir.path().join("speedup.svg").exists());
}

#[test]
fn test_bench_without_baseline() {
  let dir = TempDir::new().unwrap();
  let lines = format!("{ONE_LINE}seq = false\n");
  let config = write_config(dir.path(), "sleep 0.01", &lines);

  bench(&dir, &config)
    .assert()
    .failure()
    .stdout(predicate::str::contains("no sequential baseline recorded"));
}

#[test]
fn test_bench_rejects_invalid_config() {
  let dir = TempDir::new().unwrap();
  let config = write_config(dir.path(), "true", ONE_LINE);

  bench(&dir, &config)
    .arg("--repeat")
    .arg("0")
    .assert()
    .failure()
    .stderr(predicate::str::contains("repeat must be at least 1"));
}

#[test]
fn test_generate_writes_inputs() {
  let dir = TempDir::new().unwrap();
  let cities: Vec<String> = (0..30)
    .map(|i| format!(r#"{{"name": "City{i}", "country": "Country"}}"#))
    .collect();
  fs::write(dir.path().join("cities.json"), format!("[{}]", cities.join(","))).unwrap();

  Command::cargo_bin("speedup-bench")
    .unwrap()
    .current_dir(dir.path())
    .args(["generate", "cities.json", "maps.txt", "queries.txt", "25"])
    .assert()
    .success();

  let maps = fs::read_to_string(dir.path().join("maps.txt")).unwrap();
  let queries = fs::read_to_string(dir.path().join("queries.txt")).unwrap();

  // ceil(sqrt(25)) + 10 cities
  assert_eq!(maps.lines().count(), 15 * 14);
  assert_eq!(queries.lines().count(), 25);
  assert!(queries.lines().next().unwrap().starts_with(r#"{"id":1,"#));
}

#[test]
fn test_generate_prints_usage_on_missing_arguments() {
  Command::cargo_bin("speedup-bench")
    .unwrap()
    .args(["generate", "cities.json", "maps.txt"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_generate_rejects_zero_queries() {
  Command::cargo_bin("speedup-bench")
    .unwrap()
    .args(["generate", "cities.json", "maps.txt", "queries.txt", "0"])
    .assert()
    .failure();
}

#[test]
fn test_config_prints_default_matrix() {
  Command::cargo_bin("speedup-bench")
    .unwrap()
    .arg("config")
    .assert()
    .success()
    .stdout(predicate::str::contains("threads = [1, 2, 4, 6, 8]").or(predicate::str::contains("threads = [\n")))
    .stdout(predicate::str::contains("maps100000.txt"));
}
