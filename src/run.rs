use std::{
  ffi::OsString,
  fs::{self, File},
  os::unix::process::CommandExt as _,
  path::{Path, PathBuf},
  process::{Command, Stdio},
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use log::debug;

use crate::{
  config::{Config, Line, TimingSource},
  error::{Error, Mode, TrialId},
  ext::CommandExt,
  timing,
};

/// Shared, overwritten by every trial, never read.
const STDOUT_ARTIFACT: &str = "out.txt";

/// Something that can perform one timed invocation of the subject.
pub trait Measure {
  /// Runs a single trial and returns the raw contents of its timing artifact.
  fn measure(&mut self, trial: &TrialId, line: &Line) -> Result<String, Error>;
}

/// Runs `repeat` trials of `line` in `mode`, one after another, and returns
/// their durations in seconds in trial order. Stops at the first failing
/// trial.
pub fn run_trials<M: Measure + ?Sized>(measure: &mut M, line: &Line, mode: Mode, repeat: usize) -> Result<Vec<f64>, Error> {
  (1..=repeat)
    .map(|trial| {
      let trial = TrialId::new(&line.data_size, mode, trial);
      let text = measure.measure(&trial, line)?;

      let secs = match timing::parse_artifact(&text) {
        Ok(Some(secs)) => secs,
        Ok(None) => {
          return Err(Error::Execution {
            trial,
            reason: "no timing block".to_string(),
          })
        }
        Err(source) => return Err(Error::Parse { trial, source }),
      };

      debug!("{trial}: {secs}s");

      Ok(secs)
    })
    .collect()
}

/// The external program under benchmark, run as a child process.
pub struct Subject {
  program: Vec<String>,
  timing: TimingSource,
  timeout: Option<Duration>,
  timing_output: String,
  artifacts_dir: PathBuf,
}

impl Subject {
  pub fn new(config: &Config, artifacts_dir: PathBuf) -> Self {
    Self {
      program: config.program.clone(),
      timing: config.timing,
      timeout: config.timeout(),
      timing_output: config.timing_output.clone(),
      artifacts_dir,
    }
  }

  /// Subject command line: `program... [threads] map_file query_file`.
  fn argv(&self, mode: Mode, line: &Line) -> Vec<OsString> {
    let mut argv: Vec<OsString> = self.program.iter().map(OsString::from).collect();

    if let Mode::Parallel(threads) = mode {
      argv.push(threads.to_string().into());
    }
    argv.push((&line.map_file).into());
    argv.push((&line.query_file).into());

    argv
  }

  fn artifact(&self, trial: &TrialId) -> PathBuf {
    self
      .artifacts_dir
      .join(format!("{}_{}", self.timing_output, trial.artifact_suffix()))
  }

  /// Where the subject's stderr goes when it is not part of the timing
  /// artifact.
  fn stderr_artifact(&self, trial: &TrialId) -> PathBuf {
    self
      .artifacts_dir
      .join(format!("{}_{}.stderr", self.timing_output, trial.artifact_suffix()))
  }

  fn command(&self, mode: Mode, line: &Line, stdout: File) -> Result<Command> {
    let argv = self.argv(mode, line);

    let mut command = match self.timing {
      TimingSource::Shell => {
        let mut bash = Command::new("bash");
        bash
          .env("LC_ALL", "C")
          .env_remove("TIMEFORMAT")
          .args(["-c", "time \"$@\"", "bash"])
          .args(&argv);
        bash
      }
      TimingSource::Wall => {
        let (program, args) = argv.split_first().context("empty program")?;
        let mut command = Command::new(program);
        command.args(args);
        command
      }
    };

    // timeouts kill this whole group
    command.stdin(Stdio::null()).stdout(stdout).process_group(0);

    Ok(command)
  }

  fn run(&self, trial: &TrialId, line: &Line) -> Result<String> {
    let artifact = self.artifact(trial);
    let stdout = File::create(self.artifacts_dir.join(STDOUT_ARTIFACT)).context("create stdout artifact")?;
    let mut command = self.command(trial.mode, line, stdout)?;

    debug!("{trial}: {command:?}");

    match self.timing {
      TimingSource::Shell => {
        let stderr = File::create(&artifact).with_context(|| format!("create {artifact:?}"))?;
        command.stderr(stderr).check_success_timeout(self.timeout)?;
      }
      TimingSource::Wall => {
        let stderr_artifact = self.stderr_artifact(trial);
        let stderr = File::create(&stderr_artifact).with_context(|| format!("create {stderr_artifact:?}"))?;

        let start = Instant::now();
        command.stderr(stderr).check_success_timeout(self.timeout)?;
        let elapsed = start.elapsed();

        fs::write(&artifact, format!("{}\n", elapsed.as_secs_f64())).with_context(|| format!("write {artifact:?}"))?;
      }
    }

    read_artifact(&artifact)
  }
}

impl Measure for Subject {
  fn measure(&mut self, trial: &TrialId, line: &Line) -> Result<String, Error> {
    self.run(trial, line).map_err(|err| Error::Execution {
      trial: trial.clone(),
      reason: format!("{err:#}"),
    })
  }
}

fn read_artifact(path: &Path) -> Result<String> {
  fs::read_to_string(path).with_context(|| format!("read {path:?}"))
}
