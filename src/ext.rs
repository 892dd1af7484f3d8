use std::{
  process::{Child, Command, ExitStatus},
  time::Duration,
};

use anyhow::{Context, Result};
use wait_timeout::ChildExt as WaitExt;

#[extend::ext]
pub impl ExitStatus {
  fn check_success(&self) -> Result<()> {
    if !self.success() {
      anyhow::bail!("exited with non-zero status {self}");
    }

    Ok(())
  }
}

#[extend::ext]
pub impl Child {
  /// Waits for the child, returning an error if the exit status was non-zero
  /// or if it outlived `timeout`. A timed out child is killed and reaped.
  fn check_success_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
    let Some(timeout) = timeout else {
      return self.wait().context("wait")?.check_success();
    };

    let Some(status) = self.wait_timeout(timeout).context("wait")? else {
      self.kill_group().context("kill after timeout")?;
      self.wait().context("reap after timeout")?;

      anyhow::bail!("timed out after {timeout:?}");
    };

    status.check_success()
  }

  /// Kills the process group led by this child, so whatever it spawned dies
  /// with it. Falls back to killing the child alone when it leads no group.
  fn kill_group(&mut self) -> Result<()> {
    let pgid = libc::pid_t::try_from(self.id()).context("pid")?;

    // SAFETY: killpg takes no pointers; pgid is our own unreaped child
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
      return Ok(());
    }

    self.kill().context("kill")
  }
}

#[extend::ext]
pub impl Command {
  /// Spawns the command and waits for it, see
  /// [`ChildExt::check_success_timeout`].
  fn check_success_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
    self.spawn().context("spawn")?.check_success_timeout(timeout)
  }
}
