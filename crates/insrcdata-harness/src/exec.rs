//! Typed command execution and the wall-clock timing instrument.
//!
//! Every external process the harness touches (the generator, the native
//! build tools, the sample binaries) goes through [`CommandSpec`]: a plain
//! argument vector plus an optional working directory, spawned directly
//! without a shell. Execution is blocking and sequential; there are no
//! timeouts — a hung tool blocks the harness until killed from outside.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{HarnessError, Result};

// ── Command descriptor ───────────────────────────────────────────────────

/// A process invocation: program, arguments, optional working directory.
///
/// No shell is involved, so arguments never need quoting and cannot be
/// reinterpreted.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable rendering used in reports and error messages.
    #[must_use]
    pub fn rendered(&self) -> String {
        let mut out = self.program.display().to_string();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Run to completion with inherited stdio.
    ///
    /// # Errors
    ///
    /// Fails if the process cannot be spawned or exits non-zero.
    pub fn run(&self) -> Result<()> {
        debug!(command = %self.rendered(), "running command");
        let status = self.command().status().map_err(|source| HarnessError::Spawn {
            command: self.rendered(),
            source,
        })?;
        if !status.success() {
            return Err(HarnessError::CommandFailed {
                command: self.rendered(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    /// Run to completion, capturing stdout as raw bytes. Stderr is
    /// inherited so tool diagnostics stay visible.
    ///
    /// # Errors
    ///
    /// Fails if the process cannot be spawned or exits non-zero.
    pub fn capture(&self) -> Result<Vec<u8>> {
        debug!(command = %self.rendered(), "capturing command output");
        let output = self
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| HarnessError::Spawn {
                command: self.rendered(),
                source,
            })?;
        if !output.status.success() {
            return Err(HarnessError::CommandFailed {
                command: self.rendered(),
                status: output.status.to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// Build a [`CommandSpec`] for a sample binary with an optional subcommand.
#[must_use]
pub fn binary_invocation(binary: &Path, subcommand: Option<&str>) -> CommandSpec {
    let mut spec = CommandSpec::new(binary);
    if let Some(sub) = subcommand {
        spec = spec.arg(sub);
    }
    spec
}

// ── Timing instrument ────────────────────────────────────────────────────

/// Time a command's wall-clock duration and print the measurement.
///
/// With `count`, the command is executed `count` times and the mean
/// duration is reported; every iteration's exit status is checked, so a
/// single failing execution aborts the measurement. Without `count`, one
/// execution is measured directly under the same success contract.
///
/// Always prints `<ms> ms : <command>` on success.
///
/// # Errors
///
/// Propagates the first spawn or non-zero-exit failure.
pub fn time_command(spec: &CommandSpec, count: Option<u32>) -> Result<Duration> {
    let elapsed = match count {
        Some(n) => {
            let n = n.max(1);
            let start = Instant::now();
            for _ in 0..n {
                spec.run()?;
            }
            start.elapsed() / n
        }
        None => {
            let start = Instant::now();
            spec.run()?;
            start.elapsed()
        }
    };
    println!("{} ms : {}", elapsed.as_millis(), spec.rendered());
    Ok(elapsed)
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_succeeds_on_zero_exit() {
        CommandSpec::new("true").run().unwrap();
    }

    #[test]
    fn test_run_fails_on_nonzero_exit() {
        let err = CommandSpec::new("false").run().unwrap_err();
        assert!(matches!(err, HarnessError::CommandFailed { .. }));
    }

    #[test]
    fn test_spawn_failure_is_distinct() {
        let err = CommandSpec::new("/nonexistent/harness-tool").run().unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }

    #[test]
    fn test_capture_returns_stdout_bytes() {
        let out = CommandSpec::new("echo").arg("hello").capture().unwrap();
        assert_eq!(out, b"hello\n");
    }

    #[test]
    fn test_capture_fails_on_nonzero_exit() {
        let err = CommandSpec::new("false").capture().unwrap_err();
        assert!(matches!(err, HarnessError::CommandFailed { .. }));
    }

    #[test]
    fn test_rendered_joins_program_and_args() {
        let spec = CommandSpec::new("cc").args(["main.c", "-o", "out"]);
        assert_eq!(spec.rendered(), "cc main.c -o out");
    }

    #[test]
    fn test_current_dir_applies_to_spawned_process() {
        let dir = tempfile::tempdir().unwrap();
        let out = CommandSpec::new("pwd")
            .current_dir(dir.path())
            .capture()
            .unwrap();
        let printed = String::from_utf8(out).unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        assert_eq!(printed.trim(), canonical.to_string_lossy());
    }

    #[test]
    fn test_time_command_single_execution() {
        let spec = CommandSpec::new("true");
        let elapsed = time_command(&spec, None).unwrap();
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_time_command_mean_over_repetitions() {
        let spec = CommandSpec::new("true");
        let elapsed = time_command(&spec, Some(3)).unwrap();
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_time_command_fails_fast_on_failing_command() {
        let spec = CommandSpec::new("false");
        assert!(time_command(&spec, Some(5)).is_err());
        assert!(time_command(&spec, None).is_err());
    }
}
