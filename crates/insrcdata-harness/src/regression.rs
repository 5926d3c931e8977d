//! Golden-file regression store.
//!
//! Baselines live as plain byte files at `<dir>/<check>.txt`. A missing
//! baseline is not a failure: the current output bootstraps it and the
//! check is reported as skipped-but-passing. On divergence the baseline is
//! left untouched and the new bytes are persisted to `<dir>/<check>_new.txt`
//! for manual inspection, then the check fails.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{HarnessError, Result};

/// How a regression check concluded, short of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Baseline existed and matched byte-for-byte.
    Verified,
    /// No baseline existed; the new output became the baseline.
    Bootstrapped,
}

/// Golden-baseline store for one sample/variant regression directory.
///
/// `rebaseline` is threaded in explicitly by the caller; the store never
/// inspects process arguments or environment.
#[derive(Debug, Clone)]
pub struct RegressionStore {
    dir: PathBuf,
    rebaseline: bool,
}

impl RegressionStore {
    pub fn new(dir: impl Into<PathBuf>, rebaseline: bool) -> Self {
        Self {
            dir: dir.into(),
            rebaseline,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the stored baseline for `check`.
    #[must_use]
    pub fn baseline_path(&self, check: &str) -> PathBuf {
        self.dir.join(format!("{check}.txt"))
    }

    /// Path of the mismatch artifact for `check`.
    #[must_use]
    pub fn artifact_path(&self, check: &str) -> PathBuf {
        self.dir.join(format!("{check}_new.txt"))
    }

    /// Compare `new_output` against the stored baseline for `check`.
    ///
    /// # Errors
    ///
    /// Fails with [`HarnessError::RegressionMismatch`] when a baseline
    /// exists and differs, after writing the `_new` artifact. I/O failures
    /// while reading or writing baseline files propagate as-is.
    pub fn check(&self, sample: &str, check: &str, new_output: &[u8]) -> Result<CheckOutcome> {
        fs::create_dir_all(&self.dir)?;
        let path = self.baseline_path(check);

        if self.rebaseline {
            remove_if_present(&path)?;
        }

        let baseline = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::write(&path, new_output)?;
                warn!(sample, check, path = %path.display(), "baseline bootstrapped, check skipped");
                println!("#warning: writing {sample} {check} regression; check skipped");
                return Ok(CheckOutcome::Bootstrapped);
            }
            Err(err) => return Err(err.into()),
        };

        if baseline == new_output {
            info!(sample, check, "regression check passed");
            return Ok(CheckOutcome::Verified);
        }

        let artifact = self.artifact_path(check);
        fs::write(&artifact, new_output)?;
        warn!(
            sample,
            check,
            expected_sha256 = %hex_digest(&baseline),
            actual_sha256 = %hex_digest(new_output),
            artifact = %artifact.display(),
            "regression mismatch"
        );
        Err(HarnessError::RegressionMismatch {
            sample: sample.to_owned(),
            check: check.to_owned(),
            artifact,
        })
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path, rebaseline: bool) -> RegressionStore {
        RegressionStore::new(dir.join("regression"), rebaseline)
    }

    #[test]
    fn test_missing_baseline_bootstraps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), false);

        let outcome = store.check("labels", "output", b"hello\n").unwrap();
        assert_eq!(outcome, CheckOutcome::Bootstrapped);
        assert_eq!(fs::read(store.baseline_path("output")).unwrap(), b"hello\n");
        assert!(!store.artifact_path("output").exists());
    }

    #[test]
    fn test_matching_baseline_passes_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), false);
        store.check("labels", "output", b"hello\n").unwrap();

        // Identical bytes twice in a row: never mutates, never diffs.
        for _ in 0..2 {
            let outcome = store.check("labels", "output", b"hello\n").unwrap();
            assert_eq!(outcome, CheckOutcome::Verified);
        }
        assert_eq!(fs::read(store.baseline_path("output")).unwrap(), b"hello\n");
        assert!(!store.artifact_path("output").exists());
    }

    #[test]
    fn test_mismatch_preserves_baseline_and_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), false);
        store.check("labels", "output", b"old\n").unwrap();

        let err = store.check("labels", "output", b"new\n").unwrap_err();
        match err {
            HarnessError::RegressionMismatch {
                sample,
                check,
                artifact,
            } => {
                assert_eq!(sample, "labels");
                assert_eq!(check, "output");
                assert_eq!(fs::read(artifact).unwrap(), b"new\n");
            }
            other => panic!("unexpected error: {other}"),
        }
        // Baseline untouched.
        assert_eq!(fs::read(store.baseline_path("output")).unwrap(), b"old\n");
    }

    #[test]
    fn test_rebaseline_replaces_existing_baseline() {
        let dir = tempfile::tempdir().unwrap();
        store(dir.path(), false)
            .check("labels", "output", b"old\n")
            .unwrap();

        let resetting = store(dir.path(), true);
        let outcome = resetting.check("labels", "output", b"new\n").unwrap();
        assert_eq!(outcome, CheckOutcome::Bootstrapped);
        assert_eq!(
            fs::read(resetting.baseline_path("output")).unwrap(),
            b"new\n"
        );
        assert!(!resetting.artifact_path("output").exists());
    }

    #[test]
    fn test_rebaseline_with_no_baseline_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), true);
        let outcome = store.check("labels", "template", b"trait X\n").unwrap();
        assert_eq!(outcome, CheckOutcome::Bootstrapped);
    }

    #[test]
    fn test_bootstrap_then_rerun_passes_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), false);

        fs::remove_dir_all(store.dir()).ok();
        assert_eq!(
            store.check("minister", "output", b"x").unwrap(),
            CheckOutcome::Bootstrapped
        );
        assert_eq!(
            store.check("minister", "output", b"x").unwrap(),
            CheckOutcome::Verified
        );
    }

    #[test]
    fn test_checks_are_independent_per_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), false);
        store.check("s", "output", b"a").unwrap();
        store.check("s", "template", b"b").unwrap();

        assert_eq!(fs::read(store.baseline_path("output")).unwrap(), b"a");
        assert_eq!(fs::read(store.baseline_path("template")).unwrap(), b"b");
        // Mismatch on one check leaves the other's files alone.
        assert!(store.check("s", "output", b"z").is_err());
        assert_eq!(fs::read(store.baseline_path("template")).unwrap(), b"b");
        assert!(!store.artifact_path("template").exists());
    }
}
