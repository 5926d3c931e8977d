//! Per-sample regression workflow, polymorphic over output-language variants.
//!
//! A sample project lives at `<samples-root>/<name>/` and pairs one data
//! configuration (`insrcdata/insrcdata.toml`) with one consumer program per
//! language variant (`rust-<name>/`, `c-<name>/`, ...). The workflow for a
//! `(sample, variant)` pair is strictly ordered: regenerate the accessor
//! source, build with the variant's native toolchain, run the consumer and
//! capture stdout, compare captured output and the generator's interface
//! template against golden baselines, then run the variant's extra
//! conformance checks. The first failure aborts the whole batch.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::exec::CommandSpec;
use crate::regression::RegressionStore;

/// Relative path of the data configuration inside a sample project.
pub const CONFIG_REL: &str = "insrcdata/insrcdata.toml";

/// Regression check names produced by the workflow.
pub const OUTPUT_CHECK: &str = "output";
pub const TEMPLATE_CHECK: &str = "template";

// ── Variant abstraction ──────────────────────────────────────────────────

/// Capability set one output-language variant must supply.
///
/// `lang_path` is the variant's consumer directory,
/// `<samples-root>/<name>/<lang>-<name>`. Destination paths are expressed
/// relative to the sample's `insrcdata/` configuration directory because
/// that is how the generator resolves `--dest`.
pub trait LanguageVariant {
    /// Variant tag, also the consumer directory prefix (`rust`, `c`).
    fn name(&self) -> &'static str;

    /// Generated-source destination, relative to the configuration directory.
    fn dest_rel(&self, sample: &str) -> PathBuf;

    /// Directory holding this variant's golden baselines.
    fn regression_dir(&self, lang_path: &Path) -> PathBuf;

    /// Path of the built consumer binary.
    fn binary_path(&self, lang_path: &Path, sample: &str) -> PathBuf;

    /// File whose presence marks the variant as available for a sample.
    fn build_descriptor(&self, project_root: &Path, sample: &str) -> PathBuf;

    /// Build the consumer program. Non-zero toolchain exit is fatal.
    fn build(&self, lang_path: &Path, sample: &str) -> Result<()>;

    /// Post-build conformance checks (lints, style). Fatal on failure.
    fn extra_checks(&self, _lang_path: &Path, _sample: &str) -> Result<()> {
        Ok(())
    }
}

/// Systems-language variant built through its package manager.
#[derive(Debug, Clone, Copy)]
pub struct RustVariant;

impl LanguageVariant for RustVariant {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn dest_rel(&self, sample: &str) -> PathBuf {
        PathBuf::from(format!("../rust-{sample}/src/insrcdata.rs"))
    }

    fn regression_dir(&self, lang_path: &Path) -> PathBuf {
        lang_path.join("target/debug/regression")
    }

    fn binary_path(&self, lang_path: &Path, sample: &str) -> PathBuf {
        lang_path.join("target/debug").join(sample)
    }

    fn build_descriptor(&self, project_root: &Path, sample: &str) -> PathBuf {
        project_root.join(format!("rust-{sample}/Cargo.toml"))
    }

    fn build(&self, lang_path: &Path, _sample: &str) -> Result<()> {
        CommandSpec::new("cargo")
            .args(["build", "--manifest-path"])
            .arg(lang_path.join("Cargo.toml"))
            .run()
    }

    fn extra_checks(&self, lang_path: &Path, _sample: &str) -> Result<()> {
        // Static lint pass over the consumer, generated source included.
        CommandSpec::new("cargo")
            .args(["clippy", "--manifest-path"])
            .arg(lang_path.join("Cargo.toml"))
            .run()
    }
}

/// Lower-level variant compiled by direct system-compiler invocation.
#[derive(Debug, Clone, Copy)]
pub struct CVariant;

impl LanguageVariant for CVariant {
    fn name(&self) -> &'static str {
        "c"
    }

    fn dest_rel(&self, sample: &str) -> PathBuf {
        PathBuf::from(format!("../c-{sample}/insrcdata.c"))
    }

    fn regression_dir(&self, lang_path: &Path) -> PathBuf {
        lang_path.join("target/regression")
    }

    fn binary_path(&self, lang_path: &Path, sample: &str) -> PathBuf {
        lang_path.join("target").join(sample)
    }

    fn build_descriptor(&self, project_root: &Path, sample: &str) -> PathBuf {
        project_root.join(format!("c-{sample}/main.c"))
    }

    fn build(&self, lang_path: &Path, sample: &str) -> Result<()> {
        fs::create_dir_all(lang_path.join("target"))?;
        CommandSpec::new("cc")
            .args(["main.c", "insrcdata.c", "-o"])
            .arg(Path::new("target").join(sample))
            .current_dir(lang_path)
            .run()
    }
}

// ── Sample workflow ──────────────────────────────────────────────────────

/// One `(sample name, variant)` pair under test.
///
/// Stateless beyond path derivation; constructed per test run and
/// discarded afterwards.
pub struct Sample<'v> {
    name: String,
    project_root: PathBuf,
    generator: PathBuf,
    variant: &'v dyn LanguageVariant,
}

impl<'v> Sample<'v> {
    pub fn new(
        samples_root: &Path,
        name: impl Into<String>,
        generator: impl Into<PathBuf>,
        variant: &'v dyn LanguageVariant,
    ) -> Self {
        let name = name.into();
        Self {
            project_root: samples_root.join(&name),
            name,
            generator: generator.into(),
            variant,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        self.variant.name()
    }

    /// `<samples-root>/<name>/<lang>-<name>`.
    #[must_use]
    pub fn lang_path(&self) -> PathBuf {
        self.project_root
            .join(format!("{}-{}", self.variant.name(), self.name))
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.project_root.join(CONFIG_REL)
    }

    /// Absolute location of the generated source for this variant.
    #[must_use]
    pub fn dest_path(&self) -> PathBuf {
        self.project_root
            .join("insrcdata")
            .join(self.variant.dest_rel(&self.name))
    }

    #[must_use]
    pub fn regression_dir(&self) -> PathBuf {
        self.variant.regression_dir(&self.lang_path())
    }

    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.variant.binary_path(&self.lang_path(), &self.name)
    }

    /// Delete stale generated source, regenerate it, build the consumer.
    ///
    /// A missing generated file before regeneration is tolerated; the
    /// generator recreates it.
    ///
    /// # Errors
    ///
    /// Fails when the generator or the variant's build exits non-zero.
    pub fn regenerate_and_build(&self) -> Result<()> {
        let dest = self.dest_path();
        match fs::remove_file(&dest) {
            Ok(()) => debug!(dest = %dest.display(), "removed stale generated source"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        CommandSpec::new(&self.generator)
            .arg(self.config_path())
            .arg("--dest")
            .arg(self.variant.dest_rel(&self.name))
            .run()?;

        self.variant.build(&self.lang_path(), &self.name)
    }

    /// Run the built consumer with no arguments and capture stdout.
    ///
    /// # Errors
    ///
    /// Fails when the consumer exits non-zero.
    pub fn run_and_capture(&self) -> Result<Vec<u8>> {
        CommandSpec::new(self.binary_path()).capture()
    }

    /// Ask the generator for the interface/trait declaration only.
    ///
    /// # Errors
    ///
    /// Fails when the generator exits non-zero.
    pub fn fetch_interface_template(&self) -> Result<Vec<u8>> {
        CommandSpec::new(&self.generator)
            .arg(self.config_path())
            .arg("--interface")
            .arg("--dest")
            .arg(self.variant.dest_rel(&self.name))
            .capture()
    }

    /// Full regression cycle for this `(sample, variant)` pair.
    ///
    /// # Errors
    ///
    /// Propagates the first tool failure or baseline mismatch; later steps
    /// are not attempted.
    pub fn run_regression(&self, rebaseline: bool) -> Result<()> {
        info!(sample = %self.name, variant = self.variant.name(), "running sample");

        self.regenerate_and_build()?;
        let output = self.run_and_capture()?;

        let store = RegressionStore::new(self.regression_dir(), rebaseline);
        store.check(&self.name, OUTPUT_CHECK, &output)?;

        let template = self.fetch_interface_template()?;
        store.check(&self.name, TEMPLATE_CHECK, &template)?;

        self.variant.extra_checks(&self.lang_path(), &self.name)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_variant_path_derivation() {
        let root = Path::new("/samples");
        let sample = Sample::new(root, "labels", "/bin/insrcdata", &RustVariant);

        assert_eq!(sample.lang_path(), root.join("labels/rust-labels"));
        assert_eq!(
            sample.config_path(),
            root.join("labels/insrcdata/insrcdata.toml")
        );
        assert_eq!(
            sample.dest_path(),
            root.join("labels/insrcdata/../rust-labels/src/insrcdata.rs")
        );
        assert_eq!(
            sample.regression_dir(),
            root.join("labels/rust-labels/target/debug/regression")
        );
        assert_eq!(
            sample.binary_path(),
            root.join("labels/rust-labels/target/debug/labels")
        );
    }

    #[test]
    fn test_c_variant_path_derivation() {
        let root = Path::new("/samples");
        let sample = Sample::new(root, "labels", "/bin/insrcdata", &CVariant);

        assert_eq!(sample.lang_path(), root.join("labels/c-labels"));
        assert_eq!(
            sample.dest_path(),
            root.join("labels/insrcdata/../c-labels/insrcdata.c")
        );
        assert_eq!(
            sample.regression_dir(),
            root.join("labels/c-labels/target/regression")
        );
        assert_eq!(
            sample.binary_path(),
            root.join("labels/c-labels/target/labels")
        );
    }

    #[test]
    fn test_build_descriptors() {
        let project = Path::new("/samples/minister");
        assert_eq!(
            RustVariant.build_descriptor(project, "minister"),
            project.join("rust-minister/Cargo.toml")
        );
        assert_eq!(
            CVariant.build_descriptor(project, "minister"),
            project.join("c-minister/main.c")
        );
    }

    #[test]
    fn test_regenerate_tolerates_missing_generated_source() {
        // No generated file on disk: removal must be a no-op, and the
        // failure (if any) must come from the generator invocation itself.
        let dir = tempfile::tempdir().unwrap();
        let sample = Sample::new(dir.path(), "ghost", "/nonexistent/generator", &CVariant);
        let err = sample.regenerate_and_build().unwrap_err();
        assert!(matches!(err, crate::error::HarnessError::Spawn { .. }));
    }
}
