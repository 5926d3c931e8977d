//! Benchmark driver: synthetic dataset generation and cost measurement.
//!
//! The fixture is a CSV with schema `byte,short,int,str`. Numeric columns
//! come from a fixed-seed [`StdRng`], so the same row count always yields
//! the same numeric content. The `str` column is intentionally drawn from
//! an unseeded source: fixture text is *not* reproducible across runs and
//! only the numeric columns participate in determinism guarantees. This
//! asymmetry is inherited behavior and is kept on purpose.
//!
//! The driver times, in order: generator invocation (mean of 10), consumer
//! build (single run), then reports executable size and times the
//! consumer's `startup` (mean of 100) and `bench` (single run)
//! subcommands. Any non-zero exit anywhere aborts the benchmark.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::exec::{binary_invocation, time_command, CommandSpec};

/// Seed for the reproducible numeric columns.
const DATASET_SEED: u64 = 1;

/// Fixture path relative to the benchmark project root.
pub const FIXTURE_REL: &str = "insrcdata/databench.csv";

/// Alphabet for the free-text column.
const STR_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const STR_LEN: usize = 32;

/// Default row count when the caller supplies none.
pub const DEFAULT_ROW_COUNT: u32 = 500;

// ── Dataset generation ───────────────────────────────────────────────────

/// Write the synthetic CSV fixture: a header plus `row_count` data rows.
///
/// Overwrites any previous fixture at `path`.
///
/// # Errors
///
/// Propagates file-creation and write failures.
pub fn generate_dataset(path: &Path, row_count: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut seeded = StdRng::seed_from_u64(DATASET_SEED);
    let mut free = thread_rng();

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "byte,short,int,str")?;
    for _ in 0..row_count {
        let byte: u32 = seeded.gen_range(0..0xFF);
        let short: u32 = seeded.gen_range(0..0xFFFF);
        let int: u32 = seeded.gen_range(0..0xFFFF_FFFF);
        let text: String = (0..STR_LEN)
            .map(|_| {
                let idx = free.gen_range(0..STR_CHARSET.len());
                char::from(STR_CHARSET[idx])
            })
            .collect();
        writeln!(out, "{byte},{short},{int},{text}")?;
    }
    out.flush()?;
    info!(path = %path.display(), rows = row_count, "benchmark fixture written");
    Ok(())
}

// ── Variants & driver ────────────────────────────────────────────────────

/// One output-language configuration of the benchmark sample.
#[derive(Debug, Clone)]
pub struct BenchVariant {
    pub name: &'static str,
    pub build: CommandSpec,
    pub exe: PathBuf,
}

impl BenchVariant {
    /// Rust consumer, release build through cargo.
    #[must_use]
    pub fn rust(bench_root: &Path) -> Self {
        Self {
            name: "rust",
            build: CommandSpec::new("cargo")
                .args(["build", "-q", "--release", "--manifest-path"])
                .arg(bench_root.join("rust-bench/Cargo.toml")),
            exe: bench_root.join("rust-bench/target/release/bench"),
        }
    }

    /// C consumer, direct compiler invocation.
    #[must_use]
    pub fn c(bench_root: &Path) -> Self {
        Self {
            name: "c",
            build: CommandSpec::new("cc")
                .args(["main.c", "insrcdata.c", "-o", "target/bench"])
                .current_dir(bench_root.join("c-bench")),
            exe: bench_root.join("c-bench/target/bench"),
        }
    }

    /// Look up a variant by name among the built-in ones.
    ///
    /// # Errors
    ///
    /// Fails for names with no matching variant.
    pub fn by_name(name: &str, bench_root: &Path) -> Result<Self> {
        match name {
            "rust" => Ok(Self::rust(bench_root)),
            "c" => Ok(Self::c(bench_root)),
            other => Err(HarnessError::UnknownVariant {
                name: other.to_owned(),
            }),
        }
    }
}

/// Measured costs of one benchmark pass, in display units.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub variant: String,
    pub row_count: u32,
    pub generate_ms: u128,
    pub build_ms: u128,
    pub exe_size_kb: u64,
    pub startup_ms: u128,
    pub bench_ms: u128,
}

/// Run the full timing sequence for one variant.
///
/// Assumes the fixture has already been written with
/// [`generate_dataset`]. Prints each measurement inline as it happens.
///
/// # Errors
///
/// The first failing command aborts the run; later steps do not execute.
pub fn build_and_run(
    generator: &Path,
    bench_root: &Path,
    variant: &BenchVariant,
    row_count: u32,
) -> Result<BenchmarkReport> {
    // Generation cost, averaged: the generator is fast relative to timer
    // granularity.
    let generate = CommandSpec::new(generator).arg(bench_root.join("insrcdata/insrcdata.toml"));
    let generate_ms = time_command(&generate, Some(10))?.as_millis();

    if let Some(parent) = variant.exe.parent() {
        fs::create_dir_all(parent)?;
    }
    let build_ms = time_command(&variant.build, None)?.as_millis();

    let exe_size_kb = fs::metadata(&variant.exe)?.len() / 1000;
    println!("{exe_size_kb} kB : executable size");

    let startup = binary_invocation(&variant.exe, Some("startup"));
    let startup_ms = time_command(&startup, Some(100))?.as_millis();

    let bench = binary_invocation(&variant.exe, Some("bench"));
    let bench_ms = time_command(&bench, None)?.as_millis();

    Ok(BenchmarkReport {
        variant: variant.name.to_owned(),
        row_count,
        generate_ms,
        build_ms,
        exe_size_kb,
        startup_ms,
        bench_ms,
    })
}

/// Serialize a report as pretty JSON next to the human-readable output.
///
/// # Errors
///
/// Propagates serialization and write failures.
pub fn write_report(report: &BenchmarkReport, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(report)
        .map_err(|err| HarnessError::Io(std::io::Error::other(err)))?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), "benchmark report written");
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────
