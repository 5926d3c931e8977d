//! Benchmark entry point: regenerate the synthetic fixture and time the
//! generation/build/run pipeline for one language variant.
//!
//! Usage: `run_benchmark [variant] [row_count] [--bench-root <dir>]
//! [--generator <path>] [--report <path>]`
//!
//! Variant defaults to `rust`, row count to 500. Measurements are printed
//! inline as they complete; `--report` additionally writes them as JSON.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use insrcdata_harness::benchmark::{
    build_and_run, generate_dataset, write_report, BenchVariant, DEFAULT_ROW_COUNT, FIXTURE_REL,
};

const DEFAULT_BENCH_ROOT: &str = ".";
const DEFAULT_GENERATOR: &str = "../../target/debug/insrcdata";

#[derive(Debug, Clone)]
struct Config {
    variant: String,
    row_count: u32,
    bench_root: PathBuf,
    generator: PathBuf,
    report: Option<PathBuf>,
}

impl Config {
    fn parse() -> Result<Self, String> {
        let mut variant: Option<String> = None;
        let mut row_count = DEFAULT_ROW_COUNT;
        let mut bench_root = PathBuf::from(DEFAULT_BENCH_ROOT);
        let mut generator = PathBuf::from(DEFAULT_GENERATOR);
        let mut report: Option<PathBuf> = None;

        let args: Vec<String> = env::args().skip(1).collect();
        let mut index = 0_usize;
        while index < args.len() {
            match args[index].as_str() {
                "--bench-root" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --bench-root".to_owned())?;
                    bench_root = PathBuf::from(value);
                }
                "--generator" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --generator".to_owned())?;
                    generator = PathBuf::from(value);
                }
                "--report" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --report".to_owned())?;
                    report = Some(PathBuf::from(value));
                }
                positional if !positional.starts_with("--") => {
                    if variant.is_none() {
                        variant = Some(positional.to_owned());
                    } else {
                        row_count = positional
                            .parse()
                            .map_err(|_| format!("invalid row count: {positional}"))?;
                    }
                }
                other => return Err(format!("unknown argument: {other}")),
            }
            index += 1;
        }

        Ok(Self {
            variant: variant.unwrap_or_else(|| "rust".to_owned()),
            row_count,
            bench_root,
            generator,
            report,
        })
    }
}

fn run(config: &Config) -> insrcdata_harness::Result<()> {
    let variant = BenchVariant::by_name(&config.variant, &config.bench_root)?;
    generate_dataset(&config.bench_root.join(FIXTURE_REL), config.row_count)?;

    let report = build_and_run(
        &config.generator,
        &config.bench_root,
        &variant,
        config.row_count,
    )?;

    if let Some(path) = &config.report {
        write_report(&report, path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::parse() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("run_benchmark: {message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "benchmark run failed");
            eprintln!("run_benchmark: {err}");
            ExitCode::FAILURE
        }
    }
}
