//! Orchestration entry point: run every discovered sample's regression
//! cycle across all available language variants.
//!
//! Usage: `run_samples [reset] [--samples-root <dir>] [--generator <path>]`
//!
//! The bare `reset` token rebaselines every check: existing baselines are
//! deleted before comparison, so each check bootstraps from the current
//! run's output. Processing is sequential in discovery order and the
//! first failure stops the whole batch with a non-zero exit.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use insrcdata_harness::discovery::discover_samples;
use insrcdata_harness::sample::{CVariant, LanguageVariant, RustVariant, Sample};

const DEFAULT_SAMPLES_ROOT: &str = "../examples";
const DEFAULT_GENERATOR: &str = "../target/debug/insrcdata";

#[derive(Debug, Clone)]
struct Config {
    samples_root: PathBuf,
    generator: PathBuf,
    rebaseline: bool,
}

impl Config {
    fn parse() -> Result<Self, String> {
        let mut samples_root = PathBuf::from(DEFAULT_SAMPLES_ROOT);
        let mut generator = PathBuf::from(DEFAULT_GENERATOR);
        let mut rebaseline = false;

        let args: Vec<String> = env::args().skip(1).collect();
        let mut index = 0_usize;
        while index < args.len() {
            match args[index].as_str() {
                "reset" => rebaseline = true,
                "--samples-root" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --samples-root".to_owned())?;
                    samples_root = PathBuf::from(value);
                }
                "--generator" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| "missing value for --generator".to_owned())?;
                    generator = PathBuf::from(value);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
            index += 1;
        }

        Ok(Self {
            samples_root,
            generator,
            rebaseline,
        })
    }
}

fn run(config: &Config) -> insrcdata_harness::Result<()> {
    let variants: [&dyn LanguageVariant; 2] = [&RustVariant, &CVariant];
    let names = discover_samples(&config.samples_root, &variants)?;

    for name in &names {
        println!("\n   -- sample {name} --");
        for variant in variants {
            let project_root = config.samples_root.join(name);
            if !variant.build_descriptor(&project_root, name).is_file() {
                continue;
            }
            let sample =
                Sample::new(&config.samples_root, name.as_str(), &config.generator, variant);
            sample.run_regression(config.rebaseline)?;
        }
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
            eprintln!("run_samples: {message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "sample regression run failed");
            eprintln!("run_samples: {err}");
            ExitCode::FAILURE
        }
    }
}
