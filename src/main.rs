use anyhow::{Context, Result};
use area_stats::{
    load_areas, load_datasets, parse_areas_arg, parse_datasets_arg, parse_measures_arg,
    parse_output_arg, parse_years_arg, to_json, write_table, AreaRegistry, Filters, RunConfig,
    SourceErrorPolicy,
};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Import Welsh Government statistics and answer "what is...?" questions
#[derive(Debug, Clone, Parser)]
#[command(name = "area-stats", version, about)]
struct Args {
    /// Directory holding areas.csv and the dataset files
    #[arg(long = "dir", value_name = "PATH", default_value = "datasets")]
    dir: PathBuf,

    /// Datasets to import (omit or set to 'all' to import every dataset)
    #[arg(short = 'd', long = "datasets", value_delimiter = ',', num_args = 1..)]
    datasets: Vec<String>,

    /// Areas to import by code or name (omit or set to 'all' for every area)
    #[arg(short = 'a', long = "areas", value_delimiter = ',', num_args = 1..)]
    areas: Vec<String>,

    /// Measure codes to import (omit or set to 'all' for every measure)
    #[arg(short = 'm', long = "measures", value_delimiter = ',', num_args = 1..)]
    measures: Vec<String>,

    /// Years to import as YYYY or YYYY-ZZZZ; 0 imports every year
    #[arg(short = 'y', long = "years", default_value = "0")]
    years: String,

    /// Output desired: all, average or trend
    #[arg(short = 'o', long = "output", default_value = "all")]
    output: String,

    /// Print the imported data as JSON instead of a table
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Keep going when a dataset fails to import
    #[arg(long = "skip-bad-sources")]
    skip_bad_sources: bool,
}

impl Args {
    fn into_config(self) -> Result<RunConfig> {
        let filters = Filters::all()
            .with_areas(parse_areas_arg(&self.areas))
            .with_measures(parse_measures_arg(&self.measures))
            .with_years(parse_years_arg(&self.years).context("Invalid --years value")?);

        Ok(RunConfig {
            data_dir: self.dir,
            datasets: parse_datasets_arg(&self.datasets).context("Invalid --datasets value")?,
            filters,
            output: parse_output_arg(&self.output).context("Invalid --output value")?,
            json: self.json,
            on_source_error: if self.skip_bad_sources {
                SourceErrorPolicy::Skip
            } else {
                SourceErrorPolicy::Abort
            },
        })
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();
}

fn run(config: &RunConfig) -> Result<()> {
    let mut registry = AreaRegistry::new();

    load_areas(&mut registry, &config.data_dir, &config.filters)
        .context("Failed to load the area list")?;

    let report = load_datasets(
        &mut registry,
        &config.data_dir,
        &config.datasets,
        &config.filters,
        config.on_source_error,
    )
    .context("Failed to load datasets")?;

    for (code, error) in &report.failed {
        warn!(dataset = %code, "not imported: {}", error);
    }
    debug!(areas = registry.size(), "registry ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if config.json {
        let json = to_json(&registry).context("Failed to serialize areas")?;
        writeln!(out, "{}", json).context("Failed to write output")?;
    } else {
        write_table(&registry, config.output, &mut out).context("Failed to write output")?;
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging();

    let config = Args::parse().into_config()?;
    run(&config)
}
