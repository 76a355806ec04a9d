use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colorcal::chart::{builtin_chart, builtin_chart_names, ChartIoError, ChartRegion};
use colorcal::core::ReferenceColorSpace;
use colorcal::{
    calibrate, customize_chart, load_image, resolve_chart, run_pipeline, BatchConfig,
    BatchCorrector, BatchError, BatchReport, CalibrationError, CalibrationReport, ConfigError,
    CorrectionRecipe, ImageIoError, MappingMethod, PipelineError, RecipeIoError,
};

/// Exit status when calibration succeeded but some batch files failed.
const EXIT_PARTIAL: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "colorcal", version, about = "Chart-based color calibration of photographs")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in reference charts.
    Charts,
    /// Fit a correction recipe from a photographed chart.
    Calibrate(CalibrateArgs),
    /// Correct every image of a directory with a saved recipe.
    Apply(ApplyArgs),
    /// Calibrate and correct as described by a JSON config.
    Run {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CalibrateArgs {
    /// Photograph of the chart.
    #[arg(long)]
    image: PathBuf,
    /// Chart region JSON file.
    #[arg(long)]
    region: PathBuf,
    /// Built-in chart name (default: ColorChecker Classic).
    #[arg(long, conflicts_with = "chart_definition")]
    chart: Option<String>,
    /// Chart definition JSON file.
    #[arg(long)]
    chart_definition: Option<PathBuf>,
    #[arg(long, default_value = "sRGB")]
    space: ReferenceColorSpace,
    #[arg(long, default_value = "Linear Cross-band")]
    method: MappingMethod,
    #[arg(long)]
    chip_margin: Option<f64>,
    /// Where to write the recipe JSON.
    #[arg(long)]
    recipe: PathBuf,
    /// Where to write the calibration report JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    #[arg(long)]
    recipe: PathBuf,
    #[arg(long)]
    src: PathBuf,
    /// Created when missing; same-named files are overwritten.
    #[arg(long)]
    dst: PathBuf,
    /// File extensions to process (default: jpg, jpeg).
    #[arg(long = "ext", value_delimiter = ',')]
    extensions: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("region file {}: {source}", path.display())]
    Region {
        path: PathBuf,
        #[source]
        source: ChartIoError,
    },
    #[error(transparent)]
    Image(#[from] ImageIoError),
    #[error("calibration failed: {0}")]
    Calibration(#[from] CalibrationError),
    #[error("recipe {}: {source}", path.display())]
    Recipe {
        path: PathBuf,
        #[source]
        source: RecipeIoError,
    },
    #[error("cannot write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_PARTIAL),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        colorcal::core::init_tracing(false, colorcal::core::level_from_verbosity(verbose));
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = colorcal::core::init_with_verbosity(verbose);
    }
}

/// `Ok(false)` when some batch files failed.
fn run(command: Command) -> Result<bool, CliError> {
    match command {
        Command::Charts => {
            for name in builtin_chart_names() {
                if let Some(chart) = builtin_chart(name) {
                    println!("{name} ({} x {} patches)", chart.n_cols(), chart.n_rows());
                }
            }
            Ok(true)
        }
        Command::Calibrate(args) => {
            calibrate_cmd(args)?;
            Ok(true)
        }
        Command::Apply(args) => {
            let recipe =
                CorrectionRecipe::load_json(&args.recipe).map_err(|source| CliError::Recipe {
                    path: args.recipe.clone(),
                    source,
                })?;
            let mut batch = BatchCorrector::new(recipe);
            if !args.extensions.is_empty() {
                batch = batch.with_extensions(&args.extensions);
            }
            let report = batch.run(&args.src, &args.dst)?;
            print_batch(&report);
            Ok(report.is_complete())
        }
        Command::Run { config } => {
            let cfg = BatchConfig::load_json(&config)?;
            let outcome = run_pipeline(&cfg)?;
            print_fit(&outcome.report);
            print_batch(&outcome.batch);
            Ok(outcome.batch.is_complete())
        }
    }
}

fn calibrate_cmd(args: CalibrateArgs) -> Result<(), CliError> {
    let chart = resolve_chart(args.chart.as_deref(), args.chart_definition.as_deref())?;
    let chart = customize_chart(chart, args.chip_margin, None)?;
    let region = ChartRegion::load_json(&args.region).map_err(|source| CliError::Region {
        path: args.region.clone(),
        source,
    })?;
    let image = load_image(&args.image)?;
    let calibration = calibrate(&image, &chart, &region, args.space, args.method)?;

    write_recipe(&calibration.recipe, &args.recipe)?;
    let report = CalibrationReport::new(
        &calibration.calibrator,
        &calibration.fit,
        calibration.recipe.pixel_format(),
    );
    if let Some(path) = &args.report {
        report.write_json(path).map_err(|source| CliError::Report {
            path: path.clone(),
            source,
        })?;
    }
    print_fit(&report);
    println!("recipe written to {}", args.recipe.display());
    Ok(())
}

fn write_recipe(recipe: &CorrectionRecipe, path: &Path) -> Result<(), CliError> {
    recipe.write_json(path).map_err(|source| CliError::Recipe {
        path: path.to_path_buf(),
        source,
    })
}

fn print_fit(report: &CalibrationReport) {
    println!(
        "{} / {} in {}: {} patches, dE mean {:.2} median {:.2} max {:.2}",
        report.chart,
        report.method,
        report.reference_space,
        report.patches.len(),
        report.summary.mean_delta_e,
        report.summary.median_delta_e,
        report.summary.max_delta_e
    );
}

fn print_batch(report: &BatchReport) {
    println!(
        "{} file(s) corrected, {} failed",
        report.written.len(),
        report.failures.len()
    );
    for f in &report.failures {
        println!("  failed: {}: {}", f.source.display(), f.error);
    }
}
