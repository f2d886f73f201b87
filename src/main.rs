use anyhow::{Context, Result};
use clap::Parser;
use histoseg::capture::{ImageFileSource, RasterSource};
use histoseg::output::{DirectorySink, ResultSink};
use histoseg::segmentation::DEFAULT_MAX_ITERATIONS;
use histoseg::{AnalysisReport, EngineConfig, SegmentationEngine};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image (png, jpg, jpeg or gif)
    input: PathBuf,

    /// Directory receiving the binary masks and the analysis report
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Iteration budget of the backtracking search
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Number of trajectory entries kept in the report (0 keeps all)
    #[arg(long, default_value_t = 10)]
    trajectory_limit: usize,

    /// Low hysteresis threshold of the mask edge detector
    #[arg(long, default_value_t = 100.0)]
    edge_low: f32,

    /// High hysteresis threshold of the mask edge detector
    #[arg(long, default_value_t = 200.0)]
    edge_high: f32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("histoseg starting");
    tracing::info!("Input: {}", args.input.display());
    tracing::info!("Output directory: {}", args.output_dir.display());

    let config = EngineConfig {
        edge_low_threshold: args.edge_low,
        edge_high_threshold: args.edge_high,
    };
    config.validate().context("Invalid edge detector thresholds")?;

    let mut source = ImageFileSource::new(&args.input)?;
    let mut sink = DirectorySink::new(&args.output_dir)?;
    let trajectory_limit = (args.trajectory_limit > 0).then_some(args.trajectory_limit);

    run(&mut source, &mut sink, config, args.max_iterations, trajectory_limit)
}

fn run<S, O>(
    source: &mut S,
    sink: &mut O,
    config: EngineConfig,
    max_iterations: usize,
    trajectory_limit: Option<usize>,
) -> Result<()>
where
    S: RasterSource,
    O: ResultSink,
{
    let load_start = Instant::now();
    let raster = source.load().context("Failed to load input raster")?;
    let load_time = load_start.elapsed();

    let engine = SegmentationEngine::with_config(raster, config)?;
    let histogram_analysis = engine
        .histogram_analysis()
        .context("Failed to analyze histogram")?;
    tracing::info!(
        "Histogram: mean={:.2}, std_dev={:.2}, peaks={}, valleys={}",
        histogram_analysis.mean,
        histogram_analysis.std_dev,
        histogram_analysis.peaks.len(),
        histogram_analysis.valleys.len()
    );

    let backtracking_start = Instant::now();
    let backtracking = engine.backtracking_segmentation(max_iterations);
    let backtracking_time = backtracking_start.elapsed();
    if let Some(analytics) = backtracking.backtracking() {
        tracing::info!(
            "Backtracking: threshold={}, contrast={:.4}, iterations={}",
            backtracking.threshold,
            analytics.best_contrast,
            analytics.trajectory.len()
        );
    }

    let otsu_start = Instant::now();
    let otsu = engine.otsu_segmentation();
    let otsu_time = otsu_start.elapsed();
    if let Some(analytics) = otsu.otsu() {
        tracing::info!(
            "Otsu: threshold={}, between-class variance={:.4}",
            otsu.threshold,
            analytics.between_class_variance
        );
    }

    let name = source.name();
    let stem = std::path::Path::new(&name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());

    sink.write_image(&stem, &backtracking)
        .context("Failed to write backtracking result")?;
    sink.write_image(&stem, &otsu)
        .context("Failed to write otsu result")?;

    let report = AnalysisReport::new(
        &name,
        histogram_analysis,
        &backtracking,
        &otsu,
        trajectory_limit,
    )?;
    sink.write_report(&stem, &report)
        .context("Failed to write analysis report")?;

    tracing::info!(
        "Timings: load={:.1}ms, backtracking={:.1}ms, otsu={:.1}ms",
        load_time.as_secs_f64() * 1000.0,
        backtracking_time.as_secs_f64() * 1000.0,
        otsu_time.as_secs_f64() * 1000.0
    );

    Ok(())
}
