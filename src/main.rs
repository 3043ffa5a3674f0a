use anyhow::{bail, Result};
use audio_analysis::audio::decode::is_audio_file;
use audio_analysis::pipeline::DEFAULT_MODEL_DIR;
use audio_analysis::tagging::OnnxLoader;
use audio_analysis::{
    AnalysisConfig, AnalysisPipeline, AnalysisRequest, AnalysisResult, ModelRegistry, TagOptions,
};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "audio-analysis")]
#[command(about = "Detect key, tempo and tags of audio files", long_about = None)]
struct Args {
    /// Audio files or directories (directories are scanned recursively)
    #[arg(required_unless_present = "list_models")]
    inputs: Vec<String>,

    /// Directory holding the ONNX models and their metadata
    #[arg(
        short = 'm',
        long,
        env = "AUDIO_ANALYSIS_MODELS_DIR",
        default_value = DEFAULT_MODEL_DIR
    )]
    models_dir: String,

    /// Run the tag classifiers
    #[arg(short = 't', long)]
    tags: bool,

    /// Skip key detection
    #[arg(long)]
    no_key: bool,

    /// Skip BPM detection
    #[arg(long)]
    no_bpm: bool,

    /// Number of ranked tags to report
    #[arg(long, env = "AUDIO_ANALYSIS_TOP_N", default_value = "10")]
    top_n: usize,

    /// Skip genre, mood, instrument, vocal, danceability or emotion tags
    /// (can be specified multiple times)
    #[arg(
        long = "skip-tag",
        value_parser = ["genres", "moods", "instruments", "vocals", "danceability", "emotion"]
    )]
    skip_tags: Vec<String>,

    /// Shortest audio accepted, in seconds
    #[arg(long, env = "AUDIO_ANALYSIS_MIN_DURATION", default_value = "3.0")]
    min_duration: f64,

    /// Minimum BPM for detection range
    #[arg(long, default_value = "60")]
    min_bpm: f32,

    /// Maximum BPM for detection range
    #[arg(long, default_value = "180")]
    max_bpm: f32,

    /// Only decode the first N seconds of each file
    #[arg(long)]
    max_seconds: Option<f64>,

    /// Threads ONNX Runtime may use inside one model run
    #[arg(long, env = "AUDIO_ANALYSIS_MODEL_THREADS", default_value = "1")]
    model_threads: usize,

    /// Number of files analyzed in parallel (default: number of CPUs)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Load every model and print its status, then exit
    #[arg(long)]
    list_models: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// One line of batch output
#[derive(Serialize)]
#[serde(untagged)]
enum FileReport<'a> {
    Analyzed {
        file: &'a Path,
        #[serde(flatten)]
        result: AnalysisResult,
    },
    Failed {
        file: &'a Path,
        error: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let models_dir = PathBuf::from(shellexpand::tilde(&args.models_dir).as_ref());
    let config = AnalysisConfig::new(models_dir.clone())
        .with_min_duration(args.min_duration)
        .with_top_n(args.top_n)
        .with_bpm_range(args.min_bpm, args.max_bpm)
        .with_max_decode_secs(args.max_seconds);

    let loader = OnnxLoader::new().with_intra_threads(args.model_threads);
    let registry = Arc::new(ModelRegistry::new(models_dir, loader));

    if args.list_models {
        registry.ensure_loaded();
        print_json(&registry.descriptors(), args.pretty)?;
        return Ok(());
    }

    let request = AnalysisRequest {
        detect_key: !args.no_key,
        detect_bpm: !args.no_bpm,
        detect_tags: args.tags,
        tag_top_n: Some(args.top_n),
        tag_options: tag_options(&args.skip_tags),
    };

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        bail!("No audio files found in {:?}", args.inputs);
    }
    log::info!("Analyzing {} file(s)", files.len());
    if args.tags {
        log::info!("Tagging enabled, models from {:?}", config.model_dir);
    }

    let pipeline = AnalysisPipeline::with_stratum(config, Arc::clone(&registry));

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        builder = builder.num_threads(jobs.max(1));
    }
    let pool = builder.build()?;

    let failures = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let report = match pipeline.analyze_file(path, &request) {
                    Ok(result) => FileReport::Analyzed { file: path, result },
                    Err(e) => {
                        log::error!("Failed to analyze {:?}: {:#}", path, e);
                        FileReport::Failed {
                            file: path,
                            error: format!("{:#}", e),
                        }
                    }
                };
                let failed = matches!(report, FileReport::Failed { .. });
                if let Err(e) = print_json(&report, args.pretty) {
                    log::error!("Failed to write result for {:?}: {}", path, e);
                }
                failed
            })
            .filter(|&failed| failed)
            .count()
    });

    log::info!(
        "Analysis complete: {} succeeded, {} failed",
        files.len() - failures,
        failures
    );
    Ok(())
}

/// Expand the positional inputs into a sorted list of audio files
fn collect_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = PathBuf::from(shellexpand::tilde(input).as_ref());
        if path.is_dir() {
            let before = files.len();
            for entry in WalkDir::new(&path).follow_links(true) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_audio_file(entry.path()) => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable entry: {}", e),
                }
            }
            log::debug!("{:?}: {} audio file(s)", path, files.len() - before);
        } else if path.is_file() {
            files.push(path);
        } else {
            bail!("Input not found: {:?}", path);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn tag_options(skipped: &[String]) -> TagOptions {
    let mut options = TagOptions::default();
    for name in skipped {
        match name.as_str() {
            "genres" => options.genres = false,
            "moods" => options.moods = false,
            "instruments" => options.instruments = false,
            "vocals" => options.vocals = false,
            "danceability" => options.danceability = false,
            "emotion" => options.emotion = false,
            _ => {}
        }
    }
    options
}

/// Write one JSON document to stdout as a single write
fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
