use clap::{Parser, Subcommand};
use imgpress::config::{self, CompressorConfig};
use imgpress::imaging::{OutputFormat, Quality, RustBackend};
use imgpress::lifecycle::{ALLOWED_SOURCE_EXTENSIONS, CleanupGuard, Workspace};
use imgpress::output;
use imgpress::solver::{self, CompressionRequest, CompressionResult};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

type JobError = Box<dyn std::error::Error + Send + Sync>;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Shared flags for commands that encode images.
#[derive(clap::Args, Clone)]
struct EncodeArgs {
    /// Output format: jpeg, png, or webp
    #[arg(long, default_value = "jpeg")]
    format: String,

    /// Encoding quality (1-100)
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: u32,

    /// Maximum output width in pixels (aspect-preserving, never upscales)
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum output height in pixels
    #[arg(long)]
    max_height: Option<u32>,

    /// Target output size, e.g. "500KB", "2MiB", or a plain byte count.
    /// Pursued by re-encoding at decreasing quality.
    #[arg(long)]
    target_size: Option<String>,
}

/// Encode arguments parsed into typed values, shared by both commands.
struct EncodeSpec {
    format: OutputFormat,
    quality: Quality,
    max_width: Option<u32>,
    max_height: Option<u32>,
    target_size: Option<u64>,
}

impl EncodeSpec {
    fn parse(args: &EncodeArgs) -> Result<Self, JobError> {
        let format = OutputFormat::from_str(&args.format)?;
        let target_size = args
            .target_size
            .as_deref()
            .map(parse_size::parse_size)
            .transpose()
            .map_err(|e| format!("invalid --target-size: {e}"))?;
        Ok(Self {
            format,
            quality: Quality::new(args.quality),
            max_width: args.max_width,
            max_height: args.max_height,
            target_size,
        })
    }
}

#[derive(Parser)]
#[command(name = "imgpress")]
#[command(about = "Compress images toward quality, dimension, and size constraints")]
#[command(long_about = "\
Compress images toward quality, dimension, and size constraints.

Sources are staged into the work directory, re-encoded there, and the final
artifact is copied to the destination; everything staged is removed when the
job ends, however it ends.

With --target-size, the encoder retries at decreasing quality (steps of 10,
floor 10, at most 10 attempts by default) until the artifact fits. If the
target is unreachable the best attempt is kept and flagged, so nothing is
silently discarded.

Supported sources: jpg, jpeg, png, gif, webp (10 MiB ceiling by default).
Supported outputs: jpeg, png, webp.

Run 'imgpress gen-config' to print a documented imgpress.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (built-in defaults when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for staged sources and in-progress artifacts
    #[arg(long, default_value = ".imgpress-work", global = true)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a single image
    Compress {
        /// Source image
        input: PathBuf,

        /// Destination path (default: alongside the input, named
        /// <stem>-compressed.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        encode: EncodeArgs,

        /// Print the result as JSON instead of the human summary
        #[arg(long)]
        json: bool,
    },
    /// Compress every supported image under a directory
    Batch {
        /// Directory to walk for source images
        input_dir: PathBuf,

        /// Directory for compressed outputs
        #[arg(long, default_value = "compressed")]
        out_dir: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Print a stock imgpress.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CompressorConfig::load(path)?,
        None => CompressorConfig::default(),
    };

    match cli.command {
        Command::Compress {
            input,
            output,
            encode,
            json,
        } => {
            let spec = EncodeSpec::parse(&encode)?;
            let workspace = Workspace::new(&cli.work_dir);
            workspace.ensure()?;

            let destination =
                output.unwrap_or_else(|| default_destination(&input, spec.format));
            let result = compress_file(&workspace, &config, &input, &spec, &destination)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_result(&input, &destination, &result, spec.target_size);
            }
        }
        Command::Batch {
            input_dir,
            out_dir,
            encode,
        } => {
            let spec = EncodeSpec::parse(&encode)?;
            let workspace = Workspace::new(&cli.work_dir);
            workspace.ensure()?;
            init_thread_pool(&config.processing);
            run_batch(&workspace, &config, &input_dir, &out_dir, &spec)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Run one job end to end: stage the source, compress, deliver the artifact
/// to `destination`, and clean up the staged files whatever happens.
fn compress_file(
    workspace: &Workspace,
    config: &CompressorConfig,
    input: &Path,
    spec: &EncodeSpec,
    destination: &Path,
) -> Result<CompressionResult, JobError> {
    let mut guard = CleanupGuard::new();

    let staged = workspace.stage_source(input, config.intake.max_source_bytes)?;
    guard.track(&staged);
    let artifact = workspace.allocate_output(spec.format);
    guard.track(&artifact);

    let request = CompressionRequest {
        source: staged,
        format: spec.format,
        quality: spec.quality,
        max_width: spec.max_width,
        max_height: spec.max_height,
        target_size: spec.target_size,
    };

    let settings = solver::SolverSettings::from(&config.solver);
    let result = solver::compress(&RustBackend::new(), &request, &artifact, &settings)?;

    // Deliver, then let the guard clear the workspace copies.
    std::fs::copy(&artifact, destination)?;
    Ok(result)
}

fn run_batch(
    workspace: &Workspace,
    config: &CompressorConfig,
    input_dir: &Path,
    out_dir: &Path,
    spec: &EncodeSpec,
) -> Result<(), JobError> {
    std::fs::create_dir_all(out_dir)?;

    let sources: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| {
                    ALLOWED_SOURCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str())
                })
        })
        .collect();

    let outcomes: Vec<(PathBuf, Result<CompressionResult, JobError>)> = sources
        .par_iter()
        .map(|source| {
            let destination = out_dir.join(batch_file_name(source, spec.format));
            let outcome = compress_file(workspace, config, source, spec, &destination);
            if let Ok(result) = &outcome {
                output::print_result(source, &destination, result, spec.target_size);
            }
            (source.clone(), outcome)
        })
        .collect();

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut original_bytes = 0u64;
    let mut compressed_bytes = 0u64;
    for (source, outcome) in &outcomes {
        match outcome {
            Ok(result) => {
                succeeded += 1;
                original_bytes += result.original_bytes;
                compressed_bytes += result.compressed_bytes;
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", source.display());
            }
        }
    }
    output::print_batch_summary(succeeded, failed, original_bytes, compressed_bytes);
    Ok(())
}

/// Default single-file destination: next to the input, `<stem>-compressed.<ext>`.
fn default_destination(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}-compressed.{}", format.extension()))
}

/// Batch output name: source stem with the output format's extension.
fn batch_file_name(source: &Path, format: OutputFormat) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{stem}.{}", format.extension())
}

/// Initialize the rayon thread pool from config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
