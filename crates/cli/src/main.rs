use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use rollcall_core::annotate::annotator::FrameAnnotator;
use rollcall_core::annotate::overlay::LabelFont;
use rollcall_core::collection::registry::{CollectionRegistry, CreateOutcome, DeleteOutcome};
use rollcall_core::pipeline::enroll_faces_use_case::EnrollFacesUseCase;
use rollcall_core::pipeline::recognize_image_use_case::RecognizeImageUseCase;
use rollcall_core::recognition::domain::outcome::display_names;
use rollcall_core::recognition::domain::provider::RecognitionProvider;
use rollcall_core::recognition::infrastructure::rest_provider::RestProvider;
use rollcall_core::shared::asset_resolver;
use rollcall_core::shared::config::Settings;
use rollcall_core::shared::constants::{LABEL_FONT_NAME, LABEL_FONT_URL};
use rollcall_core::stream::domain::controller::{mjpeg_part, LiveStreamController};
use rollcall_core::stream::domain::frame_source::FrameSource;
use rollcall_core::stream::infrastructure::ffmpeg_source::FfmpegFrameSource;
use rollcall_core::stream::infrastructure::threaded_stream::ThreadedStream;

/// Attendance-style face recognition backed by a remote provider.
#[derive(Parser)]
#[command(name = "rollcall")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Minimum match similarity in percent (overrides settings file).
    #[arg(long, global = true)]
    threshold: Option<f32>,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or initialize the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage face collections on the provider.
    Collections {
        #[command(subcommand)]
        action: CollectionsAction,
    },

    /// Enroll a person from one or more reference images.
    Enroll {
        /// Collection to enroll into.
        #[arg(long)]
        collection: String,

        /// Person identifier (no spaces).
        #[arg(long)]
        person: String,

        /// Reference images, e.g. several poses of the same face.
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Recognize faces in a single image and write an annotated copy.
    Recognize {
        /// Collection to search.
        #[arg(long)]
        collection: String,

        /// Input image (png, jpg, jpeg, gif).
        input: PathBuf,

        /// Annotated output image (default: annotated_<input name>).
        output: Option<PathBuf>,
    },

    /// Stream a video source as MJPEG with live recognition overlays.
    Live {
        /// Collection to search.
        #[arg(long)]
        collection: String,

        /// Video file or capture device.
        source: PathBuf,

        /// Run recognition every Nth frame (overrides settings file).
        #[arg(long)]
        interval: Option<usize>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the current effective settings to the settings file.
    Init,
    /// Print the effective settings (file plus environment overrides).
    Show,
}

#[derive(Subcommand)]
enum CollectionsAction {
    /// List all collections.
    List,
    /// Create a collection.
    Create { name: String },
    /// Delete a collection.
    Delete { name: String },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = Settings::load();
    let threshold = cli.threshold.unwrap_or(settings.match_threshold);
    let provider: Arc<dyn RecognitionProvider> = Arc::new(RestProvider::new(&settings));

    match cli.command {
        Command::Config { action } => run_config(action, &settings),
        Command::Collections { action } => run_collections(action, provider),
        Command::Enroll {
            collection,
            person,
            images,
        } => run_enroll(&collection, &person, &images, provider),
        Command::Recognize {
            collection,
            input,
            output,
        } => run_recognize(&collection, &input, output, provider, threshold),
        Command::Live {
            collection,
            source,
            interval,
        } => {
            let interval = interval.unwrap_or(settings.sample_interval);
            run_live(&collection, &source, interval, provider, threshold)
        }
    }
}

fn run_config(
    action: ConfigAction,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Init => {
            let path = settings.save()?;
            println!("Settings written to {}", path.display());
        }
        ConfigAction::Show => {
            println!("endpoint:        {}", settings.endpoint);
            println!(
                "api_key:         {}",
                if settings.api_key.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!("region:          {}", settings.region);
            println!("match_threshold: {}", settings.match_threshold);
            println!("sample_interval: {}", settings.sample_interval);
        }
    }
    Ok(())
}

fn run_collections(
    action: CollectionsAction,
    provider: Arc<dyn RecognitionProvider>,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = CollectionRegistry::new(provider);
    match action {
        CollectionsAction::List => {
            let listing = registry.list()?;
            println!("{} collection(s)", listing.count);
            for name in listing.names {
                println!("  {name}");
            }
        }
        CollectionsAction::Create { name } => {
            let outcome = registry.create(&name);
            println!("{outcome}");
            if let CreateOutcome::Failed(message) = outcome {
                return Err(message.into());
            }
        }
        CollectionsAction::Delete { name } => {
            let outcome = registry.delete(&name);
            println!("{outcome}");
            if let DeleteOutcome::Failed(message) = outcome {
                return Err(message.into());
            }
        }
    }
    Ok(())
}

fn run_enroll(
    collection: &str,
    person: &str,
    images: &[PathBuf],
    provider: Arc<dyn RecognitionProvider>,
) -> Result<(), Box<dyn std::error::Error>> {
    let use_case = EnrollFacesUseCase::new(CollectionRegistry::new(provider));
    let reports = use_case.execute(collection, person, images);
    for report in &reports {
        println!("{}: {}", report.path.display(), report.outcome);
    }
    Ok(())
}

fn run_recognize(
    collection: &str,
    input: &Path,
    output: Option<PathBuf>,
    provider: Arc<dyn RecognitionProvider>,
    threshold: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| default_output_path(input));
    let annotator = FrameAnnotator::new(provider, threshold, resolve_font());
    let use_case = RecognizeImageUseCase::new(annotator);

    let outcomes = use_case.execute(input, &output, collection)?;
    let names = display_names(&outcomes);
    if names.is_empty() {
        println!("No faces found");
    } else {
        println!("Recognized: {}", names.join(", "));
    }
    log::info!("Output written to {}", output.display());
    Ok(())
}

fn run_live(
    collection: &str,
    source: &Path,
    interval: usize,
    provider: Arc<dyn RecognitionProvider>,
    threshold: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let capture = FfmpegFrameSource::open(source)?;
    let threaded: Box<dyn FrameSource> = Box::new(ThreadedStream::spawn(Box::new(capture)));

    let annotator = FrameAnnotator::new(provider, threshold, resolve_font());
    let mut controller = LiveStreamController::new(threaded, annotator, collection, interval);
    let snapshot = controller.snapshot();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for jpeg in controller.by_ref() {
        if out.write_all(&mjpeg_part(&jpeg)).is_err() {
            // Consumer hung up; stop streaming.
            break;
        }
    }

    let names = snapshot.names();
    if !names.is_empty() {
        log::info!("Last recognized: {}", names.join(", "));
    }
    if let Some(summary) = controller.stats().summary_string() {
        log::info!("\n\n{summary}");
    }
    Ok(())
}

fn resolve_font() -> Option<LabelFont> {
    let path = match asset_resolver::resolve(
        LABEL_FONT_NAME,
        LABEL_FONT_URL,
        Some(Box::new(download_progress)),
    ) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("label font unavailable, overlays will have no text: {e}");
            return None;
        }
    };
    eprintln!();
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("could not read label font {}: {e}", path.display());
            return None;
        }
    };
    match LabelFont::from_bytes(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("invalid label font {}: {e}", path.display());
            None
        }
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.png".to_string());
    input.with_file_name(format!("annotated_{name}"))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(threshold) = cli.threshold {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(format!("Threshold must be between 0 and 100, got {threshold}").into());
        }
    }
    match &cli.command {
        Command::Enroll { person, .. } if person.chars().any(char::is_whitespace) => {
            Err(format!("Person identifier must not contain spaces: '{person}'").into())
        }
        Command::Live {
            interval: Some(0), ..
        } => Err("Interval must be at least 1".into()),
        Command::Live { source, .. } if !source.exists() => {
            Err(format!("Video source not found: {}", source.display()).into())
        }
        _ => Ok(()),
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading label font... {pct}%");
    } else {
        eprint!("\rDownloading label font... {downloaded} bytes");
    }
}
