use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lyric_motion_core::{
    AnimationScheduler, EngineConfig, FrameLoop, FrameSource, LineClassifier, LyricsDocument,
    ManualFrames, PlaybackAction, PlaybackClock, PlaybackScript, RealtimeFrames, ScheduledEvent,
};
use tracing_subscriber::EnvFilter;

fn main() -> lyric_motion_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => run_simulate(&args),
        Commands::Classify {
            document,
            time,
            config,
        } => run_classify(&document, time, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> lyric_motion_core::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path),
        None => Ok(EngineConfig::default()),
    }
}

fn run_simulate(args: &SimulateArgs) -> lyric_motion_core::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let document = LyricsDocument::from_path(&args.document)?;
    tracing::info!(
        document = ?args.document,
        lines = document.len(),
        fps = args.fps,
        duration = args.duration,
        "starting simulation"
    );

    let mut scheduler = AnimationScheduler::new(config)?;
    scheduler.set_document(Some(document));

    let mut events = Vec::new();
    if let (Some(at), Some(to)) = (args.seek_at, args.seek_to) {
        events.push(ScheduledEvent::new(at, PlaybackAction::Seek { to }));
    } else if args.seek_at.is_some() || args.seek_to.is_some() {
        return Err("--seek-at and --seek-to must be given together".into());
    }
    if let Some(at) = args.pause_at {
        events.push(ScheduledEvent::new(at, PlaybackAction::Pause));
    }
    let mut script = PlaybackScript::new(events);
    let mut clock = PlaybackClock::playing_from(args.start);

    let every = args.every.max(1);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;
    let mut frame_index = 0usize;
    let mut on_frame = |scheduler: &AnimationScheduler| {
        frame_index += 1;
        if write_error.is_some() || frame_index % every != 0 {
            return;
        }
        let written = serde_json::to_string(&scheduler.snapshot())
            .map_err(lyric_motion_core::LyricMotionError::from)
            .and_then(|line| writeln!(out, "{line}").map_err(Into::into));
        if let Err(err) = written {
            write_error = Some(err);
        }
    };

    let mut source: Box<dyn FrameSource> = if args.realtime {
        Box::new(RealtimeFrames::new(args.fps, args.duration))
    } else {
        Box::new(ManualFrames::at_fps(args.fps, args.duration))
    };
    let report = FrameLoop::default().drive(
        &mut scheduler,
        &mut source,
        &mut clock,
        &mut script,
        &mut on_frame,
    );

    if let Some(err) = write_error {
        return Err(err);
    }
    tracing::info!(
        ticks = report.ticks,
        elapsed = report.elapsed,
        went_idle = report.went_idle,
        "simulation finished"
    );
    Ok(())
}

fn run_classify(
    document: &Path,
    time: f32,
    config: Option<&Path>,
) -> lyric_motion_core::Result<()> {
    let config = load_config(config)?;
    let document = LyricsDocument::from_path(document)?;
    let classifier = LineClassifier::from_config(&config);
    tracing::info!(time, lines = document.len(), "classifying document");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (index, line) in document.lines().iter().enumerate() {
        let classification = classifier.classify(document.lines(), index, time);
        let row = serde_json::json!({
            "index": index,
            "time": line.time,
            "text": line.text,
            "state": classification.state,
            "progress": classification.progress,
            "duration": classification.duration,
        });
        writeln!(out, "{row}")?;
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Spring-animated lyric highlighting engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a document with a simulated clock and print frames as JSON lines.
    Simulate(SimulateArgs),
    /// Print the state and progress of every line at a given time.
    Classify {
        /// Path to the JSON lyrics document.
        document: PathBuf,
        /// Playback position in seconds.
        #[arg(short, long)]
        time: f32,
        /// Optional engine configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    /// Path to the JSON lyrics document.
    document: PathBuf,
    /// Optional engine configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Frames per second of the simulated display.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Seconds of loop time to simulate.
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,
    /// Playback position to start from.
    #[arg(long, default_value_t = 0.0)]
    start: f32,
    /// Loop time at which to seek.
    #[arg(long)]
    seek_at: Option<f32>,
    /// Playback position to seek to.
    #[arg(long)]
    seek_to: Option<f32>,
    /// Loop time at which to pause playback.
    #[arg(long)]
    pause_at: Option<f32>,
    /// Print every Nth frame.
    #[arg(long, default_value_t = 1)]
    every: usize,
    /// Pace frames by the wall clock instead of simulating them.
    #[arg(long)]
    realtime: bool,
}
