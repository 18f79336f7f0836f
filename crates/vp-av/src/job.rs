//! One encoder invocation per packaging format.
//!
//! An [`EncodeJob`] describes a single ffmpeg run; an [`EncodeRunner`]
//! executes it and reports exactly one [`JobOutcome`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use vp_core::JobKind;

use crate::command::ToolCommand;
use crate::matrix::ArgumentSet;

/// HLS segment name pattern, relative to the job's output directory.
const HLS_SEGMENT_PATTERN: &str = "segment_%03d.ts";

/// DASH adaptation sets: one video, one audio.
const DASH_ADAPTATION_SETS: &str = "id=0,streams=v id=1,streams=a";

// ---------------------------------------------------------------------------
// OutputTarget
// ---------------------------------------------------------------------------

/// Container / manifest produced by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    /// HLS VOD playlist with MPEG-TS segments.
    HlsPlaylist,
    /// DASH manifest with timeline + template addressing.
    DashManifest,
}

impl OutputTarget {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::HlsPlaylist => JobKind::Hls,
            Self::DashManifest => JobKind::Dash,
        }
    }

    pub fn for_kind(kind: JobKind) -> Self {
        match kind {
            JobKind::Hls => Self::HlsPlaylist,
            JobKind::Dash => Self::DashManifest,
        }
    }

    /// File name of the playlist / manifest inside the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::HlsPlaylist => "playlist.m3u8",
            Self::DashManifest => "manifest.mpd",
        }
    }

    /// Format flags that follow the codec flags, ending with the output path.
    pub fn trailing_args(&self, output_dir: &Path, segment_secs: u32) -> Vec<String> {
        let segment_secs = segment_secs.to_string();
        let output = output_dir.join(self.file_name()).to_string_lossy().to_string();

        match self {
            Self::HlsPlaylist => vec![
                "-hls_time".into(),
                segment_secs,
                "-hls_playlist_type".into(),
                "vod".into(),
                "-hls_segment_filename".into(),
                output_dir
                    .join(HLS_SEGMENT_PATTERN)
                    .to_string_lossy()
                    .to_string(),
                output,
            ],
            Self::DashManifest => vec![
                "-f".into(),
                "dash".into(),
                "-use_timeline".into(),
                "1".into(),
                "-use_template".into(),
                "1".into(),
                "-seg_duration".into(),
                segment_secs,
                "-adaptation_sets".into(),
                DASH_ADAPTATION_SETS.into(),
                output,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// EncodeJob
// ---------------------------------------------------------------------------

/// A single encoder run. Moved into the task that executes it.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub target: OutputTarget,
    pub args: ArgumentSet,
    pub segment_duration_secs: u32,
}

impl EncodeJob {
    pub fn kind(&self) -> JobKind {
        self.target.kind()
    }

    /// Path of the playlist / manifest this job writes.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.target.file_name())
    }

    /// Full ffmpeg argument vector: input flags, `-i <input>`, output flags,
    /// then the format flags and output path.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.input.len() + self.args.output.len() + 16);
        argv.extend(self.args.input.iter().cloned());
        argv.push("-i".into());
        argv.push(self.input.to_string_lossy().to_string());
        argv.extend(self.args.output.iter().cloned());
        argv.extend(
            self.target
                .trailing_args(&self.output_dir, self.segment_duration_secs),
        );
        argv
    }
}

// ---------------------------------------------------------------------------
// JobOutcome
// ---------------------------------------------------------------------------

/// Result of one [`EncodeJob`]; produced exactly once per job.
#[derive(Debug)]
pub enum JobOutcome {
    Succeeded { kind: JobKind, elapsed: Duration },
    Failed { kind: JobKind, error: vp_core::Error },
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// Executes encode jobs.
///
/// Implementations must always return an outcome (never panic on tool
/// failure) so the orchestrator can account for every job it launched.
#[async_trait]
pub trait EncodeRunner: Send + Sync {
    async fn run(&self, job: EncodeJob) -> JobOutcome;
}

/// Runs jobs by spawning ffmpeg with the job's argument vector.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    program: PathBuf,
}

impl FfmpegRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve ffmpeg from the registry, falling back to a bare `ffmpeg`
    /// lookup at spawn time when discovery did not find it.
    pub fn from_registry(tools: &crate::tools::ToolRegistry) -> Self {
        match tools.require("ffmpeg") {
            Ok(path) => Self::new(path),
            Err(e) => {
                tracing::warn!("{e}; encodes will fail until ffmpeg is installed");
                Self::new("ffmpeg")
            }
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl EncodeRunner for FfmpegRunner {
    async fn run(&self, job: EncodeJob) -> JobOutcome {
        let kind = job.kind();
        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(job.argv());

        tracing::info!(
            job = %kind,
            "{} encode: {:?} -> {:?}",
            kind.label(),
            job.input,
            job.output_path()
        );

        let started = Instant::now();
        match cmd.run_inherited().await {
            Ok(()) => {
                let elapsed = started.elapsed();
                tracing::info!(
                    job = %kind,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "{} encode finished",
                    kind.label()
                );
                JobOutcome::Succeeded { kind, elapsed }
            }
            Err(error) => {
                tracing::error!(job = %kind, error = %error, "{} encode failed", kind.label());
                JobOutcome::Failed { kind, error }
            }
        }
    }
}
