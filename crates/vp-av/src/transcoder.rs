//! Dual HLS/DASH transcode orchestration.
//!
//! [`Transcoder::transcode`] runs the two encode jobs of one upload on
//! separate tasks, waits for both to report through a fan-in channel, and
//! either returns a complete [`TranscodeResult`] or the first failure that
//! arrived. A failed request leaves whatever the sibling job wrote on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc;

use vp_core::config::Config;
use vp_core::{Codec, Error, HwAccel, JobKind, VideoId};

use crate::job::{EncodeJob, EncodeRunner, JobOutcome, OutputTarget};
use crate::matrix;

/// Jobs launched per request.
const JOBS_PER_REQUEST: usize = 2;

/// Settings fixed for the lifetime of a [`Transcoder`].
#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    pub hw_accel: HwAccel,
    pub storage_root: PathBuf,
    /// Prefix of the returned URLs; a trailing `/` is ignored.
    pub public_base_url: String,
    pub segment_duration_secs: u32,
}

impl From<&Config> for TranscoderConfig {
    fn from(config: &Config) -> Self {
        Self {
            hw_accel: config.encoder.hw_accel,
            storage_root: config.storage.root.clone(),
            public_base_url: config.server.public_base_url.clone(),
            segment_duration_secs: config.encoder.segment_duration_secs,
        }
    }
}

/// Outcome of a fully successful request.
#[derive(Debug, Clone, Serialize)]
pub struct TranscodeResult {
    pub id: VideoId,
    pub urls: BTreeMap<JobKind, String>,
    /// Encode wall-clock time per job, in seconds.
    pub timings: BTreeMap<JobKind, f64>,
    /// Wall-clock time of the whole `transcode` call, in seconds.
    pub total_secs: f64,
}

impl TranscodeResult {
    pub fn url(&self, kind: JobKind) -> Option<&str> {
        self.urls.get(&kind).map(String::as_str)
    }

    pub fn elapsed_secs(&self, kind: JobKind) -> Option<f64> {
        self.timings.get(&kind).copied()
    }
}

/// Orchestrates the HLS and DASH encodes of uploaded videos.
///
/// Stateless between calls; any number of requests may run at once.
#[derive(Clone)]
pub struct Transcoder {
    config: TranscoderConfig,
    runner: Arc<dyn EncodeRunner>,
}

impl Transcoder {
    pub fn new(config: TranscoderConfig, runner: Arc<dyn EncodeRunner>) -> Self {
        Self { config, runner }
    }

    /// Output directory of `kind` for video `id`.
    pub fn output_dir(&self, kind: JobKind, id: VideoId) -> PathBuf {
        self.config
            .storage_root
            .join(kind.as_str())
            .join(id.to_string())
    }

    /// Public URL of the playlist / manifest of `kind` for video `id`.
    pub fn public_url(&self, kind: JobKind, id: VideoId) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            kind.as_str(),
            id,
            OutputTarget::for_kind(kind).file_name()
        )
    }

    /// Build the two jobs for one request without touching the filesystem.
    pub fn plan(&self, input: &Path, id: VideoId, codec: Codec) -> [EncodeJob; JOBS_PER_REQUEST] {
        let args = matrix::select(self.config.hw_accel, codec);
        [JobKind::Hls, JobKind::Dash].map(|kind| EncodeJob {
            input: input.to_path_buf(),
            output_dir: self.output_dir(kind, id),
            target: OutputTarget::for_kind(kind),
            args: args.clone(),
            segment_duration_secs: self.config.segment_duration_secs,
        })
    }

    /// Encode `input` into HLS and DASH concurrently.
    ///
    /// Both jobs are always awaited. If either fails the first failure to
    /// arrive is returned as [`Error::Encode`] and the other outcome is
    /// discarded; no output is cleaned up.
    pub async fn transcode(
        &self,
        input: &Path,
        id: VideoId,
        codec: Codec,
    ) -> vp_core::Result<TranscodeResult> {
        let started = Instant::now();

        let jobs = self.plan(input, id, codec);
        for job in &jobs {
            tokio::fs::create_dir_all(&job.output_dir).await?;
        }

        tracing::info!(
            video_id = %id,
            codec = %codec,
            hw_accel = %self.config.hw_accel,
            "Starting HLS and DASH encodes"
        );

        let (tx, mut rx) = mpsc::channel::<JobOutcome>(JOBS_PER_REQUEST);
        for job in jobs {
            let tx = tx.clone();
            let runner = Arc::clone(&self.runner);
            tokio::spawn(async move {
                let outcome = runner.run(job).await;
                // Receiver only goes away if the caller was dropped.
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        let mut timings = BTreeMap::new();
        let mut failure: Option<Error> = None;

        for _ in 0..JOBS_PER_REQUEST {
            match rx.recv().await {
                Some(JobOutcome::Succeeded { kind, elapsed }) => {
                    timings.insert(kind, elapsed.as_secs_f64());
                }
                Some(JobOutcome::Failed { kind, error }) => {
                    if failure.is_none() {
                        failure = Some(Error::encode(kind, error));
                    } else {
                        tracing::warn!(video_id = %id, job = %kind, "Discarding second failure: {error}");
                    }
                }
                None => {
                    // A task ended without sending, i.e. the runner panicked.
                    failure.get_or_insert_with(|| {
                        Error::Internal("encode task exited without reporting".into())
                    });
                    break;
                }
            }
        }

        if let Some(err) = failure {
            tracing::error!(video_id = %id, error = %err, "Transcode failed");
            return Err(err);
        }

        let urls = [JobKind::Hls, JobKind::Dash]
            .into_iter()
            .map(|kind| (kind, self.public_url(kind, id)))
            .collect();

        let result = TranscodeResult {
            id,
            urls,
            timings,
            total_secs: started.elapsed().as_secs_f64(),
        };

        tracing::info!(
            video_id = %id,
            total_secs = result.total_secs,
            "Transcode complete"
        );

        Ok(result)
    }
}
