//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which owns a scratch storage root, a scripted
//! encoder and a running Axum server on a random port.

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use vp_av::{EncodeJob, EncodeRunner, JobOutcome, ToolRegistry};
use vp_core::config::Config;
use vp_core::{Error, JobKind};
use vp_server::context::AppContext;
use vp_server::router::build_router;

/// Encoder double: writes a stub playlist / manifest and reports success,
/// unless its kind is scripted to fail.
#[derive(Default)]
pub struct ScriptedRunner {
    pub fail: HashSet<JobKind>,
    pub delay: Option<Duration>,
    pub seen: Mutex<Vec<EncodeJob>>,
}

impl ScriptedRunner {
    pub fn failing(kind: JobKind) -> Self {
        Self {
            fail: HashSet::from([kind]),
            ..Self::default()
        }
    }

    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<EncodeJob> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncodeRunner for ScriptedRunner {
    async fn run(&self, job: EncodeJob) -> JobOutcome {
        let kind = job.kind();
        self.seen.lock().unwrap().push(job.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.contains(&kind) {
            return JobOutcome::Failed {
                kind,
                error: Error::tool("ffmpeg", "exited with exit status: 1"),
            };
        }

        let body = match kind {
            JobKind::Hls => format!("#EXTM3U\n# {}\n", job.input.display()),
            JobKind::Dash => format!("<MPD src=\"{}\"/>\n", job.input.display()),
        };
        if let Err(e) = tokio::fs::write(job.output_path(), body).await {
            return JobOutcome::Failed {
                kind,
                error: e.into(),
            };
        }

        JobOutcome::Succeeded {
            kind,
            elapsed: self.delay.unwrap_or(Duration::from_millis(1)),
        }
    }
}

/// Running server backed by a temporary storage root.
pub struct TestHarness {
    pub ctx: AppContext,
    pub runner: Arc<ScriptedRunner>,
    pub addr: SocketAddr,
    storage: TempDir,
}

impl TestHarness {
    /// Start a server whose encodes always succeed.
    pub async fn start() -> Self {
        Self::with_runner(ScriptedRunner::default()).await
    }

    /// Start a server on a random port using `runner` for encodes.
    pub async fn with_runner(runner: ScriptedRunner) -> Self {
        Self::with_config(runner, |_| {}).await
    }

    /// Like [`with_runner`](Self::with_runner), letting `tweak` adjust the
    /// config before the server starts.
    pub async fn with_config(runner: ScriptedRunner, tweak: impl FnOnce(&mut Config)) -> Self {
        let storage = tempfile::tempdir().expect("failed to create storage dir");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        let mut config = Config::default();
        config.storage.root = storage.path().to_path_buf();
        config.server.public_base_url = format!("http://{addr}");
        tweak(&mut config);
        config.storage.ensure_layout().expect("failed to create layout");

        let runner = Arc::new(runner);
        let ctx = AppContext::new(config, ToolRegistry::default(), runner.clone());
        let app = build_router(ctx.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            ctx,
            runner,
            addr,
            storage,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn root(&self) -> &Path {
        self.storage.path()
    }

    /// Output directory of `kind` for the video with id `id`.
    pub fn output_dir(&self, kind: JobKind, id: &str) -> PathBuf {
        self.root().join(kind.as_str()).join(id)
    }

    /// Files currently in the uploads directory.
    pub fn uploads(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.root().join("uploads"))
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    /// POST `bytes` as the `video` field of a multipart upload.
    pub async fn upload(&self, query: &str, file_name: &str, bytes: &[u8]) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("video", part);
        reqwest::Client::new()
            .post(self.url(&format!("/api/videos{query}")))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }
}
