//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and then
//! overlaid with environment variables once at startup. Every section
//! defaults sensibly so a completely empty `{}` file (or no file at all)
//! is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::media::HwAccel;
use crate::Error;

/// Sub-directories created under the storage root at startup.
const STORAGE_SUBDIRS: &[&str] = &["uploads", "transcoded", "hls", "dash"];

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub encoder: EncoderConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Overlay settings from the process environment.
    ///
    /// Recognized variables: `STORAGE_PATH`, `HOST`, `PORT`, `HW_ACCEL`,
    /// `PUBLIC_BASE_URL`, `FFMPEG_PATH`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env`](Self::apply_env) with an explicit lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup("STORAGE_PATH") {
            self.storage.root = PathBuf::from(root);
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(e) => tracing::warn!("Ignoring invalid PORT '{port}': {e}"),
            }
        }
        if let Some(hw) = lookup("HW_ACCEL") {
            self.encoder.hw_accel = HwAccel::parse_lenient(&hw);
        }
        if let Some(url) = lookup("PUBLIC_BASE_URL") {
            self.server.public_base_url = url;
        }
        if let Some(path) = lookup("FFMPEG_PATH") {
            self.encoder.ffmpeg_path = Some(PathBuf::from(path));
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.public_base_url.is_empty() {
            warnings.push("server.public_base_url is empty; result URLs will be relative".into());
        } else if self.server.public_base_url.ends_with('/') {
            warnings.push("server.public_base_url ends with '/'; it will be trimmed".into());
        }

        if self.encoder.segment_duration_secs == 0 {
            warnings.push("encoder.segment_duration_secs is 0; ffmpeg will reject it".into());
        }

        if let Some(ref p) = self.encoder.ffmpeg_path {
            if !p.exists() {
                warnings.push(format!(
                    "encoder.ffmpeg_path {} does not exist; falling back to PATH",
                    p.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix of the URLs returned to clients, e.g. `http://localhost:3000`.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            public_base_url: "http://localhost:3000".into(),
            max_upload_bytes: 4 * 1024 * 1024 * 1024,
        }
    }
}

/// On-disk layout of uploads and packaged outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./videos"),
        }
    }
}

impl StorageConfig {
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    pub fn hls_dir(&self) -> PathBuf {
        self.root.join("hls")
    }

    pub fn dash_dir(&self) -> PathBuf {
        self.root.join("dash")
    }

    /// Create the storage root and its fixed sub-directories.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in STORAGE_SUBDIRS {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }
}

/// Encoder invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Hardware encoder family; read once at startup.
    pub hw_accel: HwAccel,
    /// Explicit ffmpeg binary. When unset (or missing) `PATH` is searched.
    pub ffmpeg_path: Option<PathBuf>,
    #[serde(default = "default_segment_duration")]
    pub segment_duration_secs: u32,
}

fn default_segment_duration() -> u32 {
    4
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            hw_accel: HwAccel::None,
            ffmpeg_path: None,
            segment_duration_secs: default_segment_duration(),
        }
    }
}
