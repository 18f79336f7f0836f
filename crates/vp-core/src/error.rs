//! Unified error type for vodpack.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use crate::media::JobKind;

/// Unified error type covering all failure modes in vodpack.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request body exceeded the configured upload limit.
    #[error("Upload too large: {0}")]
    TooLarge(String),

    /// The uploaded file could not be written to storage.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool failed to spawn or exited unsuccessfully.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// One of the two encode jobs of a request failed.
    #[error("{} transcoding error: {source}", .kind.label())]
    Encode {
        /// Which packaging failed.
        kind: JobKind,
        /// The underlying process error.
        #[source]
        source: Box<Error>,
    },

    /// Configuration could not be loaded or is unusable.
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::TooLarge(_) => 413,
            Error::Persistence(_) => 500,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 502,
            Error::Encode { .. } => 500,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Wrap `source` as the failure of the `kind` encode job.
    pub fn encode(kind: JobKind, source: Error) -> Self {
        Error::Encode {
            kind,
            source: Box::new(source),
        }
    }

    /// The failing job, if this is an encode failure.
    pub fn job_kind(&self) -> Option<JobKind> {
        match self {
            Error::Encode { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = Error::Validation("Invalid codec. Use av1, hevc, or avc".into());
        assert_eq!(
            err.to_string(),
            "Validation error: Invalid codec. Use av1, hevc, or avc"
        );
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn too_large_is_413() {
        let err = Error::TooLarge("length limit exceeded".into());
        assert_eq!(err.to_string(), "Upload too large: length limit exceeded");
        assert_eq!(err.http_status(), 413);
    }

    #[test]
    fn persistence_display() {
        let err = Error::Persistence("disk full".into());
        assert_eq!(err.to_string(), "Persistence error: disk full");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "exit status: 1");
        assert_eq!(err.to_string(), "Tool error [ffmpeg]: exit status: 1");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn encode_wraps_job_kind_and_source() {
        let err = Error::encode(JobKind::Dash, Error::tool("ffmpeg", "exit status: 1"));
        assert_eq!(
            err.to_string(),
            "DASH transcoding error: Tool error [ffmpeg]: exit status: 1"
        );
        assert_eq!(err.job_kind(), Some(JobKind::Dash));
        assert_eq!(err.http_status(), 500);

        let source = std::error::Error::source(&err).expect("source preserved");
        assert!(source.to_string().contains("exit status: 1"));
    }

    #[test]
    fn non_encode_has_no_job_kind() {
        assert_eq!(Error::Internal("boom".into()).job_kind(), None);
    }
}
