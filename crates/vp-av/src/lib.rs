//! # vp-av
//!
//! Encoder argument selection, external tool management, and the dual
//! HLS/DASH transcode orchestration for vodpack.
//!
//! This crate provides:
//!
//! - **Parameter matrix** ([`matrix::select`]) -- maps a hardware profile and
//!   codec to ordered ffmpeg input/output flags.
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to ffmpeg.
//! - **Command execution** ([`ToolCommand`]) -- async process launch with the
//!   child's output inherited by the server.
//! - **Job runner** ([`EncodeRunner`], [`FfmpegRunner`]) -- one encoder
//!   invocation per [`EncodeJob`], reported as a [`JobOutcome`].
//! - **Orchestrator** ([`Transcoder`]) -- runs the HLS and DASH jobs of one
//!   request concurrently and reduces them into a [`TranscodeResult`].

pub mod command;
pub mod job;
pub mod matrix;
pub mod tools;
pub mod transcoder;

// ---- Re-exports for convenience ----

pub use command::ToolCommand;
pub use job::{EncodeJob, EncodeRunner, FfmpegRunner, JobOutcome, OutputTarget};
pub use matrix::ArgumentSet;
pub use tools::{ToolInfo, ToolRegistry};
pub use transcoder::{TranscodeResult, Transcoder, TranscoderConfig};
