//! ffmpeg argument matrix.
//!
//! [`select`] maps a `(HwAccel, Codec)` pair to the flags that go before
//! `-i` and the flags that go after it. The mapping is pure and
//! deterministic: the same pair always yields byte-identical lists.
//!
//! The codec picks a baseline output set. The hardware profile picks the
//! decode flags and may prepend its own encoder selection ahead of that
//! baseline. Two exceptions:
//!
//! - Intel and AMD have no AV1 encoder; AV1 falls back to software with no
//!   input flags.
//! - Apple AVC replaces the baseline entirely, since the baseline's
//!   `yuv420p` pixel format does not suit the VideoToolbox path.

use std::fmt;

use serde::Serialize;
use vp_core::{Codec, HwAccel};

/// Ordered ffmpeg flags for one encode: `input` precede `-i <path>`,
/// `output` follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgumentSet {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

impl ArgumentSet {
    fn build(input: &[&str], prefix: &[&str], baseline: &[&str]) -> Self {
        Self {
            input: input.iter().map(|s| s.to_string()).collect(),
            output: prefix
                .iter()
                .chain(baseline.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl fmt::Display for ArgumentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input: [{}] output: [{}]",
            self.input.join(" "),
            self.output.join(" ")
        )
    }
}

// ---------------------------------------------------------------------------
// Baselines
// ---------------------------------------------------------------------------

const AV1_BASELINE: &[&str] = &[
    "-c:v", "libaom-av1",
    "-crf", "30",
    "-b:v", "0",
    "-strict", "experimental",
    "-c:a", "aac",
    "-b:a", "128k",
];

const HEVC_BASELINE: &[&str] = &[
    "-c:v", "libx265",
    "-crf", "28",
    "-preset", "medium",
    "-c:a", "aac",
    "-b:a", "128k",
];

// Closed GOP of 48 frames with scene-cut keyframes and B-frames disabled so
// HLS and DASH segment boundaries line up.
const AVC_BASELINE: &[&str] = &[
    "-c:v", "libx264",
    "-preset", "ultrafast",
    "-tune", "fastdecode",
    "-profile:v", "baseline",
    "-level", "3.0",
    "-b:v", "2M",
    "-maxrate", "2.5M",
    "-bufsize", "5M",
    "-pix_fmt", "yuv420p",
    "-c:a", "aac",
    "-b:a", "128k",
    "-movflags", "+faststart",
    "-g", "48",
    "-keyint_min", "48",
    "-sc_threshold", "0",
    "-bf", "0",
];

const APPLE_AVC_OUTPUT: &[&str] = &[
    "-c:v", "h264_videotoolbox",
    "-b:v", "2M",
    "-maxrate", "2.5M",
    "-bufsize", "5M",
    "-pix_fmt", "nv12",
    "-c:a", "aac",
    "-b:a", "128k",
];

/// Software output flags for `codec`, independent of hardware.
fn baseline_output(codec: Codec) -> &'static [&'static str] {
    match codec {
        Codec::Av1 => AV1_BASELINE,
        Codec::Hevc => HEVC_BASELINE,
        Codec::Avc => AVC_BASELINE,
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Select the argument set for a hardware profile and codec.
pub fn select(hw: HwAccel, codec: Codec) -> ArgumentSet {
    let baseline = baseline_output(codec);

    match hw {
        HwAccel::None => ArgumentSet::build(&[], &[], baseline),
        HwAccel::Nvidia => {
            let prefix: &[&str] = match codec {
                Codec::Av1 => &["-c:v", "av1_nvenc"],
                Codec::Hevc => &["-c:v", "hevc_nvenc"],
                Codec::Avc => &["-c:v", "h264_nvenc", "-preset", "p4", "-tune", "ll"],
            };
            ArgumentSet::build(&["-hwaccel", "cuda"], prefix, baseline)
        }
        HwAccel::Intel => {
            let prefix: &[&str] = match codec {
                Codec::Av1 => return ArgumentSet::build(&[], &[], baseline),
                Codec::Hevc => &["-c:v", "hevc_qsv"],
                Codec::Avc => &["-c:v", "h264_qsv", "-preset", "faster"],
            };
            ArgumentSet::build(&["-hwaccel", "qsv"], prefix, baseline)
        }
        HwAccel::Amd => {
            let prefix: &[&str] = match codec {
                Codec::Av1 => return ArgumentSet::build(&[], &[], baseline),
                Codec::Hevc => &["-c:v", "hevc_amf"],
                Codec::Avc => &["-c:v", "h264_amf", "-quality", "speed"],
            };
            ArgumentSet::build(&["-hwaccel", "amf"], prefix, baseline)
        }
        HwAccel::Apple => {
            let prefix: &[&str] = match codec {
                Codec::Avc => {
                    return ArgumentSet::build(&["-hwaccel", "videotoolbox"], &[], APPLE_AVC_OUTPUT)
                }
                Codec::Hevc => &["-c:v", "hevc_videotoolbox"],
                Codec::Av1 => &[],
            };
            ArgumentSet::build(
                &[
                    "-hwaccel",
                    "videotoolbox",
                    "-hwaccel_output_format",
                    "videotoolbox_vld",
                ],
                prefix,
                baseline,
            )
        }
    }
}
