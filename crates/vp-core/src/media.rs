//! Media-domain enums for encode profiles and packaging jobs.
//!
//! All enums serialize in lowercase (via `serde(rename_all = "lowercase")`) and
//! implement `Display` manually for consistent string representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

// ---------------------------------------------------------------------------
// HwAccel
// ---------------------------------------------------------------------------

/// Hardware encoder family targeted by the encoder invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HwAccel {
    /// Pure software encoding.
    #[default]
    #[serde(alias = "software")]
    None,
    /// NVENC / CUDA.
    Nvidia,
    /// Quick Sync Video.
    Intel,
    /// AMF.
    Amd,
    /// VideoToolbox.
    #[serde(alias = "macos", alias = "videotoolbox")]
    Apple,
}

impl HwAccel {
    /// Every supported profile, in declaration order.
    pub const ALL: [HwAccel; 5] = [
        HwAccel::None,
        HwAccel::Nvidia,
        HwAccel::Intel,
        HwAccel::Amd,
        HwAccel::Apple,
    ];

    /// Parse a profile name, falling back to [`HwAccel::None`] for anything
    /// unrecognized. The fallback is logged so operators can spot typos.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown hardware acceleration profile '{s}'; using software encoding");
            HwAccel::None
        })
    }
}

impl fmt::Display for HwAccel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Nvidia => write!(f, "nvidia"),
            Self::Intel => write!(f, "intel"),
            Self::Amd => write!(f, "amd"),
            Self::Apple => write!(f, "apple"),
        }
    }
}

impl FromStr for HwAccel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "software" | "" => Ok(Self::None),
            "nvidia" => Ok(Self::Nvidia),
            "intel" => Ok(Self::Intel),
            "amd" => Ok(Self::Amd),
            "apple" | "macos" | "videotoolbox" => Ok(Self::Apple),
            other => Err(Error::Validation(format!(
                "unknown hardware acceleration profile '{other}' (valid: none, nvidia, intel, amd, apple)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Target video codec for both packagings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// H.264.
    #[default]
    Avc,
    /// H.265.
    Hevc,
    Av1,
}

impl Codec {
    pub const ALL: [Codec; 3] = [Codec::Avc, Codec::Hevc, Codec::Av1];
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Avc => write!(f, "avc"),
            Self::Hevc => write!(f, "hevc"),
            Self::Av1 => write!(f, "av1"),
        }
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avc" => Ok(Self::Avc),
            "hevc" => Ok(Self::Hevc),
            "av1" => Ok(Self::Av1),
            _ => Err(Error::Validation(
                "Invalid codec. Use av1, hevc, or avc".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// JobKind
// ---------------------------------------------------------------------------

/// Discriminator for the two encode units of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Hls,
    Dash,
}

impl JobKind {
    /// Lowercase key used in URLs, directory names, and result maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hls => "hls",
            Self::Dash => "dash",
        }
    }

    /// Uppercase label used in log lines and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hls => "HLS",
            Self::Dash => "DASH",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
