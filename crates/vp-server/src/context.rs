//! Application context shared across route handlers via Axum state.

use std::sync::Arc;

use vp_av::{EncodeRunner, ToolRegistry, Transcoder, TranscoderConfig};
use vp_core::config::Config;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s. Everything in it
/// is fixed at startup; requests never share mutable state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub tools: Arc<ToolRegistry>,
    pub transcoder: Arc<Transcoder>,
}

impl AppContext {
    /// Build a context around `runner`, reading the hardware profile and
    /// storage layout from `config` once.
    pub fn new(config: Config, tools: ToolRegistry, runner: Arc<dyn EncodeRunner>) -> Self {
        let transcoder = Transcoder::new(TranscoderConfig::from(&config), runner);
        Self {
            config: Arc::new(config),
            tools: Arc::new(tools),
            transcoder: Arc::new(transcoder),
        }
    }
}
