mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

use vp_av::{matrix, FfmpegRunner, ToolRegistry, Transcoder, TranscoderConfig};
use vp_core::config::Config;
use vp_core::{Codec, HwAccel, VideoId};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vodpack=debug,vp_core=debug,vp_av=debug,vp_server=debug,tower_http=debug".to_string()
        } else {
            "vodpack=info,vp_core=info,vp_av=info,vp_server=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = load_config(cli.config.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            tracing::info!("Starting vodpack server");
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(vp_server::start(config))?;
            Ok(())
        }
        Commands::Transcode { input, codec, id } => {
            let config = load_config(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(transcode_file(config, &input, &codec, id.as_deref()))
        }
        Commands::Args { hw, codec } => {
            let config = load_config(cli.config.as_deref());
            let hw = match hw {
                Some(h) => h.parse::<HwAccel>()?,
                None => config.encoder.hw_accel,
            };
            print_args(hw, codec.parse()?)
        }
        Commands::CheckTools => {
            let config = load_config(cli.config.as_deref());
            check_tools(&config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vodpack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// File (if any) first, then the environment on top.
fn load_config(path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_env();
    config
}

async fn transcode_file(config: Config, input: &Path, codec: &str, id: Option<&str>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    let codec: Codec = codec.parse()?;
    let id = match id {
        Some(s) => s
            .parse::<VideoId>()
            .with_context(|| format!("invalid video id '{s}'"))?,
        None => VideoId::new(),
    };

    config.storage.ensure_layout()?;

    let tools = ToolRegistry::discover(&config.encoder);
    let runner = Arc::new(FfmpegRunner::from_registry(&tools));
    let transcoder = Transcoder::new(TranscoderConfig::from(&config), runner);

    tracing::info!(
        video_id = %id,
        codec = %codec,
        hw_accel = %config.encoder.hw_accel,
        "Transcoding {:?}",
        input
    );

    let result = transcoder.transcode(input, id, codec).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn print_args(hw: HwAccel, codec: Codec) -> Result<()> {
    println!("{hw}/{codec}: {}", matrix::select(hw, codec));
    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.encoder);
    let mut all_ok = true;

    for tool in tools.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({version})");
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Install it or set FFMPEG_PATH.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let contents = std::fs::read_to_string(p)
                .with_context(|| format!("failed to read {}", p.display()))?;
            let config = Config::from_json(&contents)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Public URL: {}", config.server.public_base_url);
    println!("  Storage: {}", config.storage.root.display());
    println!("  HW accel: {}", config.encoder.hw_accel);
    println!(
        "  Segment duration: {}s",
        config.encoder.segment_duration_secs
    );

    for warning in config.validate() {
        println!("  warning: {warning}");
    }

    Ok(())
}
