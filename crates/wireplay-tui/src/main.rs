//! wireplay terminal binary.
//!
//! # Usage
//!
//! ```bash
//! # Replay the TCP three-way handshake
//! wireplay
//!
//! # Replay the MITM interception, slower motion, with a debug log
//! wireplay --script mitm --frame-interval-ms 80 --log-file wireplay.log --log-level debug
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use tokio::runtime::Handle;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wireplay_core::{RunController, RunnerConfig, mitm_interception, three_way_handshake};

mod app;
mod surface;
mod system_env;

use app::App;
use system_env::SystemEnv;

/// Built-in exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScriptChoice {
    /// TCP three-way handshake between a client and a server.
    Handshake,
    /// Man-in-the-middle interception between Alice, an attacker, and Bob.
    Mitm,
}

impl ScriptChoice {
    fn title(self) -> &'static str {
        match self {
            Self::Handshake => "TCP three-way handshake",
            Self::Mitm => "MITM interception",
        }
    }
}

/// Scripted protocol replay in the terminal
#[derive(Parser, Debug)]
#[command(name = "wireplay")]
#[command(about = "Replays scripted protocol exchanges as a terminal animation")]
#[command(version)]
struct Args {
    /// Which built-in exchange to replay
    #[arg(short, long, value_enum, default_value = "handshake")]
    script: ScriptChoice,

    /// Motion samples per step
    #[arg(long, default_value_t = RunnerConfig::DEFAULT_FRAMES_PER_STEP)]
    frames: u32,

    /// Milliseconds between animation frames
    #[arg(long, default_value_t = 50)]
    frame_interval_ms: u64,

    /// Append tracing output to this file (the terminal itself is the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level when --log-file is set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
            .with(filter)
            .init();
    }

    let script = match args.script {
        ScriptChoice::Handshake => three_way_handshake(),
        ScriptChoice::Mitm => mitm_interception(),
    };
    // Fail fast, before touching the terminal.
    script.validate()?;

    let config = RunnerConfig {
        frames_per_step: args.frames,
        frame_interval: Duration::from_millis(args.frame_interval_ms),
    };

    let (sender, receiver) = wireplay_core::channel();
    let markers = script.markers();
    let controller = RunController::new(script, config, SystemEnv::new(), sender);

    tracing::info!(script = args.script.title(), "wireplay starting");

    let mut terminal = ratatui::init();
    let result = App::new(
        controller,
        receiver,
        markers,
        args.script.title(),
        Handle::current(),
    )
    .run(&mut terminal);
    ratatui::restore();

    result?;
    Ok(())
}
