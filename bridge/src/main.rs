//! `lunx-host`: run a compiled engine module against the host bridge.
//!
//! Loads the module, initializes it, feeds it scripts, calls any tick
//! exports, then prints the hierarchy and scene the module built.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lunx_bridge::{Backend, Bridge, HostConfig, Sinks};
use lunx_hostapi::{MemHierarchy, MemScene, TracingLog};

#[derive(Parser, Debug)]
#[command(name = "lunx-host", version, about = "Run a LunX engine module against the host bridge")]
struct Cli {
    /// Engine module (.wasm or .wat).
    #[arg(long)]
    module: PathBuf,

    /// Host config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script file passed to the module's RunScript export. Repeatable.
    #[arg(long = "script")]
    scripts: Vec<PathBuf>,

    /// Zero-argument export to call after the scripts. Repeatable.
    #[arg(long = "tick")]
    ticks: Vec<String>,

    /// Skip the module's start-up export.
    #[arg(long)]
    no_init: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lunx=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    let backend = config.backend.clone().map(Backend::init).transpose()?;

    let bridge = Bridge::from_file(&cli.module, config.bridge.clone())
        .with_context(|| format!("loading {}", cli.module.display()))?;

    let hierarchy = MemHierarchy::new();
    let scene = MemScene::new();
    let mut session = bridge.instantiate(Sinks::new(TracingLog, hierarchy.clone(), scene.clone()))?;

    if !cli.no_init && !session.initialize()? {
        tracing::warn!("module has no start-up export");
    }
    for path in &cli.scripts {
        let source =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        session
            .run_script(&source)
            .with_context(|| format!("running {}", path.display()))?;
    }
    for tick in &cli.ticks {
        session.call(tick).with_context(|| format!("calling {tick}"))?;
    }

    let state = session.finish();

    println!("hierarchy:");
    for item in hierarchy.items() {
        println!("  {} {}", item.id, item.name);
    }
    println!("scene:");
    for object in scene.objects() {
        let (p, c) = (object.position, object.color);
        println!(
            "  {} pos=({}, {}, {}) color=({}, {}, {})",
            object.id, p.x, p.y, p.z, c.r, c.g, c.b
        );
    }
    if !state.faults().is_empty() {
        println!("dropped calls:");
        for fault in state.faults() {
            println!("  {}: {}", fault.export, fault.error);
        }
    }

    if let Some(backend) = backend {
        backend.shutdown();
    }
    Ok(())
}
