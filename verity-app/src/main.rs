mod api;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use verity_core::analysis::FAILURE_REASON_CORRUPT;
use verity_core::{FileDescriptor, MediaKind, MonitorEngine, Severity, WatchConfig};

#[derive(Parser, Debug)]
#[command(name = "verity-watch", version, about = "Verity Watch — Synthetic Media Monitoring Console")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "verity.toml")]
    config: String,

    /// Log level (overrides config file)
    #[arg(short, long)]
    log_level: Option<String>,

    /// RNG seed for a reproducible simulation (overrides config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Generate a default config file and exit
    #[arg(long)]
    generate_config: bool,

    /// Dry-run: load config, validate, print report, exit
    #[arg(long)]
    dry_run: bool,

    /// JSON API bind address
    #[arg(long, default_value = "127.0.0.1:9790")]
    bind: String,

    /// Disable the JSON API
    #[arg(long)]
    no_api: bool,

    /// Media files to queue for analysis at startup
    #[arg(long)]
    analyze: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Generate Config ──────────────────────────────────────────────
    if cli.generate_config {
        let config = WatchConfig::default();
        config.save(&cli.config)?;
        println!("Default configuration written to {}", cli.config);
        return Ok(());
    }

    // ── Load Config ──────────────────────────────────────────────────
    let mut config = WatchConfig::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: {}, using defaults", e);
        WatchConfig::default()
    });
    if let Some(seed) = cli.seed {
        config.general.seed = Some(seed);
    }
    let log_level = cli.log_level.as_deref().unwrap_or(&config.general.log_level);

    // ── Tracing ──────────────────────────────────────────────────────
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Verity Watch v{}", env!("CARGO_PKG_VERSION"));
    if let Some(seed) = config.general.seed {
        info!(seed, "Running with a fixed seed (reproducible simulation)");
    }

    // ── Dry Run ──────────────────────────────────────────────────────
    if cli.dry_run {
        info!(
            queue_capacity = config.analysis.queue_capacity,
            threat_interval_ms = config.threat_feed.interval_ms,
            post_interval_ms = config.social_stream.interval_ms,
            map_interval_ms = config.threat_map.interval_ms,
            "Configuration valid"
        );
        info!("Dry-run complete.");
        return Ok(());
    }

    // ── Engine ───────────────────────────────────────────────────────
    let engine = Arc::new(MonitorEngine::new(config));
    engine.start();

    // High and Critical events go straight to the operator console.
    engine.bus().subscribe(
        "console_alerts",
        None,
        Some(Severity::High),
        vec![],
        Arc::new(|event| {
            warn!(
                source = %event.source,
                severity = ?event.severity,
                "{}",
                event.title
            );
        }),
    );

    // ── Startup Submissions ──────────────────────────────────────────
    for path in &cli.analyze {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match std::fs::metadata(path) {
            Ok(meta) => {
                let file = FileDescriptor {
                    name: name.clone(),
                    size_bytes: meta.len(),
                    media_kind: MediaKind::from_extension(ext),
                };
                let id = engine.submit(file)?;
                info!(id, file = %name, "Queued for analysis");
            }
            Err(e) => {
                let file = FileDescriptor {
                    name: name.clone(),
                    size_bytes: 0,
                    media_kind: MediaKind::from_extension(ext),
                };
                let id = engine.submit(file)?;
                engine.fail_analysis(id, FAILURE_REASON_CORRUPT)?;
                warn!(id, file = %name, error = %e, "File unreadable, analysis failed");
            }
        }
    }

    // ── JSON API ─────────────────────────────────────────────────────
    if !cli.no_api {
        let api_engine = engine.clone();
        let bind = cli.bind.clone();
        tokio::spawn(async move {
            if let Err(e) = api::start_api(api_engine, &bind).await {
                error!(error = %e, "API server failed");
            }
        });
        info!(addr = %cli.bind, "JSON API available at http://{}", cli.bind);
    }

    info!("Verity Watch running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down Verity Watch...");

    // ── Graceful Shutdown ────────────────────────────────────────────
    engine.shutdown();
    let stats = engine.stats();
    info!(
        events_published = engine.bus().total_published(),
        events_delivered = engine.bus().total_delivered(),
        active_threats = stats.active_threats,
        processed_total = stats.processed_total,
        analyses_completed = engine.queue().total_completed(),
        "Shutdown complete"
    );

    Ok(())
}
