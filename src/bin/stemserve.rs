//! Web front end: upload an audio file, get back links to its stems.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stemserve::cleanup;
use stemserve::web::{router, App};
use stemserve::Backend;

#[derive(Parser, Debug)]
#[command(name = "stemserve")]
#[command(about = "Web front end for audio stem separation", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000", env = "STEMSERVE_ADDR")]
    addr: SocketAddr,

    /// Directory incoming uploads are written to
    #[arg(long, value_name = "DIR", default_value = "uploads", env = "STEMSERVE_UPLOAD_DIR")]
    uploads: PathBuf,

    /// Directory per-upload stem directories are created under
    #[arg(long, value_name = "DIR", default_value = "static/stems", env = "STEMSERVE_STEMS_DIR")]
    stems: PathBuf,

    /// Separation tool to invoke
    #[arg(long, value_enum, default_value = "demucs", env = "STEMSERVE_BACKEND")]
    backend: Backend,

    /// Delete uploads and stems older than this many hours (0 disables)
    #[arg(long, value_name = "HOURS", default_value = "24", env = "STEMSERVE_TTL_HOURS")]
    ttl_hours: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    std::fs::create_dir_all(&cli.uploads)?;
    std::fs::create_dir_all(&cli.stems)?;

    let app = Arc::new(App {
        uploads_dir: cli.uploads.clone(),
        stems_dir: cli.stems.clone(),
        separator: Mutex::new(cli.backend.separator()),
    });

    if cli.ttl_hours > 0 {
        spawn_prune_task(
            vec![cli.uploads.clone(), cli.stems.clone()],
            Duration::from_secs(cli.ttl_hours * 3600),
        );
    }

    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    info!("listening on {}", cli.addr);
    axum::serve(listener, router(app)).await?;
    Ok(())
}

/// Sweep the artifact directories once an hour, removing entries past the
/// TTL. Uploads and stems are otherwise never deleted.
fn spawn_prune_task(dirs: Vec<PathBuf>, ttl: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(3600));
        loop {
            tick.tick().await;
            for dir in &dirs {
                match cleanup::prune_older_than(dir, ttl) {
                    Ok(0) => {}
                    Ok(n) => info!("pruned {n} stale entries from {}", dir.display()),
                    Err(e) => warn!("prune of {} failed: {e}", dir.display()),
                }
            }
        }
    });
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
