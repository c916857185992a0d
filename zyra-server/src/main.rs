use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod health;
mod server;

use config::Args;

fn init_tracing() -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;
    let filter = EnvFilter::from_default_env()
        .add_directive("zyra=info".parse()?)
        .add_directive("zyra_core=info".parse()?)
        .add_directive("zyra_server=info".parse()?);
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();
    init_tracing()?;

    let args = Args::parse();
    info!(
        "Zyra starting. port={}, spotify={}, ytdlp={}",
        args.port,
        args.spotify_client_id.is_some(),
        args.ytdlp_path
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {e}");
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
