use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use guardian_ai::AnthropicGateway;
use guardian_common::models::RecordKind;
use guardian_core::repositories::{PostgresRecordRepository, PostgresUserStore};
use guardian_core::services::AnalysisPipeline;
use guardian_core::{Database, GuardianConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "guardian")]
#[command(author, version, about = "GuardianChain analysis and reward pipeline")]
struct Args {
    /// Postgres connection URL; overrides DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Apply migrations and exit.
    #[arg(long, default_value_t = false)]
    migrate_only: bool,

    /// Refuse to start when ANTHROPIC_API_KEY is missing.
    #[arg(long, default_value_t = false)]
    require_gateway: bool,

    /// Print balance, archetype and recent activity for a user id, then exit.
    #[arg(long)]
    inspect_user: Option<String>,
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("guardian=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub).context("Failed to set global subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Guardian error: {:?}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = GuardianConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = Some(url);
    }
    info!(
        "GuardianChain starting. model={}, max_connections={}",
        config.gateway.model, config.max_connections
    );

    let db = Database::new(config.require_database_url()?, config.max_connections).await?;
    db.migrate().await?;
    if args.migrate_only {
        info!("Migrations applied; exiting (--migrate-only).");
        return Ok(());
    }

    if !config.gateway.is_configured() {
        if args.require_gateway {
            bail!("ANTHROPIC_API_KEY is not set and --require-gateway was given");
        }
        warn!("ANTHROPIC_API_KEY is not set; medical analysis will fail, mood and workouts use defaults.");
    }

    let gateway = AnthropicGateway::new(config.gateway.clone())?;
    let pipeline = AnalysisPipeline::new(
        Arc::new(gateway),
        Arc::new(PostgresRecordRepository::new(db.pool().clone())),
        Arc::new(PostgresUserStore::new(db.pool().clone())),
        config.rewards.clone(),
    );

    if let Some(raw) = args.inspect_user {
        let user_id: Uuid = raw.parse().with_context(|| format!("invalid user id '{}'", raw))?;
        return inspect_user(&pipeline, user_id).await;
    }

    info!("Pipeline ready. Waiting for shutdown signal (Ctrl-C).");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down.");
    Ok(())
}

async fn inspect_user(pipeline: &AnalysisPipeline, user_id: Uuid) -> anyhow::Result<()> {
    let balance = pipeline.ledger().balance(user_id).await?;
    info!("user={} guardian_coins={}", user_id, balance);

    match pipeline.archetype_of(user_id).await? {
        Some((tag, description)) => info!("archetype={} ({})", tag, description),
        None => info!("archetype=<quiz not taken>"),
    }

    for kind in [
        RecordKind::MedicalAnalysis,
        RecordKind::MoodLog,
        RecordKind::WorkoutSession,
        RecordKind::ActivityEntry,
    ] {
        let recent = pipeline.history(user_id, kind, 5).await?;
        info!("{}: {} recent", kind.as_str(), recent.len());
        for stored in recent {
            info!("  {} at {}", stored.id, stored.record.recorded_at());
        }
    }
    Ok(())
}
