use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use notesum_bedrock::cache::{CachedModel, ResponseCache};
use notesum_bedrock::converse::BedrockModel;
use notesum_bedrock::summarize::Summarizer;
use notesum_bedrock::synthesize::QuerySynthesizer;
use notesum_pipeline::{Pipeline, StageTimeouts};
use notesum_server::config::ServerConfig;
use notesum_server::state::AppState;
use notesum_store::ingest;
use notesum_store::{SqliteStore, StoreConfig};
use notesum_templates::TemplateRegistry;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServerConfig::from_env()?;

    if config.ingest_on_startup {
        ingest::initialize(&config.db_path, &config.data_dir).await?;
    }

    let store = SqliteStore::new(
        &config.db_path,
        StoreConfig {
            pool_size: config.pool_size,
            sample_rows: config.sample_rows,
        },
    );

    let client = notesum_bedrock::client::build_client(&config.region).await;
    let cache = Arc::new(ResponseCache::with_capacity(config.cache_capacity));
    let model = Arc::new(CachedModel::new(
        BedrockModel::new(client, config.model_id.clone()),
        Arc::clone(&cache),
    ));

    let mut pipeline = Pipeline::new(
        Arc::new(TemplateRegistry::builtin()),
        Arc::new(QuerySynthesizer::new(Arc::clone(&model))),
        Arc::new(store.clone()),
        Arc::new(Summarizer::new(model)),
    );
    if let Some(limit) = config.stage_timeout {
        pipeline = pipeline.with_timeouts(StageTimeouts::uniform(limit));
    }

    let state = AppState {
        pipeline,
        cache: Arc::clone(&cache),
        db_path: config.db_path.clone(),
        data_dir: config.data_dir.clone(),
    };

    let app = notesum_server::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        bind = %config.bind,
        model_id = %config.model_id,
        db_path = %config.db_path.display(),
        "notesum listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    store.close().await;
    cache.clear();
    if config.purge_on_shutdown {
        ingest::delete_database(&config.db_path).await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
