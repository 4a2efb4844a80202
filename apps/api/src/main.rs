mod applications;
mod companies;
mod config;
mod db;
mod documents;
mod errors;
mod evaluation;
mod extract;
mod interview;
mod jobs;
mod llm_client;
mod models;
mod notify;
mod records;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::documents::S3DocumentStore;
use crate::evaluation::EvaluationEngine;
use crate::extract::PdfTextExtractor;
use crate::interview::{ConversationManager, SessionRegistry};
use crate::llm_client::{ChatModel, LlmClient};
use crate::notify::HttpMailNotifier;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recruit API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;

    // S3 / MinIO résumé storage
    let s3 = build_s3_client(&config).await;
    let documents = S3DocumentStore::new(
        s3,
        config.s3_bucket.clone(),
        config.s3_public_url.clone(),
    );
    info!("S3 document store initialized (bucket: {})", config.s3_bucket);

    // Hosted model, shared by the evaluation engine and the interview manager
    let model: Arc<dyn ChatModel> = Arc::new(LlmClient::new(config.llm_api_key.clone())?);
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm_client::MODEL,
        config.llm_timeout
    );

    let evaluator = EvaluationEngine::new(model.clone(), config.llm_timeout);

    let registry = Arc::new(SessionRegistry::new());
    if let Some(ttl) = config.session_idle_ttl {
        registry.clone().spawn_idle_sweeper(ttl);
        info!("Idle interview sessions expire after {ttl:?}");
    }
    let interviews = ConversationManager::new(model, registry, config.llm_timeout);

    let notifier = HttpMailNotifier::new(config.mail.clone())?;
    if config.mail.is_none() {
        info!("Mail API not configured; confirmation emails are disabled");
    }

    let state = AppState {
        db,
        evaluator,
        interviews,
        documents: Arc::new(documents),
        extractor: Arc::new(PdfTextExtractor),
        notifier: Arc::new(notifier),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "recruit-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
