//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::config::IndexBackend;
use crate::database::Database;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::knowledge::load_catalog;
use crate::knowledge::IndexGeneration;
use crate::knowledge::KnowledgeStore;
use crate::knowledge::MemoryVectorIndex;
use crate::knowledge::VectorIndex;
use crate::llm::CompletionService;
use crate::llm::LlmService;
use crate::support::SupportAgent;
use crate::Result;

/// Connect every service the API needs
///
/// The knowledge store is returned unbuilt; see [`prepare_index`].
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let database = Arc::new(Database::from_config(config).await?);
    database.verify_schema_or_error().await?;

    let index: Arc<dyn VectorIndex> = match config.knowledge.backend {
        IndexBackend::Postgres => Arc::clone(&database) as Arc<dyn VectorIndex>,
        IndexBackend::Memory => Arc::new(MemoryVectorIndex::new()),
    };
    let embeddings = EmbeddingService::new(config)?;
    let llm = LlmService::new(config)?;
    info!(
        "Model provider {:?}: completions '{}', embeddings '{}' ({} dimensions)",
        embeddings.provider(),
        llm.model(),
        embeddings.model(),
        embeddings.dimension()
    );
    let embedder: Arc<dyn Embedder> = Arc::new(embeddings);
    let completion: Arc<dyn CompletionService> = Arc::new(llm);

    let knowledge = Arc::new(KnowledgeStore::from_config(config, embedder, index)?);
    let agent = Arc::new(SupportAgent::from_config(
        config,
        completion,
        Arc::clone(&knowledge) as Arc<dyn crate::knowledge::ContextRetriever>,
    ));

    Ok(AppState {
        database,
        knowledge,
        agent,
        support: Arc::new(config.support.clone()),
    })
}

/// Bring the pricing index into service at startup
///
/// Rebuilds from the configured catalog unless `knowledge.rebuild_on_start`
/// is off and a persisted index exists for the namespace.
pub async fn prepare_index(
    config: &AppConfig,
    knowledge: &KnowledgeStore,
) -> Result<IndexGeneration> {
    let reuse = !config.knowledge.rebuild_on_start
        && config.knowledge.backend == IndexBackend::Postgres;
    if reuse {
        if let Some(generation) = knowledge.attach().await? {
            return Ok(generation);
        }
    }

    let catalog = match &config.knowledge.catalog_path {
        Some(path) => {
            info!("Loading pricing catalog from {}", path);
            Some(load_catalog(path)?)
        }
        None => None,
    };
    knowledge.initialize(catalog.as_ref()).await
}

/// Apply tracing, compression and optional CORS layers
pub fn with_layers(router: Router, enable_cors: bool) -> Router {
    let mut app = router
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("Starting BikeHero API server...");

    let state = build_state(config).await?;
    let generation = prepare_index(config, &state.knowledge).await?;
    info!(
        "Serving pricing index '{}' with {} documents",
        generation.namespace, generation.documents
    );

    let app = with_layers(routes::api_routes(state), enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /                - Welcome message");
    info!("  GET  /health          - Health check");
    info!("  POST /chat/           - Send a message");
    info!("  GET  /chat/history/   - List chat history");
    info!("  POST /agent/pricing/  - Replace the pricing catalog");

    axum::serve(listener, app).await?;

    Ok(())
}
