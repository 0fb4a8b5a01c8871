// src/main.rs
//
// Composition root: configuration, database, provider registry, services,
// HTTP server. Everything the rest of the crate treats as an injected
// dependency is built exactly once, here.

use std::sync::Arc;

use medialog::api::{create_router, AppState};
use medialog::auth::StaticSessionProvider;
use medialog::config::AppConfig;
use medialog::db::{create_connection_pool, get_connection, get_database_path, initialize_database};
use medialog::providers::{AniListProvider, OpenLibraryProvider, ProviderRegistry, TmdbProvider};
use medialog::repositories::{
    EntryRepository, ImportRepository, ItemSourceRepository, MediaItemRepository,
    MediaTypeRepository, NoteRepository, SegmentRepository, SqliteEntryRepository,
    SqliteImportRepository, SqliteItemSourceRepository, SqliteMediaItemRepository,
    SqliteMediaTypeRepository, SqliteNoteRepository, SqliteSegmentRepository,
};
use medialog::services::{ImportService, LibraryService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;

    if config.session_tokens.is_empty() {
        log::warn!("no session tokens configured; every request will be rejected");
    }

    // Database
    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => get_database_path()?,
    };
    let pool = Arc::new(create_connection_pool(&db_path)?);
    initialize_database(&*get_connection(&pool)?)?;
    log::info!("database ready at {}", db_path.display());

    // Provider registry. TMDB keys were validated by AppConfig; a missing
    // credential never makes it this far.
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(OpenLibraryProvider::new()));
    registry.register(Arc::new(AniListProvider::anime()));
    registry.register(Arc::new(AniListProvider::manga()));
    registry.register(Arc::new(TmdbProvider::movie(config.tmdb_api_key.clone())));
    registry.register(Arc::new(TmdbProvider::tv(config.tmdb_api_key.clone())));
    let registry = Arc::new(registry);

    // Repositories
    let type_repo: Arc<dyn MediaTypeRepository> =
        Arc::new(SqliteMediaTypeRepository::new(pool.clone()));
    let item_repo: Arc<dyn MediaItemRepository> =
        Arc::new(SqliteMediaItemRepository::new(pool.clone()));
    let source_repo: Arc<dyn ItemSourceRepository> =
        Arc::new(SqliteItemSourceRepository::new(pool.clone()));
    let entry_repo: Arc<dyn EntryRepository> = Arc::new(SqliteEntryRepository::new(pool.clone()));
    let segment_repo: Arc<dyn SegmentRepository> =
        Arc::new(SqliteSegmentRepository::new(pool.clone()));
    let note_repo: Arc<dyn NoteRepository> = Arc::new(SqliteNoteRepository::new(pool.clone()));
    let import_repo: Arc<dyn ImportRepository> =
        Arc::new(SqliteImportRepository::new(pool.clone()));

    // Services
    let import_service = Arc::new(ImportService::new(
        registry,
        type_repo.clone(),
        source_repo,
        entry_repo.clone(),
        import_repo,
    ));
    let library_service = Arc::new(LibraryService::new(
        type_repo,
        item_repo,
        entry_repo,
        segment_repo,
        note_repo,
    ));

    let state = AppState {
        library: library_service,
        import: import_service,
        sessions: Arc::new(StaticSessionProvider::new(config.session_tokens.clone())),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
