use crate::config::Config;
use crate::db::{Database, Language};
use crate::error::Result;
use crate::keypath::TranslationTree;
use crate::query::{self, GroupedTranslations, HealthStatus};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the HTTP router around a store handle
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/api/translations/:lang", get(get_translations))
        .route("/api/health", get(health_check))
        .route("/api/languages", get(get_languages))
        .route("/api/datas", get(get_datas))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &Config, db: Database) -> anyhow::Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("✓ Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(db)).await?;
    Ok(())
}

async fn get_translations(
    State(db): State<Database>,
    Path(lang): Path<String>,
) -> Result<Json<TranslationTree>> {
    let tree = query::get_translations(&db, &lang).await?;
    Ok(Json(tree))
}

async fn health_check() -> Json<HealthStatus> {
    Json(query::health())
}

async fn get_languages(State(db): State<Database>) -> Result<Json<Vec<Language>>> {
    Ok(Json(query::list_languages(&db).await?))
}

async fn get_datas(State(db): State<Database>) -> Result<Json<GroupedTranslations>> {
    Ok(Json(query::list_all_grouped(&db).await?))
}
