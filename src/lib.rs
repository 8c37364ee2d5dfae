pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod remote;
pub mod repo;
pub mod state;
pub mod store;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

pub use error::{AppError, StoreError};
pub use remote::{HttpStore, RemoteStore, SqliteStore};
pub use store::{BoardState, BoardStore, SyncConfig, SyncHandle};

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Column routes
        .route(
            "/columns",
            get(handlers::columns::list_columns).post(handlers::columns::create_column),
        )
        .route(
            "/columns/{column_id}",
            put(handlers::columns::update_column)
                .delete(handlers::columns::delete_column),
        )
        // Card routes
        .route(
            "/cards",
            get(handlers::cards::list_cards).post(handlers::cards::create_card),
        )
        .route(
            "/cards/{card_id}",
            get(handlers::cards::get_card)
                .put(handlers::cards::update_card)
                .delete(handlers::cards::delete_card),
        )
        .route("/cards/{card_id}/move", patch(handlers::cards::move_card))
        .route(
            "/cards/{card_id}/archive",
            patch(handlers::cards::set_archived),
        )
        // Comment routes
        .route(
            "/cards/{card_id}/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        // Attachment routes
        .route(
            "/cards/{card_id}/attachments",
            get(handlers::attachments::list_attachments)
                .post(handlers::attachments::create_attachment),
        )
        .route(
            "/attachments/{attachment_id}",
            delete(handlers::attachments::delete_attachment),
        )
        .route("/seed", post(handlers::columns::seed_columns));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(|| async { "ok" }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub mod test_utils {
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    pub async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool)
    }
}
