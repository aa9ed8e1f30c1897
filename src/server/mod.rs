use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::library::LibraryOptions;
use crate::ui::Icons;

pub mod routes;

/// Server state.
///
/// Handlers open their own store per request; the database's immediate
/// transactions serialize concurrent borrows and returns.
pub struct AppState {
    pub database_path: PathBuf,
    pub options: LibraryOptions,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/books", get(routes::search_books))
        .route("/loans", post(routes::borrow_book))
        .route("/loans/status", get(routes::loan_status))
        .route("/returns", post(routes::return_book))
        .route("/cards/{id}/books", get(routes::borrowed_books))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, database_path: PathBuf, options: LibraryOptions) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        database_path,
        options,
    });

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("{} Server running at http://{}", Icons::GLOBE, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
