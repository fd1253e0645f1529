use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube::{
    app,
    config::Config,
    migrations::run_migrations,
    store::{DynStore, MemoryStore, PgStore},
    AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("read configuration");

    let store: DynStore = match config.database_url.as_deref() {
        Some(database_url) => {
            run_migrations(database_url)
                .await
                .expect("run database migrations");

            Arc::new(
                PgStore::new(database_url, config.database_max_connections)
                    .expect("build database pool"),
            )
        }
        None => {
            tracing::warn!("YATUBE_DATABASE_URL is not set, data is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = config.socket_addr().expect("listen address");
    let state = AppState::new(store, config).expect("cookie key");

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app(state).into_make_service())
        .await
        .expect("start server");
}
