use std::net::SocketAddr;

use axum::{routing, Router};
use storefront::app::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_state = AppState::new_from_env().await?;
    app_state.ensure_indexes().await?;

    let api = Router::new()
        .nest(
            "/users",
            Router::new()
                .route(
                    "/register",
                    routing::post(storefront::api::users::register),
                )
                .route("/login", routing::post(storefront::api::users::login))
                .route("/:id", routing::delete(storefront::api::users::delete)),
        )
        .nest(
            "/products",
            Router::new()
                .route("/", routing::get(storefront::api::products::index))
                .route("/", routing::post(storefront::api::products::create))
                .route("/:id", routing::delete(storefront::api::products::delete)),
        );

    let app = Router::new()
        .nest("/api", api)
        .with_state(app_state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::debug!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
