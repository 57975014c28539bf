use sea_orm::Database;
use tracing::info;

use savora_auth::config::AuthConfig;
use savora_auth::router::build_router;
use savora_auth::state::AppState;
use savora_auth::usecase::token::TokenIssuer;

#[tokio::main]
async fn main() {
    savora_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let state = AppState {
        db,
        redis,
        http: reqwest::Client::new(),
        issuer: TokenIssuer {
            jwt_secret: config.jwt_secret,
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        },
        password_secret: config.password_secret,
        code_length: config.code_length,
        google_client_id: config.google_client_id,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
