use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use rand::RngCore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use corkboard_api::auth::{AppState, AppStateInner};
use corkboard_api::routes;
use corkboard_api::token::TokenSigner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corkboard=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("CORKBOARD_DB_PATH").unwrap_or_else(|_| "corkboard.db".into());
    let host = std::env::var("CORKBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CORKBOARD_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // The signing key is fixed for the life of the process. Without a
    // configured secret a random one is generated, and a restart then
    // invalidates every outstanding token.
    let tokens = match std::env::var("CORKBOARD_JWT_SECRET") {
        Ok(secret) => TokenSigner::new(secret.as_bytes()),
        Err(_) => {
            warn!("CORKBOARD_JWT_SECRET not set; using a random secret, tokens will not survive a restart");
            let mut secret = [0u8; 32];
            rand::rng().fill_bytes(&mut secret);
            TokenSigner::new(&secret)
        }
    };

    // Init database
    let db = corkboard_db::Database::open(&PathBuf::from(&db_path))?;

    let state: AppState = Arc::new(AppStateInner { db, tokens });

    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Corkboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
