use std::env;

use tracing_subscriber::EnvFilter;

use lendstream::Server;
use lendstream::server::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let admin_token = env::var("LENDSTREAM_ADMIN_TOKEN")
        .expect("LENDSTREAM_ADMIN_TOKEN environment variable must be set");

    let auth_endpoint = env::var("LENDSTREAM_AUTH_ENDPOINT")
        .expect("LENDSTREAM_AUTH_ENDPOINT environment variable must be set");

    let rate_limit_count = env::var("LENDSTREAM_RATE_LIMIT_COUNT")
        .unwrap_or_else(|_| "100".to_string())
        .parse::<u32>()
        .expect("LENDSTREAM_RATE_LIMIT_COUNT must be a valid number");

    let rate_limit_seconds = env::var("LENDSTREAM_RATE_LIMIT_SECONDS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()
        .expect("LENDSTREAM_RATE_LIMIT_SECONDS must be a valid number");

    let port: u16 = env::var("LENDSTREAM_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3113);

    tracing::info!(auth_endpoint = %auth_endpoint, port, "starting server");

    let server = Server::new(ServerConfig {
        admin_token,
        auth_endpoint,
        rate_limit_count,
        rate_limit_seconds,
        port,
    });

    server.run().await?;

    Ok(())
}
