use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tracing::info;

/// Run the liveness endpoint the hosting platform probes.
///
/// One static route; nothing here touches the bot or the store.
pub async fn run(port: u16) -> Result<()> {
    let app = Router::new().route("/", get(liveness));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind liveness endpoint on port {port}"))?;

    info!(port, "Liveness endpoint listening");

    axum::serve(listener, app)
        .await
        .context("Liveness endpoint terminated")?;

    Ok(())
}

async fn liveness() -> &'static str {
    "Bot is running 🚀"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_body() {
        assert_eq!(liveness().await, "Bot is running 🚀");
    }
}
