use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tracing::info;

/// Builds the HTTP client shared by the Firebase adapters.
pub fn create_http_client(app_name: &str, timeout_secs: u64) -> anyhow::Result<Client> {
    let client = Client::builder()
        .user_agent(format!("{}/{}", app_name, env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .build()
        .context("Failed to build HTTP client")?;

    info!("HTTP client ready (timeout {}s).", timeout_secs);
    Ok(client)
}
