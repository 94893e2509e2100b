pub mod batch;
pub mod query;

use anyhow::{Context, Result};
use urbanity::{UrbanQueryClient, UrbanQueryClientBuilder};

fn build_client(endpoint: &str, timeout: Option<u64>) -> Result<UrbanQueryClient> {
    UrbanQueryClientBuilder::new()
        .endpoint(endpoint)
        .timeout_secs(timeout)
        .build()
        .context("Failed to create TIGERweb client")
}
