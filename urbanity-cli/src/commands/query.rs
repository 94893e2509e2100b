use anyhow::{Context, Result};
use urbanity::{Coordinate, EvalResponse};

use super::build_client;

pub async fn run(
    endpoint: &str,
    timeout: Option<u64>,
    lat: f64,
    lng: f64,
    json: bool,
) -> Result<()> {
    let client = build_client(endpoint, timeout)?;

    let result = client
        .query_urbanness(lat, lng)
        .await
        .context("TIGERweb query failed")?;
    let response = EvalResponse::from_result(Coordinate::new(lat, lng), &result);

    if json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", summary(&response));
    }

    Ok(())
}

/// One-line human readable result, e.g. `Urban (New York)`.
fn summary(response: &EvalResponse) -> String {
    match &response.name {
        Some(name) => format!("{} ({})", response.morphology(), name),
        None => response.morphology().to_string(),
    }
}
