//! HTTP client for the Shipyard catalog REST API.

use crate::CliResult;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shipyard_core::{PageParams, Ship, ShipFilter, ShipId, ShipPatch};

/// Default base URL of the Shipyard server.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Error payload returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Thin wrapper over the `/rest/ships` endpoints.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Build a client for the server at `server_url`.
    pub fn new(server_url: &str) -> CliResult<Self> {
        let client = Client::builder().user_agent("shipyard-cli").build()?;
        Ok(Self {
            client,
            base_url: normalize_server_url(server_url)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/ships{path}", self.base_url)
    }

    /// One page of ships matching `filter`.
    pub async fn list(&self, filter: &ShipFilter, page: &PageParams) -> CliResult<Vec<Ship>> {
        let request = self.client.get(self.url("")).query(filter).query(page);
        read_json(request).await
    }

    /// Number of ships matching `filter`.
    pub async fn count(&self, filter: &ShipFilter) -> CliResult<u64> {
        read_json(self.client.get(self.url("/count")).query(filter)).await
    }

    /// Fetch a ship.
    pub async fn get(&self, id: ShipId) -> CliResult<Ship> {
        read_json(self.client.get(self.url(&format!("/{id}")))).await
    }

    /// Create a ship.
    pub async fn create(&self, patch: &ShipPatch) -> CliResult<Ship> {
        read_json(self.client.post(self.url("")).json(patch)).await
    }

    /// Overwrite the supplied fields of a ship.
    pub async fn update(&self, id: ShipId, patch: &ShipPatch) -> CliResult<Ship> {
        read_json(self.client.post(self.url(&format!("/{id}"))).json(patch)).await
    }

    /// Delete a ship.
    pub async fn delete(&self, id: ShipId) -> CliResult<()> {
        send(self.client.delete(self.url(&format!("/{id}")))).await?;
        Ok(())
    }
}

/// Trim whitespace and trailing slashes from the server URL.
fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Send the request and turn non-2xx statuses into the server's message.
async fn send(request: RequestBuilder) -> CliResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    Err(format!("server returned {status}: {message}").into())
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> CliResult<T> {
    Ok(send(request).await?.json::<T>().await?)
}
