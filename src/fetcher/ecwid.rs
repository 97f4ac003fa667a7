//! Ecwid implementation of [`StoreApi`]
//!
//! Endpoints used:
//! - `GET {resource}?limit=1` → `{ "total": n, ... }`
//! - `POST batch` with a JSON array of page requests → `{ "ticket": "..." }`
//! - `GET batch?ticket=...` → `{ "status": "...", ... }`

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::fetcher::ecwid_http::EcwidHttpClient;
use crate::fetcher::{FetcherError, FetcherResult, StoreApi};
use crate::{BatchResult, PageRequest, Ticket};

/// Batch endpoint path
const BATCH_ENDPOINT: &str = "batch";

#[derive(Debug, Deserialize)]
struct TotalResponse {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TicketResponse {
    ticket: Option<String>,
}

/// Store API over the Ecwid REST endpoints
pub struct EcwidFetcher {
    http_client: Arc<EcwidHttpClient>,
}

impl EcwidFetcher {
    /// Wrap a configured HTTP client
    pub fn new(http_client: Arc<EcwidHttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl StoreApi for EcwidFetcher {
    async fn total(&self, resource: &str) -> FetcherResult<u64> {
        let response: TotalResponse = self
            .http_client
            .get(resource, &[("limit", "1".to_string())])
            .await?;

        let total = response.total.ok_or_else(|| {
            FetcherError::InvalidResponse(format!("'{resource}' response has no total field"))
        })?;
        debug!("{} reports {} items", resource, total);
        Ok(total)
    }

    async fn submit_batch(&self, pages: &[PageRequest]) -> FetcherResult<Ticket> {
        let body = serde_json::to_string(pages)
            .map_err(|e| FetcherError::RequestError(format!("failed to encode batch: {e}")))?;

        let response: TicketResponse = self.http_client.post(BATCH_ENDPOINT, body).await?;
        let ticket = response
            .ticket
            .filter(|t| !t.is_empty())
            .map(Ticket::new)
            .ok_or_else(|| {
                FetcherError::InvalidResponse("batch response has no ticket".to_string())
            })?;

        info!("Submitted batch of {} pages, ticket {}", pages.len(), ticket);
        Ok(ticket)
    }

    async fn batch_status(&self, ticket: &Ticket) -> FetcherResult<BatchResult> {
        let body: Value = self
            .http_client
            .get(BATCH_ENDPOINT, &[("ticket", ticket.as_str().to_string())])
            .await?;

        let result = BatchResult::from_value(body).map_err(FetcherError::InvalidResponse)?;
        debug!("Ticket {} status {}", ticket, result.status());
        Ok(result)
    }
}
