//! HTTP gateway to the upstream todo API.

mod error;
pub mod mapping;
pub mod wire;

pub use error::{DecodeError, GatewayError};
pub use mapping::{Enricher, Enrichment, RandomEnricher, SeededEnricher, map_record};
pub use wire::{TodoPage, TodoRecord};

use std::sync::Arc;
use std::time::Duration;

use kanban_core::{AsRemoteId, RemoteId, Task, TaskDraft, TaskUpdate};
use reqwest::{Client, Method, Response};
use tracing::{debug, warn};
use url::Url;

use crate::wire::{CreateTodoBody, UpdateTodoBody};

/// Default upstream used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";
/// Fixed page size requested from (and kept from) the upstream list call.
pub const PAGE_LIMIT: usize = 50;
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Placeholder owner sent with created records.
pub const DEFAULT_OWNER_ID: u64 = 1;

/// Connection and mapping settings for [`HttpGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `https://dummyjson.com`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Owner id sent with created records.
    pub owner_id: u64,
    /// Overlay caller-supplied fields the upstream cannot store onto the
    /// mapped response of creates and updates.
    pub preserve_local_fields: bool,
}

impl GatewayConfig {
    /// Settings for the given API root with defaults elsewhere.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            owner_id: DEFAULT_OWNER_ID,
            preserve_local_fields: true,
        }
    }
}

/// Gateway translating between board tasks and upstream todo records.
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
    enricher: Arc<dyn Enricher>,
}

impl HttpGateway {
    /// Build a gateway with random placeholder enrichment.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot carry a path or the HTTP client
    /// cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.base_url.cannot_be_a_base() || !matches!(config.base_url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBaseUrl(config.base_url.to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            enricher: Arc::new(RandomEnricher),
        })
    }

    /// Replace the placeholder enrichment source.
    #[must_use]
    pub fn with_enricher(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enricher = Arc::new(enricher);
        self
    }

    /// Borrow the active configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fetch the first page of records, mapped in upstream order.
    ///
    /// # Errors
    /// Returns [`GatewayError`] on transport, status or decoding failures.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, GatewayError> {
        let mut url = self.endpoint(&[]);
        url.query_pairs_mut().append_pair("limit", &PAGE_LIMIT.to_string());
        let body = self.send(Method::GET, url.clone(), None::<&()>).await?;
        let page = TodoPage::from_slice(&body).map_err(|source| decode_error(&url, source))?;

        Ok(page
            .todos
            .iter()
            .take(PAGE_LIMIT)
            .zip(1_u64..)
            .map(|(record, index)| self.map(record, index))
            .collect())
    }

    /// Fetch one record by id (`task-5`, `"5"` or `5`).
    ///
    /// # Errors
    /// Returns [`GatewayError`] for unmappable ids and request failures.
    pub async fn get_task(&self, id: impl AsRemoteId) -> Result<Task, GatewayError> {
        let remote = id.as_remote_id()?;
        let url = self.record_endpoint(remote);
        let record = self.fetch_record(Method::GET, url, None::<&()>).await?;
        Ok(self.map(&record, record.id))
    }

    /// Create a record from the draft's title.
    ///
    /// # Errors
    /// Returns [`GatewayError`] on request failures.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, GatewayError> {
        let url = self.endpoint(&["add"]);
        let body = CreateTodoBody {
            todo: &draft.title,
            completed: false,
            user_id: self.config.owner_id,
        };
        let record = self.fetch_record(Method::POST, url, Some(&body)).await?;
        let mut task = self.map(&record, record.id);
        if self.config.preserve_local_fields {
            draft.overlay_onto(&mut task);
        }
        Ok(task)
    }

    /// Push the title and completion flag of `updates` upstream.
    ///
    /// # Errors
    /// Returns [`GatewayError`] for unmappable ids and request failures.
    pub async fn update_task(&self, id: impl AsRemoteId, updates: &TaskUpdate) -> Result<Task, GatewayError> {
        let remote = id.as_remote_id()?;
        let url = self.record_endpoint(remote);
        let body = UpdateTodoBody {
            todo: updates.title.as_deref(),
            completed: updates.status.is_some_and(|status| status.is_done()),
        };
        let record = self.fetch_record(Method::PUT, url, Some(&body)).await?;
        let mut task = self.map(&record, remote.0);
        if self.config.preserve_local_fields {
            updates.apply_to(&mut task);
        }
        Ok(task)
    }

    /// Delete a record.
    ///
    /// # Errors
    /// Returns [`GatewayError`] for unmappable ids and request failures.
    pub async fn delete_task(&self, id: impl AsRemoteId) -> Result<(), GatewayError> {
        let remote = id.as_remote_id()?;
        let url = self.record_endpoint(remote);
        self.send(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    fn map(&self, record: &TodoRecord, index: u64) -> Task {
        map_record(record, index, self.enricher.enrich(index))
    }

    fn endpoint(&self, extra: &[&str]) -> Url {
        let mut url = self.config.base_url.clone();
        // Checked in `new`: the base URL always carries path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("todos").extend(extra);
        }
        url
    }

    fn record_endpoint(&self, remote: RemoteId) -> Url {
        self.endpoint(&[&remote.to_string()])
    }

    async fn fetch_record<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<TodoRecord, GatewayError>
    where
        B: serde::Serialize + ?Sized,
    {
        let bytes = self.send(method, url.clone(), body).await?;
        TodoRecord::from_slice(&bytes).map_err(|source| decode_error(&url, source))
    }

    async fn send<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Vec<u8>, GatewayError>
    where
        B: serde::Serialize + ?Sized,
    {
        debug!(%method, %url, "upstream request");
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|err| {
            warn!(%method, %url, error = %err, "upstream request failed");
            GatewayError::Transport(err)
        })?;
        let response = ensure_success(response, &url)?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn ensure_success(response: Response, url: &Url) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    warn!(%status, %url, "upstream returned error status");
    Err(GatewayError::Status {
        status,
        url: url.to_string(),
    })
}

fn decode_error(url: &Url, source: DecodeError) -> GatewayError {
    warn!(%url, error = %source, "undecodable upstream response");
    GatewayError::Decode {
        url: url.to_string(),
        source,
    }
}
