//! Reqwest-based Elasticsearch REST client.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::wire::{
    BulkBody, ClearScrollBody, ClosePitBody, ClusterHealthBody, OpenPitBody, ScrollBody,
    SearchBody,
};
use super::{ElasticsearchConfig, Error, Result, TRACING_TARGET};
use crate::{
    BulkRequest, BulkResponse, KeepAlive, PointInTimeId, ScrollId, SearchProvider, SearchRequest,
    SearchResponse, SearchService, ServiceHealth,
};

const NDJSON: &str = "application/x-ndjson";

/// Inner client that holds the HTTP client and configuration.
struct ElasticsearchClientInner {
    http: Client,
    base_url: Url,
    config: ElasticsearchConfig,
}

/// Elasticsearch client speaking the REST API over reqwest.
///
/// This client implements the [`SearchProvider`] trait. Every trait method
/// issues exactly one HTTP request.
///
/// # Examples
///
/// ```rust,ignore
/// use pagebench_search::elasticsearch::{ElasticsearchClient, ElasticsearchConfig};
///
/// let client = ElasticsearchClient::new(ElasticsearchConfig::default())?;
/// let health = client.into_service().health_check().await?;
/// ```
#[derive(Clone)]
pub struct ElasticsearchClient {
    inner: Arc<ElasticsearchClientInner>,
}

impl std::fmt::Debug for ElasticsearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ElasticsearchConfig) -> crate::Result<Self> {
        config
            .validate()
            .map_err(|e| crate::Error::configuration().with_message(e))?;
        let base_url = config
            .url()
            .map_err(|e| crate::Error::configuration().with_message(e))?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            url = %base_url,
            timeout_ms = timeout.as_millis(),
            accept_invalid_certs = config.es_accept_invalid_certs,
            "Creating Elasticsearch client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .danger_accept_invalid_certs(config.es_accept_invalid_certs)
            .build()
            .map_err(|e| {
                crate::Error::configuration()
                    .with_message("Failed to create HTTP client")
                    .with_source(e)
            })?;

        let inner = ElasticsearchClientInner {
            http,
            base_url,
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.inner.config
    }

    /// Converts this client into a [`SearchService`] for use with dependency injection.
    pub fn into_service(self) -> SearchService {
        SearchService::new(self)
    }

    /// Resolves path segments against the cluster URL.
    fn endpoint(&self, segments: &[&str]) -> crate::Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                crate::Error::configuration().with_message("Cluster URL cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Starts a request with authentication applied.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match &self.inner.config.es_username {
            Some(username) => builder.basic_auth(username, self.inner.config.es_password.as_ref()),
            None => builder,
        }
    }

    /// Sends a request and turns non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::from_status(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Sends a release request, treating an already-gone handle as released.
    async fn release(&self, request: RequestBuilder) -> Result<()> {
        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(Error::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => {
                tracing::debug!(target: TRACING_TARGET, "Handle was already released");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for ElasticsearchClient {
    async fn search(&self, request: &SearchRequest) -> crate::Result<SearchResponse> {
        let mut url = match (&request.index, &request.point_in_time) {
            (Some(index), None) => self.endpoint(&[index.as_str(), "_search"])?,
            (None, Some(_)) => self.endpoint(&["_search"])?,
            _ => {
                return Err(crate::Error::invalid_input()
                    .with_message("search needs exactly one of an index or a point-in-time"));
            }
        };

        if let Some(keep_alive) = request.scroll {
            url.query_pairs_mut()
                .append_pair("scroll", &keep_alive.to_string());
        }

        let body: SearchBody = self
            .send_json(self.request(Method::POST, url).json(&request.to_body()))
            .await?;

        Ok(body.into())
    }

    async fn scroll(
        &self,
        scroll_id: &ScrollId,
        keep_alive: KeepAlive,
    ) -> crate::Result<SearchResponse> {
        let url = self.endpoint(&["_search", "scroll"])?;
        let payload = ScrollBody::new(scroll_id, keep_alive);

        let body: SearchBody = self
            .send_json(self.request(Method::POST, url).json(&payload))
            .await?;

        Ok(body.into())
    }

    async fn clear_scroll(&self, scroll_id: &ScrollId) -> crate::Result<()> {
        let url = self.endpoint(&["_search", "scroll"])?;
        let payload = ClearScrollBody {
            scroll_id: [scroll_id.as_str()],
        };

        self.release(self.request(Method::DELETE, url).json(&payload))
            .await?;
        Ok(())
    }

    async fn open_point_in_time(
        &self,
        index: &str,
        keep_alive: KeepAlive,
    ) -> crate::Result<PointInTimeId> {
        let mut url = self.endpoint(&[index, "_pit"])?;
        url.query_pairs_mut()
            .append_pair("keep_alive", &keep_alive.to_string());

        let body: OpenPitBody = self.send_json(self.request(Method::POST, url)).await?;
        Ok(body.into())
    }

    async fn close_point_in_time(&self, id: &PointInTimeId) -> crate::Result<()> {
        let url = self.endpoint(&["_pit"])?;
        let payload = ClosePitBody { id: id.as_str() };

        self.release(self.request(Method::DELETE, url).json(&payload))
            .await?;
        Ok(())
    }

    async fn bulk(&self, request: &BulkRequest) -> crate::Result<BulkResponse> {
        if request.is_empty() {
            return Ok(BulkResponse::default());
        }

        let url = self.endpoint(&["_bulk"])?;
        let payload = request.to_ndjson()?;

        let body: BulkBody = self
            .send_json(
                self.request(Method::POST, url)
                    .header(CONTENT_TYPE, NDJSON)
                    .body(payload),
            )
            .await?;

        Ok(body.into())
    }

    async fn health_check(&self) -> crate::Result<ServiceHealth> {
        let started_at = Instant::now();
        let url = self.endpoint(&["_cluster", "health"])?;

        let body: ClusterHealthBody = self.send_json(self.request(Method::GET, url)).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            status = %body.status,
            nodes = ?body.number_of_nodes,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Cluster health checked"
        );

        Ok(ServiceHealth::from(body).with_response_time(started_at.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = ElasticsearchClient::new(ElasticsearchConfig::new("http://localhost:9200"))
            .unwrap();
        let url = client.endpoint(&["accounts", "_search"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/accounts/_search");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client =
            ElasticsearchClient::new(ElasticsearchConfig::new("https://proxy.local/es/")).unwrap();
        let url = client.endpoint(&["_search", "scroll"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.local/es/_search/scroll");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let error = ElasticsearchClient::new(ElasticsearchConfig::new("ftp://localhost"))
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_empty_bulk_sends_nothing() {
        // Nothing listens on this port; a request would fail.
        let client =
            ElasticsearchClient::new(ElasticsearchConfig::new("http://127.0.0.1:9")).unwrap();
        let response = client.bulk(&BulkRequest::new()).await.unwrap();
        assert_eq!(response, BulkResponse::default());
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_transport_error() {
        let client = ElasticsearchClient::new(
            ElasticsearchConfig::new("http://127.0.0.1:9").with_timeout(2),
        )
        .unwrap();
        let error = client.health_check().await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Transport);
    }
}
