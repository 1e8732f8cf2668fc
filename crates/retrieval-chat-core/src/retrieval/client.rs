use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::{HistoryResponse, SearchParams, SearchResponse};
use crate::error::RetrievalError;
use crate::session::SessionId;

pub const SESSION_HEADER: &str = "X-Session-ID";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP client for the retrieval service.
///
/// Every request carries the session header and is bounded by the
/// client-wide timeout.
#[derive(Clone)]
pub struct RetrievalClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RetrievalClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a search, racing the request against `cancel`.
    pub async fn search(
        &self,
        session: &SessionId,
        query: &str,
        params: &SearchParams,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, RetrievalError> {
        let url = format!("{}/retrieve/search", self.base_url);
        debug!(%url, search_type = params.search_type.as_str(), "sending search");

        let request = self
            .client
            .get(&url)
            .query(&params.to_query_pairs(query))
            .header(SESSION_HEADER, session.as_str())
            .header(ACCEPT, "application/json");

        tokio::select! {
            _ = cancel.cancelled() => Err(RetrievalError::Cancelled),
            result = self.fetch_json::<SearchResponse>(request) => result,
        }
    }

    /// Ask the service to forget this session's conversation history.
    pub async fn clear_history(&self, session: &SessionId) -> Result<(), RetrievalError> {
        let url = format!("{}/retrieve/conversation/clear", self.base_url);
        debug!(%url, "clearing remote history");

        let request = self
            .client
            .post(&url)
            .header(SESSION_HEADER, session.as_str());

        let response = self.send(request).await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Fetch the service's formatted conversation history for this session.
    pub async fn history(&self, session: &SessionId) -> Result<String, RetrievalError> {
        let url = format!("{}/retrieve/conversation/history", self.base_url);

        let request = self
            .client
            .get(&url)
            .header(SESSION_HEADER, session.as_str())
            .header(ACCEPT, "application/json");

        let history: HistoryResponse = self.fetch_json(request).await?;
        Ok(history.history)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RetrievalError> {
        let response = self.send(request).await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        serde_json::from_str(&body).map_err(|e| RetrievalError::Decode(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RetrievalError> {
        request.send().await.map_err(|e| self.map_error(e))
    }

    async fn check_status(response: Response) -> Result<Response, RetrievalError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn map_error(&self, err: reqwest::Error) -> RetrievalError {
        if err.is_timeout() {
            RetrievalError::Timeout(self.timeout)
        } else {
            RetrievalError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RetrievalClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
