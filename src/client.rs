//! HTTP client for the data-access service.

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{AppError, RelayError};
use crate::front::Directory;
use crate::store::Professional;
use crate::telemetry::{OperationSpan, Telemetry};

/// Client for the data-access service's `/api/professionals` collection.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Collection URL, e.g. `http://api-service:5000/api/professionals`.
    collection_url: Url,
    /// Span capability.
    telemetry: Telemetry,
}

impl ApiClient {
    /// Create a client for the given collection URL.
    ///
    /// No timeouts are configured beyond reqwest's defaults.
    pub fn new(collection_url: &str, telemetry: Telemetry) -> Result<Self, RelayError> {
        let invalid = |reason: &str| RelayError::InvalidUrl {
            url: collection_url.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(collection_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(RelayError::Client)?;

        Ok(Self {
            http,
            collection_url: url,
            telemetry,
        })
    }

    /// The collection URL.
    pub fn collection_url(&self) -> &str {
        self.collection_url.as_str()
    }

    /// URL of one member, with the name percent-encoded as a single segment.
    pub fn member_url(&self, name: &str) -> Url {
        let mut url = self.collection_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    /// Fetch every professional.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Professional>, RelayError> {
        let url = self.collection_url.as_str();
        let mut span = self.telemetry.http_span("index_request", Method::GET.as_str(), url);

        let result: Result<Vec<Professional>, RelayError> = async {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|source| RelayError::Request {
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            span.record_status_code(status.as_u16());
            if !status.is_success() {
                return Err(RelayError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            response
                .json::<Vec<Professional>>()
                .await
                .map_err(|source| RelayError::Body {
                    url: url.to_string(),
                    source,
                })
        }
        .await;
        span.finish(&result);

        if let Ok(professionals) = &result {
            debug!(count = professionals.len(), "Fetched professionals");
        }
        result
    }

    /// Forward a new professional. Returns the upstream status, which callers
    /// do not act on.
    #[instrument(skip(self, professional), fields(name = ?professional.name))]
    pub async fn create(&self, professional: &Professional) -> Result<u16, RelayError> {
        let url = self.collection_url.as_str();
        let span = self
            .telemetry
            .http_span("add_professional_request", Method::POST.as_str(), url);

        let result = self.send(span, self.http.post(url).json(professional), url).await;
        if let Ok(status) = result {
            debug!(status, "Create forwarded");
        }
        result
    }

    /// Forward a delete. Returns the upstream status, which callers do not act on.
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<u16, RelayError> {
        let url = self.member_url(name);
        let span = self.telemetry.http_span(
            "delete_professional_request",
            Method::DELETE.as_str(),
            url.as_str(),
        );

        let result = self
            .send(span, self.http.delete(url.clone()), url.as_str())
            .await;
        if let Ok(status) = result {
            debug!(status, "Delete forwarded");
        }
        result
    }

    async fn send(
        &self,
        mut span: OperationSpan,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<u16, RelayError> {
        let result = request
            .send()
            .await
            .map(|response| response.status().as_u16())
            .map_err(|source| RelayError::Request {
                url: url.to_string(),
                source,
            });

        match &result {
            Ok(status) => {
                span.record_status_code(*status);
                if !(200..300).contains(status) {
                    warn!(status, url, "Data-access service returned an error status");
                }
            }
            Err(e) => warn!("Relay request failed: {}", e),
        }
        span.finish(&result);
        result
    }
}

#[async_trait]
impl Directory for ApiClient {
    async fn list(&self) -> Result<Vec<Professional>, AppError> {
        Ok(ApiClient::list(self).await?)
    }

    async fn add(&self, professional: &Professional) -> Result<(), AppError> {
        self.create(professional).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), AppError> {
        self.delete(name).await?;
        Ok(())
    }
}
