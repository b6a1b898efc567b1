//! Stateless HTTP request builder and response parser for the search API.
//!
//! # Design
//! `SearchClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. A search is split into `build_search`, which validates and
//! produces an `HttpRequest`, and `parse_search`, which consumes an
//! `HttpResponse`. `send` and `follow` tie the two together through a
//! caller-supplied `Transport`; nothing here opens a socket.

use serde::Deserialize;

use crate::config::{self, ClientConfig};
use crate::data::Person;
use crate::error::{ApiError, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::{form_encode, SearchOptions, SearchRequest, FORM_PARAMS};
use crate::response::{Quota, SearchResponse};
use crate::transport::Transport;

/// Synchronous, stateless client for the search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    config: ClientConfig,
    strict_validation: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
    warnings: Vec<String>,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            strict_validation: false,
        }
    }

    /// Client over the process-wide defaults, or the built-in defaults when
    /// `config::set_defaults` was never called.
    pub fn from_defaults() -> Self {
        Self::new(config::defaults().cloned().unwrap_or_default())
    }

    /// Also reject requests carrying fields too weak to search by.
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Key precedence: request, then client config, then process defaults.
    fn resolve_api_key<'a>(&'a self, request: &'a SearchRequest) -> Option<&'a str> {
        request
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or_else(|| self.config.api_key.as_deref().filter(|k| !k.is_empty()))
            .or_else(|| config::default_api_key())
    }

    pub fn build_search(&self, request: &SearchRequest) -> Result<HttpRequest, ApiError> {
        let api_key = self.resolve_api_key(request);
        request.validate(api_key, self.strict_validation)?;
        let api_key = api_key.ok_or(ValidationError::MissingApiKey)?;

        let (form, mut query): (Vec<_>, Vec<_>) = request
            .query_params(api_key)?
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .partition(|(name, _)| FORM_PARAMS.contains(&name.as_str()));
        query.extend(self.config.params.iter().cloned());

        let url = format!("{}/search/?{}", self.config.base_url, form_encode(&query));
        let body = form_encode(&form);
        tracing::debug!(
            base_url = %self.config.base_url,
            pointer = request.search_pointer.is_some(),
            "built search request"
        );

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![
                (
                    "content-type".to_string(),
                    "application/x-www-form-urlencoded".to_string(),
                ),
                ("user-agent".to_string(), self.config.user_agent.clone()),
            ],
            body: Some(body),
        })
    }

    pub fn parse_search(&self, response: HttpResponse) -> Result<SearchResponse, ApiError> {
        check_status(&response)?;
        let mut parsed: SearchResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        if parsed.http_status_code == 0 {
            parsed.http_status_code = response.status;
        }
        parsed.quota = Quota::from_headers(&response);
        for warning in &parsed.warnings {
            tracing::warn!(%warning, "search warning");
        }
        tracing::debug!(
            persons_count = parsed.persons_count,
            sources = parsed.sources.len(),
            "parsed search response"
        );
        Ok(parsed)
    }

    pub fn send<T: Transport + ?Sized>(
        &self,
        transport: &T,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ApiError> {
        let http_request = self.build_search(request)?;
        let http_response = transport.execute(http_request)?;
        self.parse_search(http_response)
    }

    /// Fetch the full record of a possible person through its search pointer.
    pub fn follow<T: Transport + ?Sized>(
        &self,
        transport: &T,
        person: &Person,
        options: &SearchOptions,
    ) -> Result<SearchResponse, ApiError> {
        let pointer = person
            .search_pointer
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ValidationError::InsufficientCriteria)?;
        let request = SearchRequest::from_search_pointer(pointer).with_options(options.clone());
        self.send(transport, &request)
    }
}

/// Map a non-200 status to `ApiError::Search`, reading the error body when
/// there is one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    let body: ErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
    let message = match body.error {
        Some(error) => error,
        None if response.body.trim().is_empty() => format!("HTTP {}", response.status),
        None => response.body.trim().to_string(),
    };
    tracing::warn!(status = response.status, %message, "search failed");
    Err(ApiError::Search {
        status: response.status,
        message,
        warnings: body.warnings,
    })
}
