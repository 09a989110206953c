//! `reqwest` implementation of [`Backend`].

use crate::api::{Backend, Method, Mutation};
use finesdesk_core::envelope::{normalize_text, Normalized};
use finesdesk_core::{AppError, Config, Resource};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// HTTP backend rooted at a server URL such as `http://127.0.0.1:38480`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    server: reqwest::Url,
}

/// Canonicalize a server URL: `localhost` becomes `127.0.0.1` for plain
/// HTTP and trailing slashes are dropped.
pub fn normalize_server(server: &str) -> String {
    let trimmed = server.trim();
    if let Ok(mut url) = reqwest::Url::parse(trimmed) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return trimmed.to_string();
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    trimmed.to_string()
}

impl HttpBackend {
    /// Build a backend for `server` with a per-request `timeout`.
    ///
    /// # Errors
    /// Returns [`AppError::Transport`] when the URL cannot be parsed or the
    /// HTTP client cannot be constructed.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, AppError> {
        let normalized = normalize_server(server);
        let server = reqwest::Url::parse(&normalized).map_err(|err| {
            AppError::Transport(format!("Invalid server URL '{}': {}", server, err))
        })?;
        if server.cannot_be_a_base() {
            return Err(AppError::Transport(format!(
                "Server URL '{}' cannot be used as an API base",
                server
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Transport(err.to_string()))?;
        Ok(Self { client, server })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            &config.server_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn server(&self) -> &reqwest::Url {
        &self.server
    }

    fn api_url(&self, segments: &[&str]) -> Result<reqwest::Url, AppError> {
        let mut url = self.server.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::Transport("Server URL cannot be used as an API base".to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn read(
        response: reqwest::Response,
        collection_key: Option<&str>,
    ) -> Result<Normalized, AppError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::Transport(format!("failed to read response body: {}", err)))?;
        Ok(normalize_text(status, &body, collection_key))
    }
}

fn transport_error(action: &str, err: reqwest::Error) -> AppError {
    warn!("{} failed before a response arrived: {}", action, err);
    AppError::Transport(err.to_string())
}

impl Backend for HttpBackend {
    async fn list(&self, resource: Resource) -> Result<Normalized, AppError> {
        let url = self.api_url(&["api", resource.path()])?;
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error("list", err))?;
        let normalized = Self::read(response, resource.collection_key()).await?;
        debug!(
            resource = %resource,
            ok = normalized.ok,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "list request finished"
        );
        Ok(normalized)
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<Normalized, AppError> {
        let url = self.api_url(&mutation.segments())?;
        let builder = match mutation.method {
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };
        let builder = match mutation.body.as_ref() {
            Some(body) => builder.json(body),
            None => builder,
        };
        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|err| transport_error("mutation", err))?;
        let normalized = Self::read(response, None).await?;
        debug!(
            resource = %mutation.resource,
            method = %mutation.method,
            ok = normalized.ok,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "mutation request finished"
        );
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_rewrites_localhost_and_trailing_slash() {
        assert_eq!(
            normalize_server("http://localhost:38480/"),
            "http://127.0.0.1:38480"
        );
        assert_eq!(
            normalize_server(" https://localhost/school/ "),
            "https://localhost/school"
        );
        assert_eq!(normalize_server("not a url"), "not a url");
    }

    #[test]
    fn api_url_appends_segments_to_base_path() {
        let timeout = Duration::from_secs(1);
        let backend = HttpBackend::new("http://127.0.0.1:9/school/", timeout).expect("backend");
        let segments = ["api", "fines", "3", "pay"];
        let url = backend.api_url(&segments).expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:9/school/api/fines/3/pay");
    }

    #[test]
    fn invalid_server_is_a_transport_error() {
        let err = HttpBackend::new("::nope::", Duration::from_secs(1))
            .err()
            .expect("invalid url");
        assert!(matches!(err, AppError::Transport(_)));
    }
}
