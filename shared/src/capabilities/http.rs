use crux_http::Http;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{ConfigError, FetchError};
use crate::event::Event;
use crate::graphql::{self, GraphQlRequest, Payload};

pub type HttpCapability = Http<Event>;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    scheme: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(Self::invalid(&url, "URL cannot be empty"));
        }
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(Self::invalid(
                &url,
                &format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            ));
        }

        let parsed = Url::parse(trimmed).map_err(|e| Self::invalid(&url, &e.to_string()))?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(Self::invalid(
                &url,
                &format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            ));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| Self::invalid(&url, "URL must have a host"))?
            .to_lowercase();

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(Self::invalid(&url, "credentials in URL are not allowed"));
        }

        Ok(Self {
            url: parsed.to_string(),
            scheme,
            host,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn invalid(url: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidEndpoint {
            url: Self::truncate_url(url),
            reason: reason.to_string(),
        }
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

/// Posts `request` to the gateway and decodes the reply as `P`.
///
/// The bearer token is attached to every operation except sign-in. If the
/// body cannot be built no effect is issued and the completion event is
/// returned for the caller to process right away.
pub fn send_graphql<P, F>(
    http: &HttpCapability,
    endpoint: &str,
    bearer: Option<&SecretString>,
    request: &GraphQlRequest,
    on_done: F,
) -> Option<Event>
where
    P: Payload,
    P::Output: Send + 'static,
    F: FnOnce(Result<P::Output, FetchError>) -> Event + Send + 'static,
{
    let operation = request.operation;
    let body = match request.to_bytes() {
        Ok(body) => body,
        Err(e) => {
            warn!(operation = operation.name(), error = %e, "could not encode graphql request");
            return Some(on_done(Err(e)));
        }
    };

    let request_id = Uuid::new_v4();
    let mut builder = http
        .post(endpoint)
        .body(body)
        .header("Content-Type", "application/json")
        .header("X-Request-Id", request_id.to_string().as_str());

    if operation.requires_auth() {
        if let Some(token) = bearer {
            let value = format!("Bearer {}", token.expose_secret());
            builder = builder.header("Authorization", value.as_str());
        }
    }

    info!(%request_id, operation = operation.name(), "sending graphql request");

    builder.send(move |result| {
        let outcome = match result {
            Ok(mut response) => {
                let status = u16::from(response.status());
                let body = response.take_body().unwrap_or_default();
                graphql::decode::<P>(status, &body)
            }
            Err(e) => Err(FetchError::Transport {
                message: e.to_string(),
            }),
        };
        match &outcome {
            Ok(_) => debug!(%request_id, operation = operation.name(), "graphql request succeeded"),
            Err(e) => warn!(
                %request_id,
                operation = operation.name(),
                code = e.kind().code(),
                retryable = e.is_retryable(),
                error = %e,
                "graphql request failed"
            ),
        }
        on_done(outcome)
    });

    None
}
