use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Character, CharacterId},
    protocol::NewCharacter,
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod creation;
pub mod error;
pub mod render;
pub mod session;

pub use controller::{CardActions, CollectionController, CollectionSnapshot, EditTarget, LoadPhase};
pub use creation::submit_character;
pub use error::{ClientError, ErrorKind, Operation};
pub use session::{BearerToken, Session, SessionAccessor, TOKEN_STORAGE_KEY};

/// The characters REST API as consumed by the client.
#[async_trait]
pub trait CharacterApi: Send + Sync {
    async fn list_characters(
        &self,
        token: Option<&BearerToken>,
    ) -> Result<Vec<Character>, ClientError>;
    async fn delete_character(
        &self,
        id: CharacterId,
        token: &BearerToken,
    ) -> Result<(), ClientError>;
    async fn create_character(
        &self,
        payload: &NewCharacter,
        token: Option<&BearerToken>,
    ) -> Result<Character, ClientError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub timeout: Option<Duration>,
    /// Accept self-signed certificates, as served by a local dev backend.
    pub accept_invalid_certs: bool,
}

pub struct HttpCharacterApi {
    http: Client,
    api_origin: String,
}

impl HttpCharacterApi {
    pub fn new(api_origin: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), api_origin)
    }

    pub fn with_options(api_origin: &str, options: &HttpOptions) -> Result<Self, ClientError> {
        let mut builder = Client::builder().danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| ClientError::HttpClient { source })?;
        Self::with_client(http, api_origin)
    }

    pub fn with_client(http: Client, api_origin: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            api_origin: normalize_origin(api_origin)?,
        })
    }

    pub fn api_origin(&self) -> &str {
        &self.api_origin
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "characters api responded");
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CharacterApi for HttpCharacterApi {
    async fn list_characters(
        &self,
        token: Option<&BearerToken>,
    ) -> Result<Vec<Character>, ClientError> {
        let endpoint = "GET /api/characters";
        let request = authorize(
            self.http
                .get(format!("{}/api/characters", self.api_origin))
                .header(ACCEPT, "application/json"),
            token,
        );
        let response = self.send(endpoint, request).await?;
        read_json(endpoint, response).await
    }

    async fn delete_character(
        &self,
        id: CharacterId,
        token: &BearerToken,
    ) -> Result<(), ClientError> {
        let endpoint = format!("DELETE /api/characters/{id}");
        let request = self
            .http
            .delete(format!("{}/api/characters/{id}", self.api_origin))
            .bearer_auth(token.as_str());
        self.send(&endpoint, request).await?;
        Ok(())
    }

    async fn create_character(
        &self,
        payload: &NewCharacter,
        token: Option<&BearerToken>,
    ) -> Result<Character, ClientError> {
        let endpoint = "POST /api/characters/";
        let request = authorize(
            self.http
                .post(format!("{}/api/characters/", self.api_origin))
                .header(ACCEPT, "application/json")
                .json(payload),
            token,
        );
        let response = self.send(endpoint, request).await?;
        read_json(endpoint, response).await
    }
}

fn authorize(request: RequestBuilder, token: Option<&BearerToken>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token.as_str()),
        None => request,
    }
}

async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, ClientError> {
    let body = response
        .bytes()
        .await
        .map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
    serde_json::from_slice(&body).map_err(|source| ClientError::Parse {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Validates an API origin and strips trailing slashes so paths can be
/// appended directly.
pub fn normalize_origin(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ClientError::InvalidOrigin {
        origin: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
