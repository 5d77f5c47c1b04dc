//! Client for the demo account REST API.

mod models;

pub use models::{CreateUserResponse, Credentials, GenerateTokenResponse};

use crate::data::{self, PASSWORD_LENGTH};
use crate::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Account API bound to one base URL, with a generated password for the users it creates.
///
/// A successful [`generate_token`](Self::generate_token) stores the token, and later
/// lookups send it as a bearer token.
#[derive(Debug, Clone)]
pub struct AccountApi {
    client: Client,
    base_url: String,
    password: String,
    token: Option<String>,
}

impl AccountApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            password: data::strong_password(&mut rand::thread_rng(), PASSWORD_LENGTH),
            token: None,
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /Account/v1/User`, expecting 201.
    pub async fn create_user(&self, user_name: &str, password: &str) -> Result<CreateUserResponse> {
        let url = self.endpoint("/Account/v1/User");
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&Credentials {
                user_name,
                password,
            })
            .send()
            .await?;
        read_json(&url, response, StatusCode::CREATED).await
    }

    /// `POST /Account/v1/GenerateToken`, expecting 200.
    pub async fn generate_token(
        &mut self,
        user_name: &str,
        password: &str,
    ) -> Result<GenerateTokenResponse> {
        let url = self.endpoint("/Account/v1/GenerateToken");
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&Credentials {
                user_name,
                password,
            })
            .send()
            .await?;
        let body: GenerateTokenResponse = read_json(&url, response, StatusCode::OK).await?;
        if let Some(ref token) = body.token {
            self.token = Some(token.clone());
        }
        Ok(body)
    }

    /// `GET /Account/v1/User/{user_id}`, expecting 200.
    pub async fn get_user(&self, user_id: &str) -> Result<CreateUserResponse> {
        let url = self.endpoint(&format!("/Account/v1/User/{}", user_id));
        debug!("GET {}", url);
        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        read_json(&url, response, StatusCode::OK).await
    }
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
    expected: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        debug!("{} -> {}: {}", endpoint, status, body);
        return Err(Error::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            expected: expected.as_u16(),
            actual: status.as_u16(),
        });
    }
    Ok(response.json().await?)
}
