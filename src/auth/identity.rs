use anyhow::Context;
use axum::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::IdentityConfig;
use crate::error::{AppError, AppResult};

/// Issues one-time sign-in links. Verification happens on the provider's side.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> AppResult<()>;
}

/// Client for a GoTrue-compatible auth server.
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct OtpRequest<'a> {
    email: &'a str,
    create_user: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

impl GoTrueClient {
    pub fn new(cfg: &IdentityConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build identity http client")?;
        Ok(Self {
            http,
            base_url: cfg.auth_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        let url = format!("{}/otp", self.base_url);
        let res = self
            .http
            .post(&url)
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&OtpRequest {
                email,
                create_user: true,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "identity provider unreachable");
                AppError::from(e)
            })?;

        let status = res.status();
        if status.is_success() {
            debug!(%status, "magic link requested");
            return Ok(());
        }

        let body = res.text().await.unwrap_or_default();
        let message = parse_provider_error(&body)
            .unwrap_or_else(|| format!("identity provider returned {}", status));
        error!(%status, %message, "magic link request rejected");
        Err(AppError::Identity(message))
    }
}

fn parse_provider_error(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderError>(body)
        .ok()
        .and_then(ProviderError::into_message)
}
