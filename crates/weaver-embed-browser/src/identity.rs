//! Identity lookup for the `userinfo://current` widget.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use weaver_embed_core::{EngineOptions, IdentityError, Result, UserInfo, decode_user_info};

use crate::fetch::endpoint;

/// Fetches the signed-in account using the session token from local storage.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    url: String,
    token_key: String,
    client: reqwest::Client,
}

impl IdentityClient {
    pub fn new(url: impl Into<String>, token_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token_key: token_key.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_options(options: &EngineOptions) -> Result<Self> {
        Ok(Self::new(
            endpoint(options, &options.user_info_path)?,
            options.token_key.clone(),
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn token(&self) -> Option<String> {
        web_sys::window()?
            .local_storage()
            .ok()??
            .get_item(&self.token_key)
            .ok()?
            .filter(|token| !token.is_empty())
    }

    pub async fn fetch(&self) -> Result<UserInfo, IdentityError> {
        let token = self.token().ok_or(IdentityError::MissingToken)?;
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, token)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;
        decode_user_info(&body)
    }
}
