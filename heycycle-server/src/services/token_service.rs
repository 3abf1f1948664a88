use std::sync::Arc;

use heycycle_api::models::Credentials;

use crate::configs::Cloud;
use crate::errors::{AuthError, CipherError, TransportError};
use crate::models::{Token, local_now};
use crate::services::{CloudClient, CredentialCipher, TokenStore};

/// Hands out a valid vendor token, refreshing the cache when needed.
#[derive(Clone)]
pub struct TokenService {
    client: Arc<CloudClient>,
    cipher: CredentialCipher,
    credentials: Credentials,
    store: TokenStore,
}

impl TokenService {
    pub fn new(
        client: Arc<CloudClient>,
        cipher: CredentialCipher,
        credentials: Credentials,
        store: TokenStore,
    ) -> Self {
        Self {
            client,
            cipher,
            credentials,
            store,
        }
    }

    pub fn from_settings(
        client: Arc<CloudClient>,
        cloud: &Cloud,
        store: TokenStore,
    ) -> Result<Self, CipherError> {
        let cipher = CredentialCipher::new(&cloud.app_key)?;
        let credentials = Credentials::password_grant(
            &cloud.client_id,
            &cloud.client_secret,
            &cloud.username,
            &cloud.password,
        );

        Ok(Self::new(client, cipher, credentials, store))
    }

    pub async fn get_valid_token(&self) -> Result<Token, AuthError> {
        match self.store.load().await {
            Ok(Some(token)) if !token.is_expired(local_now()) => {
                tracing::debug!("using valid token from {}", self.store.path().display());
                return Ok(token);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("ignoring unreadable token cache: {}", e),
        }

        tracing::info!("token expired or unavailable, fetching a new one");

        self.refresh().await
    }

    /// Requests a new token and caches it. The cache is untouched on failure.
    pub async fn refresh(&self) -> Result<Token, AuthError> {
        let payload = serde_json::to_string(&self.credentials)
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        let response = match self.client.request_token(self.cipher.encrypt(&payload)).await {
            Ok(response) => response,
            Err(TransportError::Status { status, body }) => {
                tracing::error!("error fetching token: {} {}", status, body);
                return Err(AuthError::Rejected { status, body });
            }
            Err(e) => {
                tracing::error!("error fetching token: {}", e);
                return Err(e.into());
            }
        };

        if response.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(String::from(
                "access_token is empty",
            )));
        }

        let token = Token::issued(response, local_now());

        if let Err(e) = self.store.save(&token).await {
            tracing::error!("error saving token: {}", e);
        }

        Ok(token)
    }
}
