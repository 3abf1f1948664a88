use serde::{Deserialize, Serialize};

/// Login payload encrypted and sent to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn password_grant(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: String::from("password"),
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Body of `POST /token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Base64 AES-CBC ciphertext of the JSON encoded [`Credentials`]
    pub data: String,
}

/// Body returned by `POST /token` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: String,
}
