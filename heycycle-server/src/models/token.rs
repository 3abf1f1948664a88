use heycycle_api::models::TokenResponse;
use serde::{Deserialize, Serialize};
use time::{Duration, PrimitiveDateTime};

time::serde::format_description!(
    issued_at_format,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second]"
);

/// Vendor bearer credential as kept in the token cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds of validity counted from `issued_at`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "issued_at_format::option"
    )]
    pub issued_at: Option<PrimitiveDateTime>,
}

impl Token {
    pub fn issued(response: TokenResponse, issued_at: PrimitiveDateTime) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            scope: response.scope,
            issued_at: Some(issued_at),
        }
    }

    pub fn expires_at(&self) -> Option<PrimitiveDateTime> {
        let issued_at = self.issued_at?;
        let expires_in = i64::try_from(self.expires_in?).ok()?;

        issued_at.checked_add(Duration::seconds(expires_in))
    }

    /// Missing expiry metadata counts as expired.
    pub fn is_expired(&self, now: PrimitiveDateTime) -> bool {
        match self.expires_at() {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
