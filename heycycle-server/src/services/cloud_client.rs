use std::time::Duration;

use heycycle_api::models::{ControlRequest, Device, PortStates, TokenRequest, TokenResponse};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::errors::TransportError;
use crate::models::Token;

/// Thin client for the vendor's open API.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http_client: Client,
    base_url: String,
}

impl CloudClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /token` with the encrypted credential payload.
    pub async fn request_token(&self, data: String) -> Result<TokenResponse, TransportError> {
        let response = self
            .http_client
            .post(format!("{}/token", self.base_url))
            .json(&TokenRequest { data })
            .send()
            .await?;

        Ok(Self::ensure_ok(response).await?.json().await?)
    }

    /// `POST /control/<device_id>`.
    pub async fn control(
        &self,
        token: &Token,
        device_id: &str,
        states: PortStates,
    ) -> Result<(), TransportError> {
        let response = self
            .http_client
            .post(format!("{}/control/{}", self.base_url, device_id))
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .json(&ControlRequest::from(states))
            .send()
            .await?;

        Self::ensure_ok(response).await?;

        Ok(())
    }

    /// `GET /devices`.
    pub async fn devices(&self, token: &Token) -> Result<Vec<Device>, TransportError> {
        let response = self
            .http_client
            .get(format!("{}/devices", self.base_url))
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .send()
            .await?;

        Ok(Self::ensure_ok(response).await?.json().await?)
    }

    /// `GET /device/<device_id>`; the status document is vendor defined.
    pub async fn device(&self, token: &Token, device_id: &str) -> Result<Value, TransportError> {
        let response = self
            .http_client
            .get(format!("{}/device/{}", self.base_url, device_id))
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .send()
            .await?;

        Ok(Self::ensure_ok(response).await?.json().await?)
    }

    async fn ensure_ok(response: Response) -> Result<Response, TransportError> {
        let status = response.status();

        if status == StatusCode::OK {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();

            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use crate::tests::valid_token;

    use super::*;

    #[tokio::test]
    async fn test_devices_lists_vendor_devices() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/devices")
            .match_header("authorization", "Bearer valid-token")
            .with_status(200)
            .with_body(
                json!([
                    { "id": "50450710e8db84f198f8", "name": "Power strip", "deviceType": "PowerStrip", "online": true }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let devices = client.devices(&valid_token()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "50450710e8db84f198f8");
        assert_eq!(devices[0].device_type, "PowerStrip");
        assert_eq!(devices[0].extra.get("online"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_device_returns_status_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/device/dev-1")
            .with_status(200)
            .with_body(json!({ "deviceState": { "power1": true } }).to_string())
            .create_async()
            .await;

        let client = CloudClient::new(&format!("{}/", server.url()), Duration::from_secs(5)).unwrap();
        let status = client.device(&valid_token(), "dev-1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(status["deviceState"]["power1"], json!(true));
    }

    #[tokio::test]
    async fn test_token_request_wraps_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::Json(json!({ "data": "cipher" })))
            .with_status(200)
            .with_body(json!({ "access_token": "abc", "expires_in": 60 }).to_string())
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let response = client.request_token(String::from("cipher")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.access_token, "abc");
        assert_eq!(response.expires_in, Some(60));
    }

    #[tokio::test]
    async fn test_non_ok_status_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/devices")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let result = client.devices(&valid_token()).await;

        match result {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
