//! HTTP client wrapper for the WordPress backend.
//!
//! One shared connection pool for the process; every call carries the shared
//! secret token (header and body field) and a descriptive user-agent. Calls
//! are at-most-once: there is no retry policy anywhere in this module.

pub mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub use types::*;

/// Timeout for quick lookups.
pub const QUICK_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for heavier aggregation endpoints (history windows, predictions).
pub const HEAVY_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("fictionbot/", env!("CARGO_PKG_VERSION"));
const API_PREFIX: &str = "wp-json/fiction-api/v1";

#[derive(Error, Debug)]
pub enum ApiError {
    /// The per-call timeout elapsed. Kept separate from other transport
    /// failures so handlers can tell the user so.
    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(String),

    /// The backend answered but refused the request, with a structured code.
    #[error("backend rejected the request: {}", .0.code)]
    Rejected(Rejection),
}

fn transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err)
    }
}

impl<T> Envelope<T> {
    /// Collapse the envelope into a typed outcome.
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            self.payload
                .ok_or_else(|| ApiError::Decode("success envelope without payload".to_string()))
        } else {
            Err(ApiError::Rejected(Rejection {
                code: self.error.unwrap_or_else(|| "unknown".to_string()),
                message: self.message,
                owner_name: self.owner_name,
            }))
        }
    }
}

/// Client for the backend REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, path)
    }

    /// POST a JSON body and decode the enveloped response.
    ///
    /// The shared token is injected into the body here so individual
    /// endpoint methods cannot forget it.
    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        mut body: serde_json::Value,
        timeout: Duration,
    ) -> Result<T, ApiError> {
        if let Some(object) = body.as_object_mut() {
            object.insert("token".to_string(), json!(self.token));
        }

        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Backend returned {} for {}", status, url);
            return Err(ApiError::Status(status));
        }

        let text = response.text().await.map_err(transport)?;
        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        envelope.into_result()
    }

    // --- Claims ---

    pub async fn submit_claim(
        &self,
        discord_id: u64,
        book_id: u64,
        book_url: &str,
        server_id: Option<u64>,
    ) -> Result<Claim, ApiError> {
        let payload: ClaimPayload = self
            .post(
                "claim/submit",
                json!({
                    "discord_id": discord_id.to_string(),
                    "book_id": book_id,
                    "book_url": book_url,
                    "server_id": server_id.map(|id| id.to_string()),
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.claim)
    }

    pub async fn process_claim(
        &self,
        claim_id: u64,
        action: &str,
        moderator_id: u64,
        server_id: Option<u64>,
    ) -> Result<Claim, ApiError> {
        let payload: ClaimPayload = self
            .post(
                "claim/process",
                json!({
                    "claim_id": claim_id,
                    "action": action,
                    "moderator_id": moderator_id.to_string(),
                    "server_id": server_id.map(|id| id.to_string()),
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.claim)
    }

    pub async fn cancel_claim(&self, claim_id: u64, discord_id: u64) -> Result<Claim, ApiError> {
        let payload: ClaimPayload = self
            .post(
                "claim/cancel",
                json!({
                    "claim_id": claim_id,
                    "discord_id": discord_id.to_string(),
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.claim)
    }

    pub async fn list_claims(
        &self,
        discord_id: Option<u64>,
        server_id: Option<u64>,
        status: Option<&str>,
    ) -> Result<Vec<Claim>, ApiError> {
        let payload: ClaimListPayload = self
            .post(
                "claim/list",
                json!({
                    "discord_id": discord_id.map(|id| id.to_string()),
                    "server_id": server_id.map(|id| id.to_string()),
                    "status": status,
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.claims)
    }

    // --- Book stats ---

    pub async fn book_history(&self, book_id: u64, days: u32) -> Result<BookHistory, ApiError> {
        self.post(
            "book/history",
            json!({ "book_id": book_id, "days": days }),
            HEAVY_TIMEOUT,
        )
        .await
    }

    // --- Essence ---

    pub async fn essence_combine(
        &self,
        first_tag: &str,
        second_tag: &str,
        discord_id: u64,
    ) -> Result<EssenceCombination, ApiError> {
        self.post(
            "essence/combine",
            json!({
                "first_tag": first_tag,
                "second_tag": second_tag,
                "discord_id": discord_id.to_string(),
            }),
            QUICK_TIMEOUT,
        )
        .await
    }

    // --- Rising Stars / PTW ---

    pub async fn rising_stars_prediction(&self, book_id: u64) -> Result<RsPrediction, ApiError> {
        self.post(
            "risingstars/prediction",
            json!({ "book_id": book_id }),
            HEAVY_TIMEOUT,
        )
        .await
    }

    pub async fn popular_this_week(&self) -> Result<Vec<PtwEntry>, ApiError> {
        let payload: PtwPayload = self.post("ptw", json!({}), QUICK_TIMEOUT).await?;
        Ok(payload.entries)
    }

    // --- Moderation ---

    pub async fn add_moderator(
        &self,
        server_id: u64,
        discord_id: u64,
        requester_id: u64,
        supermod: bool,
    ) -> Result<ModeratorRecord, ApiError> {
        let payload: ModeratorPayload = self
            .post(
                "mod/add",
                json!({
                    "server_id": server_id.to_string(),
                    "discord_id": discord_id.to_string(),
                    "requester_id": requester_id.to_string(),
                    "supermod": supermod,
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.moderator)
    }

    pub async fn remove_moderator(
        &self,
        server_id: u64,
        discord_id: u64,
        requester_id: u64,
    ) -> Result<ModeratorRecord, ApiError> {
        let payload: ModeratorPayload = self
            .post(
                "mod/remove",
                json!({
                    "server_id": server_id.to_string(),
                    "discord_id": discord_id.to_string(),
                    "requester_id": requester_id.to_string(),
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.moderator)
    }

    pub async fn verify_server(
        &self,
        server_id: u64,
        discord_id: u64,
    ) -> Result<ModeratorRecord, ApiError> {
        let payload: ModeratorPayload = self
            .post(
                "server/verify",
                json!({
                    "server_id": server_id.to_string(),
                    "discord_id": discord_id.to_string(),
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.moderator)
    }

    // --- Shoutouts ---

    pub async fn create_shoutout(
        &self,
        discord_id: u64,
        book_id: u64,
        slots: u32,
        description: Option<&str>,
    ) -> Result<ShoutoutCampaign, ApiError> {
        let payload: ShoutoutPayload = self
            .post(
                "shoutout/create",
                json!({
                    "discord_id": discord_id.to_string(),
                    "book_id": book_id,
                    "slots": slots,
                    "description": description,
                }),
                QUICK_TIMEOUT,
            )
            .await?;
        Ok(payload.campaign)
    }

    pub async fn list_shoutouts(&self) -> Result<Vec<ShoutoutCampaign>, ApiError> {
        let payload: ShoutoutListPayload =
            self.post("shoutout/list", json!({}), QUICK_TIMEOUT).await?;
        Ok(payload.campaigns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_into_result() {
        let envelope: Envelope<ClaimListPayload> = serde_json::from_str(
            r#"{"success": true, "claims": []}"#,
        )
        .unwrap();
        let claims = envelope.into_result().unwrap().claims;
        assert!(claims.is_empty());
    }

    #[test]
    fn test_rejection_envelope_into_result() {
        let envelope: Envelope<ClaimPayload> = serde_json::from_str(
            r#"{"success": false, "error": "pending_exists", "message": "A pending claim already exists"}"#,
        )
        .unwrap();
        match envelope.into_result().unwrap_err() {
            ApiError::Rejected(rejection) => {
                assert_eq!(rejection.code, "pending_exists");
                assert_eq!(
                    rejection.message.as_deref(),
                    Some("A pending claim already exists")
                );
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_success_without_payload_is_decode_error() {
        let envelope: Envelope<ClaimPayload> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            envelope.into_result().unwrap_err(),
            ApiError::Decode(_)
        ));
    }

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let client = ApiClient::new("https://example.com/".to_string(), "secret".to_string());
        assert_eq!(
            client.url("claim/submit"),
            "https://example.com/wp-json/fiction-api/v1/claim/submit"
        );
    }
}
