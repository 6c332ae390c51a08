//! Wire types for the backend REST API.
//!
//! Every response is an envelope carrying a `success` discriminant; payload
//! fields sit next to it and are modeled per endpoint instead of probing
//! loose JSON at call sites.

use serde::Deserialize;

/// Uniform response envelope.
///
/// On `success: false` the `error` field carries a machine-readable code
/// (e.g. `already_claimed`) and `message`/`owner_name` carry optional
/// human-oriented context.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(flatten)]
    pub payload: Option<T>,
}

/// Structured backend rejection, extracted from a `success: false` envelope.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub code: String,
    pub message: Option<String>,
    pub owner_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Declined,
    Cancelled,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Declined => "declined",
            ClaimStatus::Cancelled => "cancelled",
        }
    }
}

/// A claim record as the backend reports it. The bot never mutates these
/// directly, it only requests transitions.
#[derive(Debug, Clone, Deserialize)]
pub struct Claim {
    pub id: u64,
    pub discord_id: String,
    pub book_id: u64,
    pub book_url: String,
    pub status: ClaimStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub moderator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimPayload {
    pub claim: Claim,
}

#[derive(Debug, Deserialize)]
pub struct ClaimListPayload {
    pub claims: Vec<Claim>,
}

/// Windowed snapshot series for one book. Parallel sequences of equal
/// length; `timestamps` may be absent on older backend versions, in which
/// case the textual `labels` are all we get.
#[derive(Debug, Clone, Deserialize)]
pub struct BookHistory {
    pub book_id: u64,
    pub title: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub timestamps: Option<Vec<i64>>,
    #[serde(default)]
    pub followers: Vec<f64>,
    #[serde(default)]
    pub views: Vec<f64>,
    #[serde(default)]
    pub rating: Vec<f64>,
    #[serde(default)]
    pub rating_count: Vec<f64>,
    #[serde(default)]
    pub chapters: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EssenceBook {
    pub book_id: u64,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A backend-computed pairing of two tags. Tag order is canonicalized
/// (sorted) server-side before lookup; discovery attribution also happens
/// there.
#[derive(Debug, Clone, Deserialize)]
pub struct EssenceCombination {
    pub first_tag: String,
    pub second_tag: String,
    pub combination_name: String,
    pub rarity: Rarity,
    pub book_count: u64,
    #[serde(default)]
    pub example_books: Vec<EssenceBook>,
    #[serde(default)]
    pub discovered_by: Option<String>,
}

/// Rising Stars chance estimate for one book.
#[derive(Debug, Clone, Deserialize)]
pub struct RsPrediction {
    pub book_id: u64,
    pub title: String,
    /// 0.0..=1.0
    pub probability: f64,
    #[serde(default)]
    pub observed_days: Option<u32>,
    #[serde(default)]
    pub projected_rank: Option<u32>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PtwEntry {
    pub rank: u32,
    pub book_id: u64,
    pub title: String,
    pub weekly_views: u64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PtwPayload {
    pub entries: Vec<PtwEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModRole {
    Moderator,
    Supermod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModeratorRecord {
    pub server_id: String,
    pub discord_id: String,
    pub role: ModRole,
    pub verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModeratorPayload {
    pub moderator: ModeratorRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShoutoutCampaign {
    pub id: u64,
    pub book_id: u64,
    pub title: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    pub slots_total: u32,
    pub slots_open: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShoutoutPayload {
    pub campaign: ShoutoutCampaign,
}

#[derive(Debug, Deserialize)]
pub struct ShoutoutListPayload {
    pub campaigns: Vec<ShoutoutCampaign>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_envelope() {
        let json = r#"{
            "success": true,
            "claim": {
                "id": 77,
                "discord_id": "111222333",
                "book_id": 12345,
                "book_url": "https://www.royalroad.com/fiction/12345",
                "status": "pending"
            }
        }"#;

        let envelope: Envelope<ClaimPayload> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        let claim = envelope.payload.unwrap().claim;
        assert_eq!(claim.id, 77);
        assert_eq!(claim.status, ClaimStatus::Pending);
    }

    #[test]
    fn test_decode_rejection_envelope() {
        let json = r#"{
            "success": false,
            "error": "already_claimed",
            "owner_name": "Alice"
        }"#;

        let envelope: Envelope<ClaimPayload> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("already_claimed"));
        assert_eq!(envelope.owner_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_decode_history_without_timestamps() {
        let json = r#"{
            "success": true,
            "book_id": 5,
            "title": "Test Book",
            "labels": ["2026-01-01", "2026-01-02"],
            "followers": [10.0, 12.0]
        }"#;

        let envelope: Envelope<BookHistory> = serde_json::from_str(json).unwrap();
        let history = envelope.payload.unwrap();
        assert!(history.timestamps.is_none());
        assert_eq!(history.followers.len(), 2);
        assert!(history.views.is_empty());
    }

    #[test]
    fn test_decode_rarity_tiers() {
        let json = r#"{
            "success": true,
            "first_tag": "Fantasy",
            "second_tag": "Sci-fi",
            "combination_name": "Science Fantasy",
            "rarity": "legendary",
            "book_count": 3
        }"#;

        let envelope: Envelope<EssenceCombination> = serde_json::from_str(json).unwrap();
        let combo = envelope.payload.unwrap();
        assert_eq!(combo.rarity, Rarity::Legendary);
        assert!(combo.example_books.is_empty());
    }
}
