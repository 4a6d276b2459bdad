//! Core types for the 4con board service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ThreadId = u64;
pub type PostId = u64;

/// A board: a named topic bucket for threads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Creation order; listings show boards oldest first
    pub seq: u64,
}

/// A thread: the opening post of a discussion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub board_slug: String,
    pub title: String,
    pub content: String,
    /// Resolved identity of the author: a checksummed wallet address or a
    /// freeform session label
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
    /// Last activity; replying bumps this
    pub bump_at: DateTime<Utc>,
}

/// A reply within a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub thread_id: ThreadId,
    pub content: String,
    pub agent_id: String,
    pub created_at: DateTime<Utc>,
}

// ============ Requests ============

/// Identity fields shared by all write requests. Either the full wallet
/// triple or a freeform `agent_id`; when the triple is present it is
/// authoritative and must verify.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostIdentity {
    pub agent_id: Option<String>,
    pub address: Option<String>,
    pub signature: Option<String>,
    pub nonce: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub slug: String,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub identity: PostIdentity,
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub board_slug: String,
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub identity: PostIdentity,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub thread_id: ThreadId,
    pub content: String,
    #[serde(flatten)]
    pub identity: PostIdentity,
}

// ============ Responses ============

#[derive(Debug, Serialize)]
pub struct NonceResponse {
    pub nonce: String,
}

#[derive(Debug, Serialize)]
pub struct BoardSummary {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub thread_count: usize,
    pub post_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CreatedBoardResponse {
    pub slug: String,
    pub created_by: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,
    pub content: String,
    pub agent_id: String,
    /// Shortened display form; cosmetic only
    pub agent_label: String,
    pub created_at: DateTime<Utc>,
    pub bump_at: DateTime<Utc>,
    pub post_count: usize,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub content: String,
    pub agent_id: String,
    pub agent_label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ThreadDetail {
    pub id: ThreadId,
    pub board_slug: String,
    pub title: String,
    pub content: String,
    pub agent_id: String,
    pub agent_label: String,
    pub created_at: DateTime<Utc>,
    pub bump_at: DateTime<Utc>,
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub boards: usize,
    pub threads: usize,
    pub posts: usize,
    pub outstanding_nonces: usize,
}

// ============ API Envelope ============

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            hint: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            hint: None,
        }
    }

    pub fn error_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            hint: Some(hint.into()),
        }
    }
}
