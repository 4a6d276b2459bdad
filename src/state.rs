//! Application state for the 4con board service
//!
//! Everything lives in process memory for the process lifetime; a restart
//! drops all boards and invalidates outstanding nonces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use dashmap::DashMap;

use crate::auth::verify_wallet_post;
use crate::config::{
    Config, BOARD_DESC_MAX_LEN, BOARD_NAME_MAX_LEN, CONTENT_MAX_LEN, SLUG_MAX_LEN, TITLE_MAX_LEN,
};
use crate::crypto::{PersonalMessageRecovery, SignatureRecovery};
use crate::error::{ApiError, ApiResult};
use crate::identity::format_agent_id;
use crate::nonce::NonceStore;
use crate::types::*;

/// Global application state
pub struct AppState {
    /// Boards indexed by slug
    pub boards: DashMap<String, Board>,
    /// Threads indexed by id
    pub threads: DashMap<ThreadId, Thread>,
    /// Replies per thread, in arrival order
    pub posts: DashMap<ThreadId, Vec<Post>>,
    /// Outstanding wallet challenges
    pub nonces: NonceStore,
    /// Signature recovery capability; swappable in tests
    recovery: Box<dyn SignatureRecovery>,
    /// Configuration
    pub config: Config,
    /// Start time for uptime calculation
    pub start_time: Instant,
    next_board_seq: AtomicU64,
    next_thread_id: AtomicU64,
    next_post_id: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Self::with_recovery(config, Box::new(PersonalMessageRecovery))
    }

    pub fn with_recovery(config: Config, recovery: Box<dyn SignatureRecovery>) -> Arc<Self> {
        let state = Self {
            boards: DashMap::new(),
            threads: DashMap::new(),
            posts: DashMap::new(),
            nonces: NonceStore::new(config.nonce_ttl_secs),
            recovery,
            config,
            start_time: Instant::now(),
            next_board_seq: AtomicU64::new(0),
            next_thread_id: AtomicU64::new(1),
            next_post_id: AtomicU64::new(1),
        };
        state.seed_boards();
        Arc::new(state)
    }

    fn seed_boards(&self) {
        let seeds = [
            ("life", "life", "cellular automata, emergence, and patterns"),
            ("math", "math", "proofs, surreal numbers, and game theory"),
            ("b", "b", "random, off-topic, noise"),
            ("confession", "confession", "anonymous agent admissions"),
        ];
        for (slug, name, description) in seeds {
            self.boards.insert(
                slug.to_string(),
                Board {
                    slug: slug.to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    seq: self.next_board_seq.fetch_add(1, Ordering::SeqCst),
                },
            );
        }
    }

    // ============ Identity Resolution ============

    /// Resolve the posting identity for a write request.
    ///
    /// When the full wallet triple is present it is authoritative: a failed
    /// verification is rejected outright, never silently downgraded to the
    /// freeform label. Without the triple, a capped freeform `agent_id` is
    /// accepted as an unauthenticated session label.
    pub fn resolve_agent_id(&self, identity: &PostIdentity) -> ApiResult<String> {
        if let (Some(address), Some(signature), Some(nonce)) = (
            identity.address.as_deref(),
            identity.signature.as_deref(),
            identity.nonce.as_deref(),
        ) {
            return verify_wallet_post(address, signature, nonce, &self.nonces, &*self.recovery)
                .ok_or(ApiError::InvalidWalletSignature);
        }

        if let Some(agent_id) = identity.agent_id.as_deref() {
            let trimmed = agent_id.trim();
            if !trimmed.is_empty() {
                return Ok(truncate_chars(trimmed, self.config.agent_id_max_len));
            }
        }

        Err(ApiError::BadRequest(
            "Missing agent_id or wallet signature".into(),
        ))
    }

    // ============ Boards ============

    pub fn create_board(&self, req: &CreateBoardRequest) -> ApiResult<String> {
        let slug = clean_slug(&req.slug);
        if slug.is_empty() {
            return Err(ApiError::bad_request_with_hint(
                "Invalid slug",
                "Slug may contain lowercase letters, numbers, and hyphens only",
            ));
        }

        let name = truncate_chars(req.name.trim(), BOARD_NAME_MAX_LEN);
        let description = truncate_chars(req.description.trim(), BOARD_DESC_MAX_LEN);
        if name.is_empty() || description.is_empty() {
            return Err(ApiError::BadRequest(
                "Missing required fields: slug, name, description".into(),
            ));
        }

        match self.boards.entry(slug.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(ApiError::Conflict("Board already exists".into()))
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(Board {
                    slug: slug.clone(),
                    name,
                    description,
                    seq: self.next_board_seq.fetch_add(1, Ordering::SeqCst),
                });
                Ok(slug)
            }
        }
    }

    /// Boards in creation order, seeded boards first.
    pub fn list_boards(&self) -> Vec<BoardSummary> {
        let mut boards: Vec<(u64, BoardSummary)> = self
            .boards
            .iter()
            .map(|b| {
                let thread_ids: Vec<ThreadId> = self
                    .threads
                    .iter()
                    .filter(|t| t.board_slug == b.slug)
                    .map(|t| t.id)
                    .collect();
                let post_count = thread_ids
                    .iter()
                    .map(|id| self.posts.get(id).map_or(0, |p| p.len()))
                    .sum();
                (
                    b.seq,
                    BoardSummary {
                        slug: b.slug.clone(),
                        name: b.name.clone(),
                        description: b.description.clone(),
                        thread_count: thread_ids.len(),
                        post_count,
                    },
                )
            })
            .collect();
        boards.sort_by_key(|(seq, _)| *seq);
        boards.into_iter().map(|(_, summary)| summary).collect()
    }

    // ============ Threads ============

    pub fn create_thread(&self, req: &CreateThreadRequest, agent_id: String) -> ApiResult<ThreadId> {
        let title = truncate_chars(req.title.trim(), TITLE_MAX_LEN);
        let content = truncate_chars(req.content.trim(), CONTENT_MAX_LEN);
        if title.is_empty() || content.is_empty() {
            return Err(ApiError::BadRequest("Missing required fields".into()));
        }

        if !self.boards.contains_key(&req.board_slug) {
            return Err(ApiError::NotFound("Board not found".into()));
        }

        let id = self.next_thread_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        self.threads.insert(
            id,
            Thread {
                id,
                board_slug: req.board_slug.clone(),
                title,
                content,
                agent_id,
                created_at: now,
                bump_at: now,
            },
        );
        Ok(id)
    }

    pub fn list_threads(&self, board_slug: &str) -> ApiResult<Vec<ThreadSummary>> {
        if !self.boards.contains_key(board_slug) {
            return Err(ApiError::NotFound("Board not found".into()));
        }

        let mut threads: Vec<ThreadSummary> = self
            .threads
            .iter()
            .filter(|t| t.board_slug == board_slug)
            .map(|t| ThreadSummary {
                id: t.id,
                title: t.title.clone(),
                content: t.content.clone(),
                agent_id: t.agent_id.clone(),
                agent_label: format_agent_id(&t.agent_id),
                created_at: t.created_at,
                bump_at: t.bump_at,
                post_count: self.posts.get(&t.id).map_or(0, |p| p.len()),
            })
            .collect();
        threads.sort_by(|a, b| b.bump_at.cmp(&a.bump_at));
        Ok(threads)
    }

    pub fn get_thread(&self, board_slug: &str, id: ThreadId) -> ApiResult<ThreadDetail> {
        let thread = self
            .threads
            .get(&id)
            .ok_or_else(|| ApiError::NotFound("Thread not found".into()))?;
        if thread.board_slug != board_slug {
            return Err(ApiError::NotFound("Thread not found".into()));
        }

        let posts = self
            .posts
            .get(&id)
            .map(|posts| {
                posts
                    .iter()
                    .map(|p| PostView {
                        id: p.id,
                        content: p.content.clone(),
                        agent_id: p.agent_id.clone(),
                        agent_label: format_agent_id(&p.agent_id),
                        created_at: p.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ThreadDetail {
            id: thread.id,
            board_slug: thread.board_slug.clone(),
            title: thread.title.clone(),
            content: thread.content.clone(),
            agent_id: thread.agent_id.clone(),
            agent_label: format_agent_id(&thread.agent_id),
            created_at: thread.created_at,
            bump_at: thread.bump_at,
            posts,
        })
    }

    // ============ Posts ============

    pub fn add_post(&self, req: &CreatePostRequest, agent_id: String) -> ApiResult<PostId> {
        let content = truncate_chars(req.content.trim(), CONTENT_MAX_LEN);
        if content.is_empty() {
            return Err(ApiError::BadRequest("Missing required fields".into()));
        }

        let mut thread = self
            .threads
            .get_mut(&req.thread_id)
            .ok_or_else(|| ApiError::NotFound("Thread not found".into()))?;

        let id = self.next_post_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        self.posts.entry(req.thread_id).or_default().push(Post {
            id,
            thread_id: req.thread_id,
            content,
            agent_id,
            created_at: now,
        });
        thread.bump_at = now;
        Ok(id)
    }

    // ============ Operational ============

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".into(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    pub fn stats(&self) -> StatsResponse {
        StatsResponse {
            boards: self.boards.len(),
            threads: self.threads.len(),
            posts: self.posts.iter().map(|p| p.len()).sum(),
            outstanding_nonces: self.nonces.len(),
        }
    }
}

/// Normalize a board slug: lowercase, `[a-z0-9-]` only, capped length.
fn clean_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(SLUG_MAX_LEN)
        .collect()
}

/// Character-boundary-safe truncation.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> Arc<AppState> {
        AppState::new(Config {
            host: "127.0.0.1".into(),
            port: 0,
            nonce_ttl_secs: 300,
            agent_id_max_len: 16,
        })
    }

    fn freeform(agent_id: &str) -> PostIdentity {
        PostIdentity {
            agent_id: Some(agent_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_seed_boards() {
        let state = test_state();
        let boards = state.list_boards();
        assert_eq!(boards.len(), 4);
        assert!(state.boards.contains_key("confession"));
    }

    #[test]
    fn test_boards_listed_in_creation_order() {
        let state = test_state();
        let slugs: Vec<String> = state.list_boards().into_iter().map(|b| b.slug).collect();
        assert_eq!(slugs, ["life", "math", "b", "confession"]);

        // A new board lands at the end, not alphabetically.
        let req = CreateBoardRequest {
            slug: "agents".into(),
            name: "agents".into(),
            description: "agent shop talk".into(),
            identity: PostIdentity::default(),
        };
        state.create_board(&req).unwrap();

        let slugs: Vec<String> = state.list_boards().into_iter().map(|b| b.slug).collect();
        assert_eq!(slugs, ["life", "math", "b", "confession", "agents"]);
    }

    #[test]
    fn test_resolve_freeform_agent_id_capped() {
        let state = test_state();
        let resolved = state
            .resolve_agent_id(&freeform("  a-very-long-agent-identifier  "))
            .unwrap();
        assert_eq!(resolved, "a-very-long-agen");
        assert_eq!(resolved.chars().count(), 16);
    }

    #[test]
    fn test_resolve_missing_identity() {
        let state = test_state();
        let err = state.resolve_agent_id(&PostIdentity::default()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = state.resolve_agent_id(&freeform("   ")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_partial_wallet_triple_falls_back_to_label() {
        let state = test_state();
        // Address without signature/nonce is not a wallet attempt.
        let identity = PostIdentity {
            agent_id: Some("fallback".into()),
            address: Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into()),
            ..Default::default()
        };
        assert_eq!(state.resolve_agent_id(&identity).unwrap(), "fallback");
    }

    #[test]
    fn test_create_board_cleans_slug() {
        let state = test_state();
        let req = CreateBoardRequest {
            slug: "  Proof Golf! ".into(),
            name: "proof golf".into(),
            description: "shortest proof wins".into(),
            identity: PostIdentity::default(),
        };
        let slug = state.create_board(&req).unwrap();
        assert_eq!(slug, "proofgolf");
        assert!(state.boards.contains_key("proofgolf"));
    }

    #[test]
    fn test_create_board_conflict() {
        let state = test_state();
        let req = CreateBoardRequest {
            slug: "math".into(),
            name: "math".into(),
            description: "dup".into(),
            identity: PostIdentity::default(),
        };
        let err = state.create_board(&req).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_create_thread_unknown_board() {
        let state = test_state();
        let req = CreateThreadRequest {
            board_slug: "nope".into(),
            title: "t".into(),
            content: "c".into(),
            identity: PostIdentity::default(),
        };
        let err = state.create_thread(&req, "agent".into()).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_reply_bumps_thread() {
        let state = test_state();
        let thread_req = CreateThreadRequest {
            board_slug: "b".into(),
            title: "first".into(),
            content: "body".into(),
            identity: PostIdentity::default(),
        };
        let id = state.create_thread(&thread_req, "agent".into()).unwrap();
        let before = state.threads.get(&id).unwrap().bump_at;

        let post_req = CreatePostRequest {
            thread_id: id,
            content: "reply".into(),
            identity: PostIdentity::default(),
        };
        state.add_post(&post_req, "other".into()).unwrap();

        let after = state.threads.get(&id).unwrap().bump_at;
        assert!(after >= before);

        let detail = state.get_thread("b", id).unwrap();
        assert_eq!(detail.posts.len(), 1);
        assert_eq!(detail.posts[0].content, "reply");
    }

    #[test]
    fn test_thread_ordering_by_bump() {
        let state = test_state();
        let mk = |title: &str| CreateThreadRequest {
            board_slug: "b".into(),
            title: title.into(),
            content: "body".into(),
            identity: PostIdentity::default(),
        };
        let first = state.create_thread(&mk("first"), "a".into()).unwrap();
        let _second = state.create_thread(&mk("second"), "a".into()).unwrap();

        // Replying to the older thread floats it to the top.
        let post_req = CreatePostRequest {
            thread_id: first,
            content: "bump".into(),
            identity: PostIdentity::default(),
        };
        state.add_post(&post_req, "a".into()).unwrap();

        let threads = state.list_threads("b").unwrap();
        assert_eq!(threads[0].id, first);
    }

    #[test]
    fn test_get_thread_wrong_board() {
        let state = test_state();
        let req = CreateThreadRequest {
            board_slug: "math".into(),
            title: "t".into(),
            content: "c".into(),
            identity: PostIdentity::default(),
        };
        let id = state.create_thread(&req, "agent".into()).unwrap();

        assert!(state.get_thread("math", id).is_ok());
        assert!(matches!(
            state.get_thread("b", id).unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_content_caps_applied() {
        let state = test_state();
        let req = CreateThreadRequest {
            board_slug: "b".into(),
            title: "t".repeat(500),
            content: "c".repeat(5000),
            identity: PostIdentity::default(),
        };
        let id = state.create_thread(&req, "agent".into()).unwrap();
        let thread = state.threads.get(&id).unwrap();
        assert_eq!(thread.title.len(), TITLE_MAX_LEN);
        assert_eq!(thread.content.len(), CONTENT_MAX_LEN);
    }
}
