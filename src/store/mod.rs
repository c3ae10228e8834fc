//! Conversation store
//!
//! Users, sessions and their append-only message history, kept in
//! PostgreSQL. The relay only sees the [`ChatStore`] trait, so tests can swap
//! in an in-memory implementation.

pub mod client;
pub mod connection;
pub mod error;
pub mod types;

use async_trait::async_trait;
use uuid::Uuid;

use crate::llm::Message;

// Re-export main types for convenience
pub use client::PgChatStore;
pub use connection::StoreConfig;
pub use error::{Error, Result};
pub use types::{can_access, Session, UserProfile};

/// Title given to sessions created implicitly by a chat turn
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Persistence operations the relay and HTTP layer depend on
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Create or refresh a user from identity claims, returning its id
    async fn upsert_user(&self, profile: &UserProfile) -> Result<Uuid>;

    /// Start a new session; `owner` is `None` for anonymous sessions
    async fn create_session(&self, owner: Option<Uuid>, title: &str) -> Result<Session>;

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Owner of a session, or `NotFoundError` when it does not exist
    async fn session_owner(&self, session_id: Uuid) -> Result<Option<Uuid>> {
        self.get_session(session_id)
            .await?
            .map(|session| session.owner)
            .ok_or_else(|| Error::NotFoundError(format!("session {}", session_id)))
    }

    /// Append one message to the end of a session's history
    async fn append_message(&self, session_id: Uuid, message: &Message) -> Result<()>;

    /// Messages of a session in insertion order, at most `limit` of them
    async fn load_history(&self, session_id: Uuid, limit: Option<i64>) -> Result<Vec<Message>>;
}
