//! Ports (traits) implemented by the adapter crates.

use async_trait::async_trait;

use crate::{
    card::FetchOutcome,
    domain::ChatId,
    format::CardPanel,
    Result,
};

/// Where cards come from. The Hearthstone HTTP adapter is the production
/// implementation; tests substitute stubs.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Resolve a query term (partial name or stable identifier) to one card
    /// or an ambiguous set.
    ///
    /// Errors follow the dispatch taxonomy: `InvalidArgument` for an empty
    /// query (no network call made), `NotFound` when the API has no match,
    /// `ServerError`/`Http` for upstream failures.
    async fn fetch_by_partial_name(&self, query: &str) -> Result<FetchOutcome>;
}

/// Outbound side of the chat platform: replies go to the channel the
/// triggering message arrived on.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
    async fn send_panel(&self, chat_id: ChatId, panel: &CardPanel) -> Result<()>;
}
