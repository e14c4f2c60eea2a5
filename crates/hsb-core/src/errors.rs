/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the dispatch
/// layer can tell "bad query" (skip the item) from "upstream is broken"
/// (propagate) without downcasting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Bad caller input (e.g. empty query). Raised before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The API had no matching record for the query.
    #[error("no card found: {0}")]
    NotFound(String),

    /// 5xx from the card API. Indicates upstream trouble, never swallowed.
    #[error("card API server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-success HTTP status from the card API.
    #[error("card API http error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// A formatter required an attribute the record does not carry.
    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    /// The message contained no bracket spans. Ordinary chat, not a failure.
    #[error("no fetch requests found in message")]
    NoValidRequests,

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
