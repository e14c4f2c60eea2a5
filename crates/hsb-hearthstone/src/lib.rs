//! Hearthstone API adapter (RapidAPI, reqwest).
//!
//! Implements the `hsb-core` CardSource port. Every query-taking operation
//! fails fast with `InvalidArgument` on an empty argument, before any
//! network call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use hsb_core::{
    card::FetchOutcome,
    errors::Error,
    ports::CardSource,
    Result,
};

mod response;

pub use response::{parse_card_result, parse_cardback_result};

#[derive(Clone, Debug)]
pub struct HearthstoneClient {
    http: reqwest::Client,
    base_url: Url,
    host: String,
    key: String,
}

impl HearthstoneClient {
    pub fn new(
        base_url: &str,
        host: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base url '{base_url}': {e}")))?;

        Ok(Self {
            http,
            base_url,
            host: host.into(),
            key: key.into(),
        })
    }

    /// `/cards/{name}` — exact name or dbfId.
    pub async fn fetch_card_by_name(&self, name: &str) -> Result<FetchOutcome> {
        require_arg(name, "name")?;
        parse_card_result(self.get_json(&["cards", name]).await?)
    }

    /// `/cards/search/{q}` — partial name search. This is the operation the
    /// message dispatcher uses.
    pub async fn fetch_card_by_partial_name(&self, partial_name: &str) -> Result<FetchOutcome> {
        require_arg(partial_name, "partial_name")?;
        parse_card_result(self.get_json(&["cards", "search", partial_name]).await?)
    }

    /// `/cards/classes/{class}` — e.g. `Mage`.
    pub async fn fetch_cards_by_class(&self, class: &str) -> Result<FetchOutcome> {
        require_arg(class, "class")?;
        parse_card_result(self.get_json(&["cards", "classes", class]).await?)
    }

    /// `/cards/races/{race}` — e.g. `Mech`.
    pub async fn fetch_cards_by_race(&self, race: &str) -> Result<FetchOutcome> {
        require_arg(race, "race")?;
        parse_card_result(self.get_json(&["cards", "races", race]).await?)
    }

    /// `/cards/sets/{set}` — e.g. `Knights of the Frozen Throne`.
    pub async fn fetch_card_set(&self, set: &str) -> Result<FetchOutcome> {
        require_arg(set, "set")?;
        parse_card_result(self.get_json(&["cards", "sets", set]).await?)
    }

    /// `/cards/qualities/{quality}` — e.g. `Legendary`.
    pub async fn fetch_cards_by_quality(&self, quality: &str) -> Result<FetchOutcome> {
        require_arg(quality, "quality")?;
        parse_card_result(self.get_json(&["cards", "qualities", quality]).await?)
    }

    /// `/cards/factions/{faction}` — e.g. `Horde`.
    pub async fn fetch_cards_by_faction(&self, faction: &str) -> Result<FetchOutcome> {
        require_arg(faction, "faction")?;
        parse_card_result(self.get_json(&["cards", "factions", faction]).await?)
    }

    /// `/cards/types/{type}` — e.g. `Spell`.
    pub async fn fetch_cards_by_type(&self, card_type: &str) -> Result<FetchOutcome> {
        require_arg(card_type, "card_type")?;
        parse_card_result(self.get_json(&["cards", "types", card_type]).await?)
    }

    /// `/cards` — the full card dump. Large; callers should cache.
    pub async fn fetch_all_cards(&self) -> Result<FetchOutcome> {
        parse_card_result(self.get_json(&["cards"]).await?)
    }

    /// `/cardbacks`.
    pub async fn fetch_cardbacks(&self) -> Result<FetchOutcome> {
        parse_cardback_result(self.get_json(&["cardbacks"]).await?)
    }

    /// `/info` — patch, classes, sets etc. Raw JSON, no card parsing.
    pub async fn fetch_info(&self) -> Result<Value> {
        self.get_json(&["info"]).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("API base url cannot be a base".to_string()))?
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        tracing::debug!(path = url.path(), "card API request");

        let resp = self
            .http
            .get(url.clone())
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", &self.key)
            .send()
            .await
            .map_err(|e| Error::External(format!("request to {} failed: {e}", url.path())))?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(Error::ServerError {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("no data at {}", url.path())));
        }
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        resp.json()
            .await
            .map_err(|e| Error::External(format!("invalid json from {}: {e}", url.path())))
    }
}

#[async_trait]
impl CardSource for HearthstoneClient {
    async fn fetch_by_partial_name(&self, query: &str) -> Result<FetchOutcome> {
        self.fetch_card_by_partial_name(query).await
    }
}

fn require_arg(arg: &str, name: &str) -> Result<()> {
    if arg.trim().is_empty() {
        return Err(Error::InvalidArgument(format!(
            "'{name}' argument must not be empty"
        )));
    }
    Ok(())
}
