//! Per-item fetch loop: cache lookup, network fetch, formatting.

use crate::{
    cache::CardCache,
    card::{CardRecord, FetchOutcome, MultipleCards},
    domain::RequestId,
    errors::Error,
    format::{format_card_image, format_card_panel, Reply},
    parser::{FetchRequest, RequestKind},
    ports::CardSource,
    Result,
};

/// Produce one reply per resolvable item across all requests.
///
/// Per item: cache lookup by the literal term, then a network fetch on miss.
/// `NotFound` and `InvalidArgument` skip the item; upstream failures
/// (`ServerError`, `Http`) abort and propagate, since they indicate systemic
/// trouble rather than a bad query. Formatter failures degrade to a text
/// reply so the user always hears back about an item that resolved.
pub async fn dispatch_requests(
    source: &dyn CardSource,
    cache: &CardCache,
    requests: &[FetchRequest],
    request_id: RequestId,
) -> Result<Vec<Reply>> {
    let mut replies = Vec::new();

    for request in requests {
        tracing::info!(
            %request_id,
            kind = ?request.kind,
            items = request.items.len(),
            "executing fetch request"
        );

        for item in &request.items {
            let outcome = match cache.get(item).await {
                Some(card) => {
                    tracing::info!(%request_id, item = %item, "cache hit");
                    FetchOutcome::Single(card)
                }
                None => {
                    tracing::info!(%request_id, item = %item, "fetching");
                    match source.fetch_by_partial_name(item).await {
                        Ok(outcome) => outcome,
                        Err(e @ (Error::NotFound(_) | Error::InvalidArgument(_))) => {
                            tracing::warn!(%request_id, item = %item, error = %e, "skipping item");
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
            };

            let reply = match outcome {
                FetchOutcome::Multiple(cards) => {
                    disambiguation_reply(cache, &cards, item, request_id).await
                }
                FetchOutcome::Single(card) => single_card_reply(&card, request, item, request_id),
            };
            replies.push(reply);
        }
    }

    Ok(replies)
}

/// Cache every candidate under its stable identifier, then list
/// `name: identifier` pairs in the order the API returned them. A follow-up
/// request for one of the listed identifiers is then a cache hit.
async fn disambiguation_reply(
    cache: &CardCache,
    cards: &MultipleCards,
    item: &str,
    request_id: RequestId,
) -> Reply {
    tracing::info!(%request_id, item = %item, candidates = cards.len(), "multiple results");

    let mut lines = Vec::with_capacity(cards.len());
    for card in cards {
        let id = card.stable_id().unwrap_or_default();
        if !id.is_empty() {
            cache.insert(id.clone(), card.clone()).await;
        }
        lines.push(format!("{}: {id}", card.name().unwrap_or("<unnamed>")));
    }

    Reply::Text(format!(
        "Found more than one result for '{item}': \n{}",
        lines.join("\n")
    ))
}

fn single_card_reply(
    card: &CardRecord,
    request: &FetchRequest,
    item: &str,
    request_id: RequestId,
) -> Reply {
    let formatted = match request.kind {
        RequestKind::CardLookup => format_card_image(card),
        RequestKind::MetadataLookup => format_card_panel(card),
    };

    match formatted {
        Ok(reply) => {
            tracing::info!(%request_id, item = %item, card = %card, "fetch successful");
            reply
        }
        Err(e) => {
            tracing::warn!(%request_id, item = %item, error = %e, "formatting failed");
            Reply::Text(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::card::CardRecord;

    struct StubSource {
        outcome: Box<dyn Fn(&str) -> Result<FetchOutcome> + Send + Sync>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(outcome: impl Fn(&str) -> Result<FetchOutcome> + Send + Sync + 'static) -> Self {
            Self {
                outcome: Box::new(outcome),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CardSource for StubSource {
        async fn fetch_by_partial_name(&self, query: &str) -> Result<FetchOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)(query)
        }
    }

    fn cache() -> CardCache {
        CardCache::new(64 * 1024, Duration::from_secs(600))
    }

    fn request(kind: RequestKind, terms: &[&str]) -> FetchRequest {
        FetchRequest {
            kind,
            items: terms.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    fn ambiguous() -> FetchOutcome {
        FetchOutcome::Multiple(
            MultipleCards::from_values(vec![
                json!({"name": "X", "dbfId": 1, "cardId": "a", "img": "http://img/x.png"}),
                json!({"name": "Y", "dbfId": 2, "cardId": "b", "img": "http://img/y.png"}),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn ambiguous_results_are_listed_and_cached_by_identifier() {
        let source = StubSource::new(|_| Ok(ambiguous()));
        let cache = cache();
        let id = RequestId::new();

        let replies = dispatch_requests(
            &source,
            &cache,
            &[request(RequestKind::CardLookup, &["Reno"])],
            id,
        )
        .await
        .unwrap();

        assert_eq!(
            replies,
            vec![Reply::Text(
                "Found more than one result for 'Reno': \nX: 1\nY: 2".to_string()
            )]
        );
        assert_eq!(cache.get("1").await.unwrap().name(), Some("X"));
        assert_eq!(cache.get("2").await.unwrap().name(), Some("Y"));

        // A follow-up lookup by identifier is a cache hit: no second fetch.
        let replies = dispatch_requests(
            &source,
            &cache,
            &[request(RequestKind::CardLookup, &["1"])],
            id,
        )
        .await
        .unwrap();
        assert_eq!(replies, vec![Reply::Text("http://img/x.png".to_string())]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn not_found_items_are_skipped_not_fatal() {
        let source = StubSource::new(|query| {
            if query == "Ghost" {
                Err(Error::NotFound("no card".into()))
            } else {
                Ok(FetchOutcome::Single(
                    CardRecord::from_value(
                        json!({"name": "Reno", "cardId": "a", "img": "http://img/reno.png"}),
                    )
                    .unwrap(),
                ))
            }
        });
        let cache = cache();

        let replies = dispatch_requests(
            &source,
            &cache,
            &[request(RequestKind::CardLookup, &["Ghost", "Reno"])],
            RequestId::new(),
        )
        .await
        .unwrap();

        assert_eq!(replies, vec![Reply::Text("http://img/reno.png".to_string())]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn server_errors_propagate() {
        let source = StubSource::new(|_| {
            Err(Error::ServerError {
                status: 503,
                message: "unavailable".into(),
            })
        });

        let result = dispatch_requests(
            &source,
            &cache(),
            &[request(RequestKind::CardLookup, &["Reno"])],
            RequestId::new(),
        )
        .await;

        assert!(matches!(result, Err(Error::ServerError { status: 503, .. })));
    }

    #[tokio::test]
    async fn formatter_failure_degrades_to_text_reply() {
        // Metadata lookup of a record with a falsy attribute.
        let source = StubSource::new(|_| {
            Ok(FetchOutcome::Single(
                CardRecord::from_value(json!({"name": "Reno", "text": "", "img": "http://i"}))
                    .unwrap(),
            ))
        });

        let replies = dispatch_requests(
            &source,
            &cache(),
            &[request(RequestKind::MetadataLookup, &["Reno"])],
            RequestId::new(),
        )
        .await
        .unwrap();

        assert_eq!(replies.len(), 1);
        let Reply::Text(text) = &replies[0] else {
            panic!("expected degraded text reply");
        };
        assert!(text.contains("missing"));
    }

    #[tokio::test]
    async fn single_results_are_not_cached_under_the_query_term() {
        let source = StubSource::new(|_| {
            Ok(FetchOutcome::Single(
                CardRecord::from_value(
                    json!({"name": "Reno", "cardId": "a", "img": "http://img/reno.png"}),
                )
                .unwrap(),
            ))
        });
        let cache = cache();

        for _ in 0..2 {
            dispatch_requests(
                &source,
                &cache,
                &[request(RequestKind::CardLookup, &["Reno"])],
                RequestId::new(),
            )
            .await
            .unwrap();
        }

        // Only ambiguous resolutions populate the cache.
        assert_eq!(source.calls(), 2);
        assert!(cache.is_empty().await);
    }
}
