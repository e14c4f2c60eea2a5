//! API response payloads → card model.

use serde_json::Value;

use hsb_core::{
    card::{is_truthy, CardRecord, FetchOutcome, MultipleCards},
    errors::Error,
    Result,
};

/// Parse a card-endpoint payload.
///
/// The API reports "no data" two ways: a plain 404 (handled at the HTTP
/// layer) and a 200 whose body is `{"error": ..., "message": ...}`; both map
/// to `NotFound`. A proper payload is an array: more than one element is an
/// ambiguous result, exactly one is a single record.
pub fn parse_card_result(payload: Value) -> Result<FetchOutcome> {
    parse_result(payload, "no cards found")
}

/// Parse a cardback-endpoint payload. Same shape, different "no data"
/// message.
pub fn parse_cardback_result(payload: Value) -> Result<FetchOutcome> {
    parse_result(payload, "no cardbacks found")
}

fn parse_result(payload: Value, not_found: &str) -> Result<FetchOutcome> {
    if let Some(obj) = payload.as_object() {
        if obj.get("error").map(is_truthy).unwrap_or(false) {
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(not_found)
                .to_string();
            return Err(Error::NotFound(message));
        }
    }

    let Value::Array(items) = payload else {
        return Err(Error::External(format!(
            "unexpected card API payload shape: {payload}"
        )));
    };

    match items.len() {
        0 => Err(Error::NotFound(not_found.to_string())),
        1 => {
            let item = items.into_iter().next().expect("len checked");
            CardRecord::from_value(item).map(FetchOutcome::Single)
        }
        _ => MultipleCards::from_values(items).map(FetchOutcome::Multiple),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsb_core::card::CardKind;
    use serde_json::json;

    #[test]
    fn two_or_more_elements_parse_to_multiple_cards() {
        let outcome = parse_card_result(json!([
            {"cardId": "0", "collectible": 1, "name": "A"},
            {"cardId": "1", "name": "B"},
        ]))
        .unwrap();

        let FetchOutcome::Multiple(cards) = outcome else {
            panic!("expected ambiguous result");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards.by_position(0).unwrap().kind(), CardKind::Collectible);
    }

    #[test]
    fn single_element_parses_to_one_record_with_inferred_kind() {
        let outcome =
            parse_card_result(json!([{"cardId": "0", "collectible": 1, "name": "A"}])).unwrap();
        let FetchOutcome::Single(card) = outcome else {
            panic!("expected single record");
        };
        assert_eq!(card.kind(), CardKind::Collectible);

        let outcome = parse_card_result(json!([{"cardId": "0", "name": "A"}])).unwrap();
        let FetchOutcome::Single(card) = outcome else {
            panic!("expected single record");
        };
        assert_eq!(card.kind(), CardKind::NonCollectible);
    }

    #[test]
    fn cardback_payloads_infer_cardback_kind() {
        let outcome =
            parse_cardback_result(json!([{"cardBackId": "5", "name": "Classic"}])).unwrap();
        let FetchOutcome::Single(card) = outcome else {
            panic!("expected single record");
        };
        assert_eq!(card.kind(), CardKind::Cardback);
    }

    #[test]
    fn error_body_maps_to_not_found() {
        let err = parse_card_result(json!({"error": 404, "message": "Card not found."}));
        assert!(matches!(err, Err(Error::NotFound(msg)) if msg == "Card not found."));
    }

    #[test]
    fn empty_array_maps_to_not_found() {
        assert!(matches!(
            parse_card_result(json!([])),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn scalar_payload_is_an_external_error() {
        assert!(matches!(
            parse_card_result(json!("nope")),
            Err(Error::External(_))
        ));
    }
}
