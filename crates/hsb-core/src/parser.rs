//! Turns free-form chat text into typed fetch requests.
//!
//! `[...]` spans become card lookups (image reply), `{...}` spans become
//! metadata lookups (panel reply). Span contents are pipe-separated query
//! terms.

use std::collections::BTreeSet;

use regex::Regex;

use crate::{errors::Error, util::title_case, Result};

/// Which API operation and formatter apply to a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// `[...]` — reply with the card's image URL.
    CardLookup,
    /// `{...}` — reply with a metadata panel.
    MetadataLookup,
}

/// One typed fetch request extracted from a message. `items` is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: RequestKind,
    pub items: BTreeSet<String>,
}

/// Whether the text is a candidate fetch message: every `]` or `}` closes a
/// matching, correctly nested opener, and at least one bracket pair exists.
pub fn is_valid_request(text: &str) -> bool {
    let mut stack = Vec::new();
    let mut openers = 0usize;

    for c in text.chars() {
        match c {
            '[' | '{' => {
                stack.push(c);
                openers += 1;
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            _ => {}
        }
    }

    stack.is_empty() && openers > 0
}

/// Extract every fetch request from the text.
///
/// Two independent lazy scans, one per bracket kind. Nested brackets of the
/// same kind are not specially detected: the first closing bracket found
/// ends the span ("first match wins"), which is surprising for input like
/// `[[Reno]]` but is the documented behavior, not a bug to fix here.
///
/// Terms are trimmed, title-cased and de-duplicated; terms that normalize
/// to the empty string are discarded. Returns [`Error::NoValidRequests`]
/// when no span yields any term, so callers can ignore ordinary chat
/// without treating it as a failure.
pub fn parse_message(text: &str) -> Result<Vec<FetchRequest>> {
    let spans = [
        (RequestKind::CardLookup, r"\[(.*?)\]"),
        (RequestKind::MetadataLookup, r"\{(.*?)\}"),
    ];

    let mut requests = Vec::new();
    for (kind, pattern) in spans {
        let re = Regex::new(pattern).expect("valid span regex");

        let mut items = BTreeSet::new();
        for cap in re.captures_iter(text) {
            for term in cap[1].split('|') {
                let term = title_case(term.trim());
                if !term.is_empty() {
                    items.insert(term);
                }
            }
        }

        if !items.is_empty() {
            requests.push(FetchRequest { kind, items });
        }
    }

    if requests.is_empty() {
        return Err(Error::NoValidRequests);
    }
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(terms: &[&str]) -> BTreeSet<String> {
        terms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn balanced_brackets_are_valid() {
        assert!(is_valid_request("[Reno]"));
        assert!(is_valid_request("look at [Reno] and {Ysera}"));
        assert!(is_valid_request("{a}[b]{c}"));
        assert!(is_valid_request("[[Reno]]"));
    }

    #[test]
    fn lone_or_mismatched_closers_are_invalid() {
        assert!(!is_valid_request("]"));
        assert!(!is_valid_request("}"));
        assert!(!is_valid_request("[{]}"));
        assert!(!is_valid_request("oops ] here"));
    }

    #[test]
    fn unclosed_openers_are_invalid() {
        assert!(!is_valid_request("[Reno"));
        assert!(!is_valid_request("{Reno"));
    }

    #[test]
    fn text_without_brackets_is_invalid() {
        assert!(!is_valid_request("just chatting"));
        assert!(!is_valid_request(""));
    }

    #[test]
    fn parses_both_bracket_kinds_independently() {
        let requests = parse_message("[Reno] and {Reno}").unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].kind, RequestKind::CardLookup);
        assert_eq!(requests[0].items, items(&["Reno"]));
        assert_eq!(requests[1].kind, RequestKind::MetadataLookup);
        assert_eq!(requests[1].items, items(&["Reno"]));
    }

    #[test]
    fn terms_are_trimmed_title_cased_and_deduplicated() {
        let requests = parse_message("[A|b | C]").unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].items, items(&["A", "B", "C"]));

        let requests = parse_message("[reno|RENO| Reno ]").unwrap();
        assert_eq!(requests[0].items, items(&["Reno"]));
    }

    #[test]
    fn multiple_spans_of_one_kind_merge_into_one_request() {
        let requests = parse_message("[Reno] vs [Ysera]").unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].items, items(&["Reno", "Ysera"]));
    }

    #[test]
    fn plain_text_yields_no_valid_requests_error() {
        assert!(matches!(
            parse_message("just chatting"),
            Err(Error::NoValidRequests)
        ));
    }

    #[test]
    fn empty_spans_are_discarded() {
        assert!(matches!(parse_message("[] { }"), Err(Error::NoValidRequests)));
        let requests = parse_message("[|Reno|]").unwrap();
        assert_eq!(requests[0].items, items(&["Reno"]));
    }

    #[test]
    fn nested_same_kind_brackets_use_first_closing_bracket() {
        // Documented first-match-wins scan: the span of "[[Reno]]" is "[Reno".
        let requests = parse_message("[[Reno]]").unwrap();
        assert_eq!(requests[0].items, items(&["[Reno"]));
    }
}
