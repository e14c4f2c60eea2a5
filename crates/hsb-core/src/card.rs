//! Card records returned by the Hearthstone API.
//!
//! The API returns loosely-schemaed JSON objects whose keys vary by card
//! family. We keep the attributes as an ordered list (API order) tagged with
//! a variant inferred once at construction, instead of a bag of dynamic
//! attributes.

use std::fmt;

use serde_json::Value;

use crate::{errors::Error, Result};

/// Which family of record the API handed back, inferred from the keys
/// present. Fixed at construction, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    Collectible,
    NonCollectible,
    Cardback,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardKind::Collectible => "collectible card",
            CardKind::NonCollectible => "non-collectible card",
            CardKind::Cardback => "cardback",
        };
        f.write_str(s)
    }
}

/// One card as returned by the API: an immutable, ordered attribute list
/// plus the inferred [`CardKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct CardRecord {
    kind: CardKind,
    fields: Vec<(String, Value)>,
}

impl CardRecord {
    /// Build a record from one element of an API response array.
    ///
    /// Fails if the element is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::External(format!(
                "card record is not a JSON object: {value}"
            )));
        };

        let fields: Vec<(String, Value)> = map.into_iter().collect();
        let kind = infer_kind(&fields);
        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    /// Attributes in the order the API returned them.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Scalar attribute rendered as display text (strings unquoted).
    pub fn attr_str(&self, key: &str) -> Option<String> {
        self.attr(key).map(display_value)
    }

    pub fn name(&self) -> Option<&str> {
        self.attr("name").and_then(Value::as_str)
    }

    pub fn img(&self) -> Option<&str> {
        self.attr("img").and_then(Value::as_str)
    }

    /// The API's canonical id for this record, preferring the database file
    /// id (`dbfId`) under which ambiguous results are cached. Display names
    /// are not unique; these ids are.
    pub fn stable_id(&self) -> Option<String> {
        self.attr_str("dbfId")
            .or_else(|| self.attr_str("cardId"))
            .or_else(|| self.attr_str("cardBackId"))
    }

    /// A record is complete when every attribute holds a truthy value.
    /// The panel formatter refuses incomplete records.
    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(|(_, v)| is_truthy(v))
    }

    /// Rough heap footprint, used for the cache's memory budget.
    pub fn approx_size(&self) -> usize {
        self.fields
            .iter()
            .map(|(k, v)| {
                k.len()
                    + serde_json::to_string(v)
                        .map(|s| s.len())
                        .unwrap_or(16)
            })
            .sum()
    }
}

impl fmt::Display for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}: {name}", self.kind),
            None => f.write_str("invalid card"),
        }
    }
}

/// Python-style truthiness over JSON: null, false, 0, "", [] and {} are falsy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Scalar JSON value as display text: strings without quotes, everything
/// else via its JSON form.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn infer_kind(fields: &[(String, Value)]) -> CardKind {
    if fields.iter().any(|(k, _)| k == "cardBackId") {
        return CardKind::Cardback;
    }
    let collectible = fields
        .iter()
        .find(|(k, _)| k == "collectible")
        .map(|(_, v)| is_truthy(v))
        .unwrap_or(false);
    if collectible {
        CardKind::Collectible
    } else {
        CardKind::NonCollectible
    }
}

/// Ordered candidates returned when one query matched more than one card.
#[derive(Clone, Debug, PartialEq)]
pub struct MultipleCards {
    cards: Vec<CardRecord>,
}

impl MultipleCards {
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let cards = values
            .into_iter()
            .map(CardRecord::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { cards })
    }

    /// First candidate whose display name matches exactly. Names are not
    /// unique, hence "first".
    pub fn by_name(&self, name: &str) -> Option<&CardRecord> {
        self.cards.iter().find(|c| c.name() == Some(name))
    }

    pub fn by_position(&self, index: usize) -> Option<&CardRecord> {
        self.cards.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRecord> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl<'a> IntoIterator for &'a MultipleCards {
    type Item = &'a CardRecord;
    type IntoIter = std::slice::Iter<'a, CardRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

/// What one fetch resolved to: exactly one record, or an ambiguous set.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Single(CardRecord),
    Multiple(MultipleCards),
}
