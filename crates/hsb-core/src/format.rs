//! Display construction for resolved cards. Pure, no I/O.

use serde_json::Value;

use crate::{
    card::{display_value, CardRecord},
    errors::Error,
    util::title_case,
    Result,
};

/// One field of a metadata panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelField {
    pub name: String,
    pub value: String,
}

/// Structured display payload: one field per card attribute plus a primary
/// image. The chat adapter decides how to render it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardPanel {
    pub fields: Vec<PanelField>,
    pub image_url: String,
}

/// What the bot sends back for one resolved item.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Text(String),
    Panel(CardPanel),
}

/// Plain formatter: the card's image URL as text.
pub fn format_card_image(card: &CardRecord) -> Result<Reply> {
    let img = card
        .img()
        .ok_or_else(|| Error::MissingAttribute(format!("no 'img' found for {card}")))?;
    Ok(Reply::Text(img.to_string()))
}

/// Panel formatter: every attribute as a field, in API order.
///
/// Refuses records with any falsy attribute so the panel never shows holes.
/// Array-valued attributes (e.g. `mechanics`) render as a comma-joined list
/// of each element's `name` sub-field.
pub fn format_card_panel(card: &CardRecord) -> Result<Reply> {
    if !card.is_complete() {
        return Err(Error::MissingAttribute(format!(
            "missing metadata for {card}"
        )));
    }

    let image_url = card
        .img()
        .ok_or_else(|| Error::MissingAttribute(format!("no 'img' found for {card}")))?
        .to_string();

    let fields = card
        .fields()
        .iter()
        .map(|(name, value)| PanelField {
            name: title_case(name),
            value: field_value(value),
        })
        .collect();

    Ok(Reply::Panel(CardPanel { fields, image_url }))
}

fn field_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.get("name")
                    .map(display_value)
                    .unwrap_or_else(|| display_value(item))
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => display_value(other),
    }
}

/// Escape HTML special characters for platforms with HTML parse modes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
