//! Telegram adapter (teloxide).
//!
//! Implements the `hsb-core` MessagingPort over the Telegram Bot API and
//! hosts the polling router + message handler.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

pub mod handlers;
pub mod router;

use hsb_core::{
    domain::ChatId,
    errors::Error,
    format::{escape_html, CardPanel},
    ports::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_panel(&self, chat_id: ChatId, panel: &CardPanel) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(chat_id), render_panel_html(panel))
            .parse_mode(ParseMode::Html)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

/// Render a card panel as Telegram HTML: bolded field names, escaped values,
/// and the card image attached via a zero-width link (Telegram previews the
/// first link in the message).
pub fn render_panel_html(panel: &CardPanel) -> String {
    let mut out = String::new();
    for field in &panel.fields {
        out.push_str("<b>");
        out.push_str(&escape_html(&field.name));
        out.push_str("</b>: ");
        out.push_str(&escape_html(&field.value));
        out.push('\n');
    }
    out.push_str(&format!(
        "<a href=\"{}\">&#8205;</a>",
        escape_html(&panel.image_url)
    ));
    out
}
