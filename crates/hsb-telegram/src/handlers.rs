//! Message handler: validity check, parse, dispatch, reply.

use std::sync::Arc;

use teloxide::prelude::*;

use hsb_core::{
    dispatch::dispatch_requests,
    domain::{ChatId, RequestId, UserId},
    format::Reply,
    parser::{is_valid_request, parse_message},
    ports::MessagingPort,
};

use crate::router::AppState;
use crate::TelegramMessenger;

const UPSTREAM_ERROR_REPLY: &str =
    "The card service is having trouble right now. Try again in a bit.";

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    // Never answer our own messages.
    if state.me.map(|id| id == UserId(user.id.0)).unwrap_or(false) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if !is_valid_request(text) {
        // Ordinary chat is ignored silently; malformed bracket syntax is at
        // least worth a debug line.
        if text.contains(['[', ']', '{', '}']) {
            tracing::debug!(chat_id = msg.chat.id.0, "unbalanced brackets, ignoring");
        }
        return Ok(());
    }

    let request_id = RequestId::new();
    tracing::info!(%request_id, chat_id = msg.chat.id.0, "fetch message received");

    let requests = match parse_message(text) {
        Ok(requests) => requests,
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "nothing to fetch");
            return Ok(());
        }
    };

    let chat_id = ChatId(msg.chat.id.0);
    let messenger = TelegramMessenger::new(bot);

    let replies =
        match dispatch_requests(state.source.as_ref(), &state.cache, &requests, request_id).await {
            Ok(replies) => replies,
            Err(e) => {
                // Upstream trouble: degrade to a text reply instead of silence.
                tracing::error!(%request_id, error = %e, "dispatch failed");
                if let Err(send_err) = messenger.send_text(chat_id, UPSTREAM_ERROR_REPLY).await {
                    tracing::error!(%request_id, error = %send_err, "failed to send error reply");
                }
                return Ok(());
            }
        };

    for reply in replies {
        let sent = match &reply {
            Reply::Text(text) => messenger.send_text(chat_id, text).await,
            Reply::Panel(panel) => messenger.send_panel(chat_id, panel).await,
        };
        if let Err(e) = sent {
            tracing::error!(%request_id, error = %e, "failed to send reply");
        }
    }

    Ok(())
}
