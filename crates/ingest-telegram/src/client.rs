use std::ops::ControlFlow;

use grammers_client::{Client, Config, InitParams, Update};
use ingest_sessions::Credential;
use tracing::{instrument, warn};

use crate::error::{Result, TelegramError};
use crate::types::{DialogChat, IncomingMessage};

/// One chat-platform session for a single identity (C5/C6's "connect to the
/// chat platform" step). Wraps a `grammers_client::Client` and reduces its
/// update/message types down to the plain structs the rest of the pipeline
/// forwards onto the bus.
pub struct IdentityClient {
    client: Client,
    identity_id: String,
}

impl IdentityClient {
    /// Connects using a previously stored session blob, or a fresh session
    /// if `credential` is `None` (onboarding is out of scope here; an
    /// unauthorized fresh session is simply reported as such).
    #[instrument(skip(api_hash, credential), fields(identity_id))]
    pub async fn connect(
        identity_id: &str,
        api_id: i32,
        api_hash: &str,
        credential: Option<Credential>,
    ) -> Result<Self> {
        let session = match credential {
            Some(cred) => grammers_session::Session::load(cred.as_bytes())
                .map_err(|e| TelegramError::BadSession(e.to_string()))?,
            None => grammers_session::Session::new(),
        };

        let config = Config {
            session,
            api_id,
            api_hash: api_hash.to_owned(),
            params: InitParams::default(),
        };

        let client = Client::connect(config).await?;
        if !client.is_authorized().await? {
            return Err(TelegramError::NotAuthorized);
        }

        Ok(Self {
            client,
            identity_id: identity_id.to_owned(),
        })
    }

    pub fn identity_id(&self) -> &str {
        &self.identity_id
    }

    /// Serializes the current session state for persistence back through
    /// `ingest-sessions` (e.g. after a reconnect picks up a new auth key).
    pub fn session_bytes(&self) -> Result<Vec<u8>> {
        self.client
            .session()
            .save()
            .map_err(|e| TelegramError::BadSession(e.to_string()))
    }

    /// Every chat-id in this identity's dialog list — the eligibility signal
    /// C4's solver needs per identity.
    #[instrument(skip(self))]
    pub async fn dialog_chat_ids(&self) -> Result<Vec<DialogChat>> {
        let mut dialogs = self.client.iter_dialogs();
        let mut out = Vec::new();
        while let Some(dialog) = dialogs.next().await? {
            out.push(DialogChat {
                chat_id: dialog.chat().id(),
            });
        }
        Ok(out)
    }

    async fn resolve_chat(&self, chat_id: i64) -> Result<grammers_client::types::Chat> {
        let mut dialogs = self.client.iter_dialogs();
        while let Some(dialog) = dialogs.next().await? {
            if dialog.chat().id() == chat_id {
                return Ok(dialog.chat().clone());
            }
        }
        Err(TelegramError::ChatNotFound(chat_id))
    }

    /// Blocks on the next platform update and reduces it to a listener
    /// event; non-message updates (edits, deletes, raw TL) are reported as
    /// `ListenerEvent::Other` and dropped by the caller.
    pub async fn next_event(&self) -> Result<ListenerEvent> {
        match self.client.next_update().await? {
            Update::NewMessage(message) if !message.outgoing() => {
                Ok(ListenerEvent::NewMessage(message_to_incoming(&message)))
            }
            _ => Ok(ListenerEvent::Other),
        }
    }

    /// Walks `chat_id`'s history newest-to-oldest, invoking `on_message` for
    /// each message. The callback controls iteration by returning
    /// `ControlFlow::Break` once it has seen the stored watermark or crossed
    /// the days-back horizon (C6 owns that stopping rule, not this client).
    #[instrument(skip(self, on_message), fields(identity_id = %self.identity_id, chat_id))]
    pub async fn backfill_history<F>(&self, chat_id: i64, mut on_message: F) -> Result<u64>
    where
        F: FnMut(IncomingMessage) -> ControlFlow<()>,
    {
        let chat = self.resolve_chat(chat_id).await?;
        let mut iter = self.client.iter_messages(&chat);
        let mut yielded = 0u64;

        loop {
            match iter.next().await {
                Ok(Some(message)) => {
                    yielded += 1;
                    if on_message(message_to_incoming(&message)).is_break() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(chat_id, error = %e, "history iteration failed");
                    return Err(e.into());
                }
            }
        }

        Ok(yielded)
    }
}

/// What the listener got off the update stream, reduced to the two cases
/// C5 actually cares about.
pub enum ListenerEvent {
    NewMessage(IncomingMessage),
    Other,
}

fn message_to_incoming(message: &grammers_client::types::Message) -> IncomingMessage {
    let chat = message.chat();
    let sender_username = message
        .sender()
        .and_then(|p| p.username().map(str::to_owned));
    let chat_username = chat.username().map(str::to_owned);
    let sender_id = message.sender().map(|p| p.id());

    IncomingMessage {
        chat_id: chat.id(),
        message_id: message.id(),
        text: message.text().to_owned(),
        date: message.date(),
        sender_id,
        sender_username,
        chat_username,
    }
}
