use std::collections::HashMap;
use std::sync::Arc;

use biasbuster_api::ChatRequest;
use biasbuster_api_client::ApiError;
use biasbuster_core::{ChatSummary, Conversation, Message, Model};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::attachment::AttachmentStager;
use crate::backend::{ChatBackend, TurnReply};
use crate::error::ChatError;
use crate::history::HistoryCache;

/// Where the current turn is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TurnState {
    #[default]
    Idle,
    Sending {
        chat_id: String,
    },
    Settled,
    RolledBack,
}

/// A turn whose user message has been inserted but whose reply has not
/// been applied yet.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub chat_id: String,
    /// Message count before the optimistic insert; rollback restores it.
    pub snapshot_len: usize,
    pub message_id: String,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Nothing to send: no text and no staged attachment.
    Skipped,
    /// The assistant message that was appended.
    Settled(Message),
    /// The reply arrived after the user had left its chat.
    Discarded,
}

/// Owns the active conversation and runs the send/receive protocol.
///
/// Every mutation happens on `&mut self` after the awaited call returns,
/// so a turn's optimistic insert always precedes its settle or rollback.
pub struct Controller {
    backend: Arc<dyn ChatBackend>,
    conversation: Conversation,
    history: HistoryCache,
    attachment: AttachmentStager,
    model: Model,
    input: String,
    turn: TurnState,
    // Transcripts of chats left during this process, keyed by chat id.
    archive: HashMap<String, Vec<Message>>,
    background: Vec<JoinHandle<()>>,
}

impl Controller {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            history: HistoryCache::new(backend.clone()),
            attachment: AttachmentStager::new(backend.clone()),
            backend,
            conversation: Conversation::new(),
            model: Model::default(),
            input: String::new(),
            turn: TurnState::Idle,
            archive: HashMap::new(),
            background: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.conversation.chat_id.as_deref()
    }

    pub fn turn_state(&self) -> &TurnState {
        &self.turn
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn set_model(&mut self, model: Model) {
        debug!(model = %model, "model selected");
        self.model = model;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn attachment(&self) -> &AttachmentStager {
        &self.attachment
    }

    pub fn attachment_mut(&mut self) -> &mut AttachmentStager {
        &mut self.attachment
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    /// Cached chat list; see [`Controller::refresh_history`].
    pub fn chats(&self) -> Vec<ChatSummary> {
        self.history.entries()
    }

    pub async fn refresh_history(&mut self) -> Result<Vec<ChatSummary>, ChatError> {
        self.history.refresh().await
    }

    /// Begin a new, empty chat. On failure the current conversation is
    /// left as it was.
    pub async fn start_chat(&mut self) -> Result<&str, ChatError> {
        let chat_id = self
            .backend
            .create_chat()
            .await
            .map_err(ChatError::Network)?;
        info!(chat_id = %chat_id, "chat started");

        self.replace_conversation(Conversation::started(chat_id));
        self.attachment.clear();
        self.refresh_in_background();
        Ok(self.chat_id().unwrap_or_default())
    }

    /// Make sure there is an active chat, creating one if needed.
    ///
    /// Unlike [`Controller::start_chat`] this keeps the staged attachment,
    /// since it runs as the first half of a send that will carry it.
    pub async fn ensure_chat(&mut self) -> Result<String, ChatError> {
        if let Some(id) = &self.conversation.chat_id {
            return Ok(id.clone());
        }

        let chat_id = self
            .backend
            .create_chat()
            .await
            .map_err(ChatError::Network)?;
        info!(chat_id = %chat_id, "chat created for first turn");

        self.conversation = Conversation::started(chat_id.clone());
        self.turn = TurnState::Idle;
        self.refresh_in_background();
        Ok(chat_id)
    }

    /// Replace the active conversation wholesale.
    pub fn select_chat(&mut self, conversation: Conversation) {
        info!(
            chat_id = conversation.chat_id.as_deref().unwrap_or("-"),
            messages = conversation.len(),
            "chat selected"
        );
        self.replace_conversation(conversation);
        self.attachment.clear();
    }

    /// Select a chat from the history list.
    ///
    /// The history endpoint carries no transcript, so a chat visited
    /// earlier in this process is restored from memory and any other opens
    /// empty.
    pub fn open_summary(&mut self, summary: &ChatSummary) {
        if self.conversation.is_active(&summary.id) {
            debug!(chat_id = %summary.id, "chat already open");
            return;
        }
        let messages = self.archive.get(&summary.id).cloned().unwrap_or_default();
        self.select_chat(Conversation::with_messages(summary.id.clone(), messages));
    }

    /// Send `text` (and the staged attachment, if any) as one turn.
    pub async fn send_turn(&mut self, text: &str) -> Result<TurnOutcome, ChatError> {
        if !self.has_payload(text) {
            return Ok(TurnOutcome::Skipped);
        }
        if let TurnState::Sending { chat_id } = &self.turn {
            return Err(ChatError::TurnInFlight {
                chat_id: chat_id.clone(),
            });
        }

        self.ensure_chat().await?;
        let Some(pending) = self.begin_turn(text)? else {
            return Ok(TurnOutcome::Skipped);
        };
        let result = self.backend.post_turn(&pending.request).await;
        self.complete_turn(pending, result)
    }

    /// Send whatever is in the input buffer.
    pub async fn submit(&mut self) -> Result<TurnOutcome, ChatError> {
        let text = self.input.clone();
        self.send_turn(&text).await
    }

    /// Optimistically append the user's message and mark the turn as
    /// sending. Returns `None` when there is nothing to send.
    pub fn begin_turn(&mut self, text: &str) -> Result<Option<PendingTurn>, ChatError> {
        if !self.has_payload(text) {
            return Ok(None);
        }
        if let TurnState::Sending { chat_id } = &self.turn {
            return Err(ChatError::TurnInFlight {
                chat_id: chat_id.clone(),
            });
        }
        let chat_id = self
            .conversation
            .chat_id
            .clone()
            .ok_or(ChatError::NoActiveChat)?;

        let text = text.trim();
        let snapshot_len = self.conversation.len();
        let message = Message::user(text);
        let message_id = message.id.clone();
        self.conversation.messages.push(message);
        self.input.clear();
        self.turn = TurnState::Sending {
            chat_id: chat_id.clone(),
        };
        debug!(chat_id = %chat_id, message_id = %message_id, "turn sending");

        let request = ChatRequest {
            chat_id: chat_id.clone(),
            message: text.to_string(),
            file_url: self.attachment.file_ref().map(str::to_string),
            model: self.model,
        };
        Ok(Some(PendingTurn {
            chat_id,
            snapshot_len,
            message_id,
            request,
        }))
    }

    /// Apply the collaborator's answer to a pending turn.
    ///
    /// A reply for a chat that is no longer active does not touch the
    /// active conversation or the turn state; only the stored transcript of
    /// the chat it belongs to is brought in line with what the server kept.
    ///
    /// The history refresh that follows a settled turn is spawned on the
    /// current tokio runtime and skipped when there is none.
    pub fn complete_turn(
        &mut self,
        pending: PendingTurn,
        result: Result<TurnReply, ApiError>,
    ) -> Result<TurnOutcome, ChatError> {
        if !self.conversation.is_active(&pending.chat_id) {
            warn!(
                chat_id = %pending.chat_id,
                active = self.chat_id().unwrap_or("-"),
                "discarding reply for a chat that is no longer active"
            );
            self.reconcile_archived(&pending, result);
            return Ok(TurnOutcome::Discarded);
        }

        match result {
            Ok(reply) => {
                let message = Message::assistant(reply.message, reply.report);
                self.conversation.messages.push(message.clone());
                self.attachment.clear();
                self.turn = TurnState::Settled;
                info!(
                    chat_id = %pending.chat_id,
                    report = message.report.is_some(),
                    "turn settled"
                );
                self.refresh_in_background();
                Ok(TurnOutcome::Settled(message))
            }
            Err(err) => {
                self.conversation.messages.truncate(pending.snapshot_len);
                self.turn = TurnState::RolledBack;
                info!(chat_id = %pending.chat_id, "turn rolled back: {err}");
                Err(ChatError::Network(err))
            }
        }
    }

    /// Delete a chat on the server. Deleting the active chat resets the
    /// controller to "no chat".
    pub async fn delete_chat(&mut self, chat_id: &str) -> Result<(), ChatError> {
        self.backend
            .remove_chat(chat_id)
            .await
            .map_err(ChatError::Network)?;
        info!(chat_id, "chat deleted");

        self.archive.remove(chat_id);
        self.history.forget(chat_id);
        if self.conversation.is_active(chat_id) {
            self.conversation = Conversation::new();
            self.attachment.clear();
            self.turn = TurnState::Idle;
        }
        self.refresh_in_background();
        Ok(())
    }

    /// Wait for every detached history refresh started so far.
    pub async fn settle_background(&mut self) {
        for handle in self.background.drain(..) {
            if let Err(err) = handle.await {
                warn!("history refresh task failed: {err}");
            }
        }
    }

    fn has_payload(&self, text: &str) -> bool {
        !text.trim().is_empty() || self.attachment.staged().is_some()
    }

    fn replace_conversation(&mut self, next: Conversation) {
        let prev = std::mem::replace(&mut self.conversation, next);
        if let Some(id) = prev.chat_id
            && !prev.messages.is_empty()
        {
            self.archive.insert(id, prev.messages);
        }
        self.turn = TurnState::Idle;
    }

    // The left chat was archived with its optimistic message; drop it on
    // failure, add the reply the server stored on success.
    fn reconcile_archived(
        &mut self,
        pending: &PendingTurn,
        result: Result<TurnReply, ApiError>,
    ) {
        let Some(messages) = self.archive.get_mut(&pending.chat_id) else {
            return;
        };
        match result {
            Ok(reply) => messages.push(Message::assistant(reply.message, reply.report)),
            Err(_) => {
                messages.truncate(pending.snapshot_len);
                if messages.is_empty() {
                    self.archive.remove(&pending.chat_id);
                }
            }
        }
    }

    fn refresh_in_background(&mut self) {
        if tokio::runtime::Handle::try_current().is_err() {
            debug!("no tokio runtime; skipping history refresh");
            return;
        }
        self.background.retain(|h| !h.is_finished());
        self.background.push(self.history.spawn_refresh());
    }
}
