use crate::error::{ChatError, Result};
use crate::prompt;
use carewise_history::{
    HistoryStore, MessageRole, StoredMessage, ThreadIdentity, ThreadSelector,
};
use carewise_llm::{ChatMessage, CompletionClient};
use carewise_records::{HealthRecord, RecordStore};
use std::sync::Arc;

/// Orchestrates one conversational turn end to end.
///
/// Per request: resolve the thread identity, load (or create) its
/// transcript, compose the current system prompt from the relevant record,
/// call the completion provider with the full reconstructed sequence, and
/// append the (user, assistant) pair. A failed completion reaches the store
/// not at all, so the transcript either gains both turns or neither.
pub struct ChatService {
    history: Arc<dyn HistoryStore>,
    records: Arc<dyn RecordStore>,
    completion: Arc<dyn CompletionClient>,
}

impl ChatService {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        records: Arc<dyn RecordStore>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            history,
            records,
            completion,
        }
    }

    /// Handle one user turn and return the full updated transcript.
    pub async fn send_turn(
        &self,
        user_id: &str,
        selector: ThreadSelector,
        text: &str,
    ) -> Result<Vec<StoredMessage>> {
        if text.trim().is_empty() {
            return Err(ChatError::Validation("message text is empty".to_string()));
        }

        // Resolve the record this thread speaks about. For a form-specific
        // thread the lookup is ownership-scoped, so another user's record id
        // resolves to RecordNotFound before anything is read or written.
        let record = self.resolve_record(user_id, &selector).await?;

        let identity = ThreadIdentity {
            user_id: user_id.to_string(),
            selector: selector.clone(),
        };
        let transcript = self.history.get_or_create(&identity).await?;

        let system_prompt = match &selector {
            ThreadSelector::Main => prompt::compose_main(record.as_ref()),
            ThreadSelector::FormSpecific(_) => {
                // resolve_record returned Some or failed for this selector
                let record = record.as_ref().ok_or_else(|| {
                    ChatError::Storage("form-specific record vanished mid-turn".to_string())
                })?;
                prompt::compose_for_record(record)
            }
        };

        let mut outbound = Vec::with_capacity(transcript.len() + 2);
        outbound.push(ChatMessage::system(system_prompt));
        outbound.extend(transcript.iter().map(to_chat_message));
        outbound.push(ChatMessage::user(text));

        tracing::debug!(%identity, history_len = transcript.len(), "sending chat turn");

        // Single attempt; on failure nothing is persisted.
        let reply = self.completion.complete(outbound).await?;

        let user_turn = StoredMessage::user(text);
        let assistant_turn = StoredMessage::assistant(reply);
        self.history
            .append(&identity, vec![user_turn.clone(), assistant_turn.clone()])
            .await?;

        let mut updated = transcript;
        updated.push(user_turn);
        updated.push(assistant_turn);
        Ok(updated)
    }

    /// Read-only transcript view; a never-created identity reads as empty.
    pub async fn get_history(
        &self,
        user_id: &str,
        selector: ThreadSelector,
    ) -> Result<Vec<StoredMessage>> {
        let identity = ThreadIdentity {
            user_id: user_id.to_string(),
            selector,
        };
        Ok(self.history.read(&identity).await?)
    }

    /// Empty the transcript, keeping the thread. Clearing an identity that
    /// was never created fails with [`ChatError::ThreadNotFound`].
    pub async fn clear_history(&self, user_id: &str, selector: ThreadSelector) -> Result<()> {
        let identity = ThreadIdentity {
            user_id: user_id.to_string(),
            selector,
        };
        self.history.clear(&identity).await?;
        tracing::info!(%identity, "chat history cleared");
        Ok(())
    }

    /// The record backing the system prompt for this selector, if any.
    ///
    /// Main threads use the user's latest record (absence is fine);
    /// form-specific threads require their bound record to exist and be
    /// owned by the user.
    async fn resolve_record(
        &self,
        user_id: &str,
        selector: &ThreadSelector,
    ) -> Result<Option<HealthRecord>> {
        match selector {
            ThreadSelector::Main => Ok(self.records.find_latest_for_user(user_id).await?),
            ThreadSelector::FormSpecific(record_id) => {
                let record = self
                    .records
                    .find_by_id(user_id, record_id)
                    .await?
                    .ok_or_else(|| ChatError::RecordNotFound(record_id.clone()))?;
                Ok(Some(record))
            }
        }
    }
}

fn to_chat_message(message: &StoredMessage) -> ChatMessage {
    match message.role {
        MessageRole::User => ChatMessage::user(message.content.clone()),
        MessageRole::Assistant => ChatMessage::assistant(message.content.clone()),
    }
}
