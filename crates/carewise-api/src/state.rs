use crate::config::Config;
use carewise_chat::ChatService;
use carewise_records::RecordStore;
use std::sync::Arc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: Arc<ChatService>,
    pub records: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: Config, chat: ChatService, records: Arc<dyn RecordStore>) -> Self {
        Self {
            config: Arc::new(config),
            chat: Arc::new(chat),
            records,
        }
    }
}
