use utoipa::OpenApi;

use crate::routes::{chat, health, records};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        chat::send_main_turn,
        chat::get_main_history,
        chat::clear_main_history,
        chat::send_record_turn,
        chat::get_record_history,
        chat::clear_record_history,
        records::create_record,
        records::list_records,
        records::get_record,
    ),
    components(schemas(
        health::HealthResponse,
        chat::ChatTurnRequest,
        chat::ChatTurnResponse,
        chat::MessageResponse,
        chat::HistoryResponse,
        records::CreateRecordRequest,
        records::RecordResponse,
        records::ListRecordsResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "chat", description = "Conversational threads"),
        (name = "records", description = "Health record submissions")
    ),
    info(
        title = "Carewise API",
        description = "Health-aware conversational assistant"
    )
)]
pub struct ApiDoc;
