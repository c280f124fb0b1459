use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use carewise_records::{BloodPressure, HealthRecord, NewHealthRecord, Symptoms};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth::AuthedUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRecordRequest {
    pub heart_rate: u32,
    pub spo2: u32,
    pub temperature: f64,
    #[schema(value_type = Object)]
    pub blood_pressure: BloodPressure,
    /// Tagged by `problem_area`; only the chosen group's fields apply.
    #[schema(value_type = Object)]
    pub symptoms: Symptoms,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordResponse {
    pub id: String,
    pub heart_rate: u32,
    pub spo2: u32,
    pub temperature: f64,
    #[schema(value_type = Object)]
    pub blood_pressure: BloodPressure,
    pub problem_area: String,
    #[schema(value_type = Object)]
    pub symptoms: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRecordsResponse {
    pub records: Vec<RecordResponse>,
}

fn record_to_response(record: HealthRecord) -> RecordResponse {
    RecordResponse {
        id: record.id.to_hex(),
        heart_rate: record.heart_rate,
        spo2: record.spo2,
        temperature: record.temperature,
        blood_pressure: record.blood_pressure,
        problem_area: record.symptoms.problem_area().to_string(),
        symptoms: record.symptoms.detail(),
        created_at: record.created_at,
    }
}

/// Submit a new health record
#[utoipa::path(
    post,
    path = "/records",
    request_body = CreateRecordRequest,
    responses(
        (status = 201, description = "Record saved", body = RecordResponse),
        (status = 400, description = "Invalid payload")
    ),
    tag = "records"
)]
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
    Json(req): Json<CreateRecordRequest>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let record = state
        .records
        .create(
            &user_id,
            NewHealthRecord {
                heart_rate: req.heart_rate,
                spo2: req.spo2,
                temperature: req.temperature,
                blood_pressure: req.blood_pressure,
                symptoms: req.symptoms,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record_to_response(record))))
}

/// List the caller's records, newest first
#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "Records for the caller", body = ListRecordsResponse)
    ),
    tag = "records"
)]
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
) -> ApiResult<Json<ListRecordsResponse>> {
    let records = state.records.list_for_user(&user_id).await?;

    Ok(Json(ListRecordsResponse {
        records: records.into_iter().map(record_to_response).collect(),
    }))
}

/// Fetch one record by id
#[utoipa::path(
    get,
    path = "/records/{record_id}",
    params(("record_id" = String, Path, description = "Health record id")),
    responses(
        (status = 200, description = "The record", body = RecordResponse),
        (status = 404, description = "Record not found or not owned by the caller")
    ),
    tag = "records"
)]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
    Path(record_id): Path<String>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .records
        .find_by_id(&user_id, &record_id)
        .await?
        .ok_or(ApiError::RecordNotFound(record_id))?;

    Ok(Json(record_to_response(record)))
}
