//! Route handlers.
//!
//! Address-space calls block on network round trips, so they run on the
//! blocking pool. Evaluation is pure and runs inline.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::backend::AddressSpaceClient;
use crate::operators::{evaluate_logic, evaluate_math, MathOutcome, OperatorInfo, OperatorRegistry};
use crate::structure::{discover_channel, ChannelStructure};
use crate::types::TagValue;

/// Body of a tag value request
#[derive(Debug, Deserialize)]
pub struct TagValueRequest {
    #[serde(default)]
    pub node_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TagValueResponse {
    pub value: TagValue,
}

/// Body of an evaluation request
#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub inputs: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse<T> {
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct OperationsResponse {
    pub logic: Vec<OperatorInfo>,
    pub math: Vec<OperatorInfo>,
}

/// `GET /structure`
pub async fn get_structure<C>(
    State(state): State<AppState<C>>,
) -> Result<Json<ChannelStructure>, ApiError>
where
    C: AddressSpaceClient + 'static,
{
    let client = state.client.clone();
    let channel = state.channel.clone();
    let structure =
        tokio::task::spawn_blocking(move || discover_channel(client.as_ref(), &channel)).await?;
    Ok(Json(structure))
}

/// `POST /tag-value`
pub async fn tag_value<C>(
    State(state): State<AppState<C>>,
    payload: Result<Json<TagValueRequest>, JsonRejection>,
) -> Result<Json<TagValueResponse>, ApiError>
where
    C: AddressSpaceClient + 'static,
{
    let Json(request) = payload?;
    let node_id = request
        .node_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("node_id is required".to_string()))?;

    let client = state.client.clone();
    let id = node_id.clone();
    let value = tokio::task::spawn_blocking(move || client.read_value_by_id(&id))
        .await?
        .map_err(|e| e.with_context(format!("Failed to fetch tag value {}", node_id)))?;

    tracing::debug!("Read {} = {}", node_id, value);
    Ok(Json(TagValueResponse { value }))
}

/// `POST /evaluate-logic`
pub async fn evaluate_logic_handler(
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<EvaluationResponse<bool>>, ApiError> {
    let Json(request) = payload?;
    let result = evaluate_logic(&request.operation, &request.inputs)?;
    Ok(Json(EvaluationResponse { result }))
}

/// `POST /evaluate-math`
pub async fn evaluate_math_handler(
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<EvaluationResponse<MathOutcome>>, ApiError> {
    let Json(request) = payload?;
    let result = evaluate_math(&request.operation, &request.inputs)?;
    Ok(Json(EvaluationResponse { result }))
}

/// `GET /operations`
pub async fn list_operations() -> Json<OperationsResponse> {
    let registry = OperatorRegistry::global();
    Json(OperationsResponse {
        logic: registry.logic_catalog(),
        math: registry.math_catalog(),
    })
}

/// `GET /favicon.ico`
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
