use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Attachment, NewAttachment};
use crate::state::AppState;

pub async fn list_attachments(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Vec<Attachment>>> {
    state.cards.get_by_id(card_id).await?;

    let attachments = state.attachments.list_by_card(card_id).await?;
    Ok(Json(attachments))
}

#[derive(Debug, Deserialize)]
pub struct CreateAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub size: Option<String>,
}

pub async fn create_attachment(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(input): Json<CreateAttachment>,
) -> Result<Json<Attachment>> {
    let kind = input.kind.parse().map_err(AppError::Validation)?;

    let attachment = state
        .attachments
        .create(&NewAttachment {
            card_id,
            name: input.name,
            kind,
            url: input.url,
            size: input.size,
        })
        .await?;

    Ok(Json(attachment))
}

/// Responds with the owning card's id so clients can adjust its counter.
pub async fn delete_attachment(
    State(state): State<AppState>,
    Path(attachment_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let card_id = state.attachments.delete(attachment_id).await?;
    Ok(Json(json!({ "card_id": card_id })))
}
