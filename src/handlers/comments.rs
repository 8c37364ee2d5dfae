use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, CreateComment};
use crate::state::AppState;

/// List all comments for a card
pub async fn list_comments(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>> {
    // 404 for unknown cards rather than an empty list
    state.cards.get_by_id(card_id).await?;

    let comments = state.comments.list_by_card(card_id).await?;
    Ok(Json(comments))
}

/// Add a comment to a card
pub async fn create_comment(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(input): Json<CreateComment>,
) -> Result<Json<Comment>> {
    let comment = state.comments.create(&input.for_card(card_id)).await?;
    Ok(Json(comment))
}
