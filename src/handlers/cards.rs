use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Card, CardChanges, MoveCard, NewCard, SetArchived};
use crate::state::AppState;

pub async fn create_card(
    State(state): State<AppState>,
    Json(input): Json<NewCard>,
) -> Result<Json<Card>> {
    let card = state.cards.create(&input).await?;
    Ok(Json(card))
}

pub async fn list_cards(State(state): State<AppState>) -> Result<Json<Vec<Card>>> {
    let cards = state.cards.list().await?;
    Ok(Json(cards))
}

pub async fn get_card(State(state): State<AppState>, Path(card_id): Path<Uuid>) -> Result<Json<Card>> {
    let card = state.cards.get_by_id(card_id).await?;
    Ok(Json(card))
}

pub async fn update_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(input): Json<CardChanges>,
) -> Result<Json<Card>> {
    let card = state.cards.update(card_id, &input).await?;
    Ok(Json(card))
}

pub async fn delete_card(State(state): State<AppState>, Path(card_id): Path<Uuid>) -> Result<()> {
    state.cards.delete(card_id).await?;
    Ok(())
}

pub async fn move_card(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(input): Json<MoveCard>,
) -> Result<Json<Card>> {
    let card = state.cards.set_column(card_id, input.column_id).await?;
    Ok(Json(card))
}

pub async fn set_archived(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(input): Json<SetArchived>,
) -> Result<Json<Card>> {
    let card = state.cards.set_archived(card_id, input.archived_at).await?;
    Ok(Json(card))
}
