use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Column, ColumnChanges, NewColumn};
use crate::state::AppState;

pub async fn create_column(
    State(state): State<AppState>,
    Json(input): Json<NewColumn>,
) -> Result<Json<Column>> {
    let column = state.columns.create(&input).await?;
    Ok(Json(column))
}

pub async fn list_columns(State(state): State<AppState>) -> Result<Json<Vec<Column>>> {
    let columns = state.columns.list().await?;
    Ok(Json(columns))
}

pub async fn update_column(
    State(state): State<AppState>,
    Path(column_id): Path<Uuid>,
    Json(input): Json<ColumnChanges>,
) -> Result<Json<Column>> {
    let updated = state.columns.update(column_id, &input).await?;
    Ok(Json(updated))
}

pub async fn delete_column(
    State(state): State<AppState>,
    Path(column_id): Path<Uuid>,
) -> Result<()> {
    state.columns.delete(column_id).await?;
    Ok(())
}

/// Creates the default columns on an empty board; a no-op otherwise.
pub async fn seed_columns(State(state): State<AppState>) -> Result<Json<Vec<Column>>> {
    let created = state.columns.seed_defaults().await?;
    Ok(Json(created))
}
