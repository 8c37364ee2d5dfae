use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_COLUMN_COLOR: &str = "#0ea5e9";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub order: i32,
}

/// A `columns` row as the backend stores it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnRow {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub order: i32,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn to_column(raw: ColumnRow) -> Column {
    Column {
        id: raw.id,
        name: raw.name,
        color: raw.color.unwrap_or_else(|| DEFAULT_COLUMN_COLOR.to_string()),
        order: raw.order,
    }
}

impl From<ColumnRow> for Column {
    fn from(raw: ColumnRow) -> Self {
        to_column(raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewColumn {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub order: i32,
}

fn default_color() -> String {
    DEFAULT_COLUMN_COLOR.to_string()
}

impl NewColumn {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Column name is required".to_string());
        }
        Ok(())
    }
}

/// Partial column update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl ColumnChanges {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Column name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl From<&Column> for ColumnChanges {
    fn from(column: &Column) -> Self {
        Self {
            name: Some(column.name.clone()),
            color: Some(column.color.clone()),
        }
    }
}
