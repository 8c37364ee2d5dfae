use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub order: i32,
    pub attachment_count: i32,
    pub comment_count: i32,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn created_on(&self, day: NaiveDate) -> bool {
        self.created_at.date_naive() == day
    }
}

/// A `cards` row as the backend stores it. Labels are a JSON array in a TEXT
/// column and the counters are nullable.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CardRow {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub labels: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub order: i32,
    pub attachment_count: Option<i32>,
    pub comment_count: Option<i32>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn to_card(raw: CardRow) -> Card {
    let labels = raw
        .labels
        .as_deref()
        .and_then(|json| serde_json::from_str::<Vec<String>>(json).ok())
        .unwrap_or_default();

    Card {
        id: raw.id,
        column_id: raw.column_id,
        title: raw.title,
        description: raw.description,
        labels,
        due_date: raw.due_date,
        order: raw.order,
        attachment_count: raw.attachment_count.unwrap_or(0),
        comment_count: raw.comment_count.unwrap_or(0),
        archived_at: raw.archived_at,
        created_at: raw.created_at,
    }
}

impl From<CardRow> for Card {
    fn from(raw: CardRow) -> Self {
        to_card(raw)
    }
}

pub(crate) fn labels_to_json(labels: &[String]) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Card title is required".to_string());
    }
    Ok(())
}

fn validate_counts(attachment_count: i32, comment_count: i32) -> Result<(), String> {
    if attachment_count < 0 {
        return Err("Attachment count cannot be negative".to_string());
    }
    if comment_count < 0 {
        return Err("Comment count cannot be negative".to_string());
    }
    Ok(())
}

/// Everything the backend needs to insert a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub attachment_count: i32,
    #[serde(default)]
    pub comment_count: i32,
}

impl NewCard {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_counts(self.attachment_count, self.comment_count)
    }
}

/// A card as the view layer asks for it: the store decides its order.
#[derive(Debug, Clone)]
pub struct CardDraft {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub attachment_count: Option<i32>,
    pub comment_count: Option<i32>,
}

impl CardDraft {
    pub fn new(column_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            column_id,
            title: title.into(),
            description: None,
            labels: Vec::new(),
            due_date: None,
            attachment_count: None,
            comment_count: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_counts(
            self.attachment_count.unwrap_or(0),
            self.comment_count.unwrap_or(0),
        )
    }

    pub fn into_new_card(self, order: i32) -> NewCard {
        NewCard {
            column_id: self.column_id,
            title: self.title,
            description: self.description,
            labels: self.labels,
            due_date: self.due_date,
            order,
            attachment_count: self.attachment_count.unwrap_or(0),
            comment_count: self.comment_count.unwrap_or(0),
        }
    }
}

/// Replacement values for a card's editable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardChanges {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachment_count: i32,
    #[serde(default)]
    pub comment_count: i32,
}

impl CardChanges {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_counts(self.attachment_count, self.comment_count)
    }
}

impl From<&Card> for CardChanges {
    fn from(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone(),
            labels: card.labels.clone(),
            due_date: card.due_date,
            attachment_count: card.attachment_count,
            comment_count: card.comment_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveCard {
    pub column_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetArchived {
    pub archived_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(labels: Option<&str>) -> CardRow {
        CardRow {
            id: Uuid::new_v4(),
            column_id: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: None,
            labels: labels.map(str::to_string),
            due_date: None,
            order: 2,
            attachment_count: None,
            comment_count: Some(4),
            archived_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_card_normalizes_nullable_fields() {
        let card = to_card(row(None));
        assert!(card.labels.is_empty());
        assert_eq!(card.attachment_count, 0);
        assert_eq!(card.comment_count, 4);
        assert!(!card.is_archived());
    }

    #[test]
    fn test_to_card_parses_labels() {
        let card = to_card(row(Some(r#"["React","Docs"]"#)));
        assert_eq!(card.labels, vec!["React", "Docs"]);
    }

    #[test]
    fn test_to_card_malformed_labels_fall_back_to_empty() {
        let card = to_card(row(Some("not json")));
        assert!(card.labels.is_empty());
    }

    #[test]
    fn test_draft_defaults_counters_to_zero() {
        let new_card = CardDraft::new(Uuid::new_v4(), "Task").into_new_card(3);
        assert_eq!(new_card.order, 3);
        assert_eq!(new_card.attachment_count, 0);
        assert_eq!(new_card.comment_count, 0);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        assert!(CardDraft::new(Uuid::new_v4(), "   ").validate().is_err());
    }

    #[test]
    fn test_negative_counters_are_rejected() {
        let mut card = to_card(row(None));
        card.attachment_count = -7;
        assert!(CardChanges::from(&card).validate().is_err());

        card.attachment_count = 0;
        card.comment_count = -1;
        assert!(CardChanges::from(&card).validate().is_err());

        let mut draft = CardDraft::new(Uuid::new_v4(), "Task");
        draft.comment_count = Some(-3);
        assert!(draft.validate().is_err());

        let mut new_card = CardDraft::new(Uuid::new_v4(), "Task").into_new_card(0);
        new_card.attachment_count = -1;
        assert!(new_card.validate().is_err());
    }
}
