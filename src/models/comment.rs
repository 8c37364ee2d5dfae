use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author: String,
    pub author_initials: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Stored initials, or ones derived from the author's name.
    pub fn initials(&self) -> String {
        match &self.author_initials {
            Some(initials) if !initials.is_empty() => initials.clone(),
            _ => generate_initials(&self.author),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub card_id: Uuid,
    pub author: String,
    pub author_initials: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

pub fn to_comment(raw: CommentRow) -> Comment {
    Comment {
        id: raw.id,
        card_id: raw.card_id,
        author: raw.author,
        author_initials: raw.author_initials,
        text: raw.text,
        created_at: raw.created_at,
    }
}

impl From<CommentRow> for Comment {
    fn from(raw: CommentRow) -> Self {
        to_comment(raw)
    }
}

/// Request body for posting a comment on a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub author: String,
    pub author_initials: Option<String>,
    pub text: String,
}

impl CreateComment {
    pub fn for_card(self, card_id: Uuid) -> NewComment {
        NewComment {
            card_id,
            author: self.author,
            author_initials: self.author_initials,
            text: self.text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub card_id: Uuid,
    pub author: String,
    pub author_initials: Option<String>,
    pub text: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), String> {
        if self.author.trim().is_empty() {
            return Err("Comment author is required".to_string());
        }
        if self.text.trim().is_empty() {
            return Err("Comment text is required".to_string());
        }
        Ok(())
    }
}

/// "Grace Hopper" -> "GH", "Ada" -> "AD", "" -> "".
pub fn generate_initials(name: &str) -> String {
    let parts: Vec<&str> = name.split(' ').collect();
    let first = parts.first().copied().unwrap_or_default();
    let last = parts.last().copied().unwrap_or_default();

    if first.is_empty() {
        return String::new();
    }

    let upper_first = |s: &str| s.chars().next().map(|c| c.to_uppercase().to_string());

    if parts.len() == 1 {
        return first.chars().take(2).collect::<String>().to_uppercase();
    }

    match (upper_first(first), upper_first(last)) {
        (Some(a), Some(b)) => format!("{}{}", a, b),
        (Some(a), None) => a,
        _ => String::new(),
    }
}
