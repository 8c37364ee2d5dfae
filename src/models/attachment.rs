use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    File,
    Link,
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentKind::File => write!(f, "file"),
            AttachmentKind::Link => write!(f, "link"),
        }
    }
}

impl std::str::FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(AttachmentKind::File),
            "link" => Ok(AttachmentKind::Link),
            _ => Err(format!("Invalid attachment type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub card_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: Option<String>,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttachmentRow {
    pub id: Uuid,
    pub card_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
    pub size: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn to_attachment(raw: AttachmentRow) -> Attachment {
    Attachment {
        id: raw.id,
        card_id: raw.card_id,
        name: raw.name,
        kind: raw.kind.parse().unwrap_or(AttachmentKind::File),
        url: raw.url,
        size: raw.size,
        created_at: raw.created_at,
    }
}

impl From<AttachmentRow> for Attachment {
    fn from(raw: AttachmentRow) -> Self {
        to_attachment(raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub card_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: Option<String>,
    pub size: Option<String>,
}

impl NewAttachment {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Attachment name is required".to_string());
        }
        if self.kind == AttachmentKind::Link
            && self.url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err("Link attachments require a url".to_string());
        }
        Ok(())
    }

    /// Size is informational and only meaningful for files.
    pub fn normalized_size(&self) -> Option<&str> {
        match self.kind {
            AttachmentKind::File => self.size.as_deref(),
            AttachmentKind::Link => None,
        }
    }
}
