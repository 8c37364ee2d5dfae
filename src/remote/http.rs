use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    Attachment, Card, CardChanges, Column, ColumnChanges, Comment, CreateComment, NewAttachment,
    NewCard, NewColumn, NewComment,
};

use super::RemoteStore;

/// Remote store speaking to the board's JSON API over HTTP.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> StoreResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> StoreResult<reqwest::Response> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body["error"].as_str().map(str::to_string))
            .unwrap_or_else(|| status.to_string());

        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(format!("{} ({})", message, path)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Validation(message)
            }
            _ => StoreError::Transport(format!("backend returned {}: {}", status, message)),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> StoreResult<T> {
        let response = self.send(method, path, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to parse response: {}", e)))
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> StoreResult<()> {
        self.send(method, path, body).await?;
        Ok(())
    }
}

fn to_body<T: Serialize>(value: &T) -> StoreResult<Option<Value>> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| StoreError::Validation(e.to_string()))
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_columns(&self) -> StoreResult<Vec<Column>> {
        let mut columns: Vec<Column> = self.fetch(Method::GET, "/columns", None).await?;
        columns.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        Ok(columns)
    }

    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        self.fetch(Method::GET, "/cards", None).await
    }

    async fn create_column(&self, input: NewColumn) -> StoreResult<Column> {
        input.validate().map_err(StoreError::Validation)?;
        self.fetch(Method::POST, "/columns", to_body(&input)?).await
    }

    async fn update_column(&self, id: Uuid, changes: ColumnChanges) -> StoreResult<()> {
        self.execute(Method::PUT, &format!("/columns/{}", id), to_body(&changes)?)
            .await
    }

    async fn delete_column(&self, id: Uuid) -> StoreResult<()> {
        self.execute(Method::DELETE, &format!("/columns/{}", id), None)
            .await
    }

    async fn create_card(&self, input: NewCard) -> StoreResult<Card> {
        input.validate().map_err(StoreError::Validation)?;
        self.fetch(Method::POST, "/cards", to_body(&input)?).await
    }

    async fn update_card(&self, id: Uuid, changes: CardChanges) -> StoreResult<()> {
        self.execute(Method::PUT, &format!("/cards/{}", id), to_body(&changes)?)
            .await
    }

    async fn delete_card(&self, id: Uuid) -> StoreResult<()> {
        self.execute(Method::DELETE, &format!("/cards/{}", id), None)
            .await
    }

    async fn set_card_column(&self, id: Uuid, column_id: Uuid) -> StoreResult<()> {
        self.execute(
            Method::PATCH,
            &format!("/cards/{}/move", id),
            Some(json!({ "column_id": column_id })),
        )
        .await
    }

    async fn set_card_archived(
        &self,
        id: Uuid,
        archived_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        self.execute(
            Method::PATCH,
            &format!("/cards/{}/archive", id),
            Some(json!({ "archived_at": archived_at })),
        )
        .await
    }

    async fn list_comments(&self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.fetch(Method::GET, &format!("/cards/{}/comments", card_id), None)
            .await
    }

    async fn add_comment(&self, input: NewComment) -> StoreResult<Comment> {
        let body = CreateComment {
            author: input.author,
            author_initials: input.author_initials,
            text: input.text,
        };
        self.fetch(
            Method::POST,
            &format!("/cards/{}/comments", input.card_id),
            to_body(&body)?,
        )
        .await
    }

    async fn list_attachments(&self, card_id: Uuid) -> StoreResult<Vec<Attachment>> {
        self.fetch(Method::GET, &format!("/cards/{}/attachments", card_id), None)
            .await
    }

    async fn add_attachment(&self, input: NewAttachment) -> StoreResult<Attachment> {
        self.fetch(
            Method::POST,
            &format!("/cards/{}/attachments", input.card_id),
            to_body(&input)?,
        )
        .await
    }

    async fn delete_attachment(&self, id: Uuid) -> StoreResult<Uuid> {
        let path = format!("/attachments/{}", id);
        let response = self.send(Method::DELETE, &path, None).await?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Transport(format!("Failed to parse response: {}", e)))?;

        body["card_id"]
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| StoreError::Transport("response is missing card_id".to_string()))
    }
}
