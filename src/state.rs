use sqlx::SqlitePool;
use std::sync::Arc;

use crate::repo::{AttachmentRepository, CardRepository, ColumnRepository, CommentRepository};

#[derive(Clone)]
pub struct AppState {
    pub columns: ColumnRepository,
    pub cards: CardRepository,
    pub comments: CommentRepository,
    pub attachments: AttachmentRepository,
    pub pool: Arc<SqlitePool>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);
        Self {
            columns: ColumnRepository::new(pool.clone()),
            cards: CardRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            attachments: AttachmentRepository::new(pool.clone()),
            pool,
        }
    }
}
