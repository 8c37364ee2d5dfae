//! Board entities, their raw row shapes and the pure mappers between them.

pub mod attachment;
pub mod card;
pub mod column;
pub mod comment;

pub use attachment::{to_attachment, Attachment, AttachmentKind, AttachmentRow, NewAttachment};
pub use card::{to_card, Card, CardChanges, CardDraft, CardRow, MoveCard, NewCard, SetArchived};
pub use column::{to_column, Column, ColumnChanges, ColumnRow, NewColumn, DEFAULT_COLUMN_COLOR};
pub use comment::{generate_initials, to_comment, Comment, CommentRow, CreateComment, NewComment};
